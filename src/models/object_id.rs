use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serializer};

// Booking UIs send plain hex ids; stored documents use extended JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawObjectId {
    Hex(String),
    Extended {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

pub fn serialize<S>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&id.to_hex())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<ObjectId, D::Error>
where
    D: Deserializer<'de>,
{
    let hex = match RawObjectId::deserialize(deserializer)? {
        RawObjectId::Hex(hex) => hex,
        RawObjectId::Extended { oid } => oid,
    };
    ObjectId::parse_str(&hex).map_err(serde::de::Error::custom)
}
