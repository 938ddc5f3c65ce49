use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    error::ErrorKind,
    Client, Collection,
};
use std::sync::Arc;

use crate::models::{
    booking::BookableInstance,
    price_modifier::{PriceModifier, ScopeRef},
};
use crate::services::store::interface::{InstanceStore, ModifierStore, StoreError};

pub const DEFAULT_DATABASE: &str = "Pricing";
const MODIFIER_COLLECTION: &str = "PriceModifiers";
const INSTANCE_COLLECTION: &str = "Instances";

/// MongoDB-backed read side of the pricing core. Admin tooling owns the writes.
#[derive(Clone)]
pub struct MongoPricingStore {
    client: Arc<Client>,
    database: String,
}

impl MongoPricingStore {
    pub fn new(client: Arc<Client>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    fn modifiers(&self) -> Collection<PriceModifier> {
        self.client
            .database(&self.database)
            .collection(MODIFIER_COLLECTION)
    }

    fn instances(&self) -> Collection<BookableInstance> {
        self.client
            .database(&self.database)
            .collection(INSTANCE_COLLECTION)
    }
}

fn store_error(err: mongodb::error::Error) -> StoreError {
    match *err.kind {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Lookup(err.to_string()),
    }
}

impl ModifierStore for MongoPricingStore {
    async fn modifiers_for_scope(&self, scope: &ScopeRef) -> Result<Vec<PriceModifier>, StoreError> {
        let filter = doc! {
            "scope.scope_type": scope.scope_type(),
            "scope.scope_id": scope.scope_id(),
        };

        let cursor = self.modifiers().find(filter).await.map_err(store_error)?;
        cursor.try_collect().await.map_err(store_error)
    }
}

impl InstanceStore for MongoPricingStore {
    async fn instance(&self, id: &ObjectId) -> Result<BookableInstance, StoreError> {
        match self.instances().find_one(doc! { "_id": *id }).await {
            Ok(Some(instance)) => Ok(instance),
            Ok(None) => Err(StoreError::NotFound),
            Err(err) => Err(store_error(err)),
        }
    }
}
