use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{
    booking::BookableInstance,
    price_modifier::{PriceModifier, ScopeRef},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("lookup failed: {0}")]
    Lookup(String),
    /// The backing store cannot be reached at all
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read boundary for price modifiers. One call per level of the ownership chain.
pub trait ModifierStore {
    async fn modifiers_for_scope(&self, scope: &ScopeRef) -> Result<Vec<PriceModifier>, StoreError>;
}

/// Read boundary for bookable instances.
pub trait InstanceStore {
    async fn instance(&self, id: &ObjectId) -> Result<BookableInstance, StoreError>;
}
