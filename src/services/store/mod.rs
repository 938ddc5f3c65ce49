pub mod interface;
pub mod memory;

use std::collections::HashSet;

use futures::future::join_all;
use log::{debug, warn};

use crate::models::price_modifier::{PriceModifier, ScopeRef};
use crate::services::pricing_error::PricingError;
use interface::{ModifierStore, StoreError};

/// Fetch the modifiers attached to every scope in `scopes`, deduplicated by id.
///
/// Lookups run concurrently. A scope whose lookup fails contributes nothing and
/// the rest of the fetch carries on; only an unreachable store fails the fetch.
/// Results keep the order of `scopes`, then the order the store returned them in.
pub async fn fetch_modifiers<S: ModifierStore>(
    store: &S,
    scopes: &[ScopeRef],
) -> Result<Vec<PriceModifier>, PricingError> {
    let lookups = scopes.iter().map(|scope| async move {
        let result = store.modifiers_for_scope(scope).await;
        (scope, result)
    });

    let mut seen = HashSet::new();
    let mut modifiers = Vec::new();

    for (scope, result) in join_all(lookups).await {
        match result {
            Ok(found) => {
                debug!(
                    "Fetched {} modifiers for {} {}",
                    found.len(),
                    scope.scope_type(),
                    scope.scope_id()
                );
                for modifier in found {
                    if !seen.insert(modifier.id) {
                        continue;
                    }
                    if modifier.value.is_sign_negative() {
                        warn!(
                            "Price modifier {} ({}) has negative value {}, using its magnitude",
                            modifier.id, modifier.name, modifier.value
                        );
                    }
                    modifiers.push(modifier);
                }
            }
            Err(StoreError::Unavailable(reason)) => {
                return Err(PricingError::StoreUnavailable(reason));
            }
            Err(err) => {
                warn!(
                    "Skipping modifiers for {} {}: {}",
                    scope.scope_type(),
                    scope.scope_id(),
                    err
                );
            }
        }
    }

    Ok(modifiers)
}
