use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("pricing store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("instance {0} not found")]
    InstanceNotFound(String),
    #[error("invalid booking context: {0}")]
    InvalidBookingContext(String),
    #[error("more than one base price override applies: {}", modifier_ids.join(", "))]
    AmbiguousBaseOverride { modifier_ids: Vec<String> },
    #[error("modifier {modifier_id} is priced in {found}, expected {expected}")]
    CurrencyMismatch {
        expected: String,
        found: String,
        modifier_id: String,
    },
    #[error("quote generation {generation} was superseded by a newer request")]
    Superseded { generation: u64 },
    #[error("amount out of range: {0}")]
    AmountOutOfRange(String),
}

impl PricingError {
    /// Stable machine-readable name used in API error bodies.
    pub fn kind(&self) -> &str {
        match self {
            PricingError::StoreUnavailable(_) => "store_unavailable",
            PricingError::InstanceNotFound(_) => "instance_not_found",
            PricingError::InvalidBookingContext(_) => "invalid_booking_context",
            PricingError::AmbiguousBaseOverride { .. } => "ambiguous_base_override",
            PricingError::CurrencyMismatch { .. } => "currency_mismatch",
            PricingError::Superseded { .. } => "superseded",
            PricingError::AmountOutOfRange(_) => "amount_out_of_range",
        }
    }
}
