use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::models::{
    booking::{BookableInstance, BookingContext},
    breakdown::PriceBreakdown,
    price_modifier::{PriceModifier, DEFAULT_CURRENCY},
};
use crate::services::{
    applicability::{base_overrides, filter_applicable},
    pricing_error::PricingError,
    quote_generation::QuoteGenerations,
    store::{
        fetch_modifiers,
        interface::{InstanceStore, ModifierStore, StoreError},
    },
    total_calculator::{TotalCalculator, TotalRequest},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fail with `AmbiguousBaseOverride` when several `BASE_PRICE` modifiers apply
    pub strict_base_overrides: bool,
    /// Currency assumed for instances stored without one
    pub default_currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            strict_base_overrides: true,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl PricingConfig {
    /// Create config from environment variables or use defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            strict_base_overrides: std::env::var("PRICING_STRICT_BASE_OVERRIDES")
                .ok()
                .and_then(|s| s.trim().to_lowercase().parse().ok())
                .unwrap_or(defaults.strict_base_overrides),
            default_currency: std::env::var("PRICING_DEFAULT_CURRENCY")
                .ok()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.default_currency),
        }
    }
}

/// Price resolution for bookable instances. The quote endpoint and checkout
/// initiation both go through [`PricingService::quote`] so the price shown to
/// the guest is the price charged.
pub struct PricingService {
    pub config: PricingConfig,
    calculator: TotalCalculator,
}

impl Default for PricingService {
    fn default() -> Self {
        Self::with_config(PricingConfig::default())
    }
}

impl PricingService {
    pub fn new() -> Self {
        let config = PricingConfig::from_env();
        info!("PricingService initialized with config: {:?}", config);
        Self::with_config(config)
    }

    pub fn with_config(config: PricingConfig) -> Self {
        let calculator = TotalCalculator::new(config.strict_base_overrides);
        Self { config, calculator }
    }

    /// Load the instance, validate the context, fetch the modifiers of the whole
    /// ownership chain and price the booking.
    pub async fn quote<S>(
        &self,
        store: &S,
        context: &BookingContext,
    ) -> Result<PriceBreakdown, PricingError>
    where
        S: ModifierStore + InstanceStore,
    {
        let instance = match store.instance(&context.instance_id).await {
            Ok(instance) => instance,
            Err(StoreError::NotFound) => {
                return Err(PricingError::InstanceNotFound(context.instance_id.to_hex()))
            }
            Err(StoreError::Unavailable(reason)) | Err(StoreError::Lookup(reason)) => {
                return Err(PricingError::StoreUnavailable(reason))
            }
        };

        // Reject bad contexts before touching any modifier
        let nights = context
            .validate_against(&instance)
            .map_err(PricingError::InvalidBookingContext)?;

        let modifiers = fetch_modifiers(store, &instance.scope_chain()).await?;
        self.price_nights(&instance, context, nights, &modifiers)
    }

    /// Same as [`quote`](Self::quote), but the result is discarded when a newer
    /// generation was started while this one was in flight.
    pub async fn quote_for_generation<S>(
        &self,
        store: &S,
        generations: &QuoteGenerations,
        generation: u64,
        context: &BookingContext,
    ) -> Result<PriceBreakdown, PricingError>
    where
        S: ModifierStore + InstanceStore,
    {
        let result = self.quote(store, context).await;

        if !generations.is_current(generation) {
            warn!(
                "Dropping quote generation {} for instance {}, latest is {}",
                generation,
                context.instance_id,
                generations.latest()
            );
            return Err(PricingError::Superseded { generation });
        }

        result
    }

    /// Price a context from modifiers the caller already fetched. The context is
    /// validated against `instance` first.
    pub fn price(
        &self,
        instance: &BookableInstance,
        context: &BookingContext,
        modifiers: &[PriceModifier],
    ) -> Result<PriceBreakdown, PricingError> {
        let nights = context
            .validate_against(instance)
            .map_err(PricingError::InvalidBookingContext)?;
        self.price_nights(instance, context, nights, modifiers)
    }

    fn price_nights(
        &self,
        instance: &BookableInstance,
        context: &BookingContext,
        nights: u32,
        modifiers: &[PriceModifier],
    ) -> Result<PriceBreakdown, PricingError> {
        let mut applicable = base_overrides(modifiers, context);
        applicable.extend(filter_applicable(modifiers, context));

        let mut request = TotalRequest::for_instance(instance, nights, context.guest_count);
        if request.currency.trim().is_empty() {
            request.currency = self.config.default_currency.clone();
        }

        let breakdown = self.calculator.compute_total(&request, &applicable)?;

        info!(
            "Quoted instance {} ({:?}, {} nights, {} guests): {} of {} modifiers applied, total {} {}",
            instance.id,
            breakdown.booking_mode,
            breakdown.nights,
            breakdown.guest_count,
            applicable.len(),
            modifiers.len(),
            breakdown.total,
            breakdown.currency
        );

        Ok(breakdown)
    }
}
