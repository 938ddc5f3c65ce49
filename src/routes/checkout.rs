use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error_response;
use crate::models::{booking::BookingContext, breakdown::PriceBreakdown};
use crate::services::{
    pricing_error::PricingError,
    pricing_service::PricingService,
    store::interface::{InstanceStore, ModifierStore},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub quote_id: Uuid,
    pub instance_id: String,
    /// Authoritative charge in the currency's minor unit
    pub amount_minor: i64,
    pub currency: String,
    pub breakdown: PriceBreakdown,
}

/// Compute the amount to charge for a booking. Goes through the same
/// `PricingService::quote` path as the quote endpoint.
pub async fn initiate<S>(
    store: web::Data<S>,
    pricing: web::Data<PricingService>,
    input: web::Json<BookingContext>,
) -> impl Responder
where
    S: ModifierStore + InstanceStore + 'static,
{
    let context = input.into_inner();

    let breakdown = match pricing.quote(store.get_ref(), &context).await {
        Ok(breakdown) => breakdown,
        Err(err) => {
            warn!("Checkout for instance {} failed: {}", context.instance_id, err);
            return error_response(&err);
        }
    };

    let amount_minor = match breakdown.total_minor_units() {
        Some(amount) => amount,
        None => {
            error!(
                "Total {} {} does not fit in a charge amount",
                breakdown.total, breakdown.currency
            );
            return error_response(&PricingError::AmountOutOfRange(format!(
                "total {} {} cannot be charged",
                breakdown.total, breakdown.currency
            )));
        }
    };

    let quote_id = Uuid::new_v4();
    info!(
        "Checkout quote {} for instance {}: {} {} ({} minor units)",
        quote_id, context.instance_id, breakdown.total, breakdown.currency, amount_minor
    );

    HttpResponse::Ok().json(CheckoutResponse {
        quote_id,
        instance_id: context.instance_id.to_hex(),
        amount_minor,
        currency: breakdown.currency.clone(),
        breakdown,
    })
}
