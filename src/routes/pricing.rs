use actix_web::{web, HttpResponse, Responder};
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error_response;
use crate::models::{booking::BookingContext, breakdown::PriceBreakdown};
use crate::services::{
    pricing_service::PricingService,
    store::interface::{InstanceStore, ModifierStore},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub context: BookingContext,
    /// Echoed back so the booking UI can drop responses for contexts it has moved past
    #[serde(default)]
    pub generation: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote_id: Uuid,
    pub generation: Option<u64>,
    pub breakdown: PriceBreakdown,
}

pub async fn quote<S>(
    store: web::Data<S>,
    pricing: web::Data<PricingService>,
    input: web::Json<QuoteRequest>,
) -> impl Responder
where
    S: ModifierStore + InstanceStore + 'static,
{
    let input = input.into_inner();

    match pricing.quote(store.get_ref(), &input.context).await {
        Ok(breakdown) => HttpResponse::Ok().json(QuoteResponse {
            quote_id: Uuid::new_v4(),
            generation: input.generation,
            breakdown,
        }),
        Err(err) => {
            warn!("Quote for instance {} failed: {}", input.context.instance_id, err);
            error_response(&err)
        }
    }
}
