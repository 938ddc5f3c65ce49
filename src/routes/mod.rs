pub mod checkout;
pub mod health;
pub mod pricing;

use actix_web::{web, HttpResponse};

use crate::services::{
    pricing_error::PricingError,
    store::interface::{InstanceStore, ModifierStore},
};

/// Register the pricing endpoints for a concrete store type.
pub fn configure<S>(cfg: &mut web::ServiceConfig)
where
    S: ModifierStore + InstanceStore + 'static,
{
    cfg.service(
        web::scope("/api")
            .route("/pricing/quote", web::post().to(pricing::quote::<S>))
            .route("/checkout/initiate", web::post().to(checkout::initiate::<S>)),
    );
}

pub fn error_response(err: &PricingError) -> HttpResponse {
    let body = serde_json::json!({
        "error": err.kind(),
        "message": err.to_string(),
    });

    match err {
        PricingError::InvalidBookingContext(_) => HttpResponse::BadRequest().json(body),
        PricingError::InstanceNotFound(_) => HttpResponse::NotFound().json(body),
        PricingError::AmbiguousBaseOverride { .. }
        | PricingError::CurrencyMismatch { .. }
        | PricingError::Superseded { .. } => HttpResponse::Conflict().json(body),
        PricingError::AmountOutOfRange(_) => HttpResponse::UnprocessableEntity().json(body),
        PricingError::StoreUnavailable(_) => HttpResponse::ServiceUnavailable().json(body),
    }
}
