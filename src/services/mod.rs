pub mod applicability;
pub mod pricing_error;
pub mod pricing_service;
pub mod quote_generation;
pub mod store;
pub mod total_calculator;
