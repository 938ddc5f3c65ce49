pub mod mongo;
pub mod pricing_store;
