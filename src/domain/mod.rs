// Customer features and prediction requests
pub mod customer;

// Prediction history records
pub mod history;

// ML service results
pub mod prediction;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Risk tier classification
pub mod risk_tier;

// Domain-specific error types
pub mod errors;
