// Service health reporting
pub mod health;

// Paged history reads and the administrative clear
pub mod history_service;

// KPIs, risk explanations and recommendations
pub mod insights;

// Predictor calls under timeout/retry, with persistence
pub mod prediction;

// Application wiring
pub mod system;

pub use system::ChurnInsight;
