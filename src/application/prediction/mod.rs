pub mod orchestrator;
pub mod policy;

pub use orchestrator::PredictionOrchestrator;
pub use policy::PredictionPolicy;
