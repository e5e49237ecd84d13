use crate::domain::customer::SubscriptionType;
use crate::domain::prediction::PredictionResult;
use thiserror::Error;

/// Failure of a single call to the ML service, as reported by a predictor
/// adapter. Carries no customer context; the orchestrator adds it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictorError {
    #[error("ML service unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("ML service call timed out")]
    Timeout,

    #[error("ML service rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("ML service unavailable (HTTP {status})")]
    Unavailable { status: u16 },

    #[error("Malformed ML service response: {reason}")]
    Protocol { reason: String },

    #[error("Empty ML service response")]
    Empty,
}

impl PredictorError {
    /// Transport and timeout failures are the only ones worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout)
    }
}

/// Outcome of a failed prediction, one variant per failure mode
#[derive(Debug, Clone, Error)]
pub enum PredictionError {
    #[error("ML service unreachable for customer {customer_id}: {reason}")]
    ServiceUnreachable { customer_id: String, reason: String },

    #[error("ML service timed out for customer {customer_id} after {attempts} attempt(s) of {timeout_ms}ms")]
    Timeout {
        customer_id: String,
        attempts: u32,
        timeout_ms: u64,
    },

    #[error("ML service rejected customer {customer_id} (HTTP {status}): {body}")]
    UpstreamRejected {
        customer_id: String,
        status: u16,
        body: String,
    },

    #[error("ML service unavailable for customer {customer_id} (HTTP {status})")]
    UpstreamUnavailable { customer_id: String, status: u16 },

    #[error("Invalid ML service response for customer {customer_id}: {reason}")]
    ProtocolViolation { customer_id: String, reason: String },

    #[error("Empty ML service response for customer {customer_id}")]
    EmptyResponse { customer_id: String },

    #[error("Prediction for customer {customer_id} obtained but not persisted: {reason}")]
    PersistenceFailure {
        customer_id: String,
        result: PredictionResult,
        reason: String,
    },

    #[error("Prediction for customer {customer_id} cancelled after {attempts} attempt(s)")]
    Cancelled { customer_id: String, attempts: u32 },
}

impl PredictionError {
    pub fn customer_id(&self) -> &str {
        match self {
            Self::ServiceUnreachable { customer_id, .. }
            | Self::Timeout { customer_id, .. }
            | Self::UpstreamRejected { customer_id, .. }
            | Self::UpstreamUnavailable { customer_id, .. }
            | Self::ProtocolViolation { customer_id, .. }
            | Self::EmptyResponse { customer_id }
            | Self::PersistenceFailure { customer_id, .. }
            | Self::Cancelled { customer_id, .. } => customer_id,
        }
    }

    /// Stable short name, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceUnreachable { .. } => "service_unreachable",
            Self::Timeout { .. } => "timeout",
            Self::UpstreamRejected { .. } => "upstream_rejected",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::ProtocolViolation { .. } => "protocol_violation",
            Self::EmptyResponse { .. } => "empty_response",
            Self::PersistenceFailure { .. } => "persistence_failure",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// The model answered, but the answer could not be stored
    pub fn unpersisted_result(&self) -> Option<&PredictionResult> {
        match self {
            Self::PersistenceFailure { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Errors from the risk explanation read path
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("No prediction history for customer {customer_id}")]
    NotFound { customer_id: String },

    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

/// Input rejected before it reaches the core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Customer id must not be empty")]
    EmptyCustomerId,

    #[error("Watch hours must be >= 0, got {value}")]
    NegativeWatchHours { value: f64 },

    #[error("Number of profiles must be between 1 and 5, got {value}")]
    ProfilesOutOfRange { value: u8 },

    #[error("Average watch time per day must be between 0 and 24, got {value}")]
    AvgWatchTimeOutOfRange { value: f64 },

    #[error("Field {field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("Monthly fee {fee:.2} does not match the {subscription} plan price {expected:.2}")]
    FeeMismatch {
        subscription: SubscriptionType,
        fee: f64,
        expected: f64,
    },

    #[error("Unknown subscription type: {value}")]
    UnknownSubscription { value: String },

    #[error("Unknown payment method: {value}")]
    UnknownPaymentMethod { value: String },

    #[error("Page size must be between 1 and {max}, got {size}")]
    InvalidPageSize { size: u32, max: u32 },

    #[error("Range start {start} is after range end {end}")]
    InvalidRange { start: String, end: String },
}
