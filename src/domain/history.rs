use crate::domain::customer::{PaymentMethod, PredictionRequest, SubscriptionType};
use crate::domain::errors::ValidationError;
use crate::domain::prediction::{PredictionLabel, PredictionResult};
use crate::domain::risk_tier::RiskTier;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Largest page size accepted by history listings
pub const MAX_PAGE_SIZE: u32 = 500;

/// Creation times are kept at millisecond precision, the resolution of the store.
pub fn to_stored_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Inclusive `[start, end]` narrowed to whole milliseconds: a stored time `t`
/// lies in the original range iff it lies in the returned one.
pub fn stored_range(start: DateTime<Utc>, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let floor = to_stored_precision(start);
    let start = if floor < start {
        floor + Duration::milliseconds(1)
    } else {
        floor
    };
    (start, to_stored_precision(end))
}

/// One successful prediction together with the features it was made on.
///
/// Enum-like columns are kept as the stored text so that rows written by
/// other producers still load; typed views are available through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Assigned by the store on insert
    pub id: Option<i64>,
    pub customer_id: String,
    pub subscription_type: String,
    pub payment_method: String,
    pub monthly_fee: f64,
    pub watch_hours: f64,
    pub last_login_days: u32,
    pub number_of_profiles: u8,
    pub avg_watch_time_per_day: f64,
    pub probability: f64,
    /// Raw model label (`will_churn` / `will_continue`)
    pub label: String,
    /// Business tier label (`Riesgo alto` / `Riesgo medio` / `Riesgo bajo`)
    pub risk_tier: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Build the record for a successful prediction. The tier is derived from
    /// the probability and `created_at` defaults to now, truncated to
    /// milliseconds.
    pub fn from_prediction(
        request: &PredictionRequest,
        result: &PredictionResult,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        let features = &request.features;
        Self {
            id: None,
            customer_id: request.customer_id.clone(),
            subscription_type: features.subscription_type.code().to_string(),
            payment_method: features.payment_method.code().to_string(),
            monthly_fee: features.monthly_fee,
            watch_hours: features.watch_hours,
            last_login_days: features.last_login_days,
            number_of_profiles: features.number_of_profiles,
            avg_watch_time_per_day: features.avg_watch_time_per_day,
            probability: result.probability,
            label: result.label.as_str().to_string(),
            risk_tier: RiskTier::classify(result.probability).label().to_string(),
            created_at: to_stored_precision(created_at.unwrap_or_else(Utc::now)),
        }
    }

    /// Copy of the record carrying the identity assigned by the store
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn tier(&self) -> Option<RiskTier> {
        RiskTier::from_label(&self.risk_tier)
    }

    pub fn subscription(&self) -> Option<SubscriptionType> {
        self.subscription_type.parse().ok()
    }

    pub fn payment(&self) -> Option<PaymentMethod> {
        self.payment_method.parse().ok()
    }

    pub fn is_churn(&self) -> bool {
        self.label
            .eq_ignore_ascii_case(PredictionLabel::WillChurn.as_str())
    }
}

/// Zero-based page index and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, ValidationError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidPageSize {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, size })
    }

    /// First page holding `size` entries
    pub fn first(size: u32) -> Result<Self, ValidationError> {
        Self::new(0, size)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}
