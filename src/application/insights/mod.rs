//! Read-side analytics over the prediction history.
//!
//! Nothing here writes: KPIs, risk explanations and recommendations are
//! recomputed from the stored records on every call.

pub mod kpi_aggregator;
pub mod recommendation_advisor;
pub mod risk_explainer;

pub use kpi_aggregator::{KpiAggregator, Kpis};
pub use recommendation_advisor::RecommendationAdvisor;
pub use risk_explainer::{RiskExplainer, RiskFactorsResult};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::customer::{
        CustomerFeatures, PaymentMethod, PredictionRequest, SubscriptionType,
    };
    use crate::domain::history::HistoryRecord;
    use crate::domain::prediction::{PredictionLabel, PredictionResult};
    use chrono::{Duration, TimeZone, Utc};

    /// Record for `customer_id` stamped `minute` minutes after a fixed origin
    #[allow(clippy::too_many_arguments)]
    pub fn record_with(
        customer_id: &str,
        probability: f64,
        minute: i64,
        subscription_type: SubscriptionType,
        payment_method: PaymentMethod,
        last_login_days: u32,
        watch_hours: f64,
        avg_watch_time_per_day: f64,
    ) -> HistoryRecord {
        let request = PredictionRequest::new(
            customer_id,
            CustomerFeatures {
                subscription_type,
                watch_hours,
                last_login_days,
                monthly_fee: subscription_type.price(),
                number_of_profiles: 1,
                avg_watch_time_per_day,
                payment_method,
            },
        );
        let label = if probability >= 0.5 {
            PredictionLabel::WillChurn
        } else {
            PredictionLabel::WillContinue
        };
        let created_at =
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute);

        HistoryRecord::from_prediction(
            &request,
            &PredictionResult { label, probability },
            Some(created_at),
        )
    }

    pub fn record(customer_id: &str, probability: f64, minute: i64) -> HistoryRecord {
        record_with(
            customer_id,
            probability,
            minute,
            SubscriptionType::Basic,
            PaymentMethod::DebitCard,
            10,
            12.0,
            1.5,
        )
    }
}
