use crate::domain::customer::{PaymentMethod, SubscriptionType};
use crate::domain::errors::ExplainError;
use crate::domain::history::{HistoryRecord, PageRequest};
use crate::domain::repositories::HistoryRepository;
use crate::domain::risk_tier::RiskTier;
use anyhow::Context;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

pub const INACTIVE_LOGIN_DAYS: u32 = 40;
pub const RECENT_LOGIN_DAYS: u32 = 20;
pub const LOW_WATCH_HOURS: f64 = 5.0;
pub const HIGH_WATCH_HOURS: f64 = 20.0;
pub const LOW_DAILY_WATCH_HOURS: f64 = 0.5;
pub const STANDARD_ENGAGEMENT_HOURS: f64 = 10.0;

/// Explanation of a customer's latest prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactorsResult {
    /// Tier label as stored with the prediction
    pub risk_tier: String,
    pub factors: Vec<String>,
    pub suggested_action: String,
    /// Distinct customers with at least one prediction at the same tier
    pub similar_customers: u64,
}

/// Rule-based explanation of churn risk, derived on read from the history.
pub struct RiskExplainer {
    history: Arc<dyn HistoryRepository>,
}

impl RiskExplainer {
    pub fn new(history: Arc<dyn HistoryRepository>) -> Self {
        Self { history }
    }

    pub async fn explain(&self, customer_id: &str) -> Result<RiskFactorsResult, ExplainError> {
        let page = PageRequest { page: 0, size: 1 };
        let latest = self
            .history
            .page_by_customer(customer_id, page)
            .await
            .with_context(|| format!("Failed to load history of customer {}", customer_id))?
            .into_iter()
            .next()
            .ok_or_else(|| ExplainError::NotFound {
                customer_id: customer_id.to_string(),
            })?;

        let factors = risk_factors(&latest);
        let suggested_action = suggested_action(&latest).to_string();
        let similar_customers = self.similar_customers(&latest.risk_tier).await?;

        info!(
            "Explained risk for customer {}: {} ({} factors, {} similar)",
            customer_id,
            latest.risk_tier,
            factors.len(),
            similar_customers
        );

        Ok(RiskFactorsResult {
            risk_tier: latest.risk_tier,
            factors,
            suggested_action,
            similar_customers,
        })
    }

    /// Counts across every record, not only the latest per customer.
    async fn similar_customers(&self, tier_label: &str) -> Result<u64, ExplainError> {
        let all = self
            .history
            .find_all()
            .await
            .context("Failed to scan prediction history")?;

        let customers: HashSet<&str> = all
            .iter()
            .filter(|r| r.risk_tier.eq_ignore_ascii_case(tier_label))
            .map(|r| r.customer_id.as_str())
            .collect();
        debug!(
            "{} distinct customers share tier {}",
            customers.len(),
            tier_label
        );
        Ok(customers.len() as u64)
    }
}

/// Negative factors first, in a fixed order; protective factors only for low risk.
pub fn risk_factors(record: &HistoryRecord) -> Vec<String> {
    let mut factors = Vec::new();
    let subscription = record.subscription();
    let payment = record.payment();

    if record.last_login_days >= INACTIVE_LOGIN_DAYS {
        factors.push(format!(
            "Has not accessed the platform in {} days",
            record.last_login_days
        ));
    }
    if record.watch_hours <= LOW_WATCH_HOURS {
        factors.push(format!(
            "Low content consumption ({} total hours)",
            record.watch_hours
        ));
    }
    if record.avg_watch_time_per_day < LOW_DAILY_WATCH_HOURS {
        factors.push(format!(
            "Very low average daily watch time ({}h)",
            record.avg_watch_time_per_day
        ));
    }
    if subscription == Some(SubscriptionType::Basic) {
        factors.push("Basic plan, associated with a higher cancellation rate".to_string());
    }
    if payment == Some(PaymentMethod::Crypto) {
        factors.push("Crypto payment method, historically correlated with churn".to_string());
    }

    if record.tier() == Some(RiskTier::Low) {
        if subscription == Some(SubscriptionType::Premium) {
            factors.push("Premium subscription, associated with high retention".to_string());
        }
        if record.watch_hours >= HIGH_WATCH_HOURS {
            factors.push(format!(
                "High content consumption ({} hours watched)",
                record.watch_hours
            ));
        }
        if record.last_login_days <= RECENT_LOGIN_DAYS {
            factors.push("Recent access to the platform".to_string());
        }
    }

    factors
}

pub fn suggested_action(record: &HistoryRecord) -> &'static str {
    let subscription = record.subscription();

    match record.tier() {
        Some(RiskTier::High) => {
            if record.payment() == Some(PaymentMethod::Crypto) {
                "Offer migration to debit card or PayPal with an extra benefit to reduce payment friction."
            } else if record.last_login_days >= INACTIVE_LOGIN_DAYS {
                "Send a reactivation campaign with personalized content recommendations."
            } else {
                "Proactive contact with a retention offer or plan change."
            }
        }
        Some(RiskTier::Medium) => {
            if subscription == Some(SubscriptionType::Standard)
                && record.watch_hours < STANDARD_ENGAGEMENT_HOURS
            {
                "Suggest featured content to increase watch time."
            } else {
                "Offer a discount for upgrading to an annual plan."
            }
        }
        Some(RiskTier::Low) => {
            if subscription != Some(SubscriptionType::Premium) {
                "Offer a limited-time free trial of the Premium plan."
            } else {
                "Enroll the customer in the loyalty or referral program."
            }
        }
        None => "Monitor the customer's behavior over the next few days.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::insights::test_support::{record, record_with};
    use crate::infrastructure::InMemoryHistoryRepository;

    #[tokio::test]
    async fn test_unknown_customer_is_not_found() {
        let explainer = RiskExplainer::new(Arc::new(InMemoryHistoryRepository::new()));

        let err = explainer.explain("missing-id").await.unwrap_err();

        assert!(matches!(
            err,
            ExplainError::NotFound { customer_id } if customer_id == "missing-id"
        ));
    }

    #[tokio::test]
    async fn test_disengaged_crypto_customer_has_five_factors() {
        let history = InMemoryHistoryRepository::new();
        history
            .insert(&record_with(
                "user-123",
                0.82,
                1,
                SubscriptionType::Basic,
                PaymentMethod::Crypto,
                45,
                3.0,
                0.2,
            ))
            .await
            .unwrap();
        let explainer = RiskExplainer::new(Arc::new(history));

        let result = explainer.explain("user-123").await.unwrap();

        assert_eq!(result.risk_tier, "Riesgo alto");
        assert_eq!(result.factors.len(), 5);
        assert!(result.factors[0].contains("45 days"));
        assert!(result.factors[1].contains("3 total hours"));
        assert!(result.factors[2].contains("0.2h"));
        assert!(result.factors[3].starts_with("Basic plan"));
        assert!(result.factors[4].starts_with("Crypto payment"));
        assert!(result.suggested_action.contains("PayPal"));
        assert_eq!(result.similar_customers, 1);
    }

    #[test]
    fn test_protective_factors_only_for_low_risk() {
        let engaged_premium = |probability| {
            record_with(
                "user-1",
                probability,
                1,
                SubscriptionType::Premium,
                PaymentMethod::CreditCard,
                2,
                30.0,
                3.0,
            )
        };

        let low = risk_factors(&engaged_premium(0.1));
        assert_eq!(low.len(), 3);
        assert!(low[0].starts_with("Premium subscription"));
        assert!(low[1].contains("30 hours"));
        assert_eq!(low[2], "Recent access to the platform");

        assert!(risk_factors(&engaged_premium(0.5)).is_empty());
    }

    #[test]
    fn test_suggested_action_tree() {
        let high_inactive = record_with(
            "a",
            0.9,
            1,
            SubscriptionType::Standard,
            PaymentMethod::PayPal,
            50,
            8.0,
            1.0,
        );
        assert!(suggested_action(&high_inactive).starts_with("Send a reactivation"));

        let high_active = record_with(
            "a",
            0.9,
            1,
            SubscriptionType::Standard,
            PaymentMethod::PayPal,
            3,
            8.0,
            1.0,
        );
        assert!(suggested_action(&high_active).starts_with("Proactive contact"));

        let medium_standard = record_with(
            "a",
            0.5,
            1,
            SubscriptionType::Standard,
            PaymentMethod::PayPal,
            3,
            8.0,
            1.0,
        );
        assert!(suggested_action(&medium_standard).starts_with("Suggest featured content"));

        let medium_premium = record_with(
            "a",
            0.5,
            1,
            SubscriptionType::Premium,
            PaymentMethod::PayPal,
            3,
            8.0,
            1.0,
        );
        assert!(suggested_action(&medium_premium).contains("annual plan"));

        let low_basic = record("a", 0.1, 1);
        assert!(suggested_action(&low_basic).contains("free trial"));

        let low_premium = record_with(
            "a",
            0.1,
            1,
            SubscriptionType::Premium,
            PaymentMethod::PayPal,
            3,
            25.0,
            2.0,
        );
        assert!(suggested_action(&low_premium).contains("loyalty"));

        let mut unknown = record("a", 0.1, 1);
        unknown.risk_tier = "legacy".to_string();
        assert!(suggested_action(&unknown).starts_with("Monitor"));
    }

    #[tokio::test]
    async fn test_similar_customers_are_distinct_across_all_records() {
        let history = InMemoryHistoryRepository::new();
        history.insert(&record("user-1", 0.9, 1)).await.unwrap();
        history.insert(&record("user-1", 0.8, 2)).await.unwrap();
        history.insert(&record("user-2", 0.75, 3)).await.unwrap();
        // user-3 was high risk once, now medium: the old record still counts
        history.insert(&record("user-3", 0.95, 4)).await.unwrap();
        history.insert(&record("user-3", 0.4, 5)).await.unwrap();
        let explainer = RiskExplainer::new(Arc::new(history));

        let result = explainer.explain("user-2").await.unwrap();

        assert_eq!(result.similar_customers, 3);
    }

    #[tokio::test]
    async fn test_explain_uses_latest_record_and_is_idempotent() {
        let history = InMemoryHistoryRepository::new();
        history.insert(&record("user-1", 0.9, 1)).await.unwrap();
        history.insert(&record("user-1", 0.4, 2)).await.unwrap();
        let explainer = RiskExplainer::new(Arc::new(history));

        let first = explainer.explain("user-1").await.unwrap();
        let second = explainer.explain("user-1").await.unwrap();

        assert_eq!(first.risk_tier, "Riesgo medio");
        assert_eq!(first, second);
    }
}
