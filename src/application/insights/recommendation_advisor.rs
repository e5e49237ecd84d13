use crate::application::insights::risk_explainer::INACTIVE_LOGIN_DAYS;
use crate::domain::customer::PaymentMethod;
use crate::domain::history::HistoryRecord;
use crate::domain::risk_tier::RiskTier;

/// One-line retention suggestion for a single history record.
///
/// Stateless and independent of [`RiskExplainer`](super::RiskExplainer): the
/// two rule sets are allowed to disagree.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationAdvisor;

impl RecommendationAdvisor {
    pub fn new() -> Self {
        Self
    }

    pub fn suggest(&self, record: &HistoryRecord) -> String {
        match record.tier() {
            Some(RiskTier::High) if record.last_login_days >= INACTIVE_LOGIN_DAYS => format!(
                "Urgent re-engagement: the customer has not logged in for {} days. Send a push notification with personalized content.",
                record.last_login_days
            ),
            Some(RiskTier::High) if record.payment() == Some(PaymentMethod::Crypto) => {
                "Critical retention: offer migration to debit card or PayPal with a temporary benefit."
                    .to_string()
            }
            Some(RiskTier::High) => {
                "Direct contact: satisfaction survey and personalized offer.".to_string()
            }
            Some(RiskTier::Medium) => {
                "Incentive: recommend featured content to raise watch hours and prevent an engagement drop."
                    .to_string()
            }
            Some(RiskTier::Low) => {
                "Loyalty: invite the customer to the benefits or referral program.".to_string()
            }
            None => "Standard follow-up.".to_string(),
        }
    }
}
