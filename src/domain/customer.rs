use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum allowed difference between the declared monthly fee and the plan price.
pub const FEE_TOLERANCE: f64 = 0.01;

/// Subscription plan. Each plan carries its canonical monthly price.
///
/// Serialized by wire name; deserialized through `FromStr`, so any casing of
/// the wire name or the stored code is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SubscriptionType {
    #[serde(rename = "Basic")]
    Basic,
    #[serde(rename = "Standard")]
    Standard,
    #[serde(rename = "Premium")]
    Premium,
}

impl SubscriptionType {
    pub const ALL: [SubscriptionType; 3] = [Self::Basic, Self::Standard, Self::Premium];

    /// Canonical monthly price of the plan
    pub fn price(&self) -> f64 {
        match self {
            Self::Basic => 8.99,
            Self::Standard => 13.99,
            Self::Premium => 17.99,
        }
    }

    /// Name used on the wire towards the ML service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Standard => "Standard",
            Self::Premium => "Premium",
        }
    }

    /// Name stored in the prediction history
    pub fn code(&self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| {
                t.as_str().eq_ignore_ascii_case(value) || t.code().eq_ignore_ascii_case(value)
            })
            .ok_or_else(|| ValidationError::UnknownSubscription {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for SubscriptionType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "PayPal")]
    PayPal,
    #[serde(rename = "Gift Card")]
    GiftCard,
    #[serde(rename = "Crypto")]
    Crypto,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        Self::CreditCard,
        Self::DebitCard,
        Self::PayPal,
        Self::GiftCard,
        Self::Crypto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::PayPal => "PayPal",
            Self::GiftCard => "Gift Card",
            Self::Crypto => "Crypto",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::CreditCard => "CREDIT_CARD",
            Self::DebitCard => "DEBIT_CARD",
            Self::PayPal => "PAYPAL",
            Self::GiftCard => "GIFT_CARD",
            Self::Crypto => "CRYPTO",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| {
                m.as_str().eq_ignore_ascii_case(value) || m.code().eq_ignore_ascii_case(value)
            })
            .ok_or_else(|| ValidationError::UnknownPaymentMethod {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Behavioural and billing features of a customer, as sent to the ML service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFeatures {
    pub subscription_type: SubscriptionType,
    pub watch_hours: f64,
    pub last_login_days: u32,
    pub monthly_fee: f64,
    pub number_of_profiles: u8,
    pub avg_watch_time_per_day: f64,
    pub payment_method: PaymentMethod,
}

impl CustomerFeatures {
    /// Check field ranges and the plan/price cross-field rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("watch_hours", self.watch_hours),
            ("monthly_fee", self.monthly_fee),
            ("avg_watch_time_per_day", self.avg_watch_time_per_day),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field });
            }
        }

        if self.watch_hours < 0.0 {
            return Err(ValidationError::NegativeWatchHours {
                value: self.watch_hours,
            });
        }

        if !(1..=5).contains(&self.number_of_profiles) {
            return Err(ValidationError::ProfilesOutOfRange {
                value: self.number_of_profiles,
            });
        }

        if !(0.0..=24.0).contains(&self.avg_watch_time_per_day) {
            return Err(ValidationError::AvgWatchTimeOutOfRange {
                value: self.avg_watch_time_per_day,
            });
        }

        let expected = self.subscription_type.price();
        if (self.monthly_fee - expected).abs() >= FEE_TOLERANCE {
            return Err(ValidationError::FeeMismatch {
                subscription: self.subscription_type,
                fee: self.monthly_fee,
                expected,
            });
        }

        Ok(())
    }
}

/// Payload of one prediction call: `{"customer_id": .., "features": {..}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub customer_id: String,
    pub features: CustomerFeatures,
}

impl PredictionRequest {
    pub fn new(customer_id: impl Into<String>, features: CustomerFeatures) -> Self {
        Self {
            customer_id: customer_id.into(),
            features,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::EmptyCustomerId);
        }
        self.features.validate()
    }
}
