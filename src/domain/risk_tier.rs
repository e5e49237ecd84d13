//! Churn risk tiers.
//!
//! [`RiskTier::classify`] owns the probability thresholds. Every other
//! component derives tiers through it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which a customer is high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.70;
/// Probability at or above which a customer is at least medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "Riesgo alto")]
    High,
    #[serde(rename = "Riesgo medio")]
    Medium,
    #[serde(rename = "Riesgo bajo")]
    Low,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn classify(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Label persisted with each history record
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "Riesgo alto",
            Self::Medium => "Riesgo medio",
            Self::Low => "Riesgo bajo",
        }
    }

    /// Case-insensitive lookup of a persisted label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.matches_label(label))
    }

    pub fn matches_label(&self, label: &str) -> bool {
        self.label().eq_ignore_ascii_case(label.trim())
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
