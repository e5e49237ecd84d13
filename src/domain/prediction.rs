use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw label returned by the ML service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionLabel {
    WillChurn,
    WillContinue,
}

impl PredictionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WillChurn => "will_churn",
            Self::WillContinue => "will_continue",
        }
    }

    /// Human-readable reading of the label
    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::WillChurn => "Will cancel",
            Self::WillContinue => "Will continue",
        }
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PredictionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "will_churn" => Ok(Self::WillChurn),
            "will_continue" => Ok(Self::WillContinue),
            other => Err(format!("unknown prediction label '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: PredictionLabel,
    pub probability: f64,
}

/// Response body of `POST /predict`.
///
/// The label is kept as a string so that an unknown value surfaces as a
/// protocol violation instead of a generic decoding error.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub customer_id: String,
    pub prediction: RawPrediction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub probability: f64,
}

impl PredictResponse {
    pub fn into_result(self) -> Result<PredictionResult, String> {
        let label = self.prediction.label.parse::<PredictionLabel>()?;
        let probability = self.prediction.probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(format!("probability {} outside [0, 1]", probability));
        }
        Ok(PredictionResult { label, probability })
    }
}
