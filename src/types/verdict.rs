//! Scoring verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary outcome of the anomaly scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Legit,
    Fraudulent,
}

impl Verdict {
    /// Map the model's outlier decision to a verdict
    pub fn from_outlier(is_outlier: bool) -> Self {
        if is_outlier {
            Verdict::Fraudulent
        } else {
            Verdict::Legit
        }
    }

    pub fn is_fraudulent(self) -> bool {
        self == Verdict::Fraudulent
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Legit => "Legit",
            Verdict::Fraudulent => "Fraudulent",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
