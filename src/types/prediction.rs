//! Prediction response types

use serde::{Deserialize, Serialize};

/// Result of scoring one client record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Thresholded binary label (1 = predicted default)
    pub prediction: u8,

    /// Positive-class probability in [0, 1]
    pub probability_default: f64,
}

/// Error reply sent when a request is rejected at the boundary or
/// scoring fails internally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_serialization() {
        let prediction = Prediction {
            prediction: 1,
            probability_default: 0.73,
        };

        let json = serde_json::to_string(&prediction).unwrap();
        assert!(json.contains("\"prediction\":1"));
        assert!(json.contains("\"probability_default\":0.73"));

        let deserialized: Prediction = serde_json::from_str(&json).unwrap();
        assert_eq!(prediction, deserialized);
    }

    #[test]
    fn test_error_reply_serialization() {
        let reply = ErrorReply::new("malformed request");
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(json, r#"{"error":"malformed request"}"#);
    }
}
