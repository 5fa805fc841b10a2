//! Raw client feature record for credit default prediction

use serde::{Deserialize, Serialize};

/// One client's raw features, exactly as the training CSV carried them
/// (minus the target column and the row id).
///
/// JSON keys are the uppercase training-data column names. Parsing is
/// strict: a missing field, an unknown field, or a wrong primitive type
/// rejects the request before any scoring code runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientRecord {
    /// Credit limit
    #[serde(rename = "LIMIT_BAL")]
    pub limit_bal: f64,

    /// Sex, free-form text category
    #[serde(rename = "SEX")]
    pub sex: String,

    /// Education level, free-form text category
    #[serde(rename = "EDUCATION")]
    pub education: String,

    /// Marital status, free-form text category
    #[serde(rename = "MARRIAGE")]
    pub marriage: String,

    /// Age in years
    #[serde(rename = "AGE")]
    pub age: i64,

    /// Payment status, most recent month (text, as in the CSV)
    #[serde(rename = "PAY_0")]
    pub pay_0: String,

    /// Payment status month 2
    #[serde(rename = "PAY_2")]
    pub pay_2: String,

    /// Payment status month 3
    #[serde(rename = "PAY_3")]
    pub pay_3: String,

    /// Payment status month 4
    #[serde(rename = "PAY_4")]
    pub pay_4: String,

    /// Payment status month 5
    #[serde(rename = "PAY_5")]
    pub pay_5: String,

    /// Payment status month 6
    #[serde(rename = "PAY_6")]
    pub pay_6: String,

    /// Bill amount month 1
    #[serde(rename = "BILL_AMT1")]
    pub bill_amt1: f64,

    /// Bill amount month 2
    #[serde(rename = "BILL_AMT2")]
    pub bill_amt2: f64,

    /// Bill amount month 3
    #[serde(rename = "BILL_AMT3")]
    pub bill_amt3: f64,

    /// Bill amount month 4
    #[serde(rename = "BILL_AMT4")]
    pub bill_amt4: f64,

    /// Bill amount month 5
    #[serde(rename = "BILL_AMT5")]
    pub bill_amt5: f64,

    /// Bill amount month 6
    #[serde(rename = "BILL_AMT6")]
    pub bill_amt6: f64,

    /// Payment amount month 1
    #[serde(rename = "PAY_AMT1")]
    pub pay_amt1: f64,

    /// Payment amount month 2
    #[serde(rename = "PAY_AMT2")]
    pub pay_amt2: f64,

    /// Payment amount month 3
    #[serde(rename = "PAY_AMT3")]
    pub pay_amt3: f64,

    /// Payment amount month 4
    #[serde(rename = "PAY_AMT4")]
    pub pay_amt4: f64,

    /// Payment amount month 5
    #[serde(rename = "PAY_AMT5")]
    pub pay_amt5: f64,

    /// Payment amount month 6
    #[serde(rename = "PAY_AMT6")]
    pub pay_amt6: f64,
}

impl ClientRecord {
    /// Create a record with the given limit and age and neutral defaults
    /// for everything else
    pub fn new(limit_bal: f64, age: i64) -> Self {
        Self {
            limit_bal,
            sex: "M".to_string(),
            education: "university".to_string(),
            marriage: "married".to_string(),
            age,
            pay_0: "0".to_string(),
            pay_2: "0".to_string(),
            pay_3: "0".to_string(),
            pay_4: "0".to_string(),
            pay_5: "0".to_string(),
            pay_6: "0".to_string(),
            bill_amt1: 0.0,
            bill_amt2: 0.0,
            bill_amt3: 0.0,
            bill_amt4: 0.0,
            bill_amt5: 0.0,
            bill_amt6: 0.0,
            pay_amt1: 0.0,
            pay_amt2: 0.0,
            pay_amt3: 0.0,
            pay_amt4: 0.0,
            pay_amt5: 0.0,
            pay_amt6: 0.0,
        }
    }
}
