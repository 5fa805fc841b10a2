//! Inference-time feature pipeline for the credit default model.
//!
//! Reproduces the preprocessing frozen at training time: categorical
//! fields are one-hot encoded, then the resulting column set is aligned
//! against the training column schema so the model always sees the same
//! columns in the same order.

use std::collections::HashMap;

use crate::types::ClientRecord;

/// Column name to value mapping produced by encoding one raw record.
///
/// The key set is data-dependent: numeric fields keep their own names,
/// each categorical field contributes one `{FIELD}_{value}` key.
pub type EncodedRecord = HashMap<String, f64>;

/// Encoder that expands a raw client record into named numeric columns.
///
/// Matches the training pipeline's dummy encoding: each categorical field
/// yields exactly one `{FIELD}_{value}` column set to 1.0 for the value
/// observed in this record; numeric fields pass through unchanged.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode a single raw record.
    ///
    /// Encoding sees only this one record: a categorical value that never
    /// occurred at training time produces a column name absent from the
    /// training schema, and alignment drops it, leaving an all-zero
    /// one-hot block for that field. That record then carries no signal
    /// for the field, and no error is raised.
    pub fn encode(&self, record: &ClientRecord) -> EncodedRecord {
        let mut encoded = EncodedRecord::with_capacity(23);

        // Numeric fields keep their training column names.
        encoded.insert("LIMIT_BAL".to_string(), record.limit_bal);
        encoded.insert("AGE".to_string(), record.age as f64);
        encoded.insert("BILL_AMT1".to_string(), record.bill_amt1);
        encoded.insert("BILL_AMT2".to_string(), record.bill_amt2);
        encoded.insert("BILL_AMT3".to_string(), record.bill_amt3);
        encoded.insert("BILL_AMT4".to_string(), record.bill_amt4);
        encoded.insert("BILL_AMT5".to_string(), record.bill_amt5);
        encoded.insert("BILL_AMT6".to_string(), record.bill_amt6);
        encoded.insert("PAY_AMT1".to_string(), record.pay_amt1);
        encoded.insert("PAY_AMT2".to_string(), record.pay_amt2);
        encoded.insert("PAY_AMT3".to_string(), record.pay_amt3);
        encoded.insert("PAY_AMT4".to_string(), record.pay_amt4);
        encoded.insert("PAY_AMT5".to_string(), record.pay_amt5);
        encoded.insert("PAY_AMT6".to_string(), record.pay_amt6);

        // One dummy column per categorical field for the observed value.
        let categoricals: [(&str, &str); 9] = [
            ("SEX", record.sex.as_str()),
            ("EDUCATION", record.education.as_str()),
            ("MARRIAGE", record.marriage.as_str()),
            ("PAY_0", record.pay_0.as_str()),
            ("PAY_2", record.pay_2.as_str()),
            ("PAY_3", record.pay_3.as_str()),
            ("PAY_4", record.pay_4.as_str()),
            ("PAY_5", record.pay_5.as_str()),
            ("PAY_6", record.pay_6.as_str()),
        ];
        for (field, value) in categoricals {
            encoded.insert(format!("{}_{}", field, value), 1.0);
        }

        encoded
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Align an encoded record against the training column schema.
///
/// The output vector has exactly one entry per schema column, in schema
/// order: the encoded value where the column is present, 0.0 where it is
/// not. Encoded columns the schema does not name are dropped.
pub fn align_columns(encoded: &EncodedRecord, columns: &[String]) -> Vec<f64> {
    columns
        .iter()
        .map(|column| encoded.get(column).copied().unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_aligned_length_matches_schema() {
        let encoder = FeatureEncoder::new();
        let record = ClientRecord::new(50000.0, 35);
        let encoded = encoder.encode(&record);

        for columns in [
            schema(&["LIMIT_BAL"]),
            schema(&["LIMIT_BAL", "AGE", "SEX_M", "SEX_F"]),
            schema(&["AGE", "NEVER_SEEN", "BILL_AMT1", "PAY_0_0", "PAY_0_2"]),
        ] {
            let aligned = align_columns(&encoded, &columns);
            assert_eq!(aligned.len(), columns.len());
        }
    }

    #[test]
    fn test_alignment_follows_schema_order() {
        let encoder = FeatureEncoder::new();
        let mut record = ClientRecord::new(20000.0, 24);
        record.sex = "M".to_string();
        let encoded = encoder.encode(&record);

        let columns = schema(&["LIMIT_BAL", "AGE", "SEX_M", "SEX_F"]);
        let aligned = align_columns(&encoded, &columns);
        assert_eq!(aligned, vec![20000.0, 24.0, 1.0, 0.0]);

        // Same record, reversed schema, reversed vector.
        let reversed = schema(&["SEX_F", "SEX_M", "AGE", "LIMIT_BAL"]);
        let aligned = align_columns(&encoded, &reversed);
        assert_eq!(aligned, vec![0.0, 1.0, 24.0, 20000.0]);
    }

    #[test]
    fn test_encode_and_align_are_idempotent() {
        let encoder = FeatureEncoder::new();
        let record = ClientRecord::new(80000.0, 42);
        let columns = schema(&["LIMIT_BAL", "AGE", "SEX_M", "EDUCATION_university"]);

        let first = align_columns(&encoder.encode(&record), &columns);
        let second = align_columns(&encoder.encode(&record), &columns);
        assert_eq!(first, second);
    }

    #[test]
    fn test_one_hot_sets_exactly_one_column_per_field() {
        let encoder = FeatureEncoder::new();
        let mut record = ClientRecord::new(30000.0, 29);
        record.sex = "F".to_string();
        record.pay_0 = "2".to_string();
        let encoded = encoder.encode(&record);

        let columns = schema(&[
            "SEX_M",
            "SEX_F",
            "PAY_0_-1",
            "PAY_0_0",
            "PAY_0_2",
        ]);
        let aligned = align_columns(&encoded, &columns);
        assert_eq!(aligned, vec![0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unseen_category_contributes_all_zeros() {
        let encoder = FeatureEncoder::new();
        let mut record = ClientRecord::new(30000.0, 29);
        record.education = "doctorate".to_string();
        let encoded = encoder.encode(&record);

        let columns = schema(&[
            "EDUCATION_graduate school",
            "EDUCATION_university",
            "EDUCATION_high school",
            "EDUCATION_others",
        ]);
        let aligned = align_columns(&encoded, &columns);
        assert_eq!(aligned, vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_columns_outside_schema_are_dropped() {
        let encoder = FeatureEncoder::new();
        let record = ClientRecord::new(10000.0, 55);
        let encoded = encoder.encode(&record);
        assert!(encoded.contains_key("BILL_AMT6"));

        let columns = schema(&["LIMIT_BAL", "AGE"]);
        let aligned = align_columns(&encoded, &columns);
        assert_eq!(aligned, vec![10000.0, 55.0]);
    }

    #[test]
    fn test_encoded_record_shape() {
        let encoder = FeatureEncoder::new();
        let encoded = encoder.encode(&ClientRecord::new(10000.0, 55));

        // 14 numeric columns plus one dummy per categorical field.
        assert_eq!(encoded.len(), 23);
        let ones = encoded.values().filter(|&&v| v == 1.0).count();
        assert!(ones >= 9);
    }
}
