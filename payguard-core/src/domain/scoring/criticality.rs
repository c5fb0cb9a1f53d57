// payguard-core/src/domain/scoring/criticality.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    Financial,
    Operational,
    Regulatory,
}

/// A column whose lowercased name contains `keyword` adds `weight` to the
/// dataset's criticality.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct KeywordRule {
    #[validate(length(min = 1, message = "Keyword cannot be empty"))]
    pub keyword: String,
    #[validate(range(min = 1))]
    pub weight: u32,
    pub class: FieldClass,
}

impl KeywordRule {
    fn new(keyword: &str, weight: u32, class: FieldClass) -> Self {
        Self {
            keyword: keyword.to_string(),
            weight,
            class,
        }
    }
}

/// Substring matcher over column names. A column may match several rules
/// (`merchant_id` hits both `merchant_id` and `merchant`); every hit counts.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct CriticalityRules {
    #[validate(nested, custom(function = "validate_lowercase_keywords"))]
    pub rules: Vec<KeywordRule>,
    /// Summed criticality strictly above this boosts every dimension weight.
    pub boost_threshold: u32,
    #[validate(range(min = 1.0))]
    pub boost_factor: f64,
}

impl Default for CriticalityRules {
    fn default() -> Self {
        use FieldClass::*;
        Self {
            rules: vec![
                KeywordRule::new("amount", 3, Financial),
                KeywordRule::new("currency", 3, Financial),
                KeywordRule::new("txn_id", 3, Financial),
                KeywordRule::new("transaction_id", 3, Financial),
                KeywordRule::new("status", 3, Financial),
                KeywordRule::new("merchant_id", 2, Operational),
                KeywordRule::new("mcc", 2, Operational),
                KeywordRule::new("country", 2, Operational),
                KeywordRule::new("merchant", 2, Operational),
                KeywordRule::new("customer_id", 3, Regulatory),
                KeywordRule::new("kyc", 3, Regulatory),
                KeywordRule::new("compliance", 3, Regulatory),
            ],
            boost_threshold: 10,
            boost_factor: 1.2,
        }
    }
}

impl CriticalityRules {
    /// Summed weight of every (column, rule) hit.
    pub fn score<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> u32 {
        columns
            .into_iter()
            .map(|name| {
                let name = name.to_lowercase();
                self.rules
                    .iter()
                    .filter(|r| name.contains(r.keyword.as_str()))
                    .map(|r| r.weight)
                    .sum::<u32>()
            })
            .sum()
    }

    /// Multiplier for the dimension weights of a dataset with these columns.
    pub fn boost<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> f64 {
        if self.score(columns) > self.boost_threshold {
            self.boost_factor
        } else {
            1.0
        }
    }
}

fn validate_lowercase_keywords(rules: &[KeywordRule]) -> Result<(), ValidationError> {
    if rules.iter().all(|r| r.keyword == r.keyword.to_lowercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("keyword_not_lowercase"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_columns_trigger_boost() {
        let rules = CriticalityRules::default();
        let columns = ["txn_id", "amount", "currency", "merchant_id", "status"];
        // 3 + 3 + 3 + (2 + 2) + 3
        assert_eq!(rules.score(columns), 16);
        assert_eq!(rules.boost(columns), 1.2);
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let rules = CriticalityRules::default();
        assert_eq!(rules.score(["Settlement_Amount"]), 3);
        assert_eq!(rules.score(["KYC_level", "country_code"]), 5);
        assert_eq!(rules.score(["notes", "created_at"]), 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let rules = CriticalityRules::default();
        // 3 + 3 + 2 + 2 = 10: not above the threshold
        let columns = ["amount", "status", "mcc", "country"];
        assert_eq!(rules.score(columns), 10);
        assert_eq!(rules.boost(columns), 1.0);
    }

    #[test]
    fn test_uppercase_keyword_rejected() {
        let mut rules = CriticalityRules::default();
        rules.rules.push(KeywordRule::new("IBAN", 3, FieldClass::Regulatory));
        assert!(rules.validate().is_err());
    }
}
