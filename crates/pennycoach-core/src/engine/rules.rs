use std::collections::HashMap;

use crate::engine::normalize::normalize_merchant;
use crate::engine::types::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub category_id: String,
    pub is_subscription: bool,
}

/// Confirmed merchant rules keyed by merchant key; one rule per merchant.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: HashMap<String, Rule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any earlier rule for the same merchant and returns it.
    pub fn upsert(&mut self, rule: Rule) -> Option<Rule> {
        self.rules.insert(rule.merchant_key.clone(), rule)
    }

    pub fn get(&self, merchant_key: &str) -> Option<&Rule> {
        self.rules.get(merchant_key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, Rule> {
        &self.rules
    }

    /// Categorizes a raw merchant string, normalizing it first.
    pub fn categorize(&self, merchant_raw: &str, fallback_category: &str) -> RuleOutcome {
        apply_rule(
            &normalize_merchant(merchant_raw),
            &self.rules,
            fallback_category,
        )
    }
}

impl FromIterator<Rule> for RuleBook {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        let mut book = Self::new();
        for rule in iter {
            book.upsert(rule);
        }
        book
    }
}

pub fn apply_rule(
    merchant_key: &str,
    rules: &HashMap<String, Rule>,
    fallback_category: &str,
) -> RuleOutcome {
    match rules.get(merchant_key) {
        Some(rule) => RuleOutcome {
            category_id: rule.category_id.clone(),
            is_subscription: rule.is_subscription,
        },
        None => RuleOutcome {
            category_id: fallback_category.to_string(),
            is_subscription: false,
        },
    }
}
