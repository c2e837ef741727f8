//! The configured set of coarse intent categories.
//!
//! Categories are data, not code: the balancer iterates them in the order
//! they are configured and nothing downstream assumes there are exactly two.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Short code stored on catalog items and returned by the analyzer ("K").
    pub code: String,
    /// Human readable label ("Knowledge & Skills").
    pub label: String,
    /// What kind of intent belongs here; fed to the extraction prompt.
    #[serde(default)]
    pub hint: String,
}

impl Category {
    pub fn new(code: &str, label: &str, hint: &str) -> Self {
        Self { code: code.to_string(), label: label.to_string(), hint: hint.to_string() }
    }

    /// Case-insensitive match against the code or the label.
    pub fn matches(&self, raw: &str) -> bool {
        let raw = raw.trim();
        !raw.is_empty() && (self.code.eq_ignore_ascii_case(raw) || self.label.eq_ignore_ascii_case(raw))
    }
}

/// Ordered, non-empty set of categories with unique codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::InvalidConfig("at least one category must be configured".to_string()));
        }
        for (i, c) in categories.iter().enumerate() {
            if c.code.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("category #{} has a blank code", i + 1)));
            }
            if categories[..i].iter().any(|p| p.code.eq_ignore_ascii_case(&c.code)) {
                return Err(Error::InvalidConfig(format!("duplicate category code '{}'", c.code)));
            }
        }
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Every category, in configured order.
    pub fn all(&self) -> Vec<Category> {
        self.categories.clone()
    }

    /// Position of the category a raw label or item code resolves to.
    pub fn position(&self, raw: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.matches(raw))
    }

    pub fn resolve(&self, raw: &str) -> Option<&Category> {
        self.position(raw).map(|i| &self.categories[i])
    }

    /// Map raw labels onto the set: unknown labels are dropped, duplicates
    /// collapse and the result follows configured order. May be empty.
    pub fn normalize<S: AsRef<str>>(&self, raw: &[S]) -> Vec<Category> {
        let mut seen = vec![false; self.categories.len()];
        for label in raw {
            if let Some(i) = self.position(label.as_ref()) {
                seen[i] = true;
            }
        }
        self.categories
            .iter()
            .zip(seen)
            .filter_map(|(c, keep)| keep.then(|| c.clone()))
            .collect()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self { categories: default_categories() }
    }
}

pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("K", "Knowledge & Skills", "coding, technical, aptitude, hard skills"),
        Category::new("P", "Personality & Behavior", "soft skills, culture fit, leadership, traits"),
    ]
}
