use tracing::{debug, warn};

use shortlist_core::category::CategorySet;
use shortlist_core::config::Settings;
use shortlist_core::traits::QueryExtractor;
use shortlist_core::types::{QueryAnalysis, RawExtraction};

use crate::gemini::GeminiClient;

/// Turns raw query text into skills and required categories.
///
/// `analyze` never fails. Without a working extractor every query gets the
/// permissive fallback: the query itself as the only skill and every
/// category required.
pub struct QueryAnalyzer {
    extractor: Option<Box<dyn QueryExtractor>>,
    categories: CategorySet,
}

impl QueryAnalyzer {
    pub fn new(extractor: Box<dyn QueryExtractor>, categories: CategorySet) -> Self {
        Self { extractor: Some(extractor), categories }
    }

    /// Analyzer with no external service; always falls back.
    pub fn offline(categories: CategorySet) -> Self {
        Self { extractor: None, categories }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let categories = settings.category_set()?;
        let extractor = GeminiClient::from_settings(&settings.analyzer, categories.clone())?;
        Ok(Self { extractor: extractor.map(|c| Box::new(c) as Box<dyn QueryExtractor>), categories })
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        let Some(extractor) = &self.extractor else {
            return self.fallback(query);
        };
        match extractor.extract(query) {
            Ok(raw) => {
                let analysis = self.normalize(query, raw);
                debug!(skills = ?analysis.skills, required = ?codes(&analysis), "query analyzed");
                analysis
            }
            Err(e) => {
                warn!(error = %e, "query analysis failed; using fallback");
                self.fallback(query)
            }
        }
    }

    pub fn fallback(&self, query: &str) -> QueryAnalysis {
        QueryAnalysis { skills: vec![query.to_string()], required: self.categories.all() }
    }

    fn normalize(&self, query: &str, raw: RawExtraction) -> QueryAnalysis {
        let skills = match raw.skills {
            Some(skills) => skills.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            None => vec![query.to_string()],
        };
        let mut required = raw.categories.map(|labels| self.categories.normalize(&labels)).unwrap_or_default();
        if required.is_empty() {
            required = self.categories.all();
        }
        QueryAnalysis { skills, required }
    }
}

fn codes(analysis: &QueryAnalysis) -> Vec<&str> {
    analysis.required.iter().map(|c| c.code.as_str()).collect()
}
