//! Retrieval and ranking pipeline.
//!
//! [`SearchContext`] holds the immutable resources built once at startup
//! (catalog index, query encoder). [`Recommender`] runs one query through
//! analysis, vector search, lexical rerank ([`score`]) and category
//! balancing ([`balance`]).

pub mod balance;
pub mod eval;
pub mod score;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info, warn};

use shortlist_core::category::CategorySet;
use shortlist_core::config::{RankingSettings, Settings};
use shortlist_core::error::{Error, Result};
use shortlist_core::traits::Embedder;
use shortlist_core::types::{Candidate, SearchHit};
use shortlist_embed::get_default_embedder;
use shortlist_query::QueryAnalyzer;
use shortlist_vector::VectorIndex;

pub use balance::{select, SelectionLimits};
pub use score::{lexical_score, rank, FusionWeights, SkillMatcher};

/// Catalog index plus the encoder that produced it.
pub struct SearchContext {
    index: VectorIndex,
    encoder: Box<dyn Embedder>,
}

impl SearchContext {
    /// Pair an index with its encoder. A non-empty index must match the
    /// encoder's dimension; an empty one matches anything.
    pub fn new(index: VectorIndex, encoder: Box<dyn Embedder>) -> Result<Self> {
        if !index.is_empty() && encoder.dim() != index.dim() {
            return Err(Error::DimensionMismatch { expected: index.dim(), actual: encoder.dim() });
        }
        Ok(Self { index, encoder })
    }

    /// Open the configured index and encoder. Must run outside any async runtime.
    pub fn load(settings: &Settings) -> anyhow::Result<Self> {
        let index = VectorIndex::open(&settings.index.uri, &settings.index.table)
            .with_context(|| format!("opening catalog index at {}", settings.index.uri))?;
        let categories = settings.category_set()?;
        let unknown = index.items().iter().filter(|it| categories.resolve(&it.category).is_none()).count();
        if unknown > 0 {
            warn!(rows = unknown, "catalog rows with a category outside the configured set will never be selected");
        }
        let encoder = get_default_embedder(&settings.embedding)?;
        info!(model = encoder.model_id(), dim = encoder.dim(), "query encoder ready");
        Ok(Self::new(index, encoder)?)
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn encoder(&self) -> &dyn Embedder {
        self.encoder.as_ref()
    }
}

/// One entry of a recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub url: String,
    pub category: String,
    pub category_label: String,
    pub description: String,
}

/// The query pipeline. Holds only immutable state, so one instance can
/// serve concurrent callers.
///
/// Every call is blocking: query analysis may wait on the HTTP service with
/// a blocking client, which panics when driven from an async task. Async
/// callers wrap calls in `tokio::task::spawn_blocking` (or any thread
/// outside the runtime), and construct and drop the `Recommender` there too.
pub struct Recommender {
    context: SearchContext,
    analyzer: QueryAnalyzer,
    weights: FusionWeights,
    limits: SelectionLimits,
    candidate_pool: usize,
}

impl Recommender {
    pub fn new(context: SearchContext, analyzer: QueryAnalyzer, ranking: &RankingSettings) -> Self {
        Self {
            context,
            analyzer,
            weights: FusionWeights::from(ranking),
            limits: SelectionLimits::from(ranking),
            candidate_pool: ranking.candidate_pool,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let context = SearchContext::load(settings)?;
        let analyzer = QueryAnalyzer::from_settings(settings)?;
        Ok(Self::new(context, analyzer, &settings.ranking))
    }

    pub fn categories(&self) -> &CategorySet {
        self.analyzer.categories()
    }

    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    /// Balanced, reranked recommendations for `query`.
    pub fn recommend(&self, query: &str) -> Result<Vec<Recommendation>> {
        let categories = self.categories();
        Ok(self
            .rank(query)?
            .into_iter()
            .map(|c| Recommendation {
                name: c.item.name.clone(),
                url: c.item.url.clone(),
                category: c.item.category.clone(),
                category_label: categories.resolve(&c.item.category).map(|k| k.label.clone()).unwrap_or_default(),
                description: c.item.description.clone(),
            })
            .collect())
    }

    /// Same pipeline as [`Recommender::recommend`], keeping the scores.
    pub fn rank(&self, query: &str) -> Result<Vec<Candidate<'_>>> {
        let query = non_blank(query)?;
        let analysis = self.analyzer.analyze(query);
        let hits = self.search(query, self.candidate_pool)?;
        let ranked = score::rank(&hits, &analysis.skills, self.weights);
        let selected = balance::select(&ranked, &analysis.required, self.categories(), self.limits);
        debug!(pool = hits.len(), selected = selected.len(), "query ranked");
        Ok(selected)
    }

    /// Plain vector search, no rerank or balancing.
    pub fn baseline(&self, query: &str, k: usize) -> Result<Vec<SearchHit<'_>>> {
        self.search(non_blank(query)?, k)
    }

    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit<'_>>> {
        let vector = self.context.encoder.encode(query)?;
        self.context.index.search(&vector, k)
    }
}

fn non_blank(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::EmptyQuery);
    }
    Ok(query)
}
