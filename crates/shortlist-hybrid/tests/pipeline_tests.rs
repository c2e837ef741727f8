use std::sync::Arc;

use shortlist_core::category::CategorySet;
use shortlist_core::config::RankingSettings;
use shortlist_core::error::{Error, Result};
use shortlist_core::traits::{Embedder, QueryExtractor};
use shortlist_core::types::{CatalogItem, EmbeddingVector, RawExtraction};
use shortlist_hybrid::{Recommender, SearchContext};
use shortlist_query::QueryAnalyzer;
use shortlist_vector::VectorIndex;

const QUERY: &str = "Java developer with leadership skills";

/// Every query lands on the x axis, so an item's similarity is its x component.
struct AxisEmbedder;

impl Embedder for AxisEmbedder {
    fn model_id(&self) -> &str {
        "axis"
    }

    fn dim(&self) -> usize {
        2
    }

    fn encode(&self, text: &str) -> Result<EmbeddingVector> {
        if text.trim().is_empty() {
            return Err(Error::Encoding("empty".into()));
        }
        EmbeddingVector::new(vec![1.0, 0.0])
    }
}

struct Scripted {
    skills: Vec<&'static str>,
    categories: Vec<&'static str>,
}

impl QueryExtractor for Scripted {
    fn extract(&self, _query: &str) -> Result<RawExtraction> {
        Ok(RawExtraction {
            skills: Some(self.skills.iter().map(|s| s.to_string()).collect()),
            categories: Some(self.categories.iter().map(|s| s.to_string()).collect()),
        })
    }
}

fn item(name: &str, category: &str, description: &str) -> CatalogItem {
    CatalogItem {
        name: name.to_string(),
        url: format!("https://catalog.test/{name}"),
        category: category.to_string(),
        description: description.to_string(),
        tags: None,
    }
}

fn at_similarity(s: f32) -> EmbeddingVector {
    EmbeddingVector::new(vec![s, (1.0 - s * s).sqrt()]).unwrap()
}

fn context() -> SearchContext {
    let rows = [
        (item("K1", "K", "Java programming test"), 0.80),
        (item("K2", "K", "Core Java and SQL"), 0.75),
        (item("K3", "K", "Numerical reasoning"), 0.60),
        (item("P1", "P", "Leadership style questionnaire"), 0.50),
        (item("P2", "P", "Personality inventory"), 0.40),
    ];
    let (items, vectors): (Vec<_>, Vec<_>) = rows.into_iter().map(|(it, s)| (it, at_similarity(s))).unzip();
    let index = VectorIndex::from_parts(items, vectors).unwrap();
    SearchContext::new(index, Box::new(AxisEmbedder)).unwrap()
}

fn recommender(extractor: Scripted, max_results: usize) -> Recommender {
    let analyzer = QueryAnalyzer::new(Box::new(extractor), CategorySet::default());
    let ranking = RankingSettings { max_results, ..RankingSettings::default() };
    Recommender::new(context(), analyzer, &ranking)
}

fn java_and_leadership() -> Scripted {
    Scripted { skills: vec!["Java", "leadership"], categories: vec!["K", "P"] }
}

fn names(r: &Recommender, query: &str) -> Vec<String> {
    r.recommend(query).unwrap().into_iter().map(|x| x.name).collect()
}

#[test]
fn seeded_selection_then_pooled_fill() {
    let r = recommender(java_and_leadership(), 10);
    assert_eq!(names(&r, QUERY), vec!["K1", "P1", "K2", "K3", "P2"]);

    let ranked = r.rank(QUERY).unwrap();
    let fused: Vec<f32> = ranked.iter().map(|c| c.fused).collect();
    for (got, want) in fused.iter().zip([0.71f32, 0.50, 0.675, 0.42, 0.28]) {
        assert!((got - want).abs() < 1e-4, "{fused:?}");
    }
    assert!((ranked[1].lexical - 0.5).abs() < 1e-6);
    assert_eq!(ranked[3].lexical, 0.0);
}

#[test]
fn budget_cuts_the_fill_not_the_seeds() {
    let r = recommender(java_and_leadership(), 3);
    assert_eq!(names(&r, QUERY), vec!["K1", "P1", "K2"]);
}

#[test]
fn single_category_query_stays_in_its_group() {
    let r = recommender(Scripted { skills: vec!["leadership"], categories: vec!["p"] }, 10);
    assert_eq!(names(&r, "team lead"), vec!["P1", "P2"]);
}

#[test]
fn analyzer_outage_still_returns_a_balanced_list() {
    let analyzer = QueryAnalyzer::offline(CategorySet::default());
    let r = Recommender::new(context(), analyzer, &RankingSettings::default());
    assert_eq!(names(&r, QUERY), vec!["K1", "P1", "K2", "K3", "P2"]);
    assert!(r.rank(QUERY).unwrap().iter().all(|c| c.lexical == 0.0));
}

#[test]
fn recommendations_carry_catalog_fields() {
    let r = recommender(java_and_leadership(), 2);
    let out = r.recommend(QUERY).unwrap();
    assert_eq!(out[0].url, "https://catalog.test/K1");
    assert_eq!(out[0].category_label, "Knowledge & Skills");
    assert_eq!(out[1].category, "P");
    assert_eq!(out[1].description, "Leadership style questionnaire");
}

#[test]
fn blank_query_is_rejected() {
    let r = recommender(java_and_leadership(), 10);
    assert!(matches!(r.recommend("   "), Err(Error::EmptyQuery)));
    assert!(matches!(r.baseline("", 10), Err(Error::EmptyQuery)));
}

#[test]
fn baseline_is_raw_similarity_order() {
    let r = recommender(java_and_leadership(), 10);
    let hits = r.baseline(QUERY, 3).unwrap();
    let names: Vec<&str> = hits.iter().map(|h| h.item.name.as_str()).collect();
    assert_eq!(names, vec!["K1", "K2", "K3"]);
}

#[test]
fn repeated_and_concurrent_queries_agree() {
    let r = Arc::new(recommender(java_and_leadership(), 10));
    let first = r.recommend(QUERY).unwrap();
    assert_eq!(first, r.recommend(QUERY).unwrap());

    let shared: &Recommender = &r;
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(move |_| s.spawn(move || shared.recommend(QUERY).unwrap())).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), first);
        }
    });
}

#[test]
fn encoder_and_index_dimensions_must_agree() {
    let index = VectorIndex::from_parts(
        vec![item("A", "K", "")],
        vec![EmbeddingVector::new(vec![1.0, 0.0, 0.0]).unwrap()],
    )
    .unwrap();
    assert!(matches!(
        SearchContext::new(index, Box::new(AxisEmbedder)),
        Err(Error::DimensionMismatch { expected: 3, actual: 2 })
    ));
}

#[test]
fn recommender_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Recommender>();
}

#[test]
fn empty_catalog_recommends_nothing() {
    let index = VectorIndex::from_parts(vec![], vec![]).unwrap();
    let context = SearchContext::new(index, Box::new(AxisEmbedder)).unwrap();
    let analyzer = QueryAnalyzer::new(Box::new(java_and_leadership()), CategorySet::default());
    let r = Recommender::new(context, analyzer, &RankingSettings::default());

    assert!(r.recommend(QUERY).unwrap().is_empty());
    assert!(r.baseline(QUERY, 10).unwrap().is_empty());
}

#[test]
fn required_category_without_candidates_recommends_nothing() {
    let items = vec![item("K1", "K", "Java programming test"), item("K2", "K", "Core Java and SQL")];
    let vectors = vec![at_similarity(0.8), at_similarity(0.7)];
    let context = SearchContext::new(VectorIndex::from_parts(items, vectors).unwrap(), Box::new(AxisEmbedder)).unwrap();
    let extractor = Scripted { skills: vec!["leadership"], categories: vec!["P"] };
    let analyzer = QueryAnalyzer::new(Box::new(extractor), CategorySet::default());
    let r = Recommender::new(context, analyzer, &RankingSettings::default());

    assert!(r.recommend("people manager").unwrap().is_empty());
}
