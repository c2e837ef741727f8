//! Shared plumbing for the shortlist binaries: logging, configuration,
//! progress reporting and the evaluation / prediction loops.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use indicatif::{ProgressBar, ProgressStyle};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use shortlist_core::config::{Config, Settings};
use shortlist_hybrid::eval::{mean, recall_at_k};
use shortlist_hybrid::Recommender;

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Settings from the layered config, or from an explicit file layered
/// over the defaults (environment variables still win). Relative paths in
/// an explicit file are taken relative to that file's directory.
pub fn load_settings(config_file: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = config_file else {
        return Config::load()?.settings();
    };
    anyhow::ensure!(path.exists(), "config file {} not found", path.display());
    let config = Config::from_figment(
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("APP_").split("__")),
    );
    let mut settings = config.settings()?;
    settings.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")));
    Ok(settings)
}

pub fn progress(len: usize, what: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(what.to_string());
    pb
}

/// One row of the labeled set: `query`, plus the relevant assessment names
/// in `relevant_assessments`, separated by `|`.
#[derive(Debug, Clone, Deserialize)]
pub struct LabeledQuery {
    pub query: String,
    #[serde(rename = "relevant_assessments", deserialize_with = "pipe_separated")]
    pub relevant: Vec<String>,
}

fn pipe_separated<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    Ok(raw.split('|').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
}

/// Labeled queries from CSV with a header row; extra columns are ignored.
pub fn read_labeled<R: Read>(input: R) -> anyhow::Result<Vec<LabeledQuery>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut rows = Vec::new();
    for (i, row) in reader.deserialize::<LabeledQuery>().enumerate() {
        rows.push(row.with_context(|| format!("labeled row {}", i + 1))?);
    }
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub baseline_recall: f64,
    pub model_recall: f64,
    pub baseline_top: Vec<String>,
    pub model_top: Vec<String>,
}

/// Evaluation summary. The mean keys carry the cutoff, e.g.
/// `model_mean_recall_at_10`.
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub k: usize,
    pub baseline_mean: f64,
    pub model_mean: f64,
    pub details: Vec<QueryReport>,
}

impl Serialize for EvalReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("k", &self.k)?;
        map.serialize_entry(&format!("baseline_mean_recall_at_{}", self.k), &self.baseline_mean)?;
        map.serialize_entry(&format!("model_mean_recall_at_{}", self.k), &self.model_mean)?;
        map.serialize_entry("details", &self.details)?;
        map.end()
    }
}

/// Recall@k of raw vector search and of the full pipeline on each query.
///
/// The pipeline never returns more than `ranking.max_results` items, so a
/// `k` above that only lowers the ceiling of the model's recall.
pub fn evaluate(recommender: &Recommender, labeled: &[LabeledQuery], k: usize, pb: &ProgressBar) -> anyhow::Result<EvalReport> {
    let mut details = Vec::with_capacity(labeled.len());
    for case in labeled {
        let baseline_top: Vec<String> = recommender
            .baseline(&case.query, k)
            .with_context(|| format!("baseline search for {:?}", case.query))?
            .into_iter()
            .map(|h| h.item.name.clone())
            .collect();
        let model_top: Vec<String> = recommender
            .recommend(&case.query)
            .with_context(|| format!("recommendation for {:?}", case.query))?
            .into_iter()
            .map(|r| r.name)
            .collect();
        details.push(QueryReport {
            query: case.query.clone(),
            baseline_recall: recall_at_k(&baseline_top, &case.relevant, k),
            model_recall: recall_at_k(&model_top, &case.relevant, k),
            baseline_top,
            model_top,
        });
        pb.inc(1);
    }
    let baseline: Vec<f64> = details.iter().map(|d| d.baseline_recall).collect();
    let model: Vec<f64> = details.iter().map(|d| d.model_recall).collect();
    Ok(EvalReport { k, baseline_mean: mean(&baseline), model_mean: mean(&model), details })
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(rename = "Query")]
    query: String,
}

/// Queries from a CSV file with a `Query` column. Blank queries are skipped.
pub fn read_queries<R: Read>(input: R) -> anyhow::Result<Vec<String>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut queries = Vec::new();
    for (i, row) in reader.deserialize::<QueryRow>().enumerate() {
        let row = row.with_context(|| format!("query row {} (is there a `Query` column?)", i + 1))?;
        let query = row.query.trim();
        if !query.is_empty() {
            queries.push(query.to_string());
        }
    }
    Ok(queries)
}

/// One output row: `Query,Assessment_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "Query")]
    pub query: String,
    #[serde(rename = "Assessment_url")]
    pub assessment_url: String,
}

/// One row per recommended item. Queries that fail are logged and skipped.
pub fn predict(recommender: &Recommender, queries: &[String], pb: &ProgressBar) -> Vec<Prediction> {
    let mut rows = Vec::new();
    for query in queries {
        match recommender.recommend(query) {
            Ok(recs) => rows.extend(
                recs.into_iter().map(|r| Prediction { query: query.clone(), assessment_url: r.url }),
            ),
            Err(e) => warn!(query = %query, error = %e, "skipping query"),
        }
        pb.inc(1);
    }
    rows
}

/// CSV with a `Query,Assessment_url` header, written even when there are no rows.
pub fn write_predictions<W: Write>(output: W, rows: &[Prediction]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["Query", "Assessment_url"])?;
    for row in rows {
        writer.write_record([row.query.as_str(), row.assessment_url.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
