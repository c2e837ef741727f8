use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use shortlist_cli::{evaluate, init_tracing, load_settings, progress, read_labeled};
use shortlist_hybrid::Recommender;

/// Compare recall@k of plain vector search against the full pipeline.
#[derive(Parser, Debug)]
#[command(name = "shortlist-evaluate")]
struct Args {
    /// CSV with `query` and `relevant_assessments` (names separated by `|`)
    labeled: PathBuf,

    /// Where to write the JSON report (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Recall cutoff; defaults to `ranking.max_results`
    #[arg(short)]
    k: Option<usize>,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    let max_results = settings.ranking.max_results;
    let k = args.k.unwrap_or(max_results);
    if k > max_results {
        warn!(k, max_results, "recommendations are capped below k; model recall is bounded accordingly");
    }

    let file = File::open(&args.labeled).with_context(|| format!("opening {}", args.labeled.display()))?;
    let labeled = read_labeled(file).with_context(|| format!("parsing {}", args.labeled.display()))?;

    let recommender = Recommender::from_settings(&settings)?;
    let pb = progress(labeled.len(), "queries");
    let report = evaluate(&recommender, &labeled, k, &pb)?;
    pb.finish_and_clear();

    info!(queries = labeled.len(), baseline = report.baseline_mean, model = report.model_mean, "mean recall@{}", k);
    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => fs::write(path, json).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
