use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use shortlist_cli::{init_tracing, load_settings, predict, progress, read_queries, write_predictions};
use shortlist_hybrid::Recommender;

/// Batch recommendations: reads a CSV with a `Query` column and writes one
/// `Query,Assessment_url` row per recommended assessment.
#[derive(Parser, Debug)]
#[command(name = "shortlist-predict")]
struct Args {
    /// CSV file with a `Query` column
    queries: PathBuf,

    /// Output CSV (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;

    let file = File::open(&args.queries).with_context(|| format!("opening {}", args.queries.display()))?;
    let queries = read_queries(file).with_context(|| format!("parsing {}", args.queries.display()))?;
    let recommender = Recommender::from_settings(&settings)?;

    let pb = progress(queries.len(), "queries");
    let rows = predict(&recommender, &queries, &pb);
    pb.finish_and_clear();

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).with_context(|| format!("creating {}", path.display()))?),
        None => Box::new(std::io::stdout().lock()),
    };
    write_predictions(out, &rows)?;
    info!(queries = queries.len(), rows = rows.len(), "predictions written");
    Ok(())
}
