use std::path::PathBuf;

use clap::Parser;

use shortlist_cli::{init_tracing, load_settings};
use shortlist_hybrid::Recommender;

/// Recommend catalog assessments for one free-text query.
#[derive(Parser, Debug)]
#[command(name = "shortlist-recommend")]
struct Args {
    /// Query text, e.g. "Java developer with leadership skills"
    query: String,

    /// Config file layered over the defaults (instead of ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show fused, semantic and lexical scores
    #[arg(long)]
    scores: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    let recommender = Recommender::from_settings(&settings)?;

    if args.json {
        let recs = recommender.recommend(&args.query)?;
        println!("{}", serde_json::to_string_pretty(&recs)?);
        return Ok(());
    }

    let ranked = recommender.rank(&args.query)?;
    println!("🔍 {} results for: \"{}\"", ranked.len(), args.query.trim());
    for (i, c) in ranked.iter().enumerate() {
        let label = recommender.categories().resolve(&c.item.category).map_or("", |k| k.label.as_str());
        println!("\n  {}. {}  [{}]", i + 1, c.item.name, label);
        if args.scores {
            println!("     fused={:.4}  semantic={:.4}  lexical={:.2}", c.fused, c.similarity, c.lexical);
        }
        println!("     {}", c.item.url);
    }
    Ok(())
}
