use clap::Parser;
use priorkin::pipeline::{run, InputPaths};
use priorkin::{Config, FailurePolicy};
use std::path::PathBuf;
use std::process::ExitCode;

/// Find the closest strictly-older relatives of query isolates in a
/// phylogeny and a genome collection, plus their ancestral geographic
/// trait inferences.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Strain names of the isolates to query.
    #[arg(required = true)]
    isolates: Vec<String>,

    /// Nextstrain metadata TSV (strain, date, region, country, division).
    #[arg(short, long)]
    metadata: PathBuf,

    /// Reference FASTA covering all strains in the tree.
    #[arg(short, long)]
    fasta: PathBuf,

    /// Refined newick phylogeny.
    #[arg(short, long)]
    tree: PathBuf,

    /// Trait inference node-data JSON for the tree.
    #[arg(short = 'T', long)]
    traits: PathBuf,

    /// Output directory for the result tables.
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Overwrite a previous run's output directory.
    #[arg(long)]
    overwrite: bool,

    /// Worker threads for per-isolate resolution (0 = one per CPU).
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// Abort the whole run if any isolate has no older relative in the
    /// tree, instead of skipping and reporting it.
    #[arg(long)]
    abort_on_missing: bool,

    /// Threads for mash sketching.
    #[arg(long, default_value_t = 8)]
    mash_threads: usize,

    /// Reuse an existing sketch from a previous run.
    #[arg(long)]
    reuse_sketch: bool,

    /// Verbose logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let policy = if args.abort_on_missing {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Skip
    };
    let config = Config::default()
        .with_workers(args.workers)
        .with_failure_policy(policy)
        .with_mash_threads(args.mash_threads)
        .with_reuse_sketch(args.reuse_sketch);

    let inputs = InputPaths {
        metadata: args.metadata,
        fasta: args.fasta,
        tree: args.tree,
        traits: args.traits,
    };

    match run(&args.isolates, &inputs, &args.output_dir, args.overwrite, &config) {
        Ok(summary) => {
            log::info!(
                "resolved {} isolates: {} tree rows, {} genomic rows, {} trait rows",
                summary.isolates_queried,
                summary.tree.records.len(),
                summary.genomic.records.len(),
                summary.ancestor_traits.len()
            );
            if !summary.tree.skipped.is_empty() {
                log::warn!(
                    "skipped under the tree metric: {}",
                    summary.tree.skipped.join(", ")
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
