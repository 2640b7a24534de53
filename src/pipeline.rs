//! End-to-end run: parse inputs, validate, sketch, resolve both metrics in
//! parallel, extract ancestor traits, write the three output tables.

use crate::ancestry;
use crate::error::{PriorkinError, Result};
use crate::genome::{check_mash, sketch_reference, MashProvider};
use crate::io::{self, Metadata, OutputTables};
use crate::resolve::{resolve_batch, BatchOutcome, GenomicResolver, TreeResolver};
use crate::tree::parse_newick;
use crate::types::{AncestorTraitRecord, Config, FailurePolicy};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Input file locations for one run.
#[derive(Debug, Clone)]
pub struct InputPaths {
    /// Nextstrain-style metadata TSV.
    pub metadata: PathBuf,
    /// Reference FASTA containing all strains in the tree.
    pub fasta: PathBuf,
    /// Refined newick phylogeny.
    pub tree: PathBuf,
    /// Trait inference node-data JSON for the same tree.
    pub traits: PathBuf,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub isolates_queried: usize,
    pub tree: BatchOutcome,
    pub genomic: BatchOutcome,
    pub ancestor_traits: Vec<AncestorTraitRecord>,
    pub tables: OutputTables,
}

fn prepare_output_dir(dir: &Path, overwrite: bool) -> Result<()> {
    if dir.exists() {
        if !overwrite {
            return Err(PriorkinError::OutputDirExists(dir.to_path_buf()));
        }
        log::warn!("overwriting previous output in {}", dir.display());
        fs::remove_dir_all(dir).map_err(|e| PriorkinError::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| PriorkinError::io(dir, e))
}

/// Run the full resolution for `isolates`.
pub fn run(
    isolates: &[String],
    inputs: &InputPaths,
    output_dir: &Path,
    overwrite: bool,
    config: &Config,
) -> Result<RunSummary> {
    prepare_output_dir(output_dir, overwrite)?;
    check_mash()?;

    log::info!(
        "parsing inputs: {}, {}, {}, {}",
        inputs.metadata.display(),
        inputs.fasta.display(),
        inputs.tree.display(),
        inputs.traits.display()
    );
    let metadata = Metadata::from_tsv(&inputs.metadata)?;
    let newick = fs::read_to_string(&inputs.tree).map_err(|e| PriorkinError::io(&inputs.tree, e))?;
    let tree = parse_newick(&newick)?;
    let traits = io::parse_traits_file(&inputs.traits)?;

    let requested: FxHashSet<String> = isolates.iter().cloned().collect();
    let query_dir = output_dir.join("query_genomes");
    let fasta_strains = io::extract_query_fastas(&inputs.fasta, &requested, &query_dir)?;

    let usable = io::check_inputs(
        isolates,
        &metadata,
        &tree,
        &traits,
        &fasta_strains,
        &config.unknown_leaf_prefix,
    )?;

    let sketch = sketch_reference(
        &inputs.fasta,
        output_dir,
        config.mash_threads,
        config.reuse_sketch,
    )?;

    log::info!(
        "searching for older closest relatives of {} isolates in {}",
        usable.len(),
        inputs.tree.display()
    );
    let tree_resolver = TreeResolver::new(&tree, metadata.temporal(), &config.unknown_leaf_prefix);
    let tree_outcome = resolve_batch(&usable, config.workers, config.failure_policy, |isolate| {
        tree_resolver.resolve(isolate)
    })?;

    log::info!("searching for older closest genomes with mash");
    let provider = MashProvider::new(sketch, query_dir);
    let genomic_resolver = GenomicResolver::new(&provider, metadata.temporal());
    // An empty older set is non-fatal on this metric, so the only unit
    // errors here are collaborator failures; those always abort.
    let genomic_outcome = resolve_batch(&usable, config.workers, FailurePolicy::Abort, |isolate| {
        genomic_resolver.resolve(isolate)
    })?;

    log::info!("extracting ancestral traits for {} isolates", usable.len());
    let ancestor_traits = ancestry::extract_all(&tree, &traits, &usable)?;

    let tables = OutputTables::in_dir(output_dir);
    io::output::write_distance_table(&tables.tree, &tree_outcome.records, &metadata)?;
    io::output::write_distance_table(&tables.genomic, &genomic_outcome.records, &metadata)?;
    io::output::write_trait_table(&tables.traits, &ancestor_traits, &metadata)?;

    Ok(RunSummary {
        isolates_queried: usable.len(),
        tree: tree_outcome,
        genomic: genomic_outcome,
        ancestor_traits,
        tables,
    })
}
