// commands.rs - Runners for the create and subsample subcommands

use std::time::Instant;

use tracing::{info, warn};

use crate::cli::validation::{CreateSettings, SubsampleMode, SubsampleSettings};
use crate::core::{
    seeded_rng, summarize, Community, CommunityBuilder, DistanceCache, DistanceIndex,
    GroupSummary, ProportionalSubsampler,
};
use crate::data::loaders::{
    read_id_list, read_metadata, read_proportions, read_taxon_table, read_triples,
};
use crate::data::{SequenceSet, TaxonRecord};
use crate::error::Result;
use crate::output::{
    write_community, write_community_fasta, write_summary, write_taxon_table, write_triples,
    RunHeader,
};

/// Load inputs, grow the community and write every requested output.
///
/// Nothing is written until the community is complete.
pub fn run_create(settings: &CreateSettings, seed: u64, command_line: &str) -> Result<Community> {
    let start = Instant::now();
    info!("🧭 Stage: create");
    info!("📏 Threshold: {}", settings.threshold);

    let sequences = SequenceSet::from_fasta(&settings.alignment, settings.trim_primers)?;
    let starter = settings
        .include_strains
        .as_deref()
        .map(read_id_list)
        .transpose()?;
    let labels = settings.metadata.as_deref().map(read_metadata).transpose()?;

    let mut cache = DistanceCache::new();
    let index = match &settings.distance_index {
        Some(path) => {
            let triples = read_triples(path)?;
            let (index, computed) = DistanceIndex::from_triples(&triples, &sequences, &mut cache)?;
            if computed > 0 {
                info!("🔄 Computed {} pairs missing from the saved index", computed);
            }
            index
        }
        None => DistanceIndex::build(&sequences, &mut cache)?,
    };
    let (pairs, distinct, hits) = cache.stats();
    info!(
        "💾 Distance cache: {} pairs over {} distinct sequences, {} hits",
        pairs, distinct, hits
    );

    let mut rng = seeded_rng(seed);
    let community = CommunityBuilder::new(&index, settings.threshold)
        .build(starter.as_deref(), &mut rng)?;

    let header = RunHeader::new(command_line, Some(seed));
    let unlabeled = write_community(&settings.output, &community, labels.as_ref(), &header)?;
    if unlabeled > 0 {
        warn!("⚠️  {} community members had no metadata (written as NA)", unlabeled);
    }
    if let Some(path) = &settings.output_fasta {
        write_community_fasta(path, &community, &sequences)?;
    }
    if let Some(path) = &settings.distance_index_out {
        write_triples(path, &index.triples(), &header)?;
    }

    info!("⏱️  Total time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(community)
}

/// Load a community table, subsample it and write the result.
///
/// Returns the retained records and the realized per-group summary.
pub fn run_subsample(
    settings: &SubsampleSettings,
    seed: u64,
    command_line: &str,
) -> Result<(Vec<TaxonRecord>, Vec<GroupSummary>)> {
    let start = Instant::now();
    info!("🧭 Stage: subsample");

    let table = read_taxon_table(&settings.community)?;
    let mut rng = seeded_rng(seed);

    let (records, summary) = match &settings.mode {
        SubsampleMode::Count(target) => {
            info!("🎯 Mode: uniform sample of {} taxa", target);
            let records = ProportionalSubsampler::sample_count(&table.records, *target, &mut rng)?;
            let summary = match (&settings.group_by, table.header.len()) {
                (None, 1) => Vec::new(),
                (group_by, _) => {
                    let column = table.group_column(group_by.as_deref())?;
                    summarize(&records, column, None)
                }
            };
            (records, summary)
        }
        SubsampleMode::Proportion {
            goals,
            target,
            enforce_count,
        } => {
            let column = table.group_column(settings.group_by.as_deref())?;
            let goal = read_proportions(goals)?;
            info!(
                "🎯 Mode: proportions over '{}' ({} groups){}",
                table.header[column],
                goal.len(),
                match target {
                    Some(t) if *enforce_count => format!(", exactly {} taxa", t),
                    Some(t) => format!(", target {} taxa", t),
                    None => String::new(),
                }
            );
            let outcome = ProportionalSubsampler::new(*target, *enforce_count)
                .subsample(&table.records, column, &goal, &mut rng)?;
            (outcome.records, outcome.summary)
        }
    };

    info!("📊 Actualized proportions:");
    for group in &summary {
        match group.goal {
            Some(goal) => info!(
                "   {}: {} taxa, {:.4} (goal {:.4})",
                group.group, group.count, group.proportion, goal
            ),
            None => info!("   {}: {} taxa, {:.4}", group.group, group.count, group.proportion),
        }
    }

    let header = RunHeader::new(command_line, Some(seed));
    write_taxon_table(&settings.output, &table.header, &records, &header)?;
    if let Some(path) = &settings.summary {
        write_summary(path, &summary, &header)?;
    }

    info!("⏱️  Total time: {:.2}s", start.elapsed().as_secs_f64());
    Ok((records, summary))
}
