// validation.rs - Input validation utilities

use std::path::{Path, PathBuf};

use crate::cli::args::{CreateArgs, SubsampleArgs};
use crate::error::{DiscoError, Result};

/// Checked inputs of `disco create`
#[derive(Debug, Clone)]
pub struct CreateSettings {
    pub alignment: PathBuf,
    pub threshold: usize,
    pub include_strains: Option<PathBuf>,
    pub trim_primers: Option<usize>,
    pub metadata: Option<PathBuf>,
    pub distance_index: Option<PathBuf>,
    pub distance_index_out: Option<PathBuf>,
    pub output: PathBuf,
    pub output_fasta: Option<PathBuf>,
}

/// How `disco subsample` reduces the community
#[derive(Debug, Clone, PartialEq)]
pub enum SubsampleMode {
    /// Uniform sample of this many taxa
    Count(usize),
    /// Proportion goals with an optional target size
    Proportion {
        goals: PathBuf,
        target: Option<usize>,
        enforce_count: bool,
    },
}

/// Checked inputs of `disco subsample`
#[derive(Debug, Clone)]
pub struct SubsampleSettings {
    pub community: PathBuf,
    pub mode: SubsampleMode,
    pub group_by: Option<String>,
    pub output: PathBuf,
    pub summary: Option<PathBuf>,
}

fn existing_file(path: &str, what: &str) -> Result<PathBuf> {
    let path = PathBuf::from(path);
    if !path.is_file() {
        return Err(DiscoError::InputMissing(format!(
            "{} file '{}' does not exist",
            what,
            path.display()
        )));
    }
    Ok(path)
}

fn optional_file(path: Option<&String>, what: &str) -> Result<Option<PathBuf>> {
    path.map(|p| existing_file(p, what)).transpose()
}

/// Validate `create` arguments after the config merge
pub fn validate_create(args: &CreateArgs) -> Result<CreateSettings> {
    let alignment = args
        .alignment
        .as_deref()
        .ok_or_else(|| DiscoError::InputMissing("--alignment is required".to_string()))?;
    let threshold = args
        .threshold
        .ok_or_else(|| DiscoError::InputMissing("--threshold is required".to_string()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| format!("Community_ED{}.txt", threshold));

    let settings = CreateSettings {
        alignment: existing_file(alignment, "Alignment")?,
        threshold,
        include_strains: optional_file(args.include_strains.as_ref(), "Starter community")?,
        trim_primers: args.trim_primers,
        metadata: optional_file(args.metadata.as_ref(), "Metadata")?,
        distance_index: optional_file(args.distance_index.as_ref(), "Distance index")?,
        distance_index_out: args.distance_index_out.as_ref().map(PathBuf::from),
        output: PathBuf::from(output),
        output_fasta: args.output_fasta.as_ref().map(PathBuf::from),
    };

    if let (Some(input), Some(out)) = (&settings.distance_index, &settings.distance_index_out) {
        if same_path(input, out) {
            return Err(DiscoError::InvalidInput(
                "--distance-index-out must differ from --distance-index".to_string(),
            ));
        }
    }
    Ok(settings)
}

/// Validate `subsample` arguments after the config merge
pub fn validate_subsample(args: &SubsampleArgs) -> Result<SubsampleSettings> {
    let community = args
        .community
        .as_deref()
        .ok_or_else(|| DiscoError::InputMissing("--community is required".to_string()))?;

    if args.num_enforce && (args.num_taxa.is_none() || args.proportion.is_none()) {
        return Err(DiscoError::InputMissing(
            "--num-enforce must be used with both --num-taxa and --proportion".to_string(),
        ));
    }

    let mode = match (&args.proportion, args.num_taxa) {
        (Some(goals), target) => SubsampleMode::Proportion {
            goals: existing_file(goals, "Proportion")?,
            target,
            enforce_count: args.num_enforce,
        },
        (None, Some(count)) => SubsampleMode::Count(count),
        (None, None) => {
            return Err(DiscoError::InputMissing(
                "either --num-taxa or --proportion is required".to_string(),
            ))
        }
    };

    let output = match (&args.output, &mode) {
        (Some(output), _) => PathBuf::from(output),
        (None, SubsampleMode::Count(count)) => {
            PathBuf::from(format!("Subsampled_community_taxa{}.txt", count))
        }
        (None, SubsampleMode::Proportion { .. }) => {
            PathBuf::from("Subsampled_community_taxa_prop.txt")
        }
    };

    Ok(SubsampleSettings {
        community: existing_file(community, "Community")?,
        mode,
        group_by: args.group_by.clone(),
        output,
        summary: args.summary.as_ref().map(PathBuf::from),
    })
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
