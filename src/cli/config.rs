// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{DiscoError, Result};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub seed: Option<u64>,
    pub log_level: Option<String>,

    #[serde(default)]
    pub create: CreateConfig,

    #[serde(default)]
    pub subsample: SubsampleConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateConfig {
    pub alignment: Option<String>,
    pub threshold: Option<usize>,
    pub include_strains: Option<String>,
    pub trim_primers: Option<usize>,
    pub metadata: Option<String>,
    pub distance_index: Option<String>,
    pub distance_index_out: Option<String>,
    pub output: Option<String>,
    pub output_fasta: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubsampleConfig {
    pub community: Option<String>,
    pub num_taxa: Option<usize>,
    pub group_by: Option<String>,
    pub proportion: Option<String>,
    pub num_enforce: Option<bool>,
    pub output: Option<String>,
    pub summary: Option<String>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DiscoError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            DiscoError::Config(msg) => {
                DiscoError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DiscoError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| DiscoError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content).map_err(|e| DiscoError::io(path, e))
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# disco.toml - Configuration file for disco
# Command line arguments will override these settings

# Random seed; omit to draw one from OS entropy (the seed used is always reported)
seed = 12345

# Log level: error, warn, info, debug, trace (RUST_LOG takes precedence)
log_level = "info"

# =============================================================================
# CREATE
# =============================================================================

[create]

# Aligned FASTA file (all sequences must have the same length)
alignment = "alignment.fasta"

# Members must differ by more than this many columns
threshold = 5

# Starter community that must be included (one id per line)
# include_strains = "starter.txt"

# Residues trimmed from both ends of every sequence
# trim_primers = 20

# Metadata joined to the community (label in the first column, id in the last)
# metadata = "metadata.tsv"

# Reuse a saved distance index instead of recomputing every pair
# distance_index = "index.tsv.lz4"

# Save the distance index (.lz4 extension compresses)
# distance_index_out = "index.tsv.lz4"

# Community table (default: Community_ED<threshold>.txt)
# output = "Community_ED5.txt"

# Community sequences as FASTA
# output_fasta = "community.fasta"

# =============================================================================
# SUBSAMPLE
# =============================================================================

[subsample]

# Community table written by `disco create`
community = "Community_ED5.txt"

# Number of taxa to keep
num_taxa = 50

# Column to group by (default: second column)
# group_by = "phylum"

# Desired group proportions (group<TAB>fraction, summing to 1)
# proportion = "proportions.tsv"

# Never let the proportion search drop below num_taxa
# num_enforce = true

# Subsampled table
# output = "Subsampled_community_taxa50.txt"

# Realized vs goal proportions
# summary = "proportions_summary.tsv"
"#
        .to_string()
    }
}
