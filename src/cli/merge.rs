// merge.rs - Merge configuration file with CLI arguments

use crate::cli::args::{Command, CreateArgs, SubsampleArgs};
use crate::cli::config::{CreateConfig, SubsampleConfig};
use crate::cli::{Args, Config};
use crate::error::Result;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        if self.seed.is_none() {
            self.seed = config.seed;
        }
        if self.log_level.is_none() {
            self.log_level = config.log_level;
        }

        self.command = match self.command {
            Command::Create(args) => Command::Create(args.merge_with_config(config.create)),
            Command::Subsample(args) => {
                Command::Subsample(args.merge_with_config(config.subsample))
            }
            other => other,
        };
        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

impl CreateArgs {
    pub fn merge_with_config(mut self, config: CreateConfig) -> Self {
        if self.alignment.is_none() {
            self.alignment = config.alignment;
        }
        if self.threshold.is_none() {
            self.threshold = config.threshold;
        }
        if self.include_strains.is_none() {
            self.include_strains = config.include_strains;
        }
        if self.trim_primers.is_none() {
            self.trim_primers = config.trim_primers;
        }
        if self.metadata.is_none() {
            self.metadata = config.metadata;
        }
        if self.distance_index.is_none() {
            self.distance_index = config.distance_index;
        }
        if self.distance_index_out.is_none() {
            self.distance_index_out = config.distance_index_out;
        }
        if self.output.is_none() {
            self.output = config.output;
        }
        if self.output_fasta.is_none() {
            self.output_fasta = config.output_fasta;
        }
        self
    }
}

impl SubsampleArgs {
    pub fn merge_with_config(mut self, config: SubsampleConfig) -> Self {
        if self.community.is_none() {
            self.community = config.community;
        }
        if self.num_taxa.is_none() {
            self.num_taxa = config.num_taxa;
        }
        if self.group_by.is_none() {
            self.group_by = config.group_by;
        }
        if self.proportion.is_none() {
            self.proportion = config.proportion;
        }
        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.num_enforce && config.num_enforce.unwrap_or(false) {
            self.num_enforce = true;
        }
        if self.output.is_none() {
            self.output = config.output;
        }
        if self.summary.is_none() {
            self.summary = config.summary;
        }
        self
    }
}
