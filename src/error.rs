// error.rs - Error types shared by every disco stage

use thiserror::Error;

/// Errors raised while loading inputs, building communities or subsampling.
///
/// Every variant except `Internal` is a user-input validation failure: the run
/// aborts before any output is written.
#[derive(Debug, Error)]
pub enum DiscoError {
    /// A required input (alignment, threshold, subsample mode) was not given
    #[error("Missing required input: {0}")]
    InputMissing(String),

    /// A residue outside the nucleotide + IUPAC ambiguity alphabet
    #[error("Invalid symbol '{symbol}' at column {column}{}", describe_sequence(.id))]
    InvalidSymbol {
        id: Option<String>,
        symbol: char,
        column: usize,
    },

    /// Sequences of an alignment do not share one length
    #[error("Sequence '{id}' has length {found}, expected {expected} (input must be pre-aligned)")]
    UnequalLength {
        id: String,
        expected: usize,
        found: usize,
    },

    /// Starter community members that sit within the threshold of each other
    #[error("Starter community is not valid at threshold {threshold}; conflicting members: {}", format_pairs(.pairs))]
    StarterCommunityInvalid {
        threshold: usize,
        pairs: Vec<(String, String)>,
    },

    /// A proportion entry names a group absent from the record table
    #[error("Group '{group}' not found in grouping column (available: {})", .available.join(", "))]
    UnknownGroup {
        group: String,
        available: Vec<String>,
    },

    /// Goal proportions do not sum to one
    #[error("Proportions do not sum to 1 (currently sum to {sum})")]
    ProportionSumInvalid { sum: f64 },

    /// Target count cannot be met
    #[error("Count constraint infeasible: {0}")]
    CountConstraintInfeasible(String),

    /// An id referenced by a starter list or persisted index is not in the alignment
    #[error("Unknown sequence id '{id}' referenced in {origin}")]
    UnknownSequenceId { id: String, origin: String },

    /// Malformed input content
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Broken internal invariant; always a bug
    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DiscoError>;

impl DiscoError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        DiscoError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

fn describe_sequence(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" of sequence '{}'", id),
        None => String::new(),
    }
}

fn format_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(a, b)| format!("{},{}", a, b))
        .collect::<Vec<_>>()
        .join("; ")
}
