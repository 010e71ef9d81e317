// lib.rs - disco library root

//! # disco - Distance-separated community builder for aligned sequences
//!
//! Selects a maximally diverse subset ("community") of aligned DNA/RNA
//! sequences such that every pair of members differs by more than a chosen
//! number of columns, then optionally subsamples that community toward target
//! group proportions or a target size.
//!
//! ## Features
//!
//! - **Ambiguity aware**: IUPAC codes match any base they may stand for
//! - **Reusable index**: pairwise distances can be saved (optionally LZ4) and reloaded
//! - **Starter communities**: required members are validated and grown around
//! - **Reproducible**: every random decision draws from one seeded generator
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use disco::prelude::*;
//!
//! let sequences = SequenceSet::from_fasta(std::path::Path::new("alignment.fasta"), None)?;
//! let mut cache = DistanceCache::new();
//! let index = DistanceIndex::build(&sequences, &mut cache)?;
//!
//! let mut rng = seeded_rng(resolve_seed(Some(42)));
//! let community = CommunityBuilder::new(&index, 5).build(None, &mut rng)?;
//! println!("{} members", community.len());
//! # Ok::<(), disco::DiscoError>(())
//! ```

pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::core::{ambiguity_distance, resolve_seed, seeded_rng, summarize};
    pub use crate::core::{AmbiguitySymbolSet, DistanceCache, DistanceIndex, DistanceTriple};
    pub use crate::core::{Community, CommunityBuilder};
    pub use crate::core::{GroupProportionGoal, ProportionalSubsampler, SubsampleOutcome};
    pub use crate::data::{Sequence, SequenceSet, TaxonRecord, TaxonTable};
    pub use crate::error::{DiscoError, Result};
}

// Re-export main types at the root level for convenience
pub use crate::core::{Community, CommunityBuilder, DistanceIndex, ProportionalSubsampler};
pub use crate::data::{SequenceSet, TaxonTable};
pub use crate::error::{DiscoError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "disco v{} - Distance-separated community builder for aligned sequences",
        VERSION
    )
}
