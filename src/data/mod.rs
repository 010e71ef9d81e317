// mod.rs - Data structures module

pub mod loaders;
pub mod sequence;
pub mod taxa;

// Re-export main types for convenience
pub use loaders::MemberLabels;
pub use sequence::{Sequence, SequenceSet};
pub use taxa::{TaxonRecord, TaxonTable};
