// mod.rs - Core logic module

pub mod ambiguity;
pub mod community;
pub mod index;
pub mod seed;
pub mod subsample;

// Re-export main types for convenience
pub use ambiguity::{ambiguity_distance, AmbiguitySymbolSet, DistanceCache};
pub use community::{Community, CommunityBuilder};
pub use index::{DistanceIndex, DistanceTriple};
pub use seed::{resolve_seed, seeded_rng, RunRng};
pub use subsample::{
    summarize, GroupProportionGoal, GroupSummary, ProportionalSubsampler, SubsampleOutcome,
    PROPORTION_TOLERANCE,
};
