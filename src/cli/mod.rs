// mod.rs - CLI module

pub mod args;
pub mod commands;
pub mod config;
pub mod merge;
pub mod validation;

// Re-export main types for convenience
pub use args::{Args, Command, CreateArgs, SubsampleArgs};
pub use commands::{run_create, run_subsample};
pub use config::Config;
pub use validation::{
    validate_create, validate_subsample, CreateSettings, SubsampleMode, SubsampleSettings,
};
