// main.rs - CLI entry point

use disco::cli::{
    run_create, run_subsample, validate_create, validate_subsample, Args, Command, Config,
};
use disco::core::resolve_seed;
use disco::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: Option<&str>) {
    let level = level.unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_main() -> Result<()> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if let Command::GenerateConfig(_) = args.command {
        println!("{}", Config::generate_sample());
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    init_logging(args.log_level.as_deref());
    info!("🚀 {}", disco::get_info());
    if let Some(config_path) = &args.config {
        info!("📄 Loaded configuration from: {}", config_path);
    }
    info!("🔧 Command: {}", command_line);

    match &args.command {
        Command::Create(create) => {
            let settings = validate_create(create)?;
            let seed = resolve_seed(args.seed);
            run_create(&settings, seed, &command_line)?;
        }
        Command::Subsample(subsample) => {
            let settings = validate_subsample(subsample)?;
            let seed = resolve_seed(args.seed);
            run_subsample(&settings, seed, &command_line)?;
        }
        Command::GenerateConfig(_) => {}
    }
    Ok(())
}
