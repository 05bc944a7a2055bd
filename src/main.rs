use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use extension_discovery::cli;
use extension_discovery::logging::{self, Verbosity};
use extension_discovery::output::OutputFormatter;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logging::init(Verbosity::from_flags(args.verbose, args.quiet));
    args.validate().context("Invalid arguments")?;

    let settings = args.settings()?;
    let root = settings.root.clone().unwrap_or_else(|| PathBuf::from("."));
    cli::validate_root(&root).context("Invalid root")?;

    let mut discovery = settings
        .build_discovery(&root, None)
        .context("Invalid discovery settings")?;
    info!(
        "Scanning {} for '{}' extensions ({} search roots)",
        discovery.scanner().root().display(),
        args.extension_type,
        discovery.roots().len()
    );

    let registry = discovery.scan(&args.extension_type, args.include_tests());
    let output = OutputFormatter::format(&args.extension_type, &registry, args.format)?;

    match args.output_file {
        Some(ref path) => {
            OutputFormatter::write(&output, path)?;
            info!("Wrote {} registry to {}", args.format.as_str(), path.display());
        }
        None => println!("{output}"),
    }

    Ok(())
}
