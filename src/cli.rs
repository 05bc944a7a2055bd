use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::discovery::SearchRoot;
use crate::error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "extdisc")]
#[command(about = "Extension discovery - find manifest-described extensions across search roots", long_about = None)]
pub struct Args {
    /// Root directory that search roots are resolved against
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Extension type to list (e.g., module, theme)
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "module")]
    pub extension_type: String,

    /// Search root as WEIGHT=DIR or DIR. Can be specified multiple times.
    #[arg(short = 's', long = "search-root", value_name = "SPEC")]
    pub search_roots: Vec<String>,

    /// Include extensions living under tests/ directories
    #[arg(long, conflicts_with = "exclude_tests")]
    pub include_tests: bool,

    /// Exclude extensions living under tests/ directories
    #[arg(long)]
    pub exclude_tests: bool,

    /// Directory name to prune during traversal. Replaces the defaults.
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Settings file (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Output format (json, yaml)
    #[arg(short = 'f', long, default_value = "json")]
    pub format: OutputFormat,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref root) = self.root {
            validate_root(root)?;
        }
        if let Some(ref config) = self.config {
            if !config.is_file() {
                anyhow::bail!("Config file does not exist: {}", config.display());
            }
        }
        if self.extension_type.trim().is_empty() {
            anyhow::bail!("Extension type must not be empty");
        }
        Ok(())
    }

    /// Explicit test inclusion from the flags; `None` defers to settings and
    /// the environment.
    pub fn include_tests(&self) -> Option<bool> {
        match (self.include_tests, self.exclude_tests) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Loads the settings file, if any, and applies command-line overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match self.config {
            Some(ref path) => Settings::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(ref root) = self.root {
            settings.root = Some(root.clone());
        }
        if !self.search_roots.is_empty() {
            settings.search_roots =
                SearchRoot::parse_list(&self.search_roots).context("Invalid --search-root")?;
        }
        if !self.exclude_dirs.is_empty() {
            settings.excluded_dirs = Some(self.exclude_dirs.clone());
        }
        if let Some(include) = self.include_tests() {
            settings.include_tests = Some(include);
        }

        Ok(settings)
    }
}

pub fn validate_root(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(IoError::directory_not_found(path))
            .with_context(|| format!("Root does not exist: {}", path.display()));
    }
    if !path.is_dir() {
        anyhow::bail!("Root is not a directory: {}", path.display());
    }
    std::fs::read_dir(path).with_context(|| format!("Cannot read directory: {}", path.display()))?;
    Ok(())
}
