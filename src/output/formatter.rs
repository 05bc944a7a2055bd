use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::discovery::ExtensionRegistry;
use crate::error::IoError;

#[derive(Debug, Serialize)]
pub struct RegistryOutput<'a> {
    #[serde(rename = "type")]
    pub extension_type: &'a str,
    pub total: usize,
    pub extensions: &'a ExtensionRegistry,
}

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format(
        extension_type: &str,
        registry: &ExtensionRegistry,
        format: OutputFormat,
    ) -> Result<String> {
        let output = Self::build_output(extension_type, registry);

        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&output)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&output)?),
        }
    }

    pub fn build_output<'a>(
        extension_type: &'a str,
        registry: &'a ExtensionRegistry,
    ) -> RegistryOutput<'a> {
        RegistryOutput {
            extension_type,
            total: registry.len(),
            extensions: registry,
        }
    }

    pub fn write(content: &str, path: &Path) -> crate::error::Result<()> {
        fs::write(path, content).map_err(|e| IoError::write_error(path, e))?;
        Ok(())
    }
}
