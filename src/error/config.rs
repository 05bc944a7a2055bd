use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid search root '{spec}': {message}")]
    InvalidSearchRoot { spec: String, message: String },

    #[error("invalid value '{value}' for {variable} (expected true or false)")]
    InvalidFlag { variable: String, value: String },
}

impl ConfigError {
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_search_root(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSearchRoot {
            spec: spec.into(),
            message: message.into(),
        }
    }

    pub fn invalid_flag(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFlag {
            variable: variable.into(),
            value: value.into(),
        }
    }
}
