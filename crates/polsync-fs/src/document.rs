//! Format-agnostic document loading
//!
//! Definition and fixture files are YAML or JSON; the configuration file
//! is TOML. All of them are read through [`Document`], which detects the
//! format from the file extension and keeps the raw text next to the
//! parsed value.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, NormalizedPath, Result, io};

/// Serialization format, detected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// Detect the format from an extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Detect the format of a path.
    pub fn of(path: &NormalizedPath) -> Option<Self> {
        path.extension().and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Toml => "TOML",
        }
    }

    /// Parse `content` into a typed value.
    pub fn parse<T: DeserializeOwned>(&self, path: &NormalizedPath, content: &str) -> Result<T> {
        let parse_error = |message: String| Error::Parse {
            path: path.to_native(),
            format: self.as_str().into(),
            message,
        };

        match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
            Self::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            Self::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        }
    }
}

/// A loaded file: its path, raw text, and parsed value.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: NormalizedPath,
    pub format: DocumentFormat,
    pub raw: String,
    pub value: Value,
}

impl Document {
    /// Load and parse a document, detecting the format from its extension.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let format = DocumentFormat::of(path).ok_or_else(|| Error::UnsupportedFormat {
            extension: path.extension().unwrap_or("").to_string(),
        })?;
        let raw = io::read_text(path)?;
        let value = format.parse::<Value>(path, &raw)?;
        Ok(Self {
            path: path.clone(),
            format,
            raw,
            value,
        })
    }

    /// Look up a string at a dot-separated path, e.g. `metadata.name`.
    pub fn str_at(&self, dotted: &str) -> Option<&str> {
        let mut current = &self.value;
        for part in dotted.split('.') {
            current = current.as_object()?.get(part)?;
        }
        current.as_str()
    }
}

/// Load a typed value straight from a file, without keeping the raw text.
///
/// This is how `polsync.toml` layers are read.
pub fn load<T: DeserializeOwned>(path: &NormalizedPath) -> Result<T> {
    let format = DocumentFormat::of(path).ok_or_else(|| Error::UnsupportedFormat {
        extension: path.extension().unwrap_or("").to_string(),
    })?;
    let raw = io::read_text(path)?;
    format.parse(path, &raw)
}
