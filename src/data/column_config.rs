//! Column role configuration for an experiment.

use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a column config came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Produced by the column-role heuristics.
    #[default]
    Auto,
    /// Reviewed and confirmed by a user or agent.
    User,
}

/// Which columns to drop before training and, optionally, an explicit
/// feature allowlist.
///
/// `ignore_columns` and `feature_columns` never share a name. The check runs
/// on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawColumnConfig")]
pub struct ColumnConfig {
    ignore_columns: Vec<String>,
    feature_columns: Vec<String>,
    source: ConfigSource,
}

#[derive(Deserialize)]
struct RawColumnConfig {
    #[serde(default)]
    ignore_columns: Vec<String>,
    #[serde(default)]
    feature_columns: Vec<String>,
    #[serde(default)]
    source: ConfigSource,
}

impl TryFrom<RawColumnConfig> for ColumnConfig {
    type Error = ForgeError;

    fn try_from(raw: RawColumnConfig) -> Result<Self> {
        ColumnConfig::new(raw.ignore_columns, raw.feature_columns, raw.source)
    }
}

impl ColumnConfig {
    /// Create a config, rejecting names listed as both ignored and feature.
    pub fn new(
        ignore_columns: Vec<String>,
        feature_columns: Vec<String>,
        source: ConfigSource,
    ) -> Result<Self> {
        let ignored: BTreeSet<&str> = ignore_columns.iter().map(String::as_str).collect();
        let overlap: BTreeSet<&str> = feature_columns
            .iter()
            .map(String::as_str)
            .filter(|c| ignored.contains(c))
            .collect();
        if !overlap.is_empty() {
            return Err(ForgeError::InvalidColumnConfig(format!(
                "columns cannot appear in both feature_columns and ignore_columns: {:?}",
                overlap
            )));
        }
        Ok(Self {
            ignore_columns,
            feature_columns,
            source,
        })
    }

    /// Config that only drops columns.
    pub fn ignoring<S: AsRef<str>>(columns: &[S], source: ConfigSource) -> Self {
        Self {
            ignore_columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            feature_columns: Vec::new(),
            source,
        }
    }

    pub fn ignore_columns(&self) -> &[String] {
        &self.ignore_columns
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Same columns, different provenance. Used when a user confirms a
    /// suggested config.
    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.source = source;
        self
    }
}
