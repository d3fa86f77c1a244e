//! Variable-name canonicalization tables.
//!
//! Source datasets name the same quantity differently across model
//! configurations (`sossheig` vs `zos` for sea surface height, `nav_lat`
//! vs `latitude`, and so on). Instead of probing a dataset attribute by
//! attribute and warning ad hoc, a [`MappingTable`] declares up front which
//! source names map to which canonical names and which of them are
//! required. Applying the table once at load renames everything it can and
//! returns a [`MappingReport`] of what happened; missing required names are
//! a hard, typed error.
//!
//! Tables can be built in code or loaded from TOML:
//!
//! ```toml
//! [[variables]]
//! source = "sossheig"
//! canonical = "ssh"
//!
//! [[variables]]
//! source = "nav_lat"
//! canonical = "latitude"
//! required = true
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for mapping-table loading and application.
#[derive(Debug, Error)]
pub enum MappingError {
    /// File I/O error while reading a table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// One or more required source variables were absent.
    #[error("required source variables missing: {}", names.join(", "))]
    MissingRequired {
        /// All missing required source names, in table order.
        names: Vec<String>,
    },

    /// Two present variables map to the same canonical name.
    #[error("canonical name '{canonical}' produced by more than one present variable")]
    DuplicateCanonical {
        /// The colliding canonical name.
        canonical: String,
    },
}

/// One source-to-canonical rename, with a required flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMapping {
    /// Name as it appears in the source dataset.
    pub source: String,
    /// Name the crate uses.
    pub canonical: String,
    /// Whether absence of the source name fails the load.
    #[serde(default)]
    pub required: bool,
}

/// Outcome of applying a table to a set of named arrays.
///
/// Required-name failures are reported through [`MappingError`], not here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingReport {
    /// (source, canonical) pairs that were renamed, in table order.
    pub applied: Vec<(String, String)>,
    /// Optional source names that were absent, in table order.
    pub missing_optional: Vec<String>,
    /// Input names not covered by the table, passed through unchanged,
    /// sorted.
    pub passthrough: Vec<String>,
}

impl MappingReport {
    /// True when every table entry matched.
    pub fn is_complete(&self) -> bool {
        self.missing_optional.is_empty()
    }
}

/// An ordered set of [`VariableMapping`] entries.
///
/// Several sources may target the same canonical name (model
/// configurations differ); that is only an error when more than one of
/// them is actually present in the data being mapped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTable {
    /// Entries in application order.
    pub variables: Vec<VariableMapping>,
}

impl MappingTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, builder-style.
    pub fn with_entry(
        mut self,
        source: impl Into<String>,
        canonical: impl Into<String>,
        required: bool,
    ) -> Self {
        self.variables.push(VariableMapping {
            source: source.into(),
            canonical: canonical.into(),
            required,
        });
        self
    }

    /// The conventional NEMO t-grid table.
    ///
    /// Coordinates are required; state variables are optional and cover
    /// both classic and CMIP-style NEMO output names.
    pub fn nemo_t_grid() -> Self {
        Self::new()
            .with_entry("nav_lat", "latitude", true)
            .with_entry("nav_lon", "longitude", true)
            .with_entry("time_counter", "time", true)
            .with_entry("deptht", "depth", false)
            .with_entry("sossheig", "ssh", false)
            .with_entry("zos", "ssh", false)
            .with_entry("votemper", "temperature", false)
            .with_entry("thetao", "temperature", false)
            .with_entry("vosaline", "salinity", false)
            .with_entry("so", "salinity", false)
    }

    /// Parse a table from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, MappingError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a table from a TOML file.
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, MappingError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize the table to TOML text.
    pub fn to_toml_string(&self) -> Result<String, MappingError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply the table to a set of named arrays.
    ///
    /// Matched names are renamed to their canonical form; unmatched input
    /// names pass through unchanged. Fails if any required source name is
    /// absent, or if two present names map onto the same canonical name.
    pub fn apply<T>(
        &self,
        mut arrays: HashMap<String, T>,
    ) -> Result<(HashMap<String, T>, MappingReport), MappingError> {
        let mut out: HashMap<String, T> = HashMap::with_capacity(arrays.len());
        let mut report = MappingReport::default();
        let mut missing_required: Vec<String> = Vec::new();

        for entry in &self.variables {
            match arrays.remove(&entry.source) {
                Some(values) => {
                    if out.contains_key(&entry.canonical) {
                        return Err(MappingError::DuplicateCanonical {
                            canonical: entry.canonical.clone(),
                        });
                    }
                    log::debug!("mapped variable '{}' -> '{}'", entry.source, entry.canonical);
                    report
                        .applied
                        .push((entry.source.clone(), entry.canonical.clone()));
                    out.insert(entry.canonical.clone(), values);
                }
                None if entry.required => missing_required.push(entry.source.clone()),
                None => {
                    log::warn!(
                        "optional variable '{}' not present; '{}' unavailable",
                        entry.source,
                        entry.canonical
                    );
                    report.missing_optional.push(entry.source.clone());
                }
            }
        }

        if !missing_required.is_empty() {
            return Err(MappingError::MissingRequired {
                names: missing_required,
            });
        }

        // Whatever the table did not claim passes through under its own
        // name.
        let mut passthrough: Vec<String> = arrays.keys().cloned().collect();
        passthrough.sort();
        for (name, values) in arrays {
            if out.contains_key(&name) {
                return Err(MappingError::DuplicateCanonical { canonical: name });
            }
            out.insert(name, values);
        }
        report.passthrough = passthrough;

        Ok((out, report))
    }
}

// =============================================================================
// Tests
// =============================================================================
