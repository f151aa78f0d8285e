//! Exact-version dependency pins (`name==version`)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProvenvError, Result};

/// A Python package pinned to an exact version
///
/// Only the `name==version` form is accepted. Ranges, extras and
/// environment markers are rejected: the provisioning contract is
/// reproducibility, and anything but an exact pin can drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pin {
    pub name: String,
    pub version: String,
}

impl Pin {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse a `name==version` requirement string
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let Some((name, version)) = input.split_once("==") else {
            return Err(ProvenvError::InvalidPin {
                input: input.to_string(),
                reason: "missing '==' separator".to_string(),
            });
        };

        let name = name.trim();
        let version = version.trim();

        if name.is_empty() {
            return Err(ProvenvError::InvalidPin {
                input: input.to_string(),
                reason: "empty package name".to_string(),
            });
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(ProvenvError::InvalidPin {
                input: input.to_string(),
                reason: "package name contains invalid characters".to_string(),
            });
        }
        if version.is_empty() {
            return Err(ProvenvError::InvalidPin {
                input: input.to_string(),
                reason: "empty version".to_string(),
            });
        }
        if version.contains("==") || version.chars().any(char::is_whitespace) {
            return Err(ProvenvError::InvalidPin {
                input: input.to_string(),
                reason: "version must be a single exact version".to_string(),
            });
        }

        Ok(Self::new(name, version))
    }

    /// Canonical name as pip reports it in `pip freeze` (PEP 503, lowered
    /// with runs of `-_.` collapsed to `-`)
    pub fn normalized_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut last_was_sep = false;
        for c in self.name.chars() {
            if matches!(c, '-' | '_' | '.') {
                if !last_was_sep {
                    out.push('-');
                }
                last_was_sep = true;
            } else {
                out.push(c.to_ascii_lowercase());
                last_was_sep = false;
            }
        }
        out
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

impl TryFrom<String> for Pin {
    type Error = ProvenvError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Pin> for String {
    fn from(pin: Pin) -> Self {
        pin.to_string()
    }
}
