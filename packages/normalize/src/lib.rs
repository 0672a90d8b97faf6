#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical subdivision name normalization.
//!
//! Accident records name their subdivision in a free-text location field
//! such as `"KEC. KARANGPILANG, KOTA SURABAYA"`, while the boundary dataset
//! uses names like `"Karang Pilang"`. [`Normalizer`] bridges the two with a
//! deterministic pipeline applied to every location:
//!
//! 1. Trim surrounding whitespace
//! 2. Strip the leading marker (e.g. `"KEC. "`)
//! 3. Strip the trailing qualifier (e.g. `", KOTA SURABAYA"`)
//! 4. Title-case
//! 5. Apply the spelling correction table
//!
//! The result is best-effort: unrecognized formats pass through cleaned
//! but unmatched, and the join drops them later.

pub mod case;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use case::title_case;

/// Errors that can occur while building a [`Normalizer`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A correction could never match, or its target would be rewritten
    /// again by a second pass.
    #[error("Correction '{from}' -> '{to}' is not stable: {reason}")]
    UnstableCorrection {
        /// Correction key.
        from: String,
        /// Correction target.
        to: String,
        /// Why the target is unstable.
        reason: &'static str,
    },
}

/// How raw location strings are formatted for one accident dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFormat {
    /// Literal leading marker to strip (case-sensitive).
    #[serde(default)]
    pub prefix: String,
    /// Literal trailing qualifier to strip (case-sensitive).
    #[serde(default)]
    pub suffix: String,
    /// Known-incorrect → correct name pairs, matched after title-casing.
    #[serde(default)]
    pub corrections: BTreeMap<String, String>,
}

/// Converts raw accident locations into canonical subdivision names.
#[derive(Debug, Clone)]
pub struct Normalizer {
    format: LocationFormat,
}

impl Normalizer {
    /// Builds a normalizer for the given location format.
    ///
    /// Correction keys are matched against title-cased names, so every key
    /// must already be title-cased. Every target must be title-cased too and
    /// must not be a correction key itself, otherwise normalizing twice
    /// would not give the same result as normalizing once.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::UnstableCorrection`] if a correction key
    /// could never match or a target is not a fixed point of the pipeline.
    pub fn new(format: LocationFormat) -> Result<Self, NormalizeError> {
        for (from, to) in &format.corrections {
            if title_case(from) != *from {
                return Err(NormalizeError::UnstableCorrection {
                    from: from.clone(),
                    to: to.clone(),
                    reason: "key is not title-cased, so it can never match",
                });
            }
            if title_case(to) != *to {
                return Err(NormalizeError::UnstableCorrection {
                    from: from.clone(),
                    to: to.clone(),
                    reason: "target is not title-cased",
                });
            }
            if format.corrections.contains_key(to) {
                return Err(NormalizeError::UnstableCorrection {
                    from: from.clone(),
                    to: to.clone(),
                    reason: "target is also a correction key",
                });
            }
        }

        log::debug!(
            "Normalizer ready (prefix={:?}, suffix={:?}, {} corrections)",
            format.prefix,
            format.suffix,
            format.corrections.len()
        );

        Ok(Self { format })
    }

    /// Returns the location format this normalizer applies.
    #[must_use]
    pub const fn format(&self) -> &LocationFormat {
        &self.format
    }

    /// Normalizes a raw location into a canonical subdivision name.
    ///
    /// Returns an empty string for blank input.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let mut name = raw.trim();

        if !self.format.prefix.is_empty()
            && let Some(rest) = name.strip_prefix(self.format.prefix.as_str())
        {
            name = rest;
        }
        if !self.format.suffix.is_empty()
            && let Some(rest) = name.strip_suffix(self.format.suffix.as_str())
        {
            name = rest;
        }

        let titled = title_case(name.trim());

        match self.format.corrections.get(&titled) {
            Some(corrected) => corrected.clone(),
            None => titled,
        }
    }

    /// Normalizes every location in `raw`, preserving order.
    #[must_use]
    pub fn normalize_all<'a, I>(&self, raw: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        raw.into_iter().map(|s| self.normalize(s)).collect()
    }
}
