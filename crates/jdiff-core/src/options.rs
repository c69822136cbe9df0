use std::fmt;

use serde::{Deserialize, Serialize};

use crate::OptionsError;

/// Controls how two sequences are aligned before their elements are diffed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceStrategy {
    /// Pair elements by position (default).
    #[default]
    Positional,
    /// Align elements with a longest-common-subsequence edit script.
    Lcs,
}

impl fmt::Display for SequenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional => f.write_str("positional"),
            Self::Lcs => f.write_str("lcs"),
        }
    }
}

/// Configuration knobs passed to a diff invocation.
///
/// ```
/// # use jdiff_core::{DiffOptions, SequenceStrategy};
/// let opts = DiffOptions::default().with_strategy(SequenceStrategy::Lcs);
/// assert_eq!(opts.strategy(), SequenceStrategy::Lcs);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiffOptions {
    strategy: SequenceStrategy,
    sort_keys: Option<Vec<String>>,
}

impl DiffOptions {
    /// Returns the configured sequence alignment strategy.
    #[must_use]
    pub fn strategy(&self) -> SequenceStrategy {
        self.strategy
    }

    /// Returns the keys used to pre-sort sequences of mappings, if any.
    #[must_use]
    pub fn sort_keys(&self) -> Option<&[String]> {
        self.sort_keys.as_deref()
    }

    /// Sets the sequence alignment strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SequenceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the keys used to pre-sort sequences of mappings.
    ///
    /// ```
    /// # use jdiff_core::DiffOptions;
    /// let opts = DiffOptions::default().with_sort_keys(["id"]).expect("sort keys");
    /// assert_eq!(opts.sort_keys().unwrap(), ["id"]);
    /// ```
    pub fn with_sort_keys<I, S>(mut self, keys: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected = Vec::new();
        for key in keys {
            let key = key.into();
            if key.trim().is_empty() {
                return Err(OptionsError::EmptySortKey);
            }
            collected.push(key);
        }
        if collected.is_empty() {
            return Err(OptionsError::EmptySortKey);
        }
        self.sort_keys = Some(collected);
        Ok(self)
    }
}
