//! Known state-label extraction artifacts
//!
//! Some report pages lose the leading glyph of a state name during
//! extraction ("llinois"). Those labels are restored from a small
//! known-bad to correct mapping before the page is validated.

use std::collections::BTreeMap;

use tracing::warn;

/// Mapping of mis-extracted state labels to their correct form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCorrections {
    fixes: BTreeMap<String, String>,
}

impl StateCorrections {
    pub fn new(fixes: BTreeMap<String, String>) -> Self {
        Self { fixes }
    }

    /// No corrections at all.
    pub fn none() -> Self {
        Self {
            fixes: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// The corrected label for `label`, if it is a known artifact.
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.fixes.get(label).map(String::as_str)
    }

    /// Replace `label` in place when it is a known artifact.
    ///
    /// Returns `true` if the label was changed.
    pub fn apply(&self, label: &mut String, month: &str) -> bool {
        match self.lookup(label) {
            Some(fixed) => {
                warn!(month, from = %label, to = fixed, "corrected state label");
                *label = fixed.to_string();
                true
            }
            None => false,
        }
    }
}

impl Default for StateCorrections {
    fn default() -> Self {
        Self::new(BTreeMap::from([(
            "llinois".to_string(),
            "Illinois".to_string(),
        )]))
    }
}

impl From<&BTreeMap<String, String>> for StateCorrections {
    fn from(fixes: &BTreeMap<String, String>) -> Self {
        Self::new(fixes.clone())
    }
}
