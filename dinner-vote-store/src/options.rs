use std::sync::{PoisonError, RwLock};

use itertools::Itertools as _;
use serde::Serialize;

/// The venues on the ballot, in display order.
///
/// Never empty; labels are trimmed and unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionList(Vec<String>);

impl OptionList {
    pub fn new<I, S>(labels: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_owned())
            .filter(|label| !label.is_empty())
            .unique()
            .collect();
        if labels.is_empty() {
            None
        } else {
            Some(Self(labels))
        }
    }

    /// One label per line, as typed into the option editor.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        Self::new(text.lines())
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        self.0.join("\n")
    }

    #[must_use]
    pub fn contains(&self, option: &str) -> bool {
        self.0.iter().any(|label| label == option)
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

/// The option list shared by every client.
///
/// Replacing it does not touch recorded votes, those keep the text that was
/// chosen.
#[derive(Debug)]
pub struct OptionBoard {
    current: RwLock<OptionList>,
}

impl OptionBoard {
    #[must_use]
    pub const fn new(options: OptionList) -> Self {
        Self {
            current: RwLock::new(options),
        }
    }

    #[must_use]
    pub fn current(&self) -> OptionList {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the list that was replaced.
    pub fn replace(&self, options: OptionList) -> OptionList {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        core::mem::replace(&mut *current, options)
    }
}
