//! Identity of the target column(s) of a life.
//!
//! A target is resolved once, when the transformer is built, into one of
//! three shapes so that nothing downstream has to branch on whether the
//! configured target was a single name or a list.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetColumn {
    /// One target column, e.g. `RUL`.
    Single(String),
    /// A value column paired with the timestamp column it is indexed by.
    TimeIndexed { time: String, value: String },
    /// Several target columns, selected together in the given order.
    Composite(Vec<String>),
}

impl TargetColumn {
    pub fn single(name: impl Into<String>) -> Self {
        Self::Single(name.into())
    }

    pub fn composite<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Composite(names.into_iter().map(Into::into).collect())
    }

    /// Attach a time feature to this target.
    ///
    /// A single target becomes [`TargetColumn::TimeIndexed`]; a composite
    /// target gets the time column prepended.
    #[must_use]
    pub fn with_time_feature(self, time: impl Into<String>) -> Self {
        let time = time.into();
        match self {
            Self::Single(value) | Self::TimeIndexed { value, .. } => {
                Self::TimeIndexed { time, value }
            }
            Self::Composite(names) => {
                let mut columns = Vec::with_capacity(names.len() + 1);
                columns.push(time);
                columns.extend(names.into_iter());
                Self::Composite(columns)
            }
        }
    }

    /// Column names to select from a life, in selection order.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::TimeIndexed { time, value } => vec![time.as_str(), value.as_str()],
            Self::Composite(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for TargetColumn {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for TargetColumn {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for TargetColumn {
    fn from(names: Vec<String>) -> Self {
        Self::Composite(names)
    }
}
