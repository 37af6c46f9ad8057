use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{LOCAL_ID_PREFIX, REMOTE_ID_PREFIX};
use crate::error::SharedError;

/// Recipe identifier. The variant records which store owns the record:
///
/// - `Seed(n)` formats as `"n"`: bundled, read-only.
/// - `Local(ms)` formats as `"user-<ms>"`: held in the local fallback store.
/// - `Remote { .. }` formats as `"recipe:<ms>:<suffix>"`: owned by the
///   remote recipe service.
///
/// Parsing and formatting happen only through [`FromStr`] and [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecipeId {
    Seed(u32),
    Local(i64),
    Remote { timestamp: i64, suffix: String },
}

/// Which store a [`RecipeId`] routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecipeOrigin {
    Seed,
    Local,
    Remote,
}

impl RecipeId {
    /// A local-only id stamped with the given unix-millis timestamp.
    pub fn local(timestamp_ms: i64) -> Self {
        Self::Local(timestamp_ms)
    }

    pub fn remote(timestamp_ms: i64, suffix: impl Into<String>) -> Self {
        Self::Remote {
            timestamp: timestamp_ms,
            suffix: suffix.into(),
        }
    }

    pub fn origin(&self) -> RecipeOrigin {
        match self {
            Self::Seed(_) => RecipeOrigin::Seed,
            Self::Local(_) => RecipeOrigin::Local,
            Self::Remote { .. } => RecipeOrigin::Remote,
        }
    }

    pub fn is_seed(&self) -> bool {
        matches!(self, Self::Seed(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed(n) => write!(f, "{n}"),
            Self::Local(ts) => write!(f, "{LOCAL_ID_PREFIX}{ts}"),
            Self::Remote { timestamp, suffix } => {
                write!(f, "{REMOTE_ID_PREFIX}{timestamp}:{suffix}")
            }
        }
    }
}

impl FromStr for RecipeId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SharedError::InvalidRecipeId(s.to_string());

        if let Some(rest) = s.strip_prefix(REMOTE_ID_PREFIX) {
            let (ts, suffix) = rest.split_once(':').ok_or_else(invalid)?;
            let timestamp = ts.parse::<i64>().map_err(|_| invalid())?;
            if suffix.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::Remote {
                timestamp,
                suffix: suffix.to_string(),
            });
        }

        if let Some(ts) = s.strip_prefix(LOCAL_ID_PREFIX) {
            return ts.parse::<i64>().map(Self::Local).map_err(|_| invalid());
        }

        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s.parse::<u32>().map(Self::Seed).map_err(|_| invalid());
        }

        Err(invalid())
    }
}

impl TryFrom<String> for RecipeId {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecipeId> for String {
    fn from(id: RecipeId) -> Self {
        id.to_string()
    }
}
