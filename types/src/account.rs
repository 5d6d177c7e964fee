//! NEAR account id type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// A NEAR account id, e.g. `alice.near` or `a1b2c3.lockup.near`.
///
/// Account ids are 2–64 characters of lowercase alphanumeric segments
/// separated by `-`, `_` or `.`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 64;

    /// Validate and wrap a raw account id string.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let s = raw.into();
        if !Self::is_valid(&s) {
            return Err(TypeError::InvalidAccountId(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the NEAR account id grammar: length bounds, lowercase
    /// alphanumeric segments, single separators, no leading/trailing
    /// separator.
    pub fn is_valid(s: &str) -> bool {
        if s.len() < Self::MIN_LEN || s.len() > Self::MAX_LEN {
            return false;
        }
        let mut prev_separator = true; // rejects a leading separator
        for c in s.chars() {
            match c {
                'a'..='z' | '0'..='9' => prev_separator = false,
                '-' | '_' | '.' => {
                    if prev_separator {
                        return false;
                    }
                    prev_separator = true;
                }
                _ => return false,
            }
        }
        !prev_separator
    }
}

impl FromStr for AccountId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
