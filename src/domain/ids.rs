//! Record identifier newtype
//!
//! Identifiers are the stable codes (e.g. HCPCS/CPT codes) that key every
//! record across runs. Ordering is plain byte-wise string ordering, which is
//! the order of the output artifact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Code identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use quill::domain::ids::CodeId;
/// use std::str::FromStr;
///
/// let id = CodeId::from_str("99213").unwrap();
/// assert_eq!(id.as_str(), "99213");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeId(String);

impl CodeId {
    /// Creates a new CodeId, rejecting blank identifiers
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Code identifier cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for CodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_code_id_rejects_blank() {
        assert!(CodeId::new("").is_err());
        assert!(CodeId::new("   ").is_err());
        assert!(CodeId::new("J2785").is_ok());
    }

    #[test]
    fn test_code_id_orders_bytewise() {
        let mut ids: Vec<CodeId> = ["99213", "0001U", "A0392", "80305"]
            .iter()
            .map(|s| CodeId::from_str(s).unwrap())
            .collect();
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(CodeId::as_str).collect();
        assert_eq!(ordered, vec!["0001U", "80305", "99213", "A0392"]);
    }

    #[test]
    fn test_code_id_as_json_map_key() {
        let mut map = BTreeMap::new();
        map.insert(CodeId::new("99490").unwrap(), "Chronic Care Management".to_string());

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"99490":"Chronic Care Management"}"#);

        let back: BTreeMap<CodeId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("99490").map(String::as_str), Some("Chronic Care Management"));
    }
}
