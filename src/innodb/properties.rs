//! Engine attribute string parsing.
//!
//! The data dictionary serializes per-entity engine attributes
//! (`se_private_data`, `options`) as flat `key=value;key=value;` strings,
//! e.g. `"id=330;root=4;table_id=1199;trx_id=2563;"`. This module parses
//! them into a [`Properties`] map with typed lookups. Instant ADD/DROP
//! metadata (`version_added`, `version_dropped`, `physical_pos`,
//! `default`, `default_null`, `instant_col`) arrives through this format.

use std::collections::BTreeMap;

use crate::IbdError;

/// Parsed `key=value;` attribute string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    kvs: BTreeMap<String, String>,
}

impl Properties {
    /// Parse a serialized attribute string. An empty string yields an empty
    /// map. A segment without a key (`"=x;"`) is a malformed document.
    ///
    /// # Examples
    ///
    /// ```
    /// use ibd::innodb::properties::Properties;
    ///
    /// let p = Properties::parse("id=330;root=4;").unwrap();
    /// assert_eq!(p.get("id"), Some("330"));
    /// assert_eq!(p.get_u32("root"), Some(4));
    /// assert!(!p.contains("space_id"));
    ///
    /// assert!(Properties::parse("").unwrap().is_empty());
    /// assert!(Properties::parse("=4;").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, IbdError> {
        let mut kvs = BTreeMap::new();
        for seg in raw.split(';') {
            if seg.is_empty() {
                continue;
            }
            let (key, value) = seg.split_once('=').ok_or_else(|| {
                IbdError::Malformed(format!("attribute segment without '=': {:?}", seg))
            })?;
            if key.is_empty() {
                return Err(IbdError::Malformed(format!(
                    "attribute segment with empty key: {:?}",
                    seg
                )));
            }
            kvs.insert(key.to_string(), value.to_string());
        }
        Ok(Properties { kvs })
    }

    /// Whether no attributes are present.
    pub fn is_empty(&self) -> bool {
        self.kvs.is_empty()
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.kvs.contains_key(key)
    }

    /// Raw string value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.kvs.get(key).map(|s| s.as_str())
    }

    /// Value for `key` parsed as u32. `None` if absent or non-numeric.
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key)?.parse().ok()
    }

    /// Value for `key` parsed as u64. `None` if absent or non-numeric.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.parse().ok()
    }

    /// Value for `key` parsed as a boolean. The dictionary writes booleans
    /// as `0`/`1` or `true`/`false`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            "true" => Some(true),
            "false" | "0" => Some(false),
            v => v.parse::<i64>().ok().map(|n| n != 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typical_se_private_data() {
        let p = Properties::parse("id=330;root=4;space_id=5;table_id=1199;trx_id=2563;").unwrap();
        assert_eq!(p.get_u64("id"), Some(330));
        assert_eq!(p.get_u32("root"), Some(4));
        assert_eq!(p.get("trx_id"), Some("2563"));
        assert!(!p.contains("version_added"));
    }

    #[test]
    fn test_parse_instant_metadata() {
        let p = Properties::parse("physical_pos=3;version_dropped=1;").unwrap();
        assert_eq!(p.get_u32("physical_pos"), Some(3));
        assert_eq!(p.get_u32("version_dropped"), Some(1));
    }

    #[test]
    fn test_parse_empty_value() {
        // "default=;" is a key with an empty value, not an error
        let p = Properties::parse("default=;").unwrap();
        assert!(p.contains("default"));
        assert_eq!(p.get("default"), Some(""));
    }

    #[test]
    fn test_parse_no_trailing_semicolon() {
        let p = Properties::parse("instant_col=2").unwrap();
        assert_eq!(p.get_u32("instant_col"), Some(2));
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        assert!(Properties::parse("=5;").is_err());
        assert!(Properties::parse("a=1;=2;").is_err());
    }

    #[test]
    fn test_parse_rejects_bare_segment() {
        assert!(Properties::parse("noequals;").is_err());
    }

    #[test]
    fn test_get_bool_forms() {
        let p = Properties::parse("a=true;b=false;c=0;d=1;").unwrap();
        assert_eq!(p.get_bool("a"), Some(true));
        assert_eq!(p.get_bool("b"), Some(false));
        assert_eq!(p.get_bool("c"), Some(false));
        assert_eq!(p.get_bool("d"), Some(true));
    }
}
