//! Agent configuration: whitespace-separated `key=value` property maps.
//!
//! Every agent is constructed from an argument string such as
//! `"init=65536,65536 alpha=0.0025 save=weights.bin"`. Typed settings are
//! extracted and validated eagerly at construction; the map itself stays
//! around as a generic side-table that `notify` can extend at runtime.

use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing configuration key '{0}'")]
    MissingKey(String),
    #[error("configuration key '{key}' has unparseable value '{value}'")]
    BadValue { key: String, value: String },
}

/// String-keyed property map with coerce-on-read numeric views.
///
/// Keys are unique and the last write wins, both at parse time and through
/// [`Properties::notify`].
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Parse `defaults` followed by `args`, so caller-supplied pairs override
    /// the agent's built-in `name=... role=...` defaults.
    pub fn from_args(defaults: &str, args: &str) -> Self {
        let mut props = Properties::default();
        for token in defaults.split_whitespace().chain(args.split_whitespace()) {
            let (key, value) = token.split_once('=').unwrap_or((token, ""));
            props.set(key, value);
        }
        props
    }

    /// Read a property, failing loudly if it was never set.
    pub fn get(&self, key: &str) -> Result<&str, ConfigError> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Read a property with a fallback for absent keys.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Coerce a property to a numeric (or any `FromStr`) value on read.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.get(key)?;
        value.parse().map_err(|_| ConfigError::BadValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// True if `key` was set.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite a property.
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Consume a runtime `key=value` message, inserting or overwriting.
    pub fn notify(&mut self, msg: &str) {
        let (key, value) = msg.split_once('=').unwrap_or((msg, ""));
        self.set(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_coerce() {
        let props = Properties::from_args("name=test role=slider", "alpha=0.05 seed=7");
        assert_eq!(props.get("name").unwrap(), "test");
        assert!((props.get_parsed::<f64>("alpha").unwrap() - 0.05).abs() < 1e-12);
        assert_eq!(props.get_parsed::<u64>("seed").unwrap(), 7);
    }

    #[test]
    fn args_override_defaults_and_last_write_wins() {
        let props = Properties::from_args("name=unknown role=unknown", "name=a name=b");
        assert_eq!(props.get("name").unwrap(), "b");
        assert_eq!(props.get("role").unwrap(), "unknown");
    }

    #[test]
    fn missing_key_fails_loudly() {
        let props = Properties::from_args("", "");
        assert!(matches!(
            props.get("alpha"),
            Err(ConfigError::MissingKey(key)) if key == "alpha"
        ));
    }

    #[test]
    fn bad_numeric_value() {
        let props = Properties::from_args("", "alpha=fast");
        assert!(matches!(
            props.get_parsed::<f32>("alpha"),
            Err(ConfigError::BadValue { .. })
        ));
    }

    #[test]
    fn notify_changes_only_its_key() {
        let mut props = Properties::from_args("", "alpha=0.05 seed=7");
        props.notify("alpha=0.1");
        assert!((props.get_parsed::<f64>("alpha").unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(props.get_parsed::<u64>("seed").unwrap(), 7);
    }
}
