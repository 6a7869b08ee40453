//! Command-line flag tokenizer.
//!
//! Accepts three shapes: `--key=value`, `--key value` (the value is taken only
//! when the next token does not itself start with `--`), and a bare `--flag`,
//! which is recorded as `"true"`. Tokens that are not flags are ignored.

use std::collections::BTreeMap;

/// Parsed `--key` -> value pairs. Later occurrences of a key overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap {
    values: BTreeMap<String, String>,
}

impl ArgMap {
    /// Tokenize raw arguments (program name already stripped).
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let mut values = BTreeMap::new();
        let mut i = 0;

        while i < args.len() {
            let arg = args[i].as_ref();
            let Some(flag) = arg.strip_prefix("--") else {
                tracing::debug!(token = %arg, "Ignoring positional argument");
                i += 1;
                continue;
            };

            if let Some((key, value)) = flag.split_once('=') {
                values.insert(key.to_string(), value.to_string());
                i += 1;
                continue;
            }

            let next: Option<&str> = args.get(i + 1).map(|s| s.as_ref());
            match next {
                Some(next) if !next.starts_with("--") => {
                    values.insert(flag.to_string(), next.to_string());
                    i += 2;
                }
                _ => {
                    values.insert(flag.to_string(), "true".to_string());
                    i += 1;
                }
            }
        }

        Self { values }
    }

    /// Value recorded for `key`, if the flag was given.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether the flag is present and set to a truthy value.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key).and_then(parse_bool).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lenient boolean parsing shared by flags and environment variables.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equals_value() {
        let args = ArgMap::parse(&["--server-name=Docs"]);
        assert_eq!(args.get("server-name"), Some("Docs"));
    }

    #[test]
    fn test_equals_splits_once() {
        let args = ArgMap::parse(&["--transport-host=a=b"]);
        assert_eq!(args.get("transport-host"), Some("a=b"));
    }

    #[test]
    fn test_key_space_value() {
        let args = ArgMap::parse(&["--transport-type", "http", "--transport-port", "9000"]);
        assert_eq!(args.get("transport-type"), Some("http"));
        assert_eq!(args.get("transport-port"), Some("9000"));
    }

    #[test]
    fn test_bare_flag_is_true() {
        let args = ArgMap::parse(&["--verbose"]);
        assert_eq!(args.get("verbose"), Some("true"));
        assert!(args.is_true("verbose"));
    }

    #[test]
    fn test_value_not_consumed_when_next_is_flag() {
        let args = ArgMap::parse(&["--verbose", "--npm-org", "acme"]);
        assert_eq!(args.get("verbose"), Some("true"));
        assert_eq!(args.get("npm-org"), Some("acme"));
    }

    #[test]
    fn test_trailing_flag_without_value() {
        let args = ArgMap::parse(&["--config"]);
        assert_eq!(args.get("config"), Some("true"));
    }

    #[test]
    fn test_positional_ignored() {
        let args = ArgMap::parse(&["stray", "--verbose"]);
        assert_eq!(args.iter().count(), 1);
        assert!(args.is_true("verbose"));
    }

    #[test]
    fn test_empty() {
        let args = ArgMap::parse::<&str>(&[]);
        assert!(args.is_empty());
        assert!(!args.is_true("verbose"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }
}
