//! Reader for the TOML configuration file
//!
//! Every top-level key is one directive. A value is a scalar or an array of
//! scalars; strings, integers, floats and booleans are all kept as their
//! textual form and validated later by `EngineConfig::from_directives`.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValues {
    Many(Vec<Scalar>),
    One(Scalar),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Integer(number) => number.to_string(),
            Self::Float(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

impl Directive {
    pub fn new<I, S>(key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn load(path: &Path) -> Result<Vec<Directive>, DirectiveError> {
    let contents = fs::read_to_string(path).map_err(|source| DirectiveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&contents)
}

pub fn parse_str(contents: &str) -> Result<Vec<Directive>, DirectiveError> {
    let table: BTreeMap<String, RawValues> = toml::from_str(contents)?;

    Ok(table
        .into_iter()
        .map(|(key, raw)| {
            let values = match raw {
                RawValues::Many(values) => values.into_iter().map(Scalar::into_text).collect(),
                RawValues::One(value) => vec![value.into_text()],
            };
            Directive { key, values }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{parse_str, Directive, DirectiveError};

    #[test]
    fn reads_every_value_shape() {
        let directives = parse_str(
            r#"
# systemd health sampling
Service = ["nginx", "sshd"]
Interval = 10
Verbose = true
StateIgnoreRegex = '^user@\d+\.service$'
"#,
        )
        .expect("valid config");

        assert_eq!(
            directives,
            vec![
                Directive::new("Interval", ["10"]),
                Directive::new("Service", ["nginx", "sshd"]),
                Directive::new("StateIgnoreRegex", [r"^user@\d+\.service$"]),
                Directive::new("Verbose", ["true"]),
            ]
        );
    }

    #[test]
    fn fractional_interval_keeps_its_value() {
        let directives = parse_str("Interval = 2.5").expect("valid config");
        assert_eq!(directives, vec![Directive::new("Interval", ["2.5"])]);
    }

    #[test]
    fn empty_file_has_no_directives() {
        let directives = parse_str("# nothing configured\n").expect("valid config");
        assert!(directives.is_empty());
    }

    #[test]
    fn unknown_keys_are_kept_for_validation() {
        let directives = parse_str(r#"Frobnicate = "1""#).expect("valid syntax");
        assert_eq!(directives, vec![Directive::new("Frobnicate", ["1"])]);
    }

    #[test]
    fn empty_array_is_kept_for_validation() {
        let directives = parse_str("Service = []").expect("valid syntax");
        assert_eq!(directives, vec![Directive::new("Service", Vec::<String>::new())]);
    }

    #[test]
    fn repeated_key_is_rejected() {
        let err = parse_str("Service = \"nginx\"\nService = \"sshd\"").expect_err("duplicate key");
        assert!(matches!(err, DirectiveError::Parse(_)));
    }

    #[test]
    fn nested_table_is_rejected() {
        let err = parse_str("[Service]\nname = \"nginx\"").expect_err("not a directive");
        assert!(matches!(err, DirectiveError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = super::load(std::path::Path::new("/nonexistent/sampler.toml"))
            .expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/sampler.toml"));
    }
}
