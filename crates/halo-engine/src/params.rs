//! Inputs-file parameter table.
//!
//! An inputs file is a list of `key = value [value ...]` lines. `#` starts
//! a comment, blank lines are ignored, and a key given twice keeps its last
//! value. Command-line `key=value` overrides are applied on top with
//! [`ParamTable::apply_override`].

use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::config::ConfigError;

/// Raw parameters in declaration order.
///
/// # Examples
///
/// ```
/// use halo_engine::ParamTable;
///
/// let mut params = ParamTable::parse("
///     n_cell = 32        # cells per axis
///     max_grid_size = 16
///     dt = 1e-5
/// ").unwrap();
/// params.apply_override("nsteps=5").unwrap();
///
/// assert_eq!(params.get::<u32>("n_cell").unwrap(), 32);
/// assert_eq!(params.query::<u64>("nsteps", 10).unwrap(), 5);
/// assert_eq!(params.query::<i64>("plot_int", -1).unwrap(), -1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamTable {
    entries: IndexMap<String, Vec<String>>,
}

impl ParamTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse inputs-file text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let (key, values) = split_assignment(line).ok_or_else(|| ConfigError::Malformed {
                line: i + 1,
                text: raw.trim().to_string(),
            })?;
            table.set(key, values);
        }
        Ok(table)
    }

    /// Read and parse an inputs file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text)
    }

    /// Set `key`, replacing any earlier values.
    pub fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.insert(key.into(), values);
    }

    /// Apply one `key=value [value ...]` override.
    pub fn apply_override(&mut self, arg: &str) -> Result<(), ConfigError> {
        let (key, values) = split_assignment(arg.trim()).ok_or_else(|| ConfigError::Malformed {
            line: 0,
            text: arg.to_string(),
        })?;
        self.set(key, values);
        Ok(())
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw values of `key`.
    pub fn raw(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Keys in first-declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// A required single value.
    pub fn get<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let values = self.raw(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })?;
        match values {
            [one] => parse_value(key, one),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                reason: format!("expected one value, got {}", values.len()),
            }),
        }
    }

    /// An optional single value, `default` when absent.
    pub fn query<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        if self.contains(key) {
            self.get(key)
        } else {
            Ok(default)
        }
    }

    /// A required list of values.
    pub fn get_list<T>(&self, key: &str) -> Result<Vec<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw(key)
            .ok_or_else(|| ConfigError::Missing {
                key: key.to_string(),
            })?
            .iter()
            .map(|v| parse_value(key, v))
            .collect()
    }

    /// An optional list of values, `default` when absent.
    pub fn query_list<T>(&self, key: &str, default: Vec<T>) -> Result<Vec<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        if self.contains(key) {
            self.get_list(key)
        } else {
            Ok(default)
        }
    }
}

fn split_assignment(line: &str) -> Option<(String, Vec<String>)> {
    let (key, rhs) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    let values: Vec<String> = rhs.split_whitespace().map(str::to_string).collect();
    if values.is_empty() {
        return None;
    }
    Some((key.to_string(), values))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Parse {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_blank_lines_and_lists() {
        let p = ParamTable::parse(
            "# heading\n\nn_cell = 8 16  # two axes\nis_periodic = 1 0\n",
        )
        .unwrap();
        assert_eq!(p.get_list::<u32>("n_cell").unwrap(), vec![8, 16]);
        assert_eq!(p.get_list::<i32>("is_periodic").unwrap(), vec![1, 0]);
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["n_cell", "is_periodic"]);
    }

    #[test]
    fn later_duplicate_wins() {
        let p = ParamTable::parse("dt = 1\ndt = 2\n").unwrap();
        assert_eq!(p.get::<f64>("dt").unwrap(), 2.0);
    }

    #[test]
    fn missing_required_key() {
        let p = ParamTable::new();
        assert_eq!(
            p.get::<f64>("dt"),
            Err(ConfigError::Missing { key: "dt".into() })
        );
    }

    #[test]
    fn unparsable_value_names_key() {
        let p = ParamTable::parse("nsteps = many").unwrap();
        assert!(matches!(
            p.get::<u64>("nsteps"),
            Err(ConfigError::Parse { ref key, ref value, .. }) if key == "nsteps" && value == "many"
        ));
    }

    #[test]
    fn scalar_with_several_values_rejected() {
        let p = ParamTable::parse("dt = 1 2").unwrap();
        assert!(matches!(p.get::<f64>("dt"), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let err = ParamTable::parse("dt = 1\njust words\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError::Malformed {
                line: 2,
                text: "just words".into()
            }
        );
        assert!(ParamTable::parse("dt =\n").is_err());
    }

    #[test]
    fn override_replaces_value() {
        let mut p = ParamTable::parse("restart = -1").unwrap();
        p.apply_override("restart=20").unwrap();
        assert_eq!(p.get::<i64>("restart").unwrap(), 20);
        assert!(p.apply_override("restart").is_err());
    }

    #[test]
    fn unreadable_file() {
        let err = ParamTable::from_file(Path::new("/nonexistent/halo/inputs")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }
}
