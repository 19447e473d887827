//! Front-matter parsing

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::path::Path;

use crate::error::{Error, Result};

/// Metadata block at the top of a post.
///
/// Keys keep the order they appear in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub meta: IndexMap<String, Value>,
}

impl FrontMatter {
    /// Split a post into its front matter and markdown body.
    ///
    /// The YAML block either runs up to the first blank line, or is fenced
    /// by `---` lines. `path` is only used for error messages.
    pub fn parse<'a>(path: &Path, content: &'a str) -> Result<(Self, &'a str)> {
        let content = content.trim_start_matches('\u{feff}');

        let (yaml, body) = match split_fenced(content) {
            Some(parts) => parts,
            None => split_blank_line(content)
                .ok_or_else(|| Error::MissingSeparator(path.to_path_buf()))?,
        };

        let meta = parse_mapping(path, yaml)?;
        Ok((Self { meta }, body))
    }

    /// Look up a raw value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// Look up a value rendered as a string (numbers and booleans included)
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.meta.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The `published` flag, false unless set
    pub fn published(&self) -> bool {
        match self.meta.get("published") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim(), "true" | "yes" | "on"),
            _ => false,
        }
    }

    /// Parse the `date` field
    pub fn parse_date(&self) -> Option<DateTime<FixedOffset>> {
        self.get_str("date").and_then(|s| parse_date_string(&s))
    }
}

/// `---` fenced block: returns (yaml, body)
fn split_fenced(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    // Empty block: the closing fence follows immediately
    if let Some(after) = rest.strip_prefix("---") {
        return Some(("", after.trim_start_matches(['\r', '\n'])));
    }

    let end = rest.find("\n---")?;
    let yaml = &rest[..end];
    let after = &rest[end + 4..];
    // Drop the remainder of the closing fence line
    let body = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => "",
    };
    Some((yaml, body.trim_start_matches(['\r', '\n'])))
}

/// Blank-line terminated block: returns (yaml, body)
fn split_blank_line(content: &str) -> Option<(&str, &str)> {
    let lf = content.find("\n\n").map(|i| (i, 2));
    let crlf = content.find("\r\n\r\n").map(|i| (i, 4));

    let (pos, len) = match (lf, crlf) {
        (Some(a), Some(b)) => std::cmp::min_by_key(a, b, |(i, _)| *i),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    Some((&content[..pos], &content[pos + len..]))
}

fn parse_mapping(path: &Path, yaml: &str) -> Result<IndexMap<String, Value>> {
    let invalid = |message: String| Error::FrontMatter {
        path: path.to_path_buf(),
        message,
    };

    if yaml.trim().is_empty() {
        return Ok(IndexMap::new());
    }

    let value: Value = serde_yaml::from_str(yaml).map_err(|e| invalid(e.to_string()))?;

    match value {
        Value::Null => Ok(IndexMap::new()),
        Value::Mapping(mapping) => {
            let mut meta = IndexMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => return Err(invalid(format!("unsupported key {:?}", other))),
                };
                meta.insert(key, value);
            }
            Ok(meta)
        }
        other => Err(invalid(format!(
            "expected `key: value` pairs, found {:?}",
            other
        ))),
    }
}

/// Parse a date string in various formats. Naive values are taken as UTC.
pub fn parse_date_string(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().fixed_offset());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).fixed_offset());
        }
    }

    None
}
