//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile `/`-delimited patterns with `:name` parameter segments
//! - Match a runtime path against the whole pattern
//! - Percent-decode captured parameter values
//!
//! # Design Decisions
//! - Segment-wise comparison, no regex: static segments compare byte for byte,
//!   so `.`, `*` or `(` in a pattern never act as metacharacters
//! - A parameter captures exactly one non-empty segment
//! - Anchored at both ends: segment counts must be equal
//! - Zero-parameter patterns return empty params on match, not `None`

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Errors raised while compiling a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route pattern '{0}' must start with '/'")]
    NotAbsolute(String),

    #[error("route pattern '{0}' has a parameter without a name")]
    EmptyParameterName(String),

    #[error("route pattern '{pattern}' declares parameter '{name}' twice")]
    DuplicateParameter { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parameters extracted from a matched path, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    entries: Vec<(String, String)>,
}

impl RouteParams {
    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs left to right.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn push(&mut self, name: &str, value: String) {
        self.entries.push((name.to_string(), value));
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// A compiled route pattern such as `/book/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compile a pattern.
    pub fn compile(pattern: &str) -> Result<Self, RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::NotAbsolute(pattern.to_string()));
        }

        let mut segments = Vec::new();
        let mut param_names: Vec<String> = Vec::new();

        for raw in pattern.split('/') {
            match raw.strip_prefix(':') {
                Some("") => return Err(RouteError::EmptyParameterName(pattern.to_string())),
                Some(name) => {
                    if param_names.iter().any(|existing| existing == name) {
                        return Err(RouteError::DuplicateParameter {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                        });
                    }
                    param_names.push(name.to_string());
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(raw.to_string())),
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
            param_names,
        })
    }

    /// The pattern text this matcher was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a whole path, returning decoded parameters on success.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let mut params = RouteParams::default();
        let mut parts = path.split('/');

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(expected) => {
                    if part != expected {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let value = percent_decode_str(part).decode_utf8().ok()?;
                    params.push(name, value.into_owned());
                }
            }
        }

        // Leftover segments mean the path is longer than the pattern.
        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}
