//! Route pattern grammar.
//!
//! A pattern is a `/`-separated list of segments:
//! - `product`: literal segment
//! - `$id`: parameter, filled from the parameter of the same name
//! - `$language[en,nl]`: parameter restricted to the listed values
//!
//! Patterns are parsed once when an application's configuration is loaded.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// `$` without a parameter name.
    #[error("empty parameter name in segment '{0}'")]
    EmptyParameter(String),

    /// A `[` without a matching `]`.
    #[error("unterminated value list in segment '{0}'")]
    UnterminatedValues(String),

    /// The same parameter appears twice in one pattern.
    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),
}

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Emitted verbatim.
    Literal(String),
    /// Replaced by the named parameter.
    Parameter(String),
    /// Replaced by the named parameter, which must be one of `values`.
    Constrained { name: String, values: Vec<String> },
}

impl Segment {
    /// Parameter name, if this segment is a parameter.
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Parameter(name) | Segment::Constrained { name, .. } => Some(name),
        }
    }

    /// Returns true if `value` is acceptable for this segment.
    ///
    /// Literal segments accept anything; they are not driven by parameters.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Segment::Constrained { values, .. } => values.iter().any(|v| v == value),
            _ => true,
        }
    }

    fn parse(raw: &str) -> Result<Self, PatternError> {
        let Some(body) = raw.strip_prefix('$') else {
            return Ok(Segment::Literal(raw.to_string()));
        };

        let Some(open) = body.find('[') else {
            if body.is_empty() {
                return Err(PatternError::EmptyParameter(raw.to_string()));
            }
            return Ok(Segment::Parameter(body.to_string()));
        };

        let close = body[open..]
            .find(']')
            .map(|i| open + i)
            .ok_or_else(|| PatternError::UnterminatedValues(raw.to_string()))?;

        // `$lang[en,nl]` and `$[en,nl]lang` both name the parameter `lang`
        let name = format!("{}{}", &body[..open], &body[close + 1..]);
        if name.is_empty() {
            return Err(PatternError::EmptyParameter(raw.to_string()));
        }

        let values = body[open + 1..close]
            .split(',')
            .map(str::to_string)
            .collect();

        Ok(Segment::Constrained { name, values })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => write!(f, "{}", s),
            Segment::Parameter(name) => write!(f, "${}", name),
            Segment::Constrained { name, values } => write!(f, "${}[{}]", name, values.join(",")),
        }
    }
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// The pattern's segments, empty segments already dropped.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all parameters in the pattern, in order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::parameter_name)
    }
}

impl FromStr for RoutePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split('/')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for name in segments.iter().filter_map(Segment::parameter_name) {
            if !seen.insert(name) {
                return Err(PatternError::DuplicateParameter(name.to_string()));
            }
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
