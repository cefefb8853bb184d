//! Per-application route table.
//!
//! # Responsibilities
//! - Map a handler identity to its ordered route patterns
//! - Match a concrete path back onto a handler (forward direction)
//!
//! # Design Decisions
//! - Registration order is preserved for handlers and for patterns
//! - Immutable after construction, shared via `Arc<Application>`

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::routing::pattern::{PatternError, RoutePattern, Segment};

/// Identity of the code unit that serves a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub String);

impl HandlerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of matching a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub handler: HandlerId,
    pub pattern: RoutePattern,
    /// Captured parameters, keyed by parameter name.
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct RouteEntry {
    handler: HandlerId,
    patterns: Vec<RoutePattern>,
}

/// Ordered mapping from handler identity to route patterns.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: HashMap<HandlerId, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern for `handler`, after any already registered.
    pub fn insert(&mut self, handler: impl Into<HandlerId>, pattern: RoutePattern) {
        let handler = handler.into();
        match self.index.get(&handler) {
            Some(&i) => self.entries[i].patterns.push(pattern),
            None => {
                self.index.insert(handler.clone(), self.entries.len());
                self.entries.push(RouteEntry {
                    handler,
                    patterns: vec![pattern],
                });
            }
        }
    }

    /// Parse and register a textual pattern.
    pub fn add(&mut self, handler: impl Into<HandlerId>, pattern: &str) -> Result<(), PatternError> {
        let pattern = pattern.parse()?;
        self.insert(handler, pattern);
        Ok(())
    }

    /// Patterns registered for `handler`, in registration order.
    pub fn lookup(&self, handler: &HandlerId) -> &[RoutePattern] {
        self.index
            .get(handler)
            .map(|&i| self.entries[i].patterns.as_slice())
            .unwrap_or(&[])
    }

    /// Handlers in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &HandlerId> {
        self.entries.iter().map(|e| &e.handler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first pattern (in registration order) that matches `path`
    /// segment for segment.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let parts: Vec<&str> = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();

        for entry in &self.entries {
            for pattern in &entry.patterns {
                if let Some(params) = capture(pattern, &parts) {
                    return Some(RouteMatch {
                        handler: entry.handler.clone(),
                        pattern: pattern.clone(),
                        params,
                    });
                }
            }
        }
        None
    }
}

fn capture(pattern: &RoutePattern, parts: &[&str]) -> Option<BTreeMap<String, String>> {
    if pattern.segments().len() != parts.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (segment, part) in pattern.segments().iter().zip(parts) {
        match segment {
            Segment::Literal(literal) => {
                if literal != part {
                    return None;
                }
            }
            Segment::Parameter(name) => {
                params.insert(name.clone(), part.to_string());
            }
            Segment::Constrained { name, .. } => {
                if !segment.accepts(part) {
                    return None;
                }
                params.insert(name.clone(), part.to_string());
            }
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table.add("shop::product", "$language[en,nl]/product/$id").unwrap();
        table.add("shop::product", "product/$id").unwrap();
        table.add("shop::cart", "$language/cart").unwrap();
        table
    }

    #[test]
    fn test_lookup_preserves_order() {
        let table = table();
        let patterns = table.lookup(&"shop::product".into());
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].to_string(), "$language[en,nl]/product/$id");
        assert_eq!(patterns[1].to_string(), "product/$id");
        assert!(table.lookup(&"shop::missing".into()).is_empty());
        assert_eq!(table.handlers().map(HandlerId::as_str).collect::<Vec<_>>(), vec!["shop::product", "shop::cart"]);
    }

    #[test]
    fn test_match_path() {
        let table = table();

        let m = table.match_path("/en/product/42").unwrap();
        assert_eq!(m.handler, HandlerId::from("shop::product"));
        assert_eq!(m.params.get("language").map(String::as_str), Some("en"));
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));

        let m = table.match_path("product/7?x=1").unwrap();
        assert_eq!(m.pattern.to_string(), "product/$id");

        // fr is not an allowed language for the product route
        assert!(table.match_path("fr/product/42").is_none());

        let m = table.match_path("fr/cart").unwrap();
        assert_eq!(m.handler, HandlerId::from("shop::cart"));
    }
}
