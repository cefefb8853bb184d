//! Reverse routing: turn an internal link into its canonical URL.
//!
//! # Data Flow
//! ```text
//! "product?language=en&id=42#reviews"
//!     → split path / query / fragment
//!     → HandlerResolver: path → handler
//!     → RouteTable: handler → candidate patterns
//!     → pick the most specific fully matching pattern
//!     → "en/product/42#reviews"
//! ```
//!
//! # Design Decisions
//! - Best effort: any failure yields the input unchanged, never an error
//! - Ties between patterns go to the one registered first
//! - Leftover parameters keep the order they were supplied in

use url::form_urlencoded;

use crate::observability::metrics;
use crate::routing::handler::HandlerResolver;
use crate::routing::pattern::{RoutePattern, Segment};
use crate::routing::table::RouteTable;

/// Name of the parameter the current display language is injected as.
pub const LANGUAGE_PARAM: &str = "language";

/// Ordered query parameters; a repeated key keeps its first position and
/// takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a query string, accepting HTML-escaped `&amp;` separators.
    pub fn parse(query: &str) -> Self {
        let query = query.replace("&amp;", "&");
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            params.insert(&key, &value);
        }
        params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let i = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(i).1)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode as `application/x-www-form-urlencoded`.
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// A link split into its components.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target<'a> {
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> Target<'a> {
    /// Returns `None` for links that cannot be rewritten: absolute URLs,
    /// protocol-relative URLs and links without a path.
    fn parse(raw: &'a str) -> Option<Self> {
        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        if path.is_empty() || path.starts_with("//") || path.contains("://") {
            return None;
        }

        Some(Self { path, query, fragment })
    }
}

/// Rewrites links against one application's route table.
#[derive(Debug, Clone, Copy)]
pub struct ReverseResolver<'a> {
    routes: &'a RouteTable,
    handlers: &'a dyn HandlerResolver,
    language: Option<&'a str>,
}

impl<'a> ReverseResolver<'a> {
    pub fn new(routes: &'a RouteTable, handlers: &'a dyn HandlerResolver) -> Self {
        Self {
            routes,
            handlers,
            language: None,
        }
    }

    /// Inject `language` as a default parameter.
    pub fn with_language(mut self, language: Option<&'a str>) -> Self {
        self.language = language;
        self
    }

    /// Rewrite `target` through the route table, or return it unchanged.
    pub fn resolve(&self, target: &str) -> String {
        match self.rewrite(target) {
            Some(url) => {
                tracing::trace!(link = target, url = %url, "Reverse route applied");
                metrics::record_reverse("rewritten");
                url
            }
            None => {
                tracing::trace!(link = target, "No reverse route, keeping link");
                metrics::record_reverse("unchanged");
                target.to_string()
            }
        }
    }

    fn rewrite(&self, raw: &str) -> Option<String> {
        let target = Target::parse(raw)?;
        let mut params = QueryParams::parse(target.query.unwrap_or_default());

        let mut language_added = false;
        if let Some(language) = self.language {
            if !params.contains(LANGUAGE_PARAM) {
                params.insert(LANGUAGE_PARAM, language);
                language_added = true;
            }
        }

        let path = target.path.strip_prefix('/').unwrap_or(target.path);
        let handler = self.handlers.resolve(path)?;
        let pattern = select(self.routes.lookup(&handler), &params)?;

        let mut segments = Vec::with_capacity(pattern.segments().len());
        for segment in pattern.segments() {
            match segment {
                Segment::Literal(literal) => segments.push(literal.clone()),
                Segment::Parameter(name) | Segment::Constrained { name, .. } => {
                    segments.push(params.remove(name)?);
                }
            }
        }

        if language_added {
            params.remove(LANGUAGE_PARAM);
        }

        let mut url = segments.join("/");
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query());
        }
        if let Some(fragment) = target.fragment {
            url.push('#');
            url.push_str(fragment);
        }

        match url.strip_prefix('/') {
            Some(stripped) => Some(stripped.to_string()),
            None => Some(url),
        }
    }
}

/// Pick the fully matching pattern with the most segments; the first one
/// registered wins a tie.
fn select<'p>(patterns: &'p [RoutePattern], params: &QueryParams) -> Option<&'p RoutePattern> {
    let mut best = None;
    let mut best_count = 0;

    for pattern in patterns {
        let matched = pattern
            .segments()
            .iter()
            .filter(|segment| match segment.parameter_name() {
                None => true,
                Some(name) => params.get(name).is_some_and(|value| segment.accepts(value)),
            })
            .count();

        if matched == pattern.segments().len() && matched > best_count {
            best = Some(pattern);
            best_count = matched;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::ConfiguredResolver;

    fn fixture() -> (RouteTable, ConfiguredResolver) {
        let mut routes = RouteTable::new();
        routes.add("shop::product", "$lang[en,nl]/product/$id").unwrap();
        routes.add("shop::cart", "$language[en,nl]/cart").unwrap();
        routes.add("shop::search", "search").unwrap();
        routes.add("shop::search", "search/$q").unwrap();
        routes.add("shop::search", "find/$q").unwrap();

        let resolver = ConfiguredResolver::new(Some("shop".into()));
        (routes, resolver)
    }

    #[test]
    fn test_constrained_parameters() {
        let (routes, resolver) = fixture();
        let reverse = ReverseResolver::new(&routes, &resolver);

        assert_eq!(reverse.resolve("/product?lang=en&id=42"), "en/product/42");
        // fr is not an allowed value
        assert_eq!(reverse.resolve("/product?lang=fr&id=42"), "/product?lang=fr&id=42");
        // Missing parameter
        assert_eq!(reverse.resolve("product?lang=nl"), "product?lang=nl");
    }

    #[test]
    fn test_leftover_params_and_fragment() {
        let (routes, resolver) = fixture();
        let reverse = ReverseResolver::new(&routes, &resolver);

        assert_eq!(
            reverse.resolve("product?sort=desc&lang=nl&id=7&page=2#section"),
            "nl/product/7?sort=desc&page=2#section"
        );
        assert_eq!(
            reverse.resolve("product?lang=en&amp;id=1&amp;q=a+b"),
            "en/product/1?q=a+b"
        );
    }

    #[test]
    fn test_most_specific_pattern_wins() {
        let (routes, resolver) = fixture();
        let reverse = ReverseResolver::new(&routes, &resolver);

        assert_eq!(reverse.resolve("search"), "search");
        assert_eq!(reverse.resolve("search?q=shoes"), "search/shoes");
        // search/$q and find/$q both match two segments, first registered wins
        assert_eq!(reverse.resolve("search?q=shoes&x=1"), "search/shoes?x=1");
    }

    #[test]
    fn test_injected_language() {
        let (routes, resolver) = fixture();
        let reverse = ReverseResolver::new(&routes, &resolver).with_language(Some("en"));

        // Consumed by the route, not repeated in the query
        assert_eq!(reverse.resolve("cart"), "en/cart");
        // Not consumed, still dropped
        assert_eq!(reverse.resolve("search?q=x"), "search/x");
        // Explicit language is kept
        assert_eq!(reverse.resolve("search?q=x&language=nl"), "search/x?language=nl");
        assert_eq!(reverse.resolve("cart?language=nl"), "nl/cart");
    }

    #[test]
    fn test_unresolvable_links_are_kept() {
        let (routes, resolver) = fixture();
        let reverse = ReverseResolver::new(&routes, &resolver);

        assert_eq!(reverse.resolve("unknown/page?x=1"), "unknown/page?x=1");
        assert_eq!(reverse.resolve("weird-path!"), "weird-path!");
        assert_eq!(reverse.resolve("https://example.org/product?id=1"), "https://example.org/product?id=1");
        assert_eq!(reverse.resolve("//cdn.example.org/a.js"), "//cdn.example.org/a.js");
        assert_eq!(reverse.resolve("?lang=en&id=1"), "?lang=en&id=1");
    }

    #[test]
    fn test_query_params_order() {
        let mut params = QueryParams::parse("b=2&a=1&b=3");
        assert_eq!(params.to_query(), "b=3&a=1");
        params.insert("c", "x y");
        assert_eq!(params.remove("a").as_deref(), Some("1"));
        assert_eq!(params.to_query(), "b=3&c=x+y");
    }
}
