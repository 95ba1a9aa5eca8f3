//! Route matching logic.
//!
//! # Responsibilities
//! - Match URL path segments against a route's configured path
//! - Recognize the full route chain for a URL path (root → leaf)
//!
//! # Design Decisions
//! - Static segments match exactly (case-sensitive)
//! - `:name` segments match any single segment
//! - `**` matches the rest of the path
//! - Empty paths consume nothing, so they group children
//! - First match wins, depth first, in declaration order

use std::fmt;

use crate::config::schema::RouteConfig;
use crate::routing::snapshot::RouteSegment;

/// Trait for matching a route path against URL segments.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Number of leading segments consumed, or `None` if it does not match.
    fn consume(&self, segments: &[&str]) -> Option<usize>;
}

/// Matches a fixed sequence of segments, with `:param` placeholders.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    parts: Vec<String>,
}

impl SegmentMatcher {
    pub fn new(path: &str) -> Self {
        Self {
            parts: split_path(path).map(str::to_string).collect(),
        }
    }
}

impl Matcher for SegmentMatcher {
    fn consume(&self, segments: &[&str]) -> Option<usize> {
        if segments.len() < self.parts.len() {
            return None;
        }
        let matched = self
            .parts
            .iter()
            .zip(segments)
            .all(|(part, segment)| part.starts_with(':') || part == segment);
        matched.then_some(self.parts.len())
    }
}

/// Matches every remaining segment.
#[derive(Debug, Clone)]
pub struct WildcardMatcher;

impl Matcher for WildcardMatcher {
    fn consume(&self, segments: &[&str]) -> Option<usize> {
        Some(segments.len())
    }
}

#[derive(Debug)]
struct CompiledRoute {
    matcher: Box<dyn Matcher>,
    segment: RouteSegment,
    children: Vec<CompiledRoute>,
}

impl CompiledRoute {
    fn compile(config: &RouteConfig) -> Self {
        let matcher: Box<dyn Matcher> = if config.path.trim_matches('/') == "**" {
            Box::new(WildcardMatcher)
        } else {
            Box::new(SegmentMatcher::new(&config.path))
        };
        Self {
            matcher,
            segment: RouteSegment::new(config.path.clone(), config.data.clone()),
            children: config.children.iter().map(CompiledRoute::compile).collect(),
        }
    }
}

/// Immutable, compiled route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn compile(routes: &[RouteConfig]) -> Self {
        Self {
            routes: routes.iter().map(CompiledRoute::compile).collect(),
        }
    }

    /// Recognize the route chain (without the synthetic root) for a URL path.
    pub fn recognize(&self, path: &str) -> Option<Vec<RouteSegment>> {
        let segments: Vec<&str> = split_path(path).collect();
        recognize_in(&self.routes, &segments)
    }
}

fn recognize_in(routes: &[CompiledRoute], segments: &[&str]) -> Option<Vec<RouteSegment>> {
    for route in routes {
        let Some(consumed) = route.matcher.consume(segments) else {
            continue;
        };
        let rest = &segments[consumed..];

        if route.children.is_empty() {
            if rest.is_empty() {
                return Some(vec![route.segment.clone()]);
            }
            continue;
        }

        if let Some(mut chain) = recognize_in(&route.children, rest) {
            chain.insert(0, route.segment.clone());
            return Some(chain);
        }
    }
    None
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::compile(&[
            RouteConfig::new("shop")
                .with_child(RouteConfig::new(""))
                .with_child(RouteConfig::new("items/:id")),
            RouteConfig::new("plain"),
            RouteConfig::new("**"),
        ])
    }

    fn paths(chain: Option<Vec<RouteSegment>>) -> Vec<String> {
        chain
            .unwrap_or_default()
            .into_iter()
            .map(|segment| segment.path)
            .collect()
    }

    #[test]
    fn test_segment_matcher() {
        let matcher = SegmentMatcher::new("items/:id");
        assert_eq!(matcher.consume(&["items", "7", "extra"]), Some(2));
        assert_eq!(matcher.consume(&["orders", "7"]), None);
        assert_eq!(matcher.consume(&["items"]), None);

        let empty = SegmentMatcher::new("");
        assert_eq!(empty.consume(&["anything"]), Some(0));
    }

    #[test]
    fn test_recognize_nested() {
        let table = table();
        assert_eq!(paths(table.recognize("/shop")), vec!["shop", ""]);
        assert_eq!(paths(table.recognize("/shop/items/7")), vec!["shop", "items/:id"]);
        assert_eq!(paths(table.recognize("/plain/")), vec!["plain"]);
    }

    #[test]
    fn test_recognize_falls_back_to_wildcard() {
        let table = table();
        assert_eq!(paths(table.recognize("/shop/unknown")), vec!["**"]);
        assert_eq!(paths(table.recognize("/")), vec!["**"]);
    }

    #[test]
    fn test_no_match() {
        let table = RouteTable::compile(&[RouteConfig::new("shop")]);
        assert!(table.recognize("/other").is_none());
    }
}
