//! Route ancestry snapshots.
//!
//! # Responsibilities
//! - Represent one activated route segment and its position in the chain
//! - Expose the ancestry (`path_from_root`) and the leaf test (`first_child`)
//! - Carry the query parameters of the navigation being activated
//!
//! # Design Decisions
//! - The ancestry is a chain, not a tree: every snapshot of one navigation
//!   shares the same `Arc` of segments and points into it by depth
//! - The query string is global to the navigation, so all snapshots share it

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::schema::RouteData;

/// Raw query parameters, in URL order.
pub type QueryParams = IndexMap<String, String>;

/// One matched route segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSegment {
    /// The route's configured path (may be empty).
    pub path: String,
    /// Metadata attached to the route.
    pub data: RouteData,
}

impl RouteSegment {
    pub fn new(path: impl Into<String>, data: RouteData) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }
}

/// A view of one segment within an activated route chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSnapshot {
    chain: Arc<[RouteSegment]>,
    depth: usize,
    query_params: Arc<QueryParams>,
}

impl RouteSnapshot {
    /// Build one snapshot per segment, root first.
    pub fn chain(segments: Vec<RouteSegment>, query_params: QueryParams) -> Vec<RouteSnapshot> {
        let chain: Arc<[RouteSegment]> = segments.into();
        let query_params = Arc::new(query_params);

        (0..chain.len())
            .map(|depth| RouteSnapshot {
                chain: chain.clone(),
                depth,
                query_params: query_params.clone(),
            })
            .collect()
    }

    /// The deepest snapshot of a chain.
    pub fn leaf(segments: Vec<RouteSegment>, query_params: QueryParams) -> Option<RouteSnapshot> {
        Self::chain(segments, query_params).pop()
    }

    /// The next snapshot toward the leaf; `None` at the leaf.
    pub fn first_child(&self) -> Option<RouteSnapshot> {
        (self.depth + 1 < self.chain.len()).then(|| self.at(self.depth + 1))
    }

    pub fn is_leaf(&self) -> bool {
        self.depth + 1 == self.chain.len()
    }

    pub fn parent(&self) -> Option<RouteSnapshot> {
        self.depth.checked_sub(1).map(|depth| self.at(depth))
    }

    /// Ancestors from the root down to and including this snapshot.
    pub fn path_from_root(&self) -> impl Iterator<Item = RouteSnapshot> + '_ {
        (0..=self.depth).map(move |depth| self.at(depth))
    }

    pub fn data(&self) -> &RouteData {
        &self.chain[self.depth].data
    }

    pub fn route_path(&self) -> &str {
        &self.chain[self.depth].path
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// URL path of this snapshot, built from the non-empty segment paths.
    pub fn url_path(&self) -> String {
        let joined = self.chain[..=self.depth]
            .iter()
            .map(|segment| segment.path.trim_matches('/'))
            .filter(|path| !path.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        format!("/{}", joined)
    }

    fn at(&self, depth: usize) -> RouteSnapshot {
        RouteSnapshot {
            chain: self.chain.clone(),
            depth,
            query_params: self.query_params.clone(),
        }
    }
}
