//! Pattern-based request multiplexer
//!
//! [`ServeMux`] matches request paths against registered patterns:
//!
//! - A pattern ending in `/` names a subtree and matches every path it
//!   prefixes; any other pattern matches only the identical path.
//! - The longest matching pattern wins, whatever the registration order.
//!   Since `/` is a subtree, it catches every path nothing else matches.
//! - A request for a registered subtree without its trailing slash
//!   (`/static` when only `/static/` exists) is redirected to the subtree.
//! - Paths with `.` or `..` segments or repeated slashes are cleaned first;
//!   if cleaning changes the path the client is redirected to the clean one.
//!
//! Redirects are `301 Moved Permanently` and keep the query string. Paths no
//! pattern matches get a plain-text 404.
//!
//! Handlers are ordinary axum [`MethodRouter`]s, usually built with
//! [`any`](axum::routing::any) so the handler sees every method.
//!
//! ```rust,ignore
//! let app = ServeMux::new()
//!     .handle("/", any(home))
//!     .handle("/snippet", any(show_snippet))
//!     .handle("/snippet/create", any(create_snippet))
//!     .into_router(state);
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Router,
};
use tower::ServiceExt;

/// Body of the response for paths no pattern matches
pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Registry of path patterns and their handlers
pub struct ServeMux<S = ()> {
    routes: HashMap<String, MethodRouter<S>>,
}

impl<S> Default for ServeMux<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<S> ServeMux<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route` for `pattern`
    ///
    /// # Panics
    ///
    /// Panics if the pattern does not start with `/` or is already registered.
    #[track_caller]
    pub fn handle(mut self, pattern: &str, route: MethodRouter<S>) -> Self {
        assert!(
            pattern.starts_with('/'),
            "invalid pattern {pattern:?}: patterns must start with '/'"
        );
        assert!(
            !self.routes.contains_key(pattern),
            "pattern {pattern:?} is already registered"
        );
        self.routes.insert(pattern.to_string(), route);
        self
    }

    /// The registered patterns
    pub fn patterns(&self) -> PatternSet {
        PatternSet::new(self.routes.keys().cloned())
    }

    /// Supply handler state and turn the mux into an axum [`Router`]
    ///
    /// The mux becomes the router's fallback, so tower-http layers applied to
    /// the returned router wrap every dispatched request.
    pub fn into_router(self, state: S) -> Router {
        let patterns = self.patterns();
        let routes = self
            .routes
            .into_iter()
            .map(|(pattern, route)| (pattern, route.with_state(state.clone())))
            .collect();
        let table = Arc::new(RouteTable { patterns, routes });

        Router::new().fallback(move |request: Request| {
            let table = Arc::clone(&table);
            async move { table.dispatch(request).await }
        })
    }
}

/// Where a request path leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Dispatch to the handler registered for this pattern
    Matched(&'a str),
    /// Redirect permanently to this path
    Redirect(String),
    /// Nothing matches
    NotFound,
}

/// Set of registered patterns, kept longest first
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    pub fn new(patterns: impl IntoIterator<Item = String>) -> Self {
        let mut patterns: Vec<String> = patterns.into_iter().collect();
        patterns.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        patterns.dedup();
        Self { patterns }
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.iter().any(|p| p == pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Decide how a request for `path` is handled
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let cleaned = clean_path(path);

        if !cleaned.ends_with('/') && !self.contains(&cleaned) {
            let with_slash = format!("{cleaned}/");
            if self.contains(&with_slash) {
                return Resolution::Redirect(with_slash);
            }
        }

        if cleaned != path {
            return Resolution::Redirect(cleaned);
        }

        self.longest_match(path)
            .map_or(Resolution::NotFound, Resolution::Matched)
    }

    /// The longest pattern matching `path`: an identical pattern, else the
    /// longest subtree pattern prefixing it
    fn longest_match(&self, path: &str) -> Option<&str> {
        self.iter()
            .find(|pattern| *pattern == path)
            .or_else(|| {
                self.iter()
                    .find(|pattern| pattern.ends_with('/') && path.starts_with(pattern))
            })
    }
}

/// Frozen route table with state already supplied to every handler
struct RouteTable {
    patterns: PatternSet,
    routes: HashMap<String, MethodRouter>,
}

impl RouteTable {
    async fn dispatch(&self, request: Request) -> Response {
        let route = match self.patterns.resolve(request.uri().path()) {
            Resolution::Matched(pattern) => self.routes.get(pattern),
            Resolution::Redirect(path) => {
                let location = match request.uri().query() {
                    Some(query) => format!("{path}?{query}"),
                    None => path,
                };
                return moved_permanently(&location);
            }
            Resolution::NotFound => None,
        };

        let Some(route) = route else {
            return not_found();
        };

        let result: Result<Response, Infallible> = route.clone().oneshot(request).await;
        match result {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

/// Canonical form of a request path
///
/// Collapses repeated slashes, drops `.` segments and resolves `..` against
/// the preceding segment (never above the root). A trailing slash is kept.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }

    if cleaned.is_empty() || path.ends_with('/') {
        cleaned.push('/');
    }

    cleaned
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

fn moved_permanently(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => not_found(),
    }
}
