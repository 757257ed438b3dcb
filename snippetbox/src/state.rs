//! Application state shared across handlers

use std::sync::Arc;

use crate::store::SnippetStore;

/// Dependencies handed to every handler
///
/// Built once at startup and passed to the router with `with_state`.
/// Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    snippets: Arc<dyn SnippetStore>,
}

impl AppState {
    pub fn new(snippets: Arc<dyn SnippetStore>) -> Self {
        Self { snippets }
    }

    /// Snippet storage
    pub fn snippets(&self) -> &dyn SnippetStore {
        self.snippets.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
