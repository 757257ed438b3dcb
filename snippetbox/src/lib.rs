//! # snippetbox
//!
//! A small web application for sharing text snippets that expire.
//!
//! - `GET /` renders the home page
//! - `GET /snippet?id=N` shows one live snippet as plain text
//! - `POST /snippet/create` stores a snippet from a form and redirects to it
//!
//! Snippets are kept in PostgreSQL or SQLite through [`store::SnippetStore`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use snippetbox::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load(None)?;
//!     init_tracing(&config.log)?;
//!
//!     let snippets = store::connect(&config.database).await?;
//!     snippets.migrate().await?;
//!
//!     Server::new(config.server)
//!         .serve(router(AppState::new(snippets)))
//!         .await
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod mux;
pub mod observability;
pub mod server;
pub mod state;
pub mod store;
pub mod templates;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cli::Cli;
    pub use crate::config::{Config, DatabaseConfig, LogConfig, LogFormat, ServerConfig};
    pub use crate::error::{AppError, Error, Result, StoreError};
    pub use crate::handlers::{router, routes};
    pub use crate::models::Snippet;
    pub use crate::mux::ServeMux;
    pub use crate::observability::init_tracing;
    pub use crate::server::Server;
    pub use crate::state::AppState;
    pub use crate::store::{self, SnippetStore};

    pub use axum::Router;
}
