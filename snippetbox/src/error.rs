//! Error types and HTTP response conversion

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias for startup and server lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by snippet storage backends
///
/// Backends translate driver errors into these variants so that nothing
/// above the store depends on a particular database's error vocabulary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No live snippet matches the requested identifier
    #[error("no matching record found")]
    NotFound,

    /// Connectivity, constraint or driver failure
    #[error("database error: {0}")]
    Database(String),

    /// The configured storage URL cannot be used
    #[error("storage configuration error: {0}")]
    Config(String),

    /// Requested lifetime is outside `1..=MAX_EXPIRY_DAYS` days
    #[error("expiry of {0} days is out of range")]
    InvalidExpiry(u32),
}

impl StoreError {
    /// Whether this is the not-found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[cfg(any(feature = "postgres", feature = "sqlite"))]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Process-level error for configuration, storage bootstrap and serving
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Storage could not be opened, pinged or migrated
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// I/O error (listener bind, accept loop)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

/// Request-level error returned by handlers
///
/// Client errors become 4xx responses and are not logged as faults.
/// Everything else is logged with full detail and rendered as an opaque 500.
#[derive(Debug, Error)]
pub enum AppError {
    /// The resource does not exist (or the request could not identify one)
    #[error("not found")]
    NotFound,

    /// Malformed client input
    #[error("client error: {0}")]
    Client(StatusCode),

    /// The route exists but does not accept this method
    #[error("method not allowed (allow: {allow})")]
    MethodNotAllowed { allow: &'static str },

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Template rendering failure
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound | AppError::Store(StoreError::NotFound) => {
                client_error(StatusCode::NOT_FOUND)
            }
            AppError::Client(status) => client_error(status),
            AppError::Store(StoreError::InvalidExpiry(_)) => client_error(StatusCode::BAD_REQUEST),
            AppError::MethodNotAllowed { allow } => {
                let mut response = client_error(StatusCode::METHOD_NOT_ALLOWED);
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static(allow));
                response
            }
            err @ (AppError::Store(_) | AppError::Template(_)) => server_error(&err),
        }
    }
}

/// Plain-text response whose body is the status's reason phrase
pub fn client_error(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}

/// Log `err` and return an opaque 500
pub fn server_error(err: &dyn std::error::Error) -> Response {
    tracing::error!(error = %err, source = ?err.source(), "request failed");
    client_error(StatusCode::INTERNAL_SERVER_ERROR)
}
