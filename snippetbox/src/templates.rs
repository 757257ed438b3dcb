//! Compile-time HTML templates
//!
//! Templates live in `ui/html` and are checked by askama at build time.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use crate::error::AppError;

/// Home page: base layout, home content and footer partial
#[derive(Debug, Default, Template)]
#[template(path = "home.page.html")]
pub struct HomePage;

/// A template rendered into an HTML response
///
/// Rendering happens before any part of the response exists, so a failure
/// turns into a complete 500 response instead of a truncated page.
pub struct HtmlTemplate<T: Template> {
    template: T,
}

impl<T: Template> HtmlTemplate<T> {
    #[must_use]
    pub fn new(template: T) -> Self {
        Self { template }
    }

    /// Render to a response, reporting template failures as [`AppError`]
    pub fn render(self) -> Result<Response, AppError> {
        let html = self.template.render()?;
        Ok(Html(html).into_response())
    }
}

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        self.render().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    struct Failing;

    impl std::fmt::Display for Failing {
        fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Err(std::fmt::Error)
        }
    }

    #[derive(Template)]
    #[template(source = "<p>{{ value }}</p>", ext = "html")]
    struct Broken {
        value: Failing,
    }

    #[test]
    fn test_home_page_composes_layout_and_partials() {
        let html = HomePage.render().unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Home - Snippetbox</title>"));
        assert!(html.contains("Latest Snippets"));
        assert!(html.contains("<footer>"));
    }

    #[test]
    fn test_html_template_response() {
        let response = HtmlTemplate::new(HomePage).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }

    #[test]
    fn test_render_failure_is_opaque_500() {
        let response = HtmlTemplate::new(Broken { value: Failing }).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
