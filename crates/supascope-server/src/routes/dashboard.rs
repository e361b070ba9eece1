//! Dashboard entry point.
//!
//! Glue only: the page offers the connect flow and loads entity data from
//! the JSON routes. Errors surface as a generic failure message; no token
//! or secret ever reaches this page.

use axum::response::Html;

const DASHBOARD_PAGE: &str = r#"<!doctype html>
<html>
<head><title>supascope</title></head>
<body>
  <h1>supascope</h1>
  <p><a href="/login">Connect Supabase account</a></p>
  <ul>
    <li><a href="/projects">Projects</a></li>
    <li><a href="/organizations">Organizations &amp; members</a></li>
  </ul>
  <p id="error" hidden>Something went wrong. Try reconnecting your account.</p>
</body>
</html>
"#;

/// `GET /dashboard`.
pub async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}
