//! Landing page.

use axum::{response::Html, routing::get, Router};

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Tessera</title>
</head>
<body>
    <h1>Tessera</h1>
    <p>User directory service.</p>
    <ul>
        <li><a href="/health">/health</a></li>
        <li><a href="/api-docs/openapi.json">/api-docs/openapi.json</a></li>
    </ul>
</body>
</html>
"#;

/// Creates the landing page router.
pub fn router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/", get(home))
}

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}
