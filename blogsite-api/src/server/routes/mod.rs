use crate::server::ServerRouter;
use axum::{Router, routing::get};

mod blogs;
mod comments;
mod wishlist;

pub fn routes() -> ServerRouter {
    Router::new()
        .route("/", get(welcome))
        .merge(blogs::routes())
        .merge(wishlist::routes())
        .merge(comments::routes())
}

async fn welcome() -> &'static str {
    "Welcome to Blog Website"
}

#[cfg(test)]
mod tests {
    use crate::server::test_util::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn root_greets() {
        let app = TestApp::new();

        let (status, body) = app.get("/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("Welcome to Blog Website"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = TestApp::new();

        let (status, body) = app.get("/nothing/here", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "status": 404, "message": "Not found" }));
    }
}
