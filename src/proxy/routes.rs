use axum::{
    extract::{Path, State},
    http::{header::HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use super::types::UserWithRepos;
use super::{AppState, ProxyError};
use crate::models::RepoDetails;

/// Hardening headers added to every response, unless a handler set them.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
         script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([state.allowed_origin.clone()]))
        .allow_methods([Method::GET]);

    let state = Arc::new(state);

    let mut router = Router::new()
        .route("/", get(root))
        .route("/api/github/search/{username}", get(search_users))
        .route("/api/github/user/{username}", get(get_user))
        .route("/api/github/repo/{username}/{repo_name}", get(get_repo_details))
        .with_state(state);

    for &(name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// GET / - liveness check
async fn root() -> &'static str {
    "Server is running!"
}

/// GET /api/github/search/{username} - upstream `items`, unmodified
#[instrument(skip(state))]
async fn search_users(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Value>>, ProxyError> {
    let items = state.github.search_users(&username).await?;
    info!(results = items.len(), "user search served");
    Ok(Json(items))
}

/// GET /api/github/user/{username} - `{user, repos}`
#[instrument(skip(state))]
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserWithRepos>, ProxyError> {
    let combined = state.github.user_with_repos(&username).await?;
    info!("user details served");
    Ok(Json(combined))
}

/// GET /api/github/repo/{username}/{repo_name} - commit summary
#[instrument(skip(state))]
async fn get_repo_details(
    State(state): State<Arc<AppState>>,
    Path((username, repo_name)): Path<(String, String)>,
) -> Result<Json<RepoDetails>, ProxyError> {
    let details = state.github.repo_details(&username, &repo_name).await?;
    info!(commits = details.last_commits.len(), "repo details served");
    Ok(Json(details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn router_for(upstream: &MockServer) -> Router {
        let mut config = Config::default();
        config.github.api_url = upstream.uri();
        build_router(AppState::new(&config).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let upstream = MockServer::start().await;
        let response = router_for(&upstream)
            .oneshot(get_request("/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"Server is running!");
    }

    #[tokio::test]
    async fn test_search_returns_upstream_items() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/users"))
            .and(query_param("q", "test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "incomplete_results": false,
                "items": [{"id": 1, "login": "testUser", "type": "User"}]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let response = router_for(&upstream)
            .oneshot(get_request("/api/github/search/test"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!([{"id": 1, "login": "testUser", "type": "User"}])
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_500() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&upstream)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/ghost/repos"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&upstream)
            .await;

        let response = router_for(&upstream)
            .oneshot(get_request("/api/github/user/ghost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(
            json_body(response).await,
            json!({"error": "Internal Server Error"})
        );
    }

    #[tokio::test]
    async fn test_user_combines_profile_and_repos() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat", "id": 1})))
            .mount(&upstream)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "hello", "id": 7}])))
            .mount(&upstream)
            .await;

        let response = router_for(&upstream)
            .oneshot(get_request("/api/github/user/octocat"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "user": {"login": "octocat", "id": 1},
                "repos": [{"name": "hello", "id": 7}]
            })
        );
    }

    #[tokio::test]
    async fn test_repo_details_shape() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"created_at": "2011-01-26T19:01:12Z"})))
            .mount(&upstream)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"commit": {"message": "second", "author": {"date": "2024-02-01T00:00:00Z"}}},
                {"commit": {"message": "first", "author": {"date": "2024-01-01T00:00:00Z"}}}
            ])))
            .mount(&upstream)
            .await;

        let response = router_for(&upstream)
            .oneshot(get_request("/api/github/repo/octocat/hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "last_commit_date": "2024-02-01T00:00:00Z",
                "creation_date": "2011-01-26T19:01:12Z",
                "last_commits": ["second", "first"]
            })
        );
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        let upstream = MockServer::start().await;
        let response = router_for(&upstream)
            .oneshot(get_request("/"))
            .await
            .unwrap();
        for &(name, value) in SECURITY_HEADERS {
            assert_eq!(response.headers().get(name).unwrap(), value, "{name}");
        }
    }

    #[tokio::test]
    async fn test_cors_allows_only_configured_origin() {
        let upstream = MockServer::start().await;
        let router = router_for(&upstream);

        let allowed = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:3000"
        );

        let other = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(other.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let mut config = Config::default();
        config.server.allowed_origin = "bad\norigin".to_string();
        assert!(matches!(
            AppState::new(&config),
            Err(ProxyError::InvalidOrigin(_))
        ));
    }
}
