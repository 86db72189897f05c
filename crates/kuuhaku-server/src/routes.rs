//! Route definitions.

use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::handlers::{self, admin, posts, products};
use crate::middleware::{api_key_middleware, request_id_middleware, ApiKeys};
use crate::state::AppState;

/// Prefix the scrapers post to.
pub const API_PREFIX: &str = "/wp-json/lovedoll/v1";

/// Create the router with all routes.
pub fn create_router(state: AppState, config: &ServiceConfig) -> Router {
    let api_keys = ApiKeys::new(config.server.api_keys.clone());

    let api = Router::new()
        .route("/add-item", post(products::add_item))
        .route("/list", get(products::list_items))
        .route("/create-blog-post", post(posts::create_blog_post))
        .route("/blog-posts", get(posts::list_blog_posts))
        .layer(middleware::from_fn_with_state(api_keys, api_key_middleware));

    let admin = Router::new()
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/ajax", post(admin::ajax))
        .route("/affiliate-links", get(admin::editor))
        .route("/affiliate-links/test", post(admin::test_link))
        .route("/affiliate-links/preview", post(admin::preview_links));

    let uploads = format!("/{}", config.media.public_path.trim_matches('/'));

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/affiliate-settings.js", get(handlers::affiliate_settings_js))
        .nest(API_PREFIX, api)
        .nest("/admin", admin)
        .with_state(state)
        .nest_service(&uploads, ServeDir::new(&config.media.dir));

    if config.server.cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use kuuhaku_auth::{hash_password, AdminAccount, Role};
    use kuuhaku_catalog::prelude::MemoryCatalog;
    use kuuhaku_options::{MemoryOptionBackend, OptionStore};

    use super::*;
    use crate::ingest::tests::resolver;

    struct Harness {
        app: Router,
        catalog: Arc<MemoryCatalog>,
        _dir: tempfile::TempDir,
    }

    fn harness_with(config: ServiceConfig) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config;
        config.media.dir = dir.path().to_path_buf();
        let catalog = Arc::new(MemoryCatalog::new());
        let options = OptionStore::new(MemoryOptionBackend::new());
        let state = AppState::new(
            catalog.clone(),
            options,
            resolver(dir.path(), true),
            &config,
        );
        Harness {
            app: create_router(state, &config),
            catalog,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        let hash = hash_password("pass1234").unwrap();
        let config = ServiceConfig {
            admins: vec![
                AdminAccount::new("kuma", hash.clone(), Role::Administrator),
                AdminAccount::new("writer", hash, Role::Editor),
            ],
            ..Default::default()
        };
        harness_with(config)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn parse(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    async fn login(app: &Router, username: &str) -> String {
        let (status, headers, _) = send(
            app,
            json_request(
                "POST",
                "/admin/login",
                json!({ "username": username, "password": "pass1234" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cookie = headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    async fn editor_nonce(app: &Router, cookie: &str) -> String {
        let request = Request::builder()
            .uri("/admin/affiliate-links")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        parse(&body)["nonce"].as_str().unwrap().to_string()
    }

    fn save_request(cookie: Option<&str>, nonce: &str, links: Value) -> Request<Body> {
        let form = format!(
            "action=save_affiliate_links&nonce={}&links={}",
            nonce,
            encode(&links.to_string())
        );
        let mut builder = Request::builder()
            .method("POST")
            .uri("/admin/ajax")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(form)).unwrap()
    }

    /// Minimal percent-encoding for form values.
    fn encode(value: &str) -> String {
        value
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                    (b as char).to_string()
                }
                _ => format!("%{:02X}", b),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, headers, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["healthy"], true);
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_add_item_create_then_existing() {
        let h = harness();
        let item = json!({
            "title": "QTD 207",
            "price": "¥998,000",
            "image_url": "https://yourdoll.jp/img/qtd.jpg",
            "product_url": "https://yourdoll.jp/product/qtd207-lovedoll/"
        });

        let (status, _, body) = send(
            &h.app,
            json_request("POST", "/wp-json/lovedoll/v1/add-item", item.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created = parse(&body);
        assert_eq!(created["price"], 998000);
        assert_eq!(created["image_url"], "https://yourdoll.jp/img/qtd.jpg");

        let (status, _, body) = send(
            &h.app,
            json_request("POST", "/wp-json/lovedoll/v1/add-item", item),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["id"], created["id"]);
        assert_eq!(h.catalog.product_count(), 1);
    }

    #[tokio::test]
    async fn test_add_item_accepts_form_and_camel_case() {
        let h = harness();
        let form = format!(
            "title=Doll&price=44650&imageUrl={}&productUrl={}",
            encode("https://yourdoll.jp/a.jpg"),
            encode("https://yourdoll.jp/product/a/")
        );
        let request = Request::builder()
            .method("POST")
            .uri("/wp-json/lovedoll/v1/add-item")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(parse(&body)["price"], 44650);
    }

    #[tokio::test]
    async fn test_add_item_validation_errors() {
        let h = harness();
        let (status, _, body) = send(
            &h.app,
            json_request(
                "POST",
                "/wp-json/lovedoll/v1/add-item",
                json!({ "title": "No price", "image_url": "https://a.jp/x.jpg", "product_url": "https://a.jp/p" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&body)["code"], "invalid_params");

        let (status, _, body) = send(
            &h.app,
            json_request(
                "POST",
                "/wp-json/lovedoll/v1/add-item",
                json!({
                    "title": "Too expensive",
                    "price": "1,200,000",
                    "image_url": "https://a.jp/x.jpg",
                    "product_url": "https://a.jp/p"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(parse(&body)["code"], "price_too_high");
        assert_eq!(h.catalog.product_count(), 0);
    }

    #[tokio::test]
    async fn test_api_keys_guard_ingestion() {
        let config = ServiceConfig {
            server: crate::config::HttpConfig {
                api_keys: vec!["secret".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let h = harness_with(config);

        let request = Request::builder()
            .uri("/wp-json/lovedoll/v1/list")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/wp-json/lovedoll/v1/list")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body), json!([]));
    }

    #[tokio::test]
    async fn test_blog_post_endpoints() {
        let h = harness();
        let (status, _, body) = send(
            &h.app,
            json_request(
                "POST",
                "/wp-json/lovedoll/v1/create-blog-post",
                json!({ "title": "選び方", "content": "<p>本文</p>", "status": "publish", "tags": ["ガイド"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created = parse(&body);
        assert_eq!(created["success"], true);
        assert_eq!(created["status"], "publish");
        assert!(created["permalink"]
            .as_str()
            .unwrap()
            .ends_with(&format!("/archives/{}/", created["post_id"])));

        let (status, _, _) = send(
            &h.app,
            json_request(
                "POST",
                "/wp-json/lovedoll/v1/create-blog-post",
                json!({ "title": "本文なし" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .uri("/wp-json/lovedoll/v1/blog-posts?per_page=5&page=1")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        let list = parse(&body);
        assert_eq!(list["total"], 1);
        assert_eq!(list["total_pages"], 1);
        assert_eq!(list["posts"][0]["title"], "選び方");
    }

    #[tokio::test]
    async fn test_save_rules_and_serve_settings() {
        let h = harness();
        let cookie = login(&h.app, "kuma").await;
        let nonce = editor_nonce(&h.app, &cookie).await;

        let links = json!([
            { "name": "YourDoll", "domain": " yourdoll.jp ", "param": "?ref=kuuhaku-lovedoll", "enabled": true },
            { "name": "incomplete", "domain": "", "param": "?a=b", "enabled": true },
            { "name": "off", "domain": "kuma-doll.com", "param": "aff=1", "enabled": false }
        ]);
        let (status, _, body) = send(&h.app, save_request(Some(&cookie), &nonce, links)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body), json!({ "success": true }));

        let request = Request::builder()
            .uri("/admin/affiliate-links")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let (_, _, body) = send(&h.app, request).await;
        let view = parse(&body);
        assert_eq!(view["links"].as_array().unwrap().len(), 2);
        assert_eq!(view["links"][0]["domain"], "yourdoll.jp");
        assert_eq!(view["stats"], json!({ "total": 2, "active": 1 }));

        let request = Request::builder()
            .uri("/affiliate-settings.js")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/javascript"));
        let script = String::from_utf8(body).unwrap();
        assert!(script.starts_with("window.lovedollAffiliateSettings = "));
        assert!(script.contains("yourdoll.jp"));
        assert!(!script.contains("kuma-doll.com"));
    }

    #[tokio::test]
    async fn test_save_rejections_leave_rules_untouched() {
        let h = harness();
        let links = json!([{ "name": "x", "domain": "a.jp", "param": "r=1", "enabled": true }]);

        let (status, _, body) = send(&h.app, save_request(None, "whatever", links.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(parse(&body), json!({ "success": false, "data": "Invalid nonce" }));

        let kuma = login(&h.app, "kuma").await;
        let (status, _, body) =
            send(&h.app, save_request(Some(&kuma), "forged", links.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(parse(&body)["data"], "Invalid nonce");

        let writer = login(&h.app, "writer").await;
        let request = Request::builder()
            .uri("/admin/affiliate-links")
            .header(header::COOKIE, &writer)
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let settings = Request::builder()
            .uri("/affiliate-settings.js")
            .body(Body::empty())
            .unwrap();
        let (_, _, body) = send(&h.app, settings).await;
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "window.lovedollAffiliateSettings = {\"links\":[]};\n"
        );
    }

    #[tokio::test]
    async fn test_editor_harness_endpoints() {
        let h = harness();
        let cookie = login(&h.app, "kuma").await;
        let links = json!([
            { "name": "YourDoll", "domain": "yourdoll.jp", "param": "?ref=kuuhaku-lovedoll", "enabled": true },
            { "name": "", "domain": "", "param": "", "enabled": true }
        ]);

        let mut request = json_request(
            "POST",
            "/admin/affiliate-links/test",
            json!({ "url": "https://yourdoll.jp/product/x/?utm_source=ig", "links": links.clone() }),
        );
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        let result = parse(&body);
        assert_eq!(
            result["converted"],
            "https://yourdoll.jp/product/x/?utm_source=ig&ref=kuuhaku-lovedoll"
        );
        assert_eq!(result["matched"], true);
        assert_eq!(result["matched_rules"], json!(["YourDoll"]));

        let mut request = json_request(
            "POST",
            "/admin/affiliate-links/preview",
            json!({ "links": links }),
        );
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        let preview = parse(&body);
        assert_eq!(
            preview["previews"],
            json!([
                "https://yourdoll.jp/example/product/?ref=kuuhaku-lovedoll",
                "設定してください"
            ])
        );

        let (status, _, body) = send(
            &h.app,
            json_request(
                "POST",
                "/admin/affiliate-links/test",
                json!({ "url": "https://yourdoll.jp/" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(parse(&body)["code"], "login_required");
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let h = harness();
        let (status, headers, body) = send(
            &h.app,
            json_request(
                "POST",
                "/admin/login",
                json!({ "username": "kuma", "password": "nope" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!headers.contains_key(header::SET_COOKIE));
        assert_eq!(parse(&body)["code"], "invalid_credentials");
    }
}
