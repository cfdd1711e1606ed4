use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::form_urlencoded;
use yarrrml_server::{ServerConfig, YarrrmlServer};

const PERSON: &str = r#"prefixes:
  ex: http://example.com/
mappings:
  person:
    sources:
      - ['data/persons.json~jsonpath', '$.persons[*]']
    s: http://example.com/$(firstname)
    po:
      - [a, foaf:Person]
      - [ex:name, $(firstname)]
"#;

const BROKEN: &str = r#"mappings:
  person:
    sources: ['data.db~sql']
    s: http://example.com/$(id)
"#;

fn app_with(config: ServerConfig) -> Router {
    YarrrmlServer::new(config).expect("YarrrmlServer::new").router()
}

fn app() -> Router {
    app_with(ServerConfig::default())
}

/// Percent-encode `txt` for use in a query string or a form body.
fn encode(txt: &str) -> String {
    form_urlencoded::byte_serialize(txt.as_bytes()).collect()
}

/// Serve `body` on a local port, returning its URL.
async fn serve_document(body: &'static str) -> String {
    // the fetching client must not go through a proxy
    std::env::set_var("NO_PROXY", "127.0.0.1");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    let document = axum::routing::get(move || async move { body });
    let router = Router::new().route("/mapping.yml", document);
    tokio::spawn(async move { axum::serve(listener, router).await });
    format!("http://{addr}/mapping.yml")
}

async fn text_body(resp: Response<Body>) -> (StatusCode, Option<String>, String) {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn json_body(resp: Response<Body>) -> (StatusCode, JsonValue) {
    let (status, _, body) = text_body(resp).await;
    let json: JsonValue = serde_json::from_str(&body).expect("valid JSON response");
    (status, json)
}

async fn get(uri: &str) -> Response<Body> {
    app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(uri: &str, content_type: &str, body: String) -> Response<Body> {
    post_to(app(), uri, content_type, body).await
}

async fn post_to(app: Router, uri: &str, content_type: &str, body: String) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn health_check_ok() {
    let (status, json) = json_body(get("/health").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn post_form() {
    let body = format!("yarrrml={}", encode(PERSON));
    let resp = post("/", "application/x-www-form-urlencoded", body).await;
    let (status, content_type, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/n-triples"));
    assert!(body.contains(
        r#"<http://mapping.example.com/source_000> <http://semweb.mmlab.be/ns/rml#source> "data/persons.json"."#
    ));
    assert!(body.lines().all(|l| l.ends_with('.')));
}

#[tokio::test]
async fn post_json() {
    let body = serde_json::json!({ "yarrrml": PERSON, "format": "turtle" }).to_string();
    let (status, content_type, body) = text_body(post("/", "application/json", body).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/turtle"));
    assert!(body.contains("rr:TriplesMap"));
}

#[tokio::test]
async fn post_raw_text_with_query_parameters() {
    let resp = post(
        "/?format=nq&base=http%3A%2F%2Frules.example.org%2F",
        "text/plain",
        PERSON.to_string(),
    )
    .await;
    let (status, content_type, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/n-quads"));
    assert!(body.contains("<http://rules.example.org/map_person_000>"));
}

#[tokio::test]
async fn get_with_query() {
    let uri = format!("/?yarrrml={}", encode(PERSON));
    let (status, content_type, body) = text_body(get(&uri).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/n-triples"));
    assert!(body.contains("<http://mapping.example.com/map_person_000>"));
}

#[tokio::test]
async fn accept_header_selects_format() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("/?yarrrml={}", encode(PERSON)))
                .header(header::ACCEPT, "text/turtle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, content_type, _) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/turtle"));
}

#[tokio::test]
async fn document_base_is_used() {
    let yarrrml = format!("base: http://doc.example.org/\n{PERSON}");
    let body = format!("yarrrml={}", encode(&yarrrml));
    let resp = post("/", "application/x-www-form-urlencoded", body).await;
    let (status, _, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<http://doc.example.org/map_person_000>"));
}

#[tokio::test]
async fn request_base_overrides_document_base() {
    let yarrrml = format!("base: http://doc.example.org/\n{PERSON}");
    let body = format!(
        "yarrrml={}&base={}",
        encode(&yarrrml),
        encode("http://req.example.org/ns")
    );
    let resp = post("/", "application/x-www-form-urlencoded", body).await;
    let (status, _, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<http://req.example.org/ns/map_person_000>"));
}

#[tokio::test]
async fn missing_yarrrml_is_unprocessable() {
    let resp = post("/", "application/x-www-form-urlencoded", String::new()).await;
    let (status, _, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.is_empty());

    let (status, _, _) = text_body(get("/").await).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let body = serde_json::json!({ "yarrrml": "  " }).to_string();
    let (status, _, _) = text_body(post("/", "application/json", body).await).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn conversion_errors_return_log() {
    let body = format!("yarrrml={}", encode(BROKEN));
    let resp = post("/", "application/x-www-form-urlencoded", body).await;
    let (status, json) = json_body(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let entries = json.as_array().expect("array of log entries");
    assert!(!entries.is_empty());
    assert!(entries.iter().any(|e| {
        e.get("level").and_then(|l| l.as_str()) == Some("error")
            && e.get("message")
                .and_then(|m| m.as_str())
                .is_some_and(|m| m.contains("sql"))
    }));
}

#[tokio::test]
async fn invalid_yaml_returns_log() {
    let body = format!("yarrrml={}", encode("mappings: [unclosed\n"));
    let resp = post("/", "application/x-www-form-urlencoded", body).await;
    let (status, json) = json_body(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.as_array().is_some_and(|a| !a.is_empty()));
}

#[tokio::test]
async fn unknown_format_is_bad_request() {
    let uri = format!("/?yarrrml={}&format=rdfxml", encode(PERSON));
    let (status, json) = json_body(get(&uri).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json
        .get("error")
        .and_then(|e| e.as_str())
        .is_some_and(|e| e.contains("rdfxml")));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (status, _, _) = text_body(post("/", "application/json", "{".to_string()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn server_state_normalizes_default_base() {
    let config = ServerConfig {
        default_base: "http://rules.example.org/ns".to_string(),
        ..ServerConfig::default()
    };
    let server = YarrrmlServer::new(config).expect("YarrrmlServer::new");
    assert_eq!(server.state().default_base, "http://rules.example.org/ns/");

    let body = format!("yarrrml={}", encode(PERSON));
    let resp = post_to(server.router(), "/", "application/x-www-form-urlencoded", body).await;
    let (status, _, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<http://rules.example.org/ns/map_person_000>"));
}

#[tokio::test]
async fn json_body_overrides_query() {
    let body = serde_json::json!({
        "yarrrml": PERSON,
        "format": "turtle",
        "base": "http://body.example.org/",
    })
    .to_string();
    let resp = post(
        "/?format=nq&base=http%3A%2F%2Fquery.example.org%2F",
        "application/json",
        body,
    )
    .await;
    let (status, content_type, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/turtle"));
    assert!(body.contains("<http://body.example.org/map_person_000>"));
    assert!(!body.contains("query.example.org"));
}

#[tokio::test]
async fn accept_header_quality_values() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("/?yarrrml={}", encode(PERSON)))
                .header(header::ACCEPT, "text/turtle;q=0.1, application/n-triples")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, content_type, _) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/n-triples"));
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let config = ServerConfig {
        body_limit: 64,
        ..ServerConfig::default()
    };
    let body = format!("yarrrml={}", encode(PERSON));
    let resp = post_to(
        app_with(config.clone()),
        "/",
        "application/x-www-form-urlencoded",
        body,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let resp = post_to(app_with(config), "/", "text/plain", PERSON.to_string()).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn document_fetched_from_url() {
    let url = serve_document(PERSON).await;
    let body = serde_json::json!({ "url": url }).to_string();
    let resp = post("/api/yarrrmltorml", "application/json", body).await;
    let (status, content_type, body) = text_body(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/n-triples"));
    assert!(body.contains("<http://mapping.example.com/map_person_000>"));

    let (status, _, body) = text_body(get(&format!("/?url={}", encode(&url))).await).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<http://mapping.example.com/map_person_000>"));
}

#[tokio::test]
async fn fetched_documents_follow_the_same_contract() {
    let broken = serve_document(BROKEN).await;
    let (status, json) = json_body(get(&format!("/?url={}", encode(&broken))).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.as_array().is_some_and(|a| !a.is_empty()));

    let empty = serve_document("   \n").await;
    let (status, _, body) = text_body(get(&format!("/?url={}", encode(&empty))).await).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.is_empty());
}

#[tokio::test]
async fn unsupported_url_scheme_is_bad_request() {
    let uri = format!("/?url={}", encode("file:///etc/passwd"));
    let (status, json) = json_body(get(&uri).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json
        .get("error")
        .and_then(|e| e.as_str())
        .is_some_and(|e| e.contains("scheme")));
}
