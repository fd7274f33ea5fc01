use actix_middleware::AuthConfig;
use actix_web::{http::header, test, App};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto_core::jwt::{Claims, JwtKeys};
use crypto_core::wallet::{address_of, sign_personal_message, DEFAULT_CHALLENGE_MESSAGE};
use gridbot_service::repository::MemoryDocumentStore;
use gridbot_service::services::{GatewayClient, LikeService, NftStorageClient};
use gridbot_service::{configure, AppState};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use k256::ecdsa::SigningKey;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use wiremock::matchers::{header as header_is, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "gridbot-integration-secret";
const BOUNDARY: &str = "gridbot-test-boundary";

struct Wallet {
    address: String,
    token: String,
}

fn wallet(seed: u8) -> Wallet {
    let key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let signature = sign_personal_message(&key, DEFAULT_CHALLENGE_MESSAGE).unwrap();
    let token = JwtKeys::from_secret(SECRET)
        .unwrap()
        .issue(&Claims {
            signature: Some(signature),
            ..Claims::default()
        })
        .unwrap();

    Wallet {
        address: address_of(key.verifying_key()),
        token,
    }
}

fn state_for(server: &MockServer) -> AppState {
    let http = reqwest::Client::new();
    AppState {
        likes: LikeService::new(Arc::new(MemoryDocumentStore::new()), false),
        gateway: GatewayClient::new(
            http.clone(),
            format!("{}/ipfs/{{cid}}/metadata.json", server.uri()),
        ),
        pinning: NftStorageClient::new(http, server.uri(), Some("pin-key".into())),
    }
}

fn auth() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::new(JwtKeys::from_secret(SECRET).unwrap()))
}

macro_rules! app {
    ($state:expr) => {{
        let state: AppState = $state;
        test::init_service(App::new().configure(move |cfg| configure(cfg, &state, auth()))).await
    }};
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

/// (field name, file name, bytes)
fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn health_is_public() {
    let server = MockServer::start().await;
    let app = app!(state_for(&server));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn api_requires_a_valid_token() {
    let server = MockServer::start().await;
    let app = app!(state_for(&server));

    let req = test::TestRequest::get().uri("/api/v1/nft/storage").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/v1/nft/storage")
        .insert_header(bearer("not.a.jwt"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);
}

#[actix_web::test]
async fn like_toggle_scenario() {
    let server = MockServer::start().await;
    let app = app!(state_for(&server));
    let first = wallet(0x11);
    let second = wallet(0x22);

    let toggle = |w: &Wallet| {
        test::TestRequest::put()
            .uri(&format!("/api/v1/nft/create?wallet={}", w.address))
            .insert_header(bearer(&w.token))
            .set_json(json!({ "cid": "cidA" }))
            .to_request()
    };

    let resp = test::call_service(&app, toggle(&first)).await;
    assert_eq!(resp.status(), 202);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "_id": "cidA", "likes": { "value": 1, "wallets": [first.address] } })
    );

    let resp = test::call_service(&app, toggle(&first)).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["likes"], json!({ "value": 0, "wallets": [] }));

    let resp = test::call_service(&app, toggle(&second)).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["likes"], json!({ "value": 1, "wallets": [second.address] }));
}

#[actix_web::test]
async fn like_requires_matching_wallet_and_cid() {
    let server = MockServer::start().await;
    let app = app!(state_for(&server));
    let owner = wallet(0x11);
    let other = wallet(0x22);

    // token signed by `owner`, wallet claims to be `other`
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/nft/create?wallet={}", other.address))
        .insert_header(bearer(&owner.token))
        .set_json(json!({ "cid": "cidA" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "WALLET_MISMATCH");

    let req = test::TestRequest::put()
        .uri("/api/v1/nft/create")
        .insert_header(bearer(&owner.token))
        .set_json(json!({ "cid": "cidA" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/nft/create?wallet={}", owner.address))
        .insert_header(bearer(&owner.token))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[actix_web::test]
async fn like_uses_the_verified_wallet() {
    let server = MockServer::start().await;
    let app = app!(state_for(&server));
    let owner = wallet(0x11);

    // padded and upper-cased, still the token signer
    let padded = format!("%20{}%20", owner.address.to_uppercase().replacen("0X", "0x", 1));
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/nft/create?wallet={}", padded))
        .insert_header(bearer(&owner.token))
        .set_json(json!({ "cid": "cidA" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 202);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["likes"], json!({ "value": 1, "wallets": [owner.address] }));

    // repeating the parameter never reaches the handler
    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/v1/nft/create?wallet={0}&wallet={0}",
            owner.address
        ))
        .insert_header(bearer(&owner.token))
        .set_json(json!({ "cid": "cidA" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);
}

#[actix_web::test]
async fn metadata_merges_likes_when_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/cidA/metadata.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "name": "Grid #7", "image": "ipfs://img" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ipfs/cidB/metadata.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Grid #8" })))
        .mount(&server)
        .await;

    let app = app!(state_for(&server));
    let liker = wallet(0x33);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/nft/create?wallet={}", liker.address))
        .insert_header(bearer(&liker.token))
        .set_json(json!({ "cid": "cidA" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 202);

    let req = test::TestRequest::get()
        .uri("/api/v1/nft/metadata/cidA")
        .insert_header(bearer(&liker.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "_id": "cidA",
            "likes": { "value": 1, "wallets": [liker.address] },
            "name": "Grid #7",
            "image": "ipfs://img"
        })
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/nft/metadata/cidB")
        .insert_header(bearer(&liker.token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body, json!({ "name": "Grid #8" }));
}

#[actix_web::test]
async fn metadata_upstream_failure_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let app = app!(state_for(&server));
    let caller = wallet(0x44);

    let req = test::TestRequest::get()
        .uri("/api/v1/nft/metadata/cidA")
        .insert_header(bearer(&caller.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[actix_web::test]
async fn converter_returns_base64_avif() {
    let server = MockServer::start().await;
    let app = app!(state_for(&server));
    let caller = wallet(0x55);

    let image = png(30, 20);
    let (content_type, body) = multipart(&[
        ("dimensions", None, &br#"{"width": 12, "height": 12}"#[..]),
        ("image", Some("input.png"), image.as_slice()),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/v1/converter/image")
        .insert_header(bearer(&caller.token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 202);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["contentType"], "image/avif");
    assert_eq!(body["extension"], "avif");

    let avif = STANDARD.decode(body["b64Data"].as_str().unwrap()).unwrap();
    assert_eq!(&avif[4..8], b"ftyp");
}

#[actix_web::test]
async fn converter_rejects_bad_dimensions() {
    let server = MockServer::start().await;
    let app = app!(state_for(&server));
    let caller = wallet(0x55);

    let image = png(4, 4);
    let (content_type, body) = multipart(&[
        ("dimensions", None, &br#"{"width": 0, "height": 12}"#[..]),
        ("image", Some("input.png"), image.as_slice()),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/v1/converter/image")
        .insert_header(bearer(&caller.token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let (content_type, body) = multipart(&[("image", Some("input.png"), image.as_slice())]);
    let req = test::TestRequest::post()
        .uri("/api/v1/converter/image")
        .insert_header(bearer(&caller.token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn upload_pins_image_then_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_is("authorization", "Bearer pin-key"))
        .and(header_is("content-type", "image/avif"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "value": { "cid": "bafyimage" } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "value": { "cid": "bafydir" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = app!(state_for(&server));
    let caller = wallet(0x66);

    let image = png(16, 16);
    let (content_type, body) = multipart(&[
        (
            "metadata",
            None,
            &br#"{"width": 8, "height": 8, "name": "Grid #9", "description": "a bot"}"#[..],
        ),
        ("image", Some("art.png"), image.as_slice()),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/v1/nft/upload")
        .insert_header(bearer(&caller.token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "cid": "bafydir", "url": "ipfs://bafydir/metadata.json" })
    );

    let requests = server.received_requests().await.unwrap();
    let metadata_upload = String::from_utf8_lossy(&requests[1].body).to_string();
    assert!(metadata_upload.contains("ipfs://bafyimage"));
    assert!(metadata_upload.contains("Grid #9"));
}

#[actix_web::test]
async fn storage_routes_proxy_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_is("authorization", "Bearer pin-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "value": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bafyabc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "value": { "cid": "bafyabc", "pin": { "status": "pinned" } } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bafygone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let app = app!(state_for(&server));
    let caller = wallet(0x77);

    let req = test::TestRequest::get()
        .uri("/api/v1/nft/storage")
        .insert_header(bearer(&caller.token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body, json!({ "ok": true, "value": [] }));

    let req = test::TestRequest::get()
        .uri("/api/v1/nft/storage/bafyabc")
        .insert_header(bearer(&caller.token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["value"]["pin"]["status"], "pinned");

    let req = test::TestRequest::get()
        .uri("/api/v1/nft/storage/bafygone")
        .insert_header(bearer(&caller.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}
