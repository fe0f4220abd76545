mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use damdfe_render::server::{router, AppState};
use damdfe_render::AppConfig;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "damdfe-test-boundary";

fn app() -> axum::Router {
    let config = AppConfig {
        layout: test_config(),
        ..AppConfig::default()
    };
    let state = AppState::new(config).expect("etat du serveur");
    router(Arc::new(state))
}

fn multipart_request(field: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"mdfe.xml\"\r\n\
         Content-Type: text/xml\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        content = content
    );
    Request::builder()
        .method("POST")
        .uri("/damdfe")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("requete")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("corps").to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn index_serves_upload_form() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("name=\"xml\""));
    assert!(html.contains("action=\"/damdfe\""));
}

#[tokio::test]
async fn missing_xml_field_is_a_bad_request() {
    let response = app()
        .oneshot(multipart_request("autre", "contenu"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "xml");
}

#[tokio::test]
async fn invalid_manifest_is_a_bad_request() {
    let response = app()
        .oneshot(multipart_request("xml", "<mdfeProc><MDFe></MDFe></mdfeProc>"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["errors"][0]["field"], "xml");
    assert!(body["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("infMDFe"));
}

#[tokio::test]
async fn valid_manifest_returns_pdf_attachment() {
    let response = app()
        .oneshot(multipart_request("xml", &sample_xml()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"damdfe_{}.pdf\"", ACCESS_KEY).as_str()
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
    let doc = load_pdf(&bytes).expect("pdf lisible");
    assert_eq!(doc.get_pages().len(), 1);
}
