//! Contract tests for the two remote recognition backends: request
//! shaping, response parsing and error mapping, against a mock server.

use duudl::{
    DuudlError, HttpClassifier, HttpClassifierConfig, NormalizedImage, Normalizer, Raster,
    Recognizer, VisionLlm, VisionLlmConfig,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn image(size: u32) -> NormalizedImage {
    let mut raster = Raster::filled(size, size, [255, 255, 255, 255]);
    raster.stamp_segment(
        duudl::Point::new(2.0, 2.0),
        duudl::Point::new(f64::from(size) - 2.0, f64::from(size) - 2.0),
        3.0,
        [0, 0, 0, 255],
    );
    Normalizer::new(size).unwrap().normalize(&raster).unwrap()
}

fn classifier(server: &MockServer) -> HttpClassifier {
    HttpClassifier::new(
        HttpClassifierConfig::new(format!("{}/model", server.uri()))
            .with_api_token("secret-token")
            .with_input_size(64),
    )
}

#[tokio::test]
async fn classifier_posts_png_bytes_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/model"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "label": "cat", "score": 0.85 },
            { "label": "dog", "score": 0.10 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let img = image(64);
    let set = classifier(&server).classify(&img).await.unwrap();
    assert_eq!(set.top().label, "cat");
    assert_eq!(set.len(), 2);

    // Exactly one outbound request, body is the PNG verbatim.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, img.as_png());
}

#[tokio::test]
async fn classifier_maps_server_error_to_backend_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&image(64)).await.unwrap_err();
    assert!(matches!(err, DuudlError::BackendUnavailable(_)));
}

#[tokio::test]
async fn classifier_maps_503_to_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&image(64)).await.unwrap_err();
    assert!(matches!(err, DuudlError::NotReady(_)));
}

#[tokio::test]
async fn classifier_rejects_unparseable_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&image(64)).await.unwrap_err();
    assert!(matches!(err, DuudlError::MalformedResponse(_)));
}

#[tokio::test]
async fn classifier_rejects_empty_ranking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&image(64)).await.unwrap_err();
    assert!(matches!(err, DuudlError::MalformedResponse(_)));
}

#[tokio::test]
async fn classifier_rejects_wrong_size_image_without_a_request() {
    let server = MockServer::start().await;
    // No mock mounted: a request would 404 and fail differently.
    let err = classifier(&server).classify(&image(32)).await.unwrap_err();
    assert!(matches!(err, DuudlError::InvalidImage(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

fn vision(server: &MockServer) -> VisionLlm {
    let mut config = VisionLlmConfig::new(
        format!("{}/v1/chat/completions", server.uri()),
        "vk-test",
        "vision-mini",
    );
    config.input_size = 64;
    VisionLlm::new(config)
}

#[tokio::test]
async fn vision_sends_chat_request_and_parses_text_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer vk-test"))
        .and(body_partial_json(json!({
            "model": "vision-mini",
            "temperature": 0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "a race car." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let set = vision(&server).classify(&image(64)).await.unwrap();
    assert_eq!(set.top().label, "a race car");
    assert_eq!(set.top().score, 1.0);

    // The image travels as an inline data URL inside the user message.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let url = body["messages"][0]["content"][1]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn vision_maps_auth_failure_to_backend_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = vision(&server).classify(&image(64)).await.unwrap_err();
    assert!(matches!(err, DuudlError::BackendUnavailable(_)));
}

#[tokio::test]
async fn vision_rejects_reply_without_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = vision(&server).classify(&image(64)).await.unwrap_err();
    assert!(matches!(err, DuudlError::MalformedResponse(_)));
}
