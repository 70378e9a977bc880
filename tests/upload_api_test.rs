//! POST /api/v1/files through the full router: auth, rate limit, size and type checks.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use omni_saude_server::app;
use omni_saude_server::config::RateLimitConfig;
use omni_saude_server::domain::event::service::EventService;
use omni_saude_server::domain::file::entity::file_info;
use omni_saude_server::domain::user::entity::user::UserRole;
use sea_orm::EntityTrait;
use serde_json::Value;
use tower::ServiceExt;

use common::{
    bearer, event_request, multipart_body, seed_professional, seed_user, setup,
    setup_with_rate_limit, upload_request, TEST_MAX_UPLOAD_BYTES,
};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn png(size: usize) -> Vec<u8> {
    vec![0x89; size]
}

#[tokio::test]
async fn upload_without_token_should_return_401() {
    let ctx = setup().await;
    let body = multipart_body("foto.png", "image/png", &png(10), &[]);

    let response = app(ctx.state.clone())
        .oneshot(upload_request(None, "10.0.0.1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["isSuccess"], false);
    assert_eq!(json["code"], "AUTH401");
}

#[tokio::test]
async fn upload_to_event_slot_should_store_and_attach() {
    // Arrange
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "paciente@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    let event = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await
    .unwrap();
    let event_id = event.event_id.to_string();
    let body = multipart_body(
        "laudo.pdf",
        "application/pdf",
        b"%PDF-1.4 conteudo",
        &[("eventId", event_id.as_str()), ("slot", "result")],
    );
    let auth = bearer(user.user_id, UserRole::Receptor);

    // Act
    let response = app(ctx.state.clone())
        .oneshot(upload_request(Some(&auth), "10.0.0.2", body))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["isSuccess"], true);
    assert_eq!(json["result"]["slot"], "result");
    assert_eq!(json["result"]["eventId"], event.event_id);
    assert_eq!(json["result"]["professionalId"], p.professional_id);
    assert_eq!(json["result"]["mimeType"], "application/pdf");
    let url = json["result"]["url"].as_str().unwrap();
    assert!(url.starts_with("http://test.local/uploads/"));
    assert!(url.ends_with(".pdf"));
    assert!(ctx.storage.contains(url));
}

#[tokio::test]
async fn upload_to_filled_slot_should_replace_previous_file() {
    // Arrange
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "a@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    let event = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await
    .unwrap();
    let event_id = event.event_id.to_string();
    let auth = bearer(user.user_id, UserRole::Receptor);
    let fields = [("eventId", event_id.as_str()), ("slot", "prescription")];

    // Act
    let first = app(ctx.state.clone())
        .oneshot(upload_request(
            Some(&auth),
            "10.0.0.3",
            multipart_body("receita-v1.png", "image/png", &png(20), &fields),
        ))
        .await
        .unwrap();
    let first_url = body_json(first).await["result"]["url"]
        .as_str()
        .unwrap()
        .to_string();
    let second = app(ctx.state.clone())
        .oneshot(upload_request(
            Some(&auth),
            "10.0.0.3",
            multipart_body("receita-v2.png", "image/png", &png(30), &fields),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(second.status(), StatusCode::OK);
    let rows = file_info::Entity::find().all(ctx.db()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "receita-v2.png");
    assert!(!ctx.storage.contains(&first_url));
    assert_eq!(ctx.storage.object_count(), 1);
}

#[tokio::test]
async fn upload_at_size_limit_should_return_413_and_one_byte_less_should_pass() {
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "b@omni.test", UserRole::Receptor).await;
    let auth = bearer(user.user_id, UserRole::Receptor);
    let limit = TEST_MAX_UPLOAD_BYTES as usize;

    let at_limit = app(ctx.state.clone())
        .oneshot(upload_request(
            Some(&auth),
            "10.0.0.4",
            multipart_body("grande.png", "image/png", &png(limit), &[]),
        ))
        .await
        .unwrap();
    let below_limit = app(ctx.state.clone())
        .oneshot(upload_request(
            Some(&auth),
            "10.0.0.4",
            multipart_body("ok.png", "image/png", &png(limit - 1), &[]),
        ))
        .await
        .unwrap();

    assert_eq!(at_limit.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(at_limit).await["code"], "FILE413");
    assert_eq!(below_limit.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_with_disallowed_type_should_return_400() {
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "c@omni.test", UserRole::Receptor).await;
    let auth = bearer(user.user_id, UserRole::Receptor);

    let text = app(ctx.state.clone())
        .oneshot(upload_request(
            Some(&auth),
            "10.0.0.5",
            multipart_body("notas.txt", "text/plain", b"ola", &[]),
        ))
        .await
        .unwrap();
    // PDFs are attachments only
    let pdf_as_image = app(ctx.state.clone())
        .oneshot(upload_request(
            Some(&auth),
            "10.0.0.5",
            multipart_body("laudo.pdf", "application/pdf", b"%PDF", &[("kind", "image")]),
        ))
        .await
        .unwrap();

    assert_eq!(text.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(text).await["code"], "COMMON400");
    assert_eq!(pdf_as_image.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.storage.object_count(), 0);
}

#[tokio::test]
async fn upload_over_rate_limit_should_return_429_with_retry_after() {
    // Arrange: 2 uploads per hour, 15 minute block
    let ctx = setup_with_rate_limit(RateLimitConfig {
        enabled: true,
        max_requests: 2,
        window: Duration::from_secs(3600),
        block_duration: Duration::from_secs(900),
    })
    .await;
    let user = seed_user(ctx.db(), "d@omni.test", UserRole::Receptor).await;
    let auth = bearer(user.user_id, UserRole::Receptor);
    let router = app(ctx.state.clone());

    // Act
    let mut statuses = Vec::new();
    let mut last = None;
    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(upload_request(
                Some(&auth),
                "203.0.113.7",
                multipart_body("foto.png", "image/png", &png(10), &[]),
            ))
            .await
            .unwrap();
        statuses.push(response.status());
        last = Some(response);
    }
    let other_client = router
        .clone()
        .oneshot(upload_request(
            Some(&auth),
            "203.0.113.8",
            multipart_body("foto.png", "image/png", &png(10), &[]),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
    let limited = last.unwrap();
    assert_eq!(
        limited.headers().get(header::RETRY_AFTER).unwrap(),
        "900"
    );
    assert_eq!(body_json(limited).await["code"], "RATE_LIMIT");
    assert_eq!(other_client.status(), StatusCode::OK);
}

#[tokio::test]
async fn orphaned_list_should_require_auth_and_return_envelope() {
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "e@omni.test", UserRole::Receptor).await;

    let response = app(ctx.state.clone())
        .oneshot(
            Request::builder()
                .uri("/api/v1/files/orphaned")
                .header(header::AUTHORIZATION, bearer(user.user_id, UserRole::Receptor))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], "COMMON200");
    assert_eq!(json["result"], serde_json::json!([]));
}
