//! Event scheduling: overlap rejection per professional and date.
//!
//! Runs the event service against an in-memory SQLite database.

mod common;

use omni_saude_server::domain::event::service::EventService;
use omni_saude_server::domain::notification::entity::notification;
use omni_saude_server::domain::user::entity::user::UserRole;
use omni_saude_server::utils::error::AppError;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{event_request, seed_professional, seed_user, setup};

#[tokio::test]
async fn overlapping_event_should_be_rejected_and_back_to_back_allowed() {
    // Arrange: P has 09:00-10:00 on 2025-10-27
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "paciente@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await
    .unwrap();

    // Act
    let overlapping = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Retorno", "2025-10-27", "09:30", "10:30", p.professional_id),
    )
    .await;
    let back_to_back = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Exame", "2025-10-27", "10:00", "11:00", p.professional_id),
    )
    .await;

    // Assert
    match overlapping {
        Err(AppError::Overlap(message)) => assert!(message.contains("sobreposição")),
        other => panic!("expected overlap error, got {:?}", other.map(|e| e.event_id)),
    }
    let created = back_to_back.unwrap();
    assert_eq!(created.start_time, "10:00");
    assert_eq!(created.end_time, "11:00");
}

#[tokio::test]
async fn overlap_error_should_map_to_bad_request_with_overlap_code() {
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "a@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dr. Bruno").await;
    EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await
    .unwrap();

    let err = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Dentro", "2025-10-27", "09:15", "09:45", p.professional_id),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(err.error_code(), "EVENT_OVERLAP");
}

#[tokio::test]
async fn same_time_should_be_allowed_for_other_professional_or_date() {
    // Arrange
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "b@omni.test", UserRole::Receptor).await;
    let p1 = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    let p2 = seed_professional(ctx.db(), user.user_id, "Dr. Carlos").await;
    EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p1.professional_id),
    )
    .await
    .unwrap();

    // Act
    let other_professional = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p2.professional_id),
    )
    .await;
    let other_date = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-28", "09:00", "10:00", p1.professional_id),
    )
    .await;

    // Assert
    assert!(other_professional.is_ok());
    assert!(other_date.is_ok());
}

#[tokio::test]
async fn update_should_not_conflict_with_itself_but_should_with_others() {
    // Arrange
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "c@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    let first = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await
    .unwrap();
    EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Exame", "2025-10-27", "11:00", "12:00", p.professional_id),
    )
    .await
    .unwrap();

    // Act: extend itself, then push into the second event
    let extended = EventService::update_event(
        &ctx.state,
        user.user_id,
        first.event_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:30", p.professional_id),
    )
    .await;
    let colliding = EventService::update_event(
        &ctx.state,
        user.user_id,
        first.event_id,
        event_request("Consulta", "2025-10-27", "10:30", "11:30", p.professional_id),
    )
    .await;

    // Assert
    assert_eq!(extended.unwrap().end_time, "10:30");
    assert!(matches!(colliding, Err(AppError::Overlap(_))));
}

#[tokio::test]
async fn end_not_after_start_should_be_validation_error() {
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "d@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;

    let result = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "10:00", "10:00", p.professional_id),
    )
    .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn professional_of_another_user_should_be_forbidden() {
    let ctx = setup().await;
    let owner = seed_user(ctx.db(), "owner@omni.test", UserRole::Receptor).await;
    let intruder = seed_user(ctx.db(), "intruder@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), owner.user_id, "Dra. Ana").await;

    let result = EventService::create_event(
        &ctx.state,
        intruder.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn update_should_archive_previous_notification_and_create_a_new_one() {
    // Arrange
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "e@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    let event = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await
    .unwrap();

    // Act
    EventService::update_event(
        &ctx.state,
        user.user_id,
        event.event_id,
        event_request("Consulta", "2025-10-27", "14:00", "15:00", p.professional_id),
    )
    .await
    .unwrap();

    // Assert
    let notifications = notification::Entity::find()
        .filter(notification::Column::EventId.eq(event.event_id))
        .all(ctx.db())
        .await
        .unwrap();
    assert_eq!(notifications.len(), 2);
    let active: Vec<_> = notifications.iter().filter(|n| !n.is_archived).collect();
    assert_eq!(active.len(), 1);
    assert!(active[0].message.contains("14:00"));
}

#[tokio::test]
async fn list_should_filter_by_date_and_order_by_start() {
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "f@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    for (date, start, end) in [
        ("2025-10-27", "15:00", "16:00"),
        ("2025-10-27", "08:00", "09:00"),
        ("2025-10-28", "08:00", "09:00"),
    ] {
        EventService::create_event(
            &ctx.state,
            user.user_id,
            event_request("Consulta", date, start, end, p.professional_id),
        )
        .await
        .unwrap();
    }

    let events = EventService::list_events(&ctx.state, user.user_id, Some("2025-10-27".to_string()))
        .await
        .unwrap();

    let starts: Vec<&str> = events.iter().map(|e| e.start_time.as_str()).collect();
    assert_eq!(starts, vec!["08:00", "15:00"]);
}
