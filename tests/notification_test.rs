//! Notifications: listing and read state.

mod common;

use omni_saude_server::domain::event::service::EventService;
use omni_saude_server::domain::notification::service::NotificationService;
use omni_saude_server::domain::user::entity::user::UserRole;
use omni_saude_server::utils::error::AppError;

use common::{event_request, seed_professional, seed_user, setup};

#[tokio::test]
async fn created_event_should_notify_owner_and_mark_read_should_stick() {
    // Arrange
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "paciente@omni.test", UserRole::Receptor).await;
    let stranger = seed_user(ctx.db(), "outro@omni.test", UserRole::Receptor).await;
    let p = seed_professional(ctx.db(), user.user_id, "Dra. Ana").await;
    let event = EventService::create_event(
        &ctx.state,
        user.user_id,
        event_request("Consulta cardiologista", "2025-10-27", "09:00", "10:00", p.professional_id),
    )
    .await
    .unwrap();

    // Act
    let listed = NotificationService::list_active(&ctx.state, user.user_id)
        .await
        .unwrap();
    let notification_id = listed[0].notification_id;
    let foreign = NotificationService::mark_read(&ctx.state, stranger.user_id, notification_id).await;
    NotificationService::mark_read(&ctx.state, user.user_id, notification_id)
        .await
        .unwrap();
    let after = NotificationService::list_active(&ctx.state, user.user_id)
        .await
        .unwrap();

    // Assert
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].payload.event_id(), Some(event.event_id));
    assert!(listed[0].message.contains("Consulta cardiologista"));
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));
    assert!(after[0].is_read);
}

#[tokio::test]
async fn mark_read_of_missing_notification_should_be_not_found() {
    let ctx = setup().await;
    let user = seed_user(ctx.db(), "a@omni.test", UserRole::Receptor).await;

    let result = NotificationService::mark_read(&ctx.state, user.user_id, 42).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
