pub mod config;
pub mod domain;
pub mod global;
pub mod state;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::file::storage::PUBLIC_PATH_PREFIX;
use crate::global::middleware::request_id_middleware;
use crate::global::rate_limit::upload_rate_limit;
pub use crate::state::AppState;

/// Room for multipart boundaries and the text fields around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        domain::health::handler::health_check,
        domain::user::handler::get_me,
        domain::event::handler::create_event,
        domain::event::handler::list_events,
        domain::event::handler::get_event,
        domain::event::handler::update_event,
        domain::event::handler::delete_event,
        domain::file::handler::upload_file,
        domain::file::handler::list_orphaned_files,
        domain::file::handler::attach_file,
        domain::file::handler::delete_file,
        domain::professional::handler::create_professional,
        domain::professional::handler::list_professionals,
        domain::professional::handler::update_professional,
        domain::professional::handler::delete_professional,
        domain::notification::handler::list_notifications,
        domain::notification::handler::mark_notification_read,
        domain::report::handler::send_report,
        domain::report::handler::list_received_reports,
        domain::report::handler::list_sent_reports,
        domain::report::handler::mark_report_viewed,
    ),
    components(
        schemas(
            domain::health::dto::HealthStatus,
            domain::health::dto::HealthState,
            domain::health::dto::HealthChecks,
            domain::health::dto::CheckResult,
            domain::user::dto::UserResponse,
            domain::user::entity::user::UserRole,
            domain::event::dto::EventRequest,
            domain::event::dto::EventResponse,
            domain::event::dto::DeleteEventResponse,
            domain::event::entity::health_event::EventType,
            domain::file::dto::FileInfoResponse,
            domain::file::dto::UploadFileForm,
            domain::file::dto::AttachFileRequest,
            domain::file::entity::file_info::FileSlot,
            domain::professional::dto::ProfessionalRequest,
            domain::professional::dto::ProfessionalResponse,
            domain::notification::dto::NotificationResponse,
            domain::report::dto::CreateReportRequest,
            domain::report::dto::ReportResponse,
            domain::report::entity::report::ReportStatus,
            utils::response::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Estado do servidor"),
        (name = "User", description = "Usuário autenticado"),
        (name = "Event", description = "Eventos de saúde (agenda)"),
        (name = "File", description = "Arquivos e anexos"),
        (name = "Professional", description = "Profissionais de saúde"),
        (name = "Notification", description = "Notificações"),
        (name = "Report", description = "Laudos")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn app(state: AppState) -> Router {
    let upload_body_limit = usize::try_from(state.config.upload.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let upload_routes = Router::new()
        .route("/api/v1/files", post(domain::file::handler::upload_file))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            upload_rate_limit,
        ))
        .layer(DefaultBodyLimit::max(upload_body_limit));

    let api_routes = Router::new()
        .route("/api/v1/users/me", get(domain::user::handler::get_me))
        .route(
            "/api/v1/events",
            post(domain::event::handler::create_event).get(domain::event::handler::list_events),
        )
        .route(
            "/api/v1/events/:event_id",
            get(domain::event::handler::get_event)
                .put(domain::event::handler::update_event)
                .delete(domain::event::handler::delete_event),
        )
        .route(
            "/api/v1/files/orphaned",
            get(domain::file::handler::list_orphaned_files),
        )
        .route(
            "/api/v1/files/:file_id/attach",
            post(domain::file::handler::attach_file),
        )
        .route(
            "/api/v1/files/:file_id",
            axum::routing::delete(domain::file::handler::delete_file),
        )
        .route(
            "/api/v1/professionals",
            post(domain::professional::handler::create_professional)
                .get(domain::professional::handler::list_professionals),
        )
        .route(
            "/api/v1/professionals/:professional_id",
            put(domain::professional::handler::update_professional)
                .delete(domain::professional::handler::delete_professional),
        )
        .route(
            "/api/v1/notifications",
            get(domain::notification::handler::list_notifications),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            patch(domain::notification::handler::mark_notification_read),
        )
        .route("/api/v1/reports", post(domain::report::handler::send_report))
        .route(
            "/api/v1/reports/received",
            get(domain::report::handler::list_received_reports),
        )
        .route(
            "/api/v1/reports/sent",
            get(domain::report::handler::list_sent_reports),
        )
        .route(
            "/api/v1/reports/:report_id/view",
            patch(domain::report::handler::mark_report_viewed),
        );

    let uploads_dir = ServeDir::new(&state.config.upload.upload_dir);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(domain::health::health_check))
        .merge(upload_routes)
        .merge(api_routes)
        .nest_service(PUBLIC_PATH_PREFIX, uploads_dir)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
