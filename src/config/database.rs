use crate::domain::{
    event::entity::health_event, file::entity::file_info, notification::entity::notification,
    professional::entity::professional, report::entity::report, user::entity::user,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Schema, Statement};
use std::env;
use tracing::info;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    info!("Successfully connected to the database.");

    let should_update_schema = env::var("DB_SCHEMA_UPDATE")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid DB_SCHEMA_UPDATE value, defaulting to false. Use 'true' or 'false'."
            );
            false
        });

    if should_update_schema {
        sync_schema(&db).await?;
    } else {
        info!("Skipping database schema synchronization (DB_SCHEMA_UPDATE is not true).");
    }

    Ok(db)
}

/// Creates missing tables and indexes. Safe to run repeatedly.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Starting database schema synchronization...");

    // Parent first, then child (foreign keys)
    create_table_if_not_exists(db, &schema, user::Entity).await?;
    create_table_if_not_exists(db, &schema, professional::Entity).await?;
    create_table_if_not_exists(db, &schema, health_event::Entity).await?;
    create_table_if_not_exists(db, &schema, file_info::Entity).await?;
    create_table_if_not_exists(db, &schema, notification::Entity).await?;
    create_table_if_not_exists(db, &schema, report::Entity).await?;

    // One file per slot within an event. Orphans have a NULL event_id and are not constrained.
    create_index_if_not_exists(
        db,
        "uq_file_info_event_slot",
        "file_info",
        &["event_id", "slot"],
        true,
    )
    .await?;
    // Overlap lookups
    create_index_if_not_exists(
        db,
        "idx_health_event_professional_date",
        "health_event",
        &["professional_id", "date"],
        false,
    )
    .await?;
    create_index_if_not_exists(
        db,
        "idx_notification_user_archived",
        "notification",
        &["user_id", "is_archived"],
        false,
    )
    .await?;

    info!("Database schema synchronization completed.");
    Ok(())
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    index_name: &str,
    table_name: &str,
    columns: &[&str],
    unique: bool,
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let cols = columns.join(", ");
    let kind = if unique { "UNIQUE INDEX" } else { "INDEX" };
    let sql = format!("CREATE {} {} ON {} ({})", kind, index_name, table_name, cols);
    let stmt = Statement::from_string(backend, sql);
    match db.execute(stmt).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let err_str = e.to_string().to_lowercase();
            if err_str.contains("duplicate") || err_str.contains("already exists") {
                Ok(())
            } else {
                tracing::error!("Failed to create index {}: {}", index_name, e);
                Err(e)
            }
        }
    }
}

async fn create_table_if_not_exists<E>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr>
where
    E: sea_orm::EntityTrait,
{
    let backend = db.get_database_backend();
    let create_stmt: Statement =
        backend.build(schema.create_table_from_entity(entity).if_not_exists());

    db.execute(create_stmt).await.map(|_| ()).map_err(|e| {
        tracing::error!("Failed to create table {}: {}", entity.table_name(), e);
        e
    })
}
