//! Read-only catalog queries. The pipeline never writes to `tools`.

use sqlx::PgPool;

use crate::DbError;

/// A row from the `tools` catalog table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ToolRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub status: String,
}

/// Fetches every catalog tool with `status = 'active'`, the only rows
/// eligible for deal matching.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_tools(pool: &PgPool) -> Result<Vec<ToolRow>, DbError> {
    let rows = sqlx::query_as::<_, ToolRow>(
        "SELECT id, name, slug, status \
         FROM tools \
         WHERE status = 'active' \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
