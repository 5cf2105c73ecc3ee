/// Aggregations behind the admin history view

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Table whose rows are counted per creation day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedTable {
    Users,
    Posts,
    Comments,
}

impl CountedTable {
    fn table_name(&self) -> &'static str {
        match self {
            CountedTable::Users => "users",
            CountedTable::Posts => "posts",
            CountedTable::Comments => "comments",
        }
    }
}

/// Rows created on one UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyCount {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: i64,
}

/// Number of role assignments per role name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

/// Per-day creation counts for `table`, oldest day first
pub async fn daily_counts(pool: &PgPool, table: CountedTable) -> Result<Vec<DailyCount>, sqlx::Error> {
    let query = format!(
        "SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS date, COUNT(*) AS count \
         FROM {} GROUP BY 1 ORDER BY 1",
        table.table_name()
    );

    sqlx::query_as::<_, DailyCount>(&query).fetch_all(pool).await
}

/// Counts the accounts holding each role, resolved to role names
///
/// An account counts once per role even if its code list repeats it.
/// Codes with no matching row in `roles` are left out.
pub async fn role_distribution(pool: &PgPool) -> Result<Vec<RoleCount>, sqlx::Error> {
    sqlx::query_as::<_, RoleCount>(
        r#"
        SELECT r.name AS role, COUNT(*) AS count
        FROM (
            SELECT DISTINCT a.id, held.code
            FROM auths a
            CROSS JOIN LATERAL UNNEST(a.roles) AS held(code)
        ) AS holding
        JOIN roles r ON r.code = holding.code
        GROUP BY r.name, r.code
        ORDER BY r.code
        "#,
    )
    .fetch_all(pool)
    .await
}
