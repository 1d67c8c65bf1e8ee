use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One logged request for a path, owned by the user who made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedPath {
    pub path: String,
    pub date: DateTime<Utc>,
    pub user_id: u32,
}

impl VisitedPath {
    /// Record a visit happening now. Truncated to microseconds, the
    /// resolution of a PostgreSQL TIMESTAMPTZ.
    pub fn now(path: impl Into<String>, user_id: u32) -> Self {
        Self {
            path: path.into(),
            date: Utc::now().trunc_subsecs(6),
            user_id,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct VisitedPathRow {
    pub path: String,
    pub visit_date: DateTime<Utc>,
    pub user_id: i32,
}

impl TryFrom<VisitedPathRow> for VisitedPath {
    type Error = String;

    fn try_from(row: VisitedPathRow) -> Result<Self, Self::Error> {
        let user_id = u32::try_from(row.user_id)
            .map_err(|_| format!("negative user id {} in visitedpaths table", row.user_id))?;
        Ok(VisitedPath {
            path: row.path,
            date: row.visit_date,
            user_id,
        })
    }
}
