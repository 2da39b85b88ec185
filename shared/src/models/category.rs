//! Category Model

use serde::{Deserialize, Serialize};

/// Product category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub org_id: String,
    pub name: String,
}
