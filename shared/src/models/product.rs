//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (frames, lenses, contact lenses, accessories, services)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub org_id: String,
    pub name: String,
    /// Category reference, `None` for uncategorized products
    pub category_id: Option<i64>,
}
