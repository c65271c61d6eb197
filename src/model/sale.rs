use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::sale_product::SaleProduct;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Sale {
    pub id: String,
    /// The seller.
    pub user_id: String,
    #[schema(value_type = String, format = "date-time")]
    pub date_added: DateTime<Utc>,
}

/// A sale together with its line items. Produced only by the explicit
/// `get_with_lines` repository operation.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaleWithLines {
    pub sale: Sale,
    pub lines: Vec<SaleProduct>,
}
