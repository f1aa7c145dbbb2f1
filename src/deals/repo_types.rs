use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::dates::optional_date;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Deal {
    pub id: i64,
    pub property_address: String,
    pub purchase_price: f64,
    pub estimated_value: Option<f64>,
    pub renovation_cost: Option<f64>,
    pub status: String,
    #[serde(default, with = "optional_date")]
    pub closing_date: Option<Date>,
    pub investor_id: Option<i64>,
    pub notes: Option<String>,
}
