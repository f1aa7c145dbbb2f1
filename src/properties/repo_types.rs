use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::dates::optional_date;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Property {
    pub id: i64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub purchase_price: f64,
    pub estimated_value: Option<f64>,
    pub renovation_cost: Option<f64>,
    pub status: String,
    #[serde(default, with = "optional_date")]
    pub acquisition_date: Option<Date>,
    #[serde(default, with = "optional_date")]
    pub sale_date: Option<Date>,
    pub notes: Option<String>,
}
