use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Investor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub total_investment: f64,
}
