use serde::Deserialize;

/// Request body for `POST /investors/`.
#[derive(Debug, Clone, Deserialize)]
pub struct InvestorCreate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub total_investment: f64,
}
