//! In-process store used when no `DATABASE_URL` is configured and in tests.
//! Enforces the same uniqueness and investor-reference rules as the schema.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    deals::{
        dto::{DealCreate, DealUpdate},
        repo::{DealRepo, UNKNOWN_INVESTOR},
        repo_types::Deal,
    },
    error::{AppError, AppResult},
    investors::{
        dto::InvestorCreate,
        repo::{InvestorRepo, DUPLICATE_EMAIL},
        repo_types::Investor,
    },
    properties::{dto::PropertyCreate, repo::PropertyRepo, repo_types::Property},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    properties: Vec<Property>,
    investors: Vec<Investor>,
    deals: Vec<Deal>,
    last_user_id: i64,
    last_property_id: i64,
    last_investor_id: i64,
    last_deal_id: i64,
}

impl Tables {
    fn check_investor(&self, investor_id: Option<i64>) -> AppResult<()> {
        match investor_id {
            Some(id) if !self.investors.iter().any(|i| i.id == id) => {
                Err(AppError::Validation(UNKNOWN_INVESTOR.into()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(AppError::DuplicateEmail);
        }
        if t.users.iter().any(|u| u.username == new.username) {
            return Err(AppError::DuplicateUsername);
        }
        t.last_user_id += 1;
        let user = User {
            id: t.last_user_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
        };
        t.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PropertyRepo for MemoryStore {
    async fn create(&self, p: PropertyCreate) -> AppResult<Property> {
        let mut t = self.tables.write().await;
        t.last_property_id += 1;
        let property = Property {
            id: t.last_property_id,
            address: p.address,
            city: p.city,
            state: p.state,
            zip_code: p.zip_code,
            purchase_price: p.purchase_price,
            estimated_value: p.estimated_value,
            renovation_cost: p.renovation_cost,
            status: p.status,
            acquisition_date: p.acquisition_date,
            sale_date: p.sale_date,
            notes: p.notes,
        };
        t.properties.push(property.clone());
        Ok(property)
    }

    async fn list(&self) -> AppResult<Vec<Property>> {
        Ok(self.tables.read().await.properties.clone())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Property>> {
        let t = self.tables.read().await;
        Ok(t.properties.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl InvestorRepo for MemoryStore {
    async fn create(&self, input: InvestorCreate) -> AppResult<Investor> {
        let mut t = self.tables.write().await;
        if t.investors.iter().any(|i| i.email == input.email) {
            return Err(AppError::Validation(DUPLICATE_EMAIL.into()));
        }
        t.last_investor_id += 1;
        let investor = Investor {
            id: t.last_investor_id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            total_investment: input.total_investment,
        };
        t.investors.push(investor.clone());
        Ok(investor)
    }

    async fn list(&self) -> AppResult<Vec<Investor>> {
        Ok(self.tables.read().await.investors.clone())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Investor>> {
        let t = self.tables.read().await;
        Ok(t.investors.iter().find(|i| i.id == id).cloned())
    }
}

#[async_trait]
impl DealRepo for MemoryStore {
    async fn create(&self, d: DealCreate) -> AppResult<Deal> {
        let mut t = self.tables.write().await;
        t.check_investor(d.investor_id)?;
        t.last_deal_id += 1;
        let deal = Deal {
            id: t.last_deal_id,
            property_address: d.property_address,
            purchase_price: d.purchase_price,
            estimated_value: d.estimated_value,
            renovation_cost: d.renovation_cost,
            status: d.status,
            closing_date: d.closing_date,
            investor_id: d.investor_id,
            notes: d.notes,
        };
        t.deals.push(deal.clone());
        Ok(deal)
    }

    async fn list(&self) -> AppResult<Vec<Deal>> {
        Ok(self.tables.read().await.deals.clone())
    }

    async fn list_by_investor(&self, investor_id: i64) -> AppResult<Vec<Deal>> {
        let t = self.tables.read().await;
        Ok(t.deals
            .iter()
            .filter(|d| d.investor_id == Some(investor_id))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Deal>> {
        let t = self.tables.read().await;
        Ok(t.deals.iter().find(|d| d.id == id).cloned())
    }

    async fn update(&self, id: i64, changes: DealUpdate) -> AppResult<Option<Deal>> {
        let mut t = self.tables.write().await;
        let Some(idx) = t.deals.iter().position(|d| d.id == id) else {
            return Ok(None);
        };
        t.check_investor(changes.new_investor_id())?;
        let deal = &mut t.deals[idx];
        changes.apply(deal);
        Ok(Some(deal.clone()))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.deals.len();
        t.deals.retain(|d| d.id != id);
        Ok(t.deals.len() < before)
    }
}
