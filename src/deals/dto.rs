use serde::{Deserialize, Deserializer};
use time::Date;

use super::repo_types::Deal;
use crate::dates::optional_date;

/// Request body for `POST /deals/`.
#[derive(Debug, Clone, Deserialize)]
pub struct DealCreate {
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

/// Request body for `PUT /deals/:id`.
///
/// Required columns are `Option<T>`: absent keeps the stored value. Nullable
/// columns are `Option<Option<T>>`: absent keeps, `null` clears, a value sets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealUpdate {
    pub property_address: Option<String>,
    pub purchase_price: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub estimated_value: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub renovation_cost: Option<Option<f64>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable_date")]
    pub closing_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "nullable")]
    pub investor_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

// Only runs when the key is present, so `null` becomes `Some(None)`.
fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

fn nullable_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<Date>>, D::Error> {
    optional_date::deserialize(d).map(Some)
}

impl DealUpdate {
    /// Investor the deal will point at after the update, if one is being set.
    pub fn new_investor_id(&self) -> Option<i64> {
        self.investor_id.flatten()
    }

    pub fn apply(self, deal: &mut Deal) {
        if let Some(v) = self.property_address {
            deal.property_address = v;
        }
        if let Some(v) = self.purchase_price {
            deal.purchase_price = v;
        }
        if let Some(v) = self.estimated_value {
            deal.estimated_value = v;
        }
        if let Some(v) = self.renovation_cost {
            deal.renovation_cost = v;
        }
        if let Some(v) = self.status {
            deal.status = v;
        }
        if let Some(v) = self.closing_date {
            deal.closing_date = v;
        }
        if let Some(v) = self.investor_id {
            deal.investor_id = v;
        }
        if let Some(v) = self.notes {
            deal.notes = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal() -> Deal {
        Deal {
            id: 1,
            property_address: "1 Main St".into(),
            purchase_price: 100_000.0,
            estimated_value: Some(150_000.0),
            renovation_cost: None,
            status: "open".into(),
            closing_date: None,
            investor_id: Some(3),
            notes: Some("first".into()),
        }
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut d = deal();
        let update: DealUpdate =
            serde_json::from_str(r#"{"status":"closed","closing_date":"2024-05-01"}"#).unwrap();
        update.apply(&mut d);
        assert_eq!(d.status, "closed");
        assert_eq!(d.closing_date, Some(time::macros::date!(2024 - 05 - 01)));
        assert_eq!(d.property_address, "1 Main St");
        assert_eq!(d.estimated_value, Some(150_000.0));
        assert_eq!(d.investor_id, Some(3));
        assert_eq!(d.notes.as_deref(), Some("first"));
    }

    #[test]
    fn explicit_null_clears_nullable_fields() {
        let mut d = deal();
        d.closing_date = Some(time::macros::date!(2024 - 05 - 01));
        let update: DealUpdate = serde_json::from_str(
            r#"{"estimated_value":null,"closing_date":null,"investor_id":null,"notes":null}"#,
        )
        .unwrap();
        assert_eq!(update.investor_id, Some(None));
        assert_eq!(update.new_investor_id(), None);
        update.apply(&mut d);
        assert_eq!(d.estimated_value, None);
        assert_eq!(d.closing_date, None);
        assert_eq!(d.investor_id, None);
        assert_eq!(d.notes, None);
        assert_eq!(d.status, "open");
        assert_eq!(d.purchase_price, 100_000.0);
    }

    #[test]
    fn value_sets_and_absent_keeps() {
        let mut d = deal();
        let update: DealUpdate =
            serde_json::from_str(r#"{"investor_id":7,"renovation_cost":5000.5}"#).unwrap();
        assert_eq!(update.new_investor_id(), Some(7));
        assert_eq!(update.notes, None);
        update.apply(&mut d);
        assert_eq!(d.investor_id, Some(7));
        assert_eq!(d.renovation_cost, Some(5000.5));
        assert_eq!(d.notes.as_deref(), Some("first"));
        assert_eq!(d.estimated_value, Some(150_000.0));
    }

    #[test]
    fn null_date_is_not_confused_with_bad_date() {
        assert!(serde_json::from_str::<DealUpdate>(r#"{"closing_date":"2024-13-01"}"#).is_err());
    }

    #[test]
    fn empty_update_is_noop() {
        let mut d = deal();
        DealUpdate::default().apply(&mut d);
        assert_eq!(d, deal());
    }
}
