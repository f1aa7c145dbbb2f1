//! `YYYY-MM-DD` (de)serialization for optional calendar dates.

pub mod optional_date {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => {
                let text = d
                    .format(format_description!("[year]-[month]-[day]"))
                    .map_err(ser::Error::custom)?;
                s.serialize_some(&text)
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|text| {
                Date::parse(&text, format_description!("[year]-[month]-[day]"))
                    .map_err(de::Error::custom)
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::{macros::date, Date};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        #[serde(default, with = "super::optional_date")]
        on: Option<Date>,
    }

    #[test]
    fn formats_as_plain_iso_date() {
        let json = serde_json::to_string(&Row { on: Some(date!(2024 - 03 - 07)) }).unwrap();
        assert_eq!(json, r#"{"on":"2024-03-07"}"#);
    }

    #[test]
    fn missing_and_null_are_none() {
        let a: Row = serde_json::from_str("{}").unwrap();
        let b: Row = serde_json::from_str(r#"{"on":null}"#).unwrap();
        assert_eq!(a.on, None);
        assert_eq!(b.on, None);
    }

    #[test]
    fn rejects_bad_date() {
        assert!(serde_json::from_str::<Row>(r#"{"on":"2024-13-01"}"#).is_err());
    }
}
