use chrono::Local;
use sea_orm::{prelude::{DateTimeWithTimeZone, Decimal}, ActiveValue::{self, NotSet, Set}, Value};
use serde::{Deserialize, Deserializer};

use crate::error::{LedgerError, Result};

pub fn now() -> DateTimeWithTimeZone {
    Local::now().fixed_offset()
}

/// Pair with `#[serde(default, deserialize_with = "deserialize_some")]` on an `Option<Option<T>>`
/// field so that an absent key stays `None` while an explicit `null` becomes `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Absent patch fields leave the column untouched
pub fn patch<V: Into<Value>>(value: Option<V>) -> ActiveValue<V> {
    match value {
        Some(value) => Set(value),
        None => NotSet,
    }
}

pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!("`{field}` is required")));
    }

    Ok(())
}

pub fn require_positive(field: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!("`{field}` must be greater than zero")));
    }

    Ok(())
}

pub fn require_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(LedgerError::Validation(format!("`{field}` cannot be negative")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        termination_date: Option<Option<NaiveDate>>,
    }

    #[test]
    fn test_deserialize_some() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.termination_date, None);

        let null: Patch = serde_json::from_str(r#"{"termination_date":null}"#).unwrap();
        assert_eq!(null.termination_date, Some(None));

        let value: Patch = serde_json::from_str(r#"{"termination_date":"2025-03-31"}"#).unwrap();
        assert_eq!(value.termination_date, Some(Some(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())));
    }

    #[test]
    fn test_patch() {
        assert_eq!(patch(Some(10_i32)), Set(10));
        assert_eq!(patch::<i32>(None), NotSet);
        assert_eq!(patch(Some(None::<String>)), Set(None));
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("code", "INSS").is_ok());
        assert!(matches!(require_text("code", "   "), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_amount_checks() {
        assert!(require_positive("value", Decimal::new(15000, 2)).is_ok());
        assert!(require_positive("value", Decimal::ZERO).is_err());
        assert!(require_non_negative("base_salary", Decimal::ZERO).is_ok());
        assert!(require_non_negative("base_salary", Decimal::new(-1, 0)).is_err());
    }
}
