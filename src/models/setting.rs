use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::validation::ValidationErrors;
use crate::entities::ubiquo_settings;

/// Discriminator stored in `ubiquo_settings.setting_type` for integer settings.
pub const INTEGER_SETTING_TYPE: &str = "UbiquoIntegerSetting";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Stored value for setting '{context}.{key}' is not an integer: {raw}")]
pub struct CorruptSettingValue {
    pub context: String,
    pub key: String,
    pub raw: String,
}

/// A `context`/`key` setting whose value is an integer (or nil).
///
/// The value is kept in its serialized JSON form. Writes are validated to be
/// integers; reads of anything else fail with [`CorruptSettingValue`] rather
/// than being coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegerSetting {
    pub id: Option<i32>,
    pub context: String,
    pub key: String,
    raw_value: Option<String>,
    pub allow_nil: bool,
}

impl IntegerSetting {
    #[must_use]
    pub fn new(context: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: None,
            context: context.into(),
            key: key.into(),
            raw_value: None,
            allow_nil: true,
        }
    }

    #[must_use]
    pub fn from_model(model: ubiquo_settings::Model) -> Self {
        Self {
            id: Some(model.id),
            context: model.context,
            key: model.key,
            raw_value: model.value,
            allow_nil: model.allow_nil,
        }
    }

    /// Serialized value as stored.
    #[must_use]
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    /// Candidate value in JSON form, before validation.
    #[must_use]
    pub fn candidate(&self) -> Value {
        self.raw_value
            .as_deref()
            .map_or(Value::Null, |raw| {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            })
    }

    pub fn set_value(&mut self, value: Option<i64>) {
        self.raw_value = value.map(|v| v.to_string());
    }

    /// Stores `value` as-is; [`IntegerSetting::validate`] decides whether it
    /// may be persisted.
    pub fn set_raw_value(&mut self, value: &Value) {
        self.raw_value = match value {
            Value::Null => None,
            other => Some(other.to_string()),
        };
    }

    /// Reads the stored value. Blank means nil; a JSON integer or a string
    /// holding a base-10 integer (`"42"`) reads back as that integer.
    pub fn value(&self) -> Result<Option<i64>, CorruptSettingValue> {
        let Some(raw) = self.raw_value.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        let parsed = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) => return Ok(None),
            Ok(Value::Number(n)) => n.as_i64(),
            Ok(Value::String(s)) => s.trim().parse::<i64>().ok(),
            Ok(_) => None,
            Err(_) => raw.parse::<i64>().ok(),
        };

        parsed.map(Some).ok_or_else(|| CorruptSettingValue {
            context: self.context.clone(),
            key: self.key.clone(),
            raw: raw.to_string(),
        })
    }

    /// True iff every value is null or a native integer that fits in `i64`.
    /// Numeric strings, floats and integers above `i64::MAX` are rejected.
    #[must_use]
    pub fn check_values(values: &[Value]) -> bool {
        values.iter().all(|v| match v {
            Value::Null => true,
            Value::Number(n) => n.is_i64(),
            _ => false,
        })
    }

    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.context.trim().is_empty() {
            errors.add("context", "can't be blank");
        }
        if self.key.trim().is_empty() {
            errors.add("key", "can't be blank");
        }

        match self.candidate() {
            Value::Null if !self.allow_nil => errors.add("value", "can't be blank"),
            Value::Null => {}
            Value::Number(n) if n.is_i64() => {}
            Value::Number(n) if n.is_u64() => errors.add("value", "is out of range"),
            Value::Number(_) => errors.add("value", "must be an integer"),
            _ => errors.add("value", "is not a number"),
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_raw(raw: Option<&str>) -> IntegerSetting {
        IntegerSetting {
            raw_value: raw.map(str::to_string),
            ..IntegerSetting::new("ubiquo_core", "items_per_page")
        }
    }

    #[test]
    fn test_value_reads_integers() {
        assert_eq!(with_raw(Some("42")).value(), Ok(Some(42)));
        assert_eq!(with_raw(Some("\"42\"")).value(), Ok(Some(42)));
        assert_eq!(with_raw(Some("-7")).value(), Ok(Some(-7)));
        assert_eq!(with_raw(None).value(), Ok(None));
        assert_eq!(with_raw(Some("")).value(), Ok(None));
        assert_eq!(with_raw(Some("null")).value(), Ok(None));
    }

    #[test]
    fn test_value_fails_loudly_on_corrupt_content() {
        let err = with_raw(Some("\"abc\"")).value().unwrap_err();
        assert_eq!(err.key, "items_per_page");
        assert_eq!(err.raw, "\"abc\"");
        assert!(with_raw(Some("1.5")).value().is_err());
        assert!(with_raw(Some("true")).value().is_err());
        assert!(with_raw(Some("abc")).value().is_err());
    }

    #[test]
    fn test_check_values() {
        assert!(IntegerSetting::check_values(&[json!(1), Value::Null, json!(2)]));
        assert!(IntegerSetting::check_values(&[]));
        assert!(!IntegerSetting::check_values(&[json!(1.5)]));
        assert!(!IntegerSetting::check_values(&[json!("3")]));
        assert!(!IntegerSetting::check_values(&[json!(1), json!(true)]));
        assert!(!IntegerSetting::check_values(&[json!(1), json!(u64::MAX)]));
        assert!(IntegerSetting::check_values(&[json!(i64::MIN), json!(i64::MAX)]));
    }

    #[test]
    fn test_validate() {
        let mut setting = IntegerSetting::new("ubiquo_core", "items_per_page");
        setting.set_value(Some(10));
        assert!(setting.validate().is_empty());
        assert_eq!(setting.value(), Ok(Some(10)));

        setting.set_value(None);
        assert!(setting.validate().is_empty());

        setting.allow_nil = false;
        assert_eq!(setting.validate().on("value"), vec!["can't be blank"]);

        setting.set_raw_value(&json!(2.5));
        assert_eq!(setting.validate().on("value"), vec!["must be an integer"]);

        setting.set_raw_value(&json!("ten"));
        assert_eq!(setting.validate().on("value"), vec!["is not a number"]);

        setting.set_raw_value(&json!(7));
        assert!(setting.validate().is_empty());
    }

    #[test]
    fn test_validate_requires_context_and_key() {
        let setting = IntegerSetting::new(" ", "");
        let errors = setting.validate();
        assert_eq!(errors.on("context"), vec!["can't be blank"]);
        assert_eq!(errors.on("key"), vec!["can't be blank"]);
    }
}
