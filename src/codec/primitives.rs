//! Codecs for JSON primitives.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::Codec;
use crate::control::Outcome;

impl Codec<String> {
    /// Accepts JSON strings.
    pub fn string() -> Self {
        Self::new(
            |value| match value {
                Value::String(text) => Outcome::success(text.clone()),
                _ => Outcome::failure("not a string".to_string()),
            },
            |text| Value::String(text.clone()),
        )
    }
}

impl Codec<f64> {
    /// Accepts JSON numbers as `f64`.
    ///
    /// Non-finite values cannot be represented in JSON and encode as `null`.
    pub fn number() -> Self {
        Self::new(
            |value| match value.as_f64() {
                Some(number) => Outcome::success(number),
                None => Outcome::failure("not a number".to_string()),
            },
            |number| serde_json::Number::from_f64(*number).map_or(Value::Null, Value::Number),
        )
    }
}

impl Codec<bool> {
    /// Accepts JSON booleans.
    pub fn boolean() -> Self {
        Self::new(
            |value| match value {
                Value::Bool(flag) => Outcome::success(*flag),
                _ => Outcome::failure("not a boolean".to_string()),
            },
            |flag| Value::Bool(*flag),
        )
    }
}

impl Codec<DateTime<Utc>> {
    /// Accepts RFC 3339 / ISO 8601 timestamps and normalizes them to UTC.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use stackless::codec::Codec;
    ///
    /// let date = Codec::date();
    /// let parsed = date.decode(&json!("2024-02-29T12:00:00+02:00")).success_value().unwrap();
    /// assert_eq!(date.encode(&parsed), json!("2024-02-29T10:00:00.000Z"));
    /// assert!(date.decode(&json!("yesterday")).is_failure());
    /// ```
    pub fn date() -> Self {
        Self::new(
            |value| {
                value
                    .as_str()
                    .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
                    .map_or_else(
                        || Outcome::failure("not an iso date".to_string()),
                        |parsed| Outcome::success(parsed.with_timezone(&Utc)),
                    )
            },
            |date| Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        )
    }
}
