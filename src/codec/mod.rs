//! Codecs between opaque JSON values and typed data.
//!
//! A [`Codec<A>`] pairs a decoder, which inspects an untyped
//! [`serde_json::Value`] and reports either an `A` or a message, with the
//! inverse encoder. Decoding failures are plain [`Outcome::Failure`] strings,
//! so decoded fields can be validated together with
//! [`ValidateAll`](crate::control::ValidateAll).
//!
//! # Examples
//!
//! ```rust
//! use stackless::codec::Codec;
//! use stackless::control::{Outcome, ValidateAll};
//! use stackless::typeclass::separated_by;
//!
//! let name = Codec::string().from_json(r#""Ada""#);
//! let age = Codec::number().from_json(r#""thirty-six""#);
//!
//! assert_eq!(
//!     (name, age).validate_all(separated_by(" | ")),
//!     Outcome::failure("not a number".to_string())
//! );
//! ```

mod error;
mod primitives;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::control::Outcome;

pub use error::CodecError;

type Decoder<A> = Arc<dyn Fn(&Value) -> Outcome<String, A> + Send + Sync>;
type Encoder<A> = Arc<dyn Fn(&A) -> Value + Send + Sync>;

/// A decoder from JSON values to `A` paired with the inverse encoder.
///
/// Codecs are cheap to clone and can be shared between threads.
pub struct Codec<A> {
    decoder: Decoder<A>,
    encoder: Encoder<A>,
}

impl<A> Clone for Codec<A> {
    fn clone(&self) -> Self {
        Self {
            decoder: Arc::clone(&self.decoder),
            encoder: Arc::clone(&self.encoder),
        }
    }
}

impl<A> Codec<A> {
    /// Builds a codec from a decoding and an encoding function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::{Value, json};
    /// use stackless::codec::Codec;
    /// use stackless::control::Outcome;
    ///
    /// let port = Codec::new(
    ///     |value: &Value| match value.as_u64().and_then(|n| u16::try_from(n).ok()) {
    ///         Some(port) => Outcome::success(port),
    ///         None => Outcome::failure("not a port".to_string()),
    ///     },
    ///     |port: &u16| json!(port),
    /// );
    /// assert_eq!(port.decode(&json!(8080)), Outcome::success(8080));
    /// assert_eq!(port.decode(&json!(70000)), Outcome::failure("not a port".to_string()));
    /// ```
    pub fn new<D, E>(decode: D, encode: E) -> Self
    where
        D: Fn(&Value) -> Outcome<String, A> + Send + Sync + 'static,
        E: Fn(&A) -> Value + Send + Sync + 'static,
    {
        Self {
            decoder: Arc::new(decode),
            encoder: Arc::new(encode),
        }
    }

    /// Decodes an untyped value.
    pub fn decode(&self, value: &Value) -> Outcome<String, A> {
        (self.decoder)(value)
    }

    /// Encodes a typed value.
    pub fn encode(&self, value: &A) -> Value {
        (self.encoder)(value)
    }

    /// Parses `text` as JSON and decodes the result.
    ///
    /// Malformed JSON becomes a failure carrying the parser's message.
    pub fn from_json(&self, text: &str) -> Outcome<String, A> {
        Outcome::from(serde_json::from_str::<Value>(text).map_err(CodecError::from))
            .map_failure(|error| error.to_string())
            .flat_map(|value| self.decode(&value))
    }

    /// Encodes `value` and serializes it as compact JSON text.
    pub fn to_json(&self, value: &A) -> String {
        self.encode(value).to_string()
    }
}

impl<A> fmt::Debug for Codec<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Codec")
            .field("decoded", &std::any::type_name::<A>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn even() -> Codec<i64> {
        Codec::new(
            |value: &Value| match value.as_i64() {
                Some(number) if number % 2 == 0 => Outcome::success(number),
                _ => Outcome::failure("not an even integer".to_string()),
            },
            |number: &i64| json!(number),
        )
    }

    #[rstest]
    fn from_json_parses_then_decodes() {
        assert_eq!(even().from_json("4"), Outcome::success(4));
        assert_eq!(
            even().from_json("3"),
            Outcome::failure("not an even integer".to_string())
        );
    }

    #[rstest]
    fn from_json_reports_syntax_errors() {
        let Outcome::Failure(message) = even().from_json("{") else {
            panic!("malformed JSON must fail");
        };
        assert!(message.starts_with("invalid JSON:"), "{message}");
    }

    #[rstest]
    fn to_json_uses_the_encoder() {
        assert_eq!(even().to_json(&12), "12");
    }

    #[rstest]
    fn debug_names_the_decoded_type() {
        assert!(format!("{:?}", even()).contains("i64"));
    }
}
