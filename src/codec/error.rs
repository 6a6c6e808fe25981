//! Error types for the codec module.

use thiserror::Error;

/// Represents failures that happen before a value reaches a decoder.
///
/// Decoders themselves report plain strings; this type only wraps the
/// JSON layer so the message has a stable prefix.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input text was not valid JSON.
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn syntax_error_keeps_the_source() {
        use std::error::Error;

        let parse_error = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        let error = CodecError::from(parse_error);
        assert!(error.to_string().starts_with("invalid JSON: "));
        assert!(error.source().is_some());
    }
}
