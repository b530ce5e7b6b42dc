//! Strict numeric coercion of resolved setting values.

use core::error::Error;

use derive_more::Display;

use super::SettingsNode;

/// Why a resolved value could not be used as a number.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum CoercionError {
    #[display("expected a numeric string, got {kind}")]
    NotAString { kind: &'static str },
    #[display("cannot parse {raw:?} as a number: {reason}")]
    Unparseable { raw: String, reason: String },
    #[display("{raw:?} is not a finite number")]
    NotFinite { raw: String },
}

impl Error for CoercionError {}

/// Parses a string node as a base-10 float.
///
/// The cluster reports this setting as a numeric string, so only strings are
/// accepted. Numbers, booleans, maps and nulls are rejected rather than
/// guessed at.
pub fn coerce(value: &SettingsNode) -> Result<f64, CoercionError> {
    let SettingsNode::String(raw) = value else {
        return Err(CoercionError::NotAString { kind: value.kind() });
    };

    let parsed = raw
        .parse::<f64>()
        .map_err(|err| CoercionError::Unparseable {
            raw: raw.clone(),
            reason: err.to_string(),
        })?;

    if !parsed.is_finite() {
        return Err(CoercionError::NotFinite { raw: raw.clone() });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    fn string(s: &str) -> SettingsNode {
        SettingsNode::String(s.to_string())
    }

    #[test]
    fn numeric_string_is_accepted() {
        assert_eq!(coerce(&string("1000")), Ok(1000.0));
        assert_eq!(coerce(&string("2.5")), Ok(2.5));
        assert_eq!(coerce(&string("1e3")), Ok(1000.0));
    }

    #[test]
    fn real_number_is_rejected() {
        assert_eq!(
            coerce(&SettingsNode::Number(1000.0)),
            Err(CoercionError::NotAString { kind: "number" })
        );
    }

    #[test]
    fn other_types_are_rejected() {
        assert_eq!(
            coerce(&SettingsNode::Null),
            Err(CoercionError::NotAString { kind: "null" })
        );
        assert_eq!(
            coerce(&SettingsNode::Bool(true)),
            Err(CoercionError::NotAString { kind: "bool" })
        );
        assert!(coerce(&SettingsNode::Map(Default::default())).is_err());
    }

    #[test]
    fn garbage_string_is_rejected() {
        let err = coerce(&string("abc")).expect_err("abc is not a number");
        assert!(matches!(err, CoercionError::Unparseable { ref raw, .. } if raw == "abc"));
        assert!(coerce(&string("")).is_err());
        assert!(coerce(&string(" 1000")).is_err());
    }

    #[test]
    fn non_finite_is_rejected() {
        assert_eq!(
            coerce(&string("NaN")),
            Err(CoercionError::NotFinite {
                raw: "NaN".to_string()
            })
        );
        assert!(coerce(&string("inf")).is_err());
    }

    #[test]
    fn error_messages_are_readable() {
        assert_eq!(
            CoercionError::NotAString { kind: "bool" }.to_string(),
            "expected a numeric string, got bool"
        );
    }
}
