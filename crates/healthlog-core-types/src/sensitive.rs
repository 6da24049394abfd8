//! Redaction wrapper for phone numbers and gateway credentials
//!
//! Anything wrapped in `Sensitive<T>` prints as a fixed marker in both
//! `Debug` and `Display`, so configs and contexts can be logged whole.

use std::fmt;

use serde::{Deserialize, Deserializer};

const REDACTED: &str = "***REDACTED***";

/// Value that must not reach log output in clear
///
/// # Example
///
/// ```
/// use healthlog_core_types::Sensitive;
///
/// let token = Sensitive::new("auth-token");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(token.expose(), &"auth-token");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the clear value, e.g. to build a gateway request
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

/// Transparent, so config files hold the clear value. There is no `Serialize`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_transparently() {
        let token: Sensitive<String> = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(token.expose(), "abc");
        assert_eq!(token.to_string(), "***REDACTED***");
    }

    #[test]
    fn test_phone_number_is_redacted() {
        let phone = Sensitive::new("+15550100".to_string());
        assert_eq!(format!("{:?}", phone), REDACTED);
        assert_eq!(format!("{}", phone), REDACTED);
        assert_eq!(phone.expose(), "+15550100");
    }

    #[test]
    fn test_redacted_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Gateway {
            account_sid: String,
            auth_token: Sensitive<String>,
        }

        let gw = Gateway {
            account_sid: "AC1".to_string(),
            auth_token: Sensitive::new("tok-123".to_string()),
        };
        let debug = format!("{:?}", gw);
        assert!(debug.contains("AC1"));
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn test_into_inner() {
        let s: Sensitive<String> = "x".to_string().into();
        assert_eq!(s.into_inner(), "x");
    }
}
