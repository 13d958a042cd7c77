//! On-chain account addresses.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Error returned when an address string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("address is empty")]
    Empty,

    #[error("address has {0} hex digits, at most 64 allowed")]
    TooLong(usize),

    #[error("address contains non-hex characters: {0}")]
    InvalidHex(String),
}

/// A 32-byte account address.
///
/// Accepts the short form (`0x1`) as well as the full 64-digit form and always
/// displays the full form, which is what the node returns in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    /// The framework address `0x1`.
    pub const ONE: Self = {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = 1;
        Self(bytes)
    };

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Long-form hex with `0x` prefix.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);

        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressParseError::TooLong(digits.len()));
        }

        // Left-pad to an even 64-digit string before decoding.
        let padded = format!("{:0>64}", digits);
        let decoded =
            hex::decode(&padded).map_err(|_| AddressParseError::InvalidHex(s.to_string()))?;

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_literal())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_long_forms_are_equal() {
        let short: AccountAddress = "0x1".parse().unwrap();
        let long: AccountAddress =
            "0x0000000000000000000000000000000000000000000000000000000000000001"
                .parse()
                .unwrap();
        assert_eq!(short, long);
        assert_eq!(short, AccountAddress::ONE);
    }

    #[test]
    fn test_display_is_long_form() {
        let addr: AccountAddress = "cafe".parse().unwrap();
        assert_eq!(
            addr.to_string(),
            "0x000000000000000000000000000000000000000000000000000000000000cafe"
        );
    }

    #[test]
    fn test_odd_length_is_padded() {
        let addr: AccountAddress = "0xabc".parse().unwrap();
        assert_eq!(addr.as_bytes()[30], 0x0a);
        assert_eq!(addr.as_bytes()[31], 0xbc);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!("0x".parse::<AccountAddress>(), Err(AddressParseError::Empty));
        assert!(matches!(
            "0xzz".parse::<AccountAddress>(),
            Err(AddressParseError::InvalidHex(_))
        ));
        let too_long = format!("0x{}", "1".repeat(65));
        assert_eq!(
            too_long.parse::<AccountAddress>(),
            Err(AddressParseError::TooLong(65))
        );
    }

    #[test]
    fn test_serde_as_string() {
        let addr: AccountAddress = "0x1".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(
            json,
            "\"0x0000000000000000000000000000000000000000000000000000000000000001\""
        );
        let back: AccountAddress = serde_json::from_str("\"0x1\"").unwrap();
        assert_eq!(back, addr);
    }
}
