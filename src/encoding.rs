//! Textual codecs for the identifiers and amounts that flow through
//! console commands: 20-byte hex addresses and arbitrary-precision
//! smallest-unit amounts.

use num_bigint::BigUint;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ADDRESS_LEN: usize = 20;
/// `0x` prefix plus 40 hex characters.
pub const ADDRESS_STR_LEN: usize = 2 + ADDRESS_LEN * 2;

/// Smallest-unit to display-unit divisor.
pub fn display_scale() -> BigUint {
    BigUint::from(10u64).pow(12)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid address '{0}': expected 0x followed by 40 hex characters")]
    AddressFormat(String),
    #[error("invalid address '{0}': not valid lower-case hex")]
    AddressHex(String),
    #[error("invalid amount '{0}': not a base-10 number")]
    Amount(String),
}

/// A fixed 20-byte account address, rendered as `0x` + lower-case hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, CodecError> {
        if s.len() != ADDRESS_STR_LEN || !s.starts_with("0x") {
            return Err(CodecError::AddressFormat(s.to_string()));
        }
        let digits = &s[2..];
        // Canonical shape is lower-case; upper-case hex is not round-trippable.
        if digits.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(CodecError::AddressHex(s.to_string()));
        }
        let raw = hex::decode(digits).map_err(|_| CodecError::AddressHex(s.to_string()))?;
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Address(bytes))
    }
}

/// Parse a base-10 arbitrary-precision amount in the smallest unit.
pub fn parse_amount(input: &str) -> Result<BigUint, CodecError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::Amount(input.to_string()));
    }
    input
        .parse::<BigUint>()
        .map_err(|_| CodecError::Amount(input.to_string()))
}

/// Floor-divide a smallest-unit amount down to display units. Only balance
/// reporting uses this; onward calls always carry the unscaled value.
pub fn scale_for_display(amount: &BigUint) -> BigUint {
    amount / display_scale()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_address_round_trip() {
        let text = "0x9821e8c1dc176c92cac40b3c1fdb795aa1b38f89";
        let addr: Address = text.parse().unwrap();
        assert_eq!(addr.to_string(), text);
        assert_eq!(addr.to_string().len(), ADDRESS_STR_LEN);
        assert_eq!(format!("{:?}", addr), format!("Address({})", text));
    }

    #[test]
    fn test_address_rejects_bad_shapes() {
        // Too short, too long, missing prefix.
        assert!(matches!(
            "0xabc".parse::<Address>(),
            Err(CodecError::AddressFormat(_))
        ));
        assert!(matches!(
            "0x9821e8c1dc176c92cac40b3c1fdb795aa1b38f8900".parse::<Address>(),
            Err(CodecError::AddressFormat(_))
        ));
        assert!(matches!(
            "9821e8c1dc176c92cac40b3c1fdb795aa1b38f8900".parse::<Address>(),
            Err(CodecError::AddressFormat(_))
        ));
    }

    #[test]
    fn test_address_rejects_bad_hex() {
        assert!(matches!(
            "0x9821e8c1dc176c92cac40b3c1fdb795aa1b38fzz".parse::<Address>(),
            Err(CodecError::AddressHex(_))
        ));
        // Upper-case decodes but does not render back identically.
        assert!(matches!(
            "0x9821E8C1DC176C92CAC40B3C1FDB795AA1B38F89".parse::<Address>(),
            Err(CodecError::AddressHex(_))
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0").unwrap(), BigUint::zero());
        assert_eq!(parse_amount("100").unwrap(), BigUint::from(100u64));
        // Larger than u128.
        let big = "340282366920938463463374607431768211456789";
        assert_eq!(parse_amount(big).unwrap().to_string(), big);
        assert!(matches!(parse_amount("12a"), Err(CodecError::Amount(_))));
        assert!(matches!(parse_amount("-5"), Err(CodecError::Amount(_))));
        assert!(matches!(parse_amount(""), Err(CodecError::Amount(_))));
    }

    #[test]
    fn test_scale_for_display_floor_division() {
        assert_eq!(scale_for_display(&display_scale()), BigUint::from(1u64));
        assert_eq!(scale_for_display(&BigUint::zero()), BigUint::zero());
        assert_eq!(
            scale_for_display(&BigUint::from(999_999_999_999u64)),
            BigUint::zero()
        );
        assert_eq!(
            scale_for_display(&BigUint::from(5_000_000_000_000u64)),
            BigUint::from(5u64)
        );
    }
}
