//! Swarm address implementation
//!
//! This module provides the SwarmAddress type, the 32-byte content reference
//! used for addressing chunks. On the wire an address is always its full
//! lowercase hex form; `Display` only shows a short prefix for logs.
//!
//! ## Example Usage
//!
//! ```
//! use comb_primitives::SwarmAddress;
//!
//! let addr: SwarmAddress = "0x0be77f0bb7abc9cd0abed640ee29849a3072ccfd1020019fe03658c38f087e02"
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(addr.to_string(), "0be77f0bb7abc9cd");
//! assert_eq!(addr.to_hex().len(), 64);
//! ```

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use alloy_primitives::{B256, hex};

use crate::error::{PrimitivesError, Result};

/// A 256-bit address for a chunk in the Swarm network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwarmAddress(pub B256);

impl SwarmAddress {
    /// Creates a new SwarmAddress from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Returns the underlying bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Creates a new address from a slice, checking the length
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let address = B256::try_from(slice)?;
        Ok(Self(address))
    }

    /// Checks if this address is zeros
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Create a new zero-filled address
    pub const fn zero() -> Self {
        Self(B256::ZERO)
    }

    /// Full 64-character lowercase hex form, without `0x` prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for SwarmAddress {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for SwarmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0.as_slice()[..8]))
    }
}

impl fmt::LowerHex for SwarmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for SwarmAddress {
    type Err = PrimitivesError;

    /// Parse a 64-character hex string, with or without `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())?;
        Self::from_slice(&bytes)
    }
}

impl Deref for SwarmAddress {
    type Target = B256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<B256> for SwarmAddress {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<[u8; 32]> for SwarmAddress {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}

impl From<SwarmAddress> for B256 {
    fn from(addr: SwarmAddress) -> Self {
        addr.0
    }
}

impl AsRef<[u8]> for SwarmAddress {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(any(test, feature = "arbitrary"))]
impl<'a> arbitrary::Arbitrary<'a> for SwarmAddress {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::new(u.arbitrary()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;
    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;

    proptest! {
        #[test]
        fn test_hex_parse_inverse(addr in arb::<SwarmAddress>()) {
            let parsed: SwarmAddress = addr.to_hex().parse().unwrap();
            prop_assert_eq!(parsed, addr);

            let prefixed: SwarmAddress = format!("0x{}", addr.to_hex()).parse().unwrap();
            prop_assert_eq!(prefixed, addr);
        }
    }

    #[test]
    fn test_display_is_short_prefix() {
        let addr = SwarmAddress::from(b256!(
            "c10090961e7682a10890c334d759a28426647141213abda93b096b892824d2ef"
        ));
        assert_eq!(addr.to_string(), "c10090961e7682a1");
        assert_eq!(
            addr.to_hex(),
            "c10090961e7682a10890c334d759a28426647141213abda93b096b892824d2ef"
        );
        assert_eq!(format!("{addr:x}"), addr.to_hex());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "zz".parse::<SwarmAddress>(),
            Err(PrimitivesError::Hex(_))
        ));
        assert!(matches!(
            "abcd".parse::<SwarmAddress>(),
            Err(PrimitivesError::ArrayConversion(_))
        ));
    }

    #[test]
    fn test_zero() {
        assert!(SwarmAddress::zero().is_zero());
        assert_eq!(SwarmAddress::default(), SwarmAddress::zero());
        assert!(!SwarmAddress::new([1; 32]).is_zero());
    }
}
