//! Protocol / APDU definitions for Sia app communication
//!
//! This module provides a protocol specification and reference implementation for
//! communication with the Sia hardware wallet.
//!
//! APDUs use a primitive binary encoding to simplify implementation with unsupported
//! languages and platforms. All integer fields are little-endian; currency values are
//! length-prefixed big-endian magnitudes as in the canonical Sia encoding.

#![no_std]

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod prelude;
pub mod state;
pub mod tx_hash;

mod helpers;

/// Sia APDU Class
pub const SIA_APDU_CLA: u8 = 0xe0;

/// Sia APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u8)]
pub enum Instruction {
    /// Start hashing a transaction, first packet of a multi-packet transfer
    TxHashInit = 0x08,

    /// Continue a transaction in progress, nth packet of a multi-packet transfer
    TxHashNext = 0x09,

    /// Fetch transaction hashing state
    TxGetInfo = 0x0a,
}

/// Status words surfaced to the host transport layer
pub mod sw {
    /// Operation complete
    pub const SW_OK: u16 = 0x9000;

    /// User rejected a pending approval
    pub const SW_USER_REJECTED: u16 = 0x6985;

    /// Internal invariant violation, always fatal to the session
    pub const SW_DEVELOPER_ERR: u16 = 0x6b00;

    /// Malformed request or transaction
    pub const SW_INVALID_PARAM: u16 = 0x6b01;

    /// Session lifecycle violation (first packet while a session is open,
    /// or a continuation with no session open)
    pub const SW_IMPROPER_INIT: u16 = 0x6b02;
}

/// Helper macro for encoding `bitflags` types
#[macro_export]
macro_rules! encdec_bitflags {
    ($b:ty) => {
        impl encdec::Encode for $b {
            type Error = ApduError;

            fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode(&bits, buff).map_err(|e| e.into())
            }

            fn encode_len(&self) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode_len(&bits).map_err(|e| e.into())
            }
        }

        impl encdec::DecodeOwned for $b {
            type Output = $b;
            type Error = ApduError;

            fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Self::Error> {
                if buff.is_empty() {
                    return Err(ApduError::InvalidLength);
                }

                let v = <$b>::from_bits_truncate(buff[0]);
                Ok((v, 1))
            }
        }
    };
}

#[cfg(test)]
pub(crate) mod test {
    use encdec::EncDec;

    use super::*;

    /// Helper for APDU encode / decode tests
    pub fn encode_decode_apdu<'a, A: EncDec<'a, ApduError> + PartialEq>(
        buff: &'a mut [u8],
        apdu: &A,
    ) -> usize {
        // Encode APDU
        let n = apdu.encode(buff).expect("encode failed");

        // Ensure encoded data fits maximum APDU payload
        let m = 255;
        assert!(n <= m, "encoded length {n} exceeds maximum APDU payload {m}");

        // Check encoded length matches expected length
        let expected_n = apdu.encode_len().expect("get length failed");
        assert_eq!(n, expected_n, "encode length mismatch");

        // Decode APDU
        let (decoded, decoded_n) = A::decode(&buff[..n]).expect("decode failed");

        // Check decoded object and length match
        assert_eq!(apdu, &decoded);
        assert_eq!(expected_n, decoded_n);

        n
    }
}
