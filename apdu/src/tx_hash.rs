//! Transaction hashing APDUs, used to stream a transaction through the
//! hardware wallet for verification, hashing, and optional signing.
//!
//! See `ledger_sia_core::engine` for interaction and state machines.

use encdec::{Decode, DecodeOwned, Encode};
use ledger_proto::ApduStatic;

use crate::{helpers::*, state::TxState, ApduError, Instruction, SIA_APDU_CLA};

bitflags::bitflags! {
    /// Transaction hashing options set on [`TxHashInit`]
    pub struct TxHashFlags: u8 {
        /// Sign the computed hash after user approval
        /// (otherwise the hash is returned as soon as decoding completes)
        const SIGN = 1 << 0;
    }
}

crate::encdec_bitflags!(TxHashFlags);

/// Transaction hashing init APDU, first packet of a multi-packet transfer.
///
/// Carries the signing key index and the signature (scope) index ahead of the
/// first transaction bytes. Opening a session while one is already in progress
/// fails with `SW_IMPROPER_INIT`: otherwise a host could splice two
/// transactions into one apparent approval.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           KEY_INDEX                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           SIG_INDEX           |     FLAGS     |               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+               +-+
/// /                       TRANSACTION BYTES                       /
/// /                       (variable length)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TxHashInit<'a> {
    /// Key index for SLIP-0010 signing key derivation
    /// (ignored unless [`TxHashFlags::SIGN`] is set)
    pub key_index: u32,

    /// Signature index the hash is scoped to
    pub sig_index: u16,

    /// Hashing options
    pub flags: TxHashFlags,

    /// First slice of canonical transaction bytes
    pub data: &'a [u8],
}

impl<'a> ApduStatic for TxHashInit<'a> {
    const CLA: u8 = SIA_APDU_CLA;
    const INS: u8 = Instruction::TxHashInit as u8;
}

impl<'a> TxHashInit<'a> {
    /// Create a new [`TxHashInit`] request
    pub fn new(key_index: u32, sig_index: u16, flags: TxHashFlags, data: &'a [u8]) -> Self {
        Self {
            key_index,
            sig_index,
            flags,
            data,
        }
    }
}

impl<'a> Encode for TxHashInit<'a> {
    type Error = ApduError;

    /// Encode a [`TxHashInit`] APDU into the provided buffer
    #[inline]
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 7 + self.data.len() {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[..4].copy_from_slice(&self.key_index.to_le_bytes());
        index += 4;

        buff[index..][..2].copy_from_slice(&self.sig_index.to_le_bytes());
        index += 2;

        index += self.flags.encode(&mut buff[index..])?;

        buff[index..][..self.data.len()].copy_from_slice(self.data);
        index += self.data.len();

        Ok(index)
    }

    #[inline]
    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(7 + self.data.len())
    }
}

impl<'a> Decode<'a> for TxHashInit<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode a [`TxHashInit`] APDU from the provided buffer
    #[inline]
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < 7 {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        let key_index = u32::from_le_bytes([buff[0], buff[1], buff[2], buff[3]]);
        index += 4;

        let sig_index = u16::from_le_bytes([buff[4], buff[5]]);
        index += 2;

        let (flags, n) = TxHashFlags::decode_owned(&buff[index..])?;
        index += n;

        let data = &buff[index..];
        index += data.len();

        Ok((
            Self {
                key_index,
                sig_index,
                flags,
                data,
            },
            index,
        ))
    }
}

/// Transaction hashing continuation APDU, nth packet of a multi-packet
/// transfer. Body is transaction bytes only; fails with `SW_IMPROPER_INIT`
/// when no session is open.
#[derive(Clone, Debug, PartialEq)]
pub struct TxHashNext<'a> {
    /// Next slice of canonical transaction bytes
    pub data: &'a [u8],
}

impl<'a> ApduStatic for TxHashNext<'a> {
    const CLA: u8 = SIA_APDU_CLA;
    const INS: u8 = Instruction::TxHashNext as u8;
}

impl<'a> TxHashNext<'a> {
    /// Create a new [`TxHashNext`] request
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Encode for TxHashNext<'a> {
    type Error = ApduError;

    #[inline]
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.data.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.data.len()].copy_from_slice(self.data);

        Ok(self.data.len())
    }

    #[inline]
    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.data.len())
    }
}

impl<'a> Decode<'a> for TxHashNext<'a> {
    type Output = Self;
    type Error = ApduError;

    #[inline]
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        Ok((Self { data: buff }, buff.len()))
    }
}

/// Transaction information request APDU (zero length)
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxInfoReq;

impl ApduStatic for TxInfoReq {
    const CLA: u8 = SIA_APDU_CLA;
    const INS: u8 = Instruction::TxGetInfo as u8;
}

/// Transaction information response APDU.
///
/// Received in response to hashing commands that produce no terminal output,
/// contains the current engine state and a value where relevant (ie. the
/// part index while paging an element).
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    TX_STATE   |      PAD      |             VALUE             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxInfo {
    /// Current transaction engine state
    pub state: TxState,
    /// Reserved (maintains field alignment)
    pub pad: u8,
    /// Value associated with current state (zero otherwise)
    pub value: u16,
}

/// Transaction hash response APDU, the computed sighash.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                             HASH                              /
/// /                      (32-byte BLAKE2b-256)                    /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxHashResp {
    /// Computed transaction sighash
    #[encdec(with = "arr")]
    pub hash: [u8; 32],
}

/// Transaction signature response APDU, returned after explicit user approval.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                           SIGNATURE                           /
/// /                       (64-byte ed25519)                       /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxSignResp {
    /// ed25519 signature over the transaction sighash
    #[encdec(with = "arr")]
    pub signature: [u8; 64],
}

#[cfg(test)]
mod test {
    use rand::random;

    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn encode_decode_tx_hash_init() {
        let data = [0xab; 48];
        let apdu = TxHashInit::new(random(), random(), TxHashFlags::SIGN, &data);

        let mut buff = [0u8; 256];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 7 + data.len());
    }

    #[test]
    fn encode_decode_tx_hash_next() {
        let data: [u8; 128] = core::array::from_fn(|_| random());
        let apdu = TxHashNext::new(&data);

        let mut buff = [0u8; 256];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, data.len());
    }

    #[test]
    fn encode_decode_tx_info() {
        let apdu = TxInfo {
            state: crate::state::TxState::Loading,
            pad: 0,
            value: random(),
        };

        let mut buff = [0u8; 256];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 4);
    }

    #[test]
    fn encode_decode_tx_hash_resp() {
        let apdu = TxHashResp { hash: random() };

        let mut buff = [0u8; 256];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 32);
    }

    #[test]
    fn encode_decode_tx_sign_resp() {
        let apdu = TxSignResp {
            signature: core::array::from_fn(|_| random()),
        };

        let mut buff = [0u8; 256];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 64);
    }

    #[test]
    fn tx_hash_init_rejects_short_buffer() {
        assert!(TxHashInit::decode(&[0u8; 5]).is_err());
    }
}
