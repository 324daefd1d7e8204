//! Running sighash accumulator
//!

use blake2::{
    digest::{consts::U32, Digest as _},
    Blake2b,
};

/// BLAKE2b with 32-byte output, the Sia sighash primitive
type Blake2b256 = Blake2b<U32>;

/// Running digest over the canonical transaction encoding.
///
/// Fed one consumed byte range at a time, in strict encoding order, by the
/// [decoder][super::decoder::TxnDecoder]. Finalizing before the decoder
/// reports completion is a caller error and is not enforced here.
#[derive(Clone)]
pub struct TxDigest(Blake2b256);

impl TxDigest {
    /// Create a new (empty) sighash accumulator
    pub fn new() -> Self {
        Self(Blake2b256::new())
    }

    /// Update the digest with newly consumed canonical bytes
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    /// Finalize the digest, consuming the accumulator
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn finalize(self) -> [u8; 32] {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(self.0.finalize().as_ref());
        hash
    }
}

impl Default for TxDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TxDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TxDigest(..)")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Chunked updates must match a one-shot hash of the same bytes
    #[test]
    fn chunked_updates_match_oneshot() {
        let data: [u8; 100] = core::array::from_fn(|i| i as u8);

        let mut a = TxDigest::new();
        for c in data.chunks(7) {
            a.update(c);
        }

        let mut b = TxDigest::new();
        b.update(&data);

        assert_eq!(a.finalize(), b.finalize());
    }
}
