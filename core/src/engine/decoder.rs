//! Streaming transaction element decoder
//!
//! A resumable parser over the canonical Sia transaction encoding. Packets of
//! up to [`MAX_APDU_PAYLOAD`] bytes are appended to a retained buffer via
//! [`TxnDecoder::update`], and [`TxnDecoder::next_elem`] consumes at most one
//! complete element per call, feeding every consumed byte into the running
//! sighash in consumption order. The transaction is never buffered in full.
//!
//! Canonical encoding (integers little-endian):
//!
//! ```text
//! txn     := section(0x00 SC) section(0x01 SF) section(0x02 fee)
//! section := kind: u8 , count: u32 , count * element
//! element := address(32) value    (SC / SF outputs)
//!          | value                (miner fees)
//! value   := len: u8 (1..=16) , len bytes big-endian magnitude
//! ```

use byteorder::{ByteOrder, LittleEndian};
use heapless::Vec;

use super::{digest::TxDigest, Error};

/// Maximum transaction bytes per transport packet
pub const MAX_APDU_PAYLOAD: usize = 255;

/// Destination address length in bytes
pub const ADDRESS_LEN: usize = 32;

/// Maximum encoded currency value length in bytes.
///
/// Bounded so a decoded value always fits `u128` and its decimal rendering
/// always fits the display value buffer; longer encodings are a decode error,
/// never a truncation.
pub const MAX_VALUE_LEN: usize = 16;

/// Largest possible single element (address + value length + value)
const MAX_ELEM_LEN: usize = ADDRESS_LEN + 1 + MAX_VALUE_LEN;

/// Reassembly buffer capacity.
///
/// Must hold one incomplete element plus a full incoming packet, so that a
/// well-behaved host can never overflow it.
pub const TXN_BUF_LEN: usize = 512;

static_assertions::const_assert!(TXN_BUF_LEN >= MAX_ELEM_LEN + MAX_APDU_PAYLOAD);

/// Transaction element kinds, in canonical section order
#[derive(Copy, Clone, PartialEq, Debug, strum::Display)]
#[repr(u8)]
pub enum ElementKind {
    /// Siacoin output
    ScOutput = 0x00,
    /// Siafund output
    SfOutput = 0x01,
    /// Miner fee
    MinerFee = 0x02,
}

/// Destination address of an output element
#[derive(Copy, Clone, PartialEq)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Debug format [Address] as hex
impl core::fmt::Debug for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for b in &self.0[..] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// One decoded transaction element.
///
/// `index` is the ordinal among elements of the same kind, used for display
/// labels (`SC Output #2` etc).
#[derive(Clone, PartialEq, Debug)]
pub enum TxElement {
    ScOutput {
        index: u32,
        address: Address,
        value: u128,
    },
    SfOutput {
        index: u32,
        address: Address,
        value: u128,
    },
    MinerFee {
        index: u32,
        value: u128,
    },
}

impl TxElement {
    /// Fetch the kind of an element
    pub fn kind(&self) -> ElementKind {
        match self {
            TxElement::ScOutput { .. } => ElementKind::ScOutput,
            TxElement::SfOutput { .. } => ElementKind::SfOutput,
            TxElement::MinerFee { .. } => ElementKind::MinerFee,
        }
    }
}

/// Result of a [`TxnDecoder::next_elem`] call
#[derive(Clone, PartialEq, Debug)]
pub enum DecodeResult {
    /// Buffered bytes hold no further complete unit, caller must supply more
    Partial,
    /// Exactly one new element decoded, remainder retained for the next call
    Ready(TxElement),
    /// All declared elements consumed, no trailing bytes, digest final
    Finished,
}

/// Decoder parse phase
#[derive(Copy, Clone, PartialEq, Debug)]
enum Phase {
    /// Expecting the kind + count header of a section
    Header(ElementKind),
    /// Expecting `remaining` further elements of a section
    Elements(ElementKind, u32),
    /// All sections exhausted
    Done,
}

/// Streaming transaction decoder with running sighash.
///
/// Owns the retained reassembly buffer and the [`TxDigest`]; exactly one
/// exists per session and both are discarded on any terminal outcome.
pub struct TxnDecoder {
    buf: Vec<u8, TXN_BUF_LEN>,
    digest: TxDigest,
    phase: Phase,
    /// Per-kind ordinals of decoded elements
    decoded: [u32; 3],
    /// Sum of declared section counts
    declared: u32,
}

impl TxnDecoder {
    /// Create a decoder for a fresh session.
    ///
    /// The signature index the hash is scoped to is fed to the digest first
    /// and is strictly outside the canonical transaction body.
    pub fn new(sig_index: u16) -> Self {
        let mut digest = TxDigest::new();
        digest.update(&sig_index.to_le_bytes());

        Self {
            buf: Vec::new(),
            digest,
            phase: Phase::Header(ElementKind::ScOutput),
            decoded: [0; 3],
            declared: 0,
        }
    }

    /// Append newly arrived transaction bytes to the retained buffer.
    ///
    /// Bytes from a different session must never be fed without constructing
    /// a fresh decoder.
    pub fn update(&mut self, data: &[u8]) -> Result<(), Error> {
        self.buf
            .extend_from_slice(data)
            .map_err(|_| Error::InvalidLength)
    }

    /// Attempt to decode the next element from the retained buffer.
    ///
    /// Consumes section headers as encountered and at most one element,
    /// feeding every consumed byte to the digest. Incomplete units leave the
    /// buffer untouched and yield [`DecodeResult::Partial`]. Decode errors
    /// are terminal for the session.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn next_elem(&mut self) -> Result<DecodeResult, Error> {
        loop {
            match self.phase {
                Phase::Header(kind) => {
                    if self.buf.len() < 5 {
                        return Ok(DecodeResult::Partial);
                    }

                    if self.buf[0] != kind as u8 {
                        #[cfg(feature = "log")]
                        log::warn!("unexpected section kind {:#04x} (expected {})", self.buf[0], kind);

                        return Err(Error::InvalidKind);
                    }

                    let count = LittleEndian::read_u32(&self.buf[1..5]);
                    self.consume(5);

                    self.declared = self.declared.saturating_add(count);

                    // A transaction with no elements at all has nothing to
                    // approve and nothing meaningful to hash
                    if kind == ElementKind::MinerFee && self.declared == 0 {
                        return Err(Error::EmptyTransaction);
                    }

                    self.phase = match count {
                        0 => Self::next_phase(kind),
                        _ => Phase::Elements(kind, count),
                    };
                }

                Phase::Elements(kind, remaining) => {
                    let elem = match self.take_element(kind)? {
                        Some(v) => v,
                        None => return Ok(DecodeResult::Partial),
                    };

                    self.phase = match remaining - 1 {
                        0 => Self::next_phase(kind),
                        n => Phase::Elements(kind, n),
                    };

                    return Ok(DecodeResult::Ready(elem));
                }

                Phase::Done => {
                    // Undeclared bytes past the final element would escape
                    // both display and hash coverage
                    if !self.buf.is_empty() {
                        return Err(Error::TrailingData);
                    }

                    return Ok(DecodeResult::Finished);
                }
            }
        }
    }

    /// Finalize the sighash, consuming the decoder.
    ///
    /// Only meaningful once [`next_elem`][Self::next_elem] has reported
    /// [`DecodeResult::Finished`].
    pub fn finalize(self) -> [u8; 32] {
        self.digest.finalize()
    }

    /// Parse one complete element from the front of the buffer, or return
    /// `None` leaving the buffer untouched
    fn take_element(&mut self, kind: ElementKind) -> Result<Option<TxElement>, Error> {
        // Address precedes the value for output elements
        let value_at = match kind {
            ElementKind::ScOutput | ElementKind::SfOutput => ADDRESS_LEN,
            ElementKind::MinerFee => 0,
        };

        // Value length byte must be visible before the element can complete,
        // and is validated as soon as it is
        if self.buf.len() < value_at + 1 {
            return Ok(None);
        }

        let value_len = self.buf[value_at] as usize;
        if value_len == 0 || value_len > MAX_VALUE_LEN {
            #[cfg(feature = "log")]
            log::warn!("currency value length {} out of range", value_len);

            return Err(Error::ValueOverflow);
        }

        let elem_len = value_at + 1 + value_len;
        if self.buf.len() < elem_len {
            return Ok(None);
        }

        // Big-endian magnitude, at most 16 bytes per the check above
        let mut value = 0u128;
        for b in &self.buf[value_at + 1..elem_len] {
            value = (value << 8) | *b as u128;
        }

        let index = self.decoded[kind as usize];
        self.decoded[kind as usize] += 1;

        let elem = match kind {
            ElementKind::ScOutput | ElementKind::SfOutput => {
                let mut address = [0u8; ADDRESS_LEN];
                address.copy_from_slice(&self.buf[..ADDRESS_LEN]);

                match kind {
                    ElementKind::ScOutput => TxElement::ScOutput {
                        index,
                        address: Address(address),
                        value,
                    },
                    _ => TxElement::SfOutput {
                        index,
                        address: Address(address),
                        value,
                    },
                }
            }
            ElementKind::MinerFee => TxElement::MinerFee { index, value },
        };

        self.consume(elem_len);

        Ok(Some(elem))
    }

    /// Feed `n` consumed bytes to the digest and drop them from the buffer
    fn consume(&mut self, n: usize) {
        self.digest.update(&self.buf[..n]);

        let rem = self.buf.len() - n;
        self.buf.copy_within(n.., 0);
        self.buf.truncate(rem);
    }

    fn next_phase(kind: ElementKind) -> Phase {
        match kind {
            ElementKind::ScOutput => Phase::Header(ElementKind::SfOutput),
            ElementKind::SfOutput => Phase::Header(ElementKind::MinerFee),
            ElementKind::MinerFee => Phase::Done,
        }
    }
}

impl core::fmt::Debug for TxnDecoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TxnDecoder")
            .field("phase", &self.phase)
            .field("buffered", &self.buf.len())
            .field("decoded", &self.decoded)
            .finish()
    }
}
