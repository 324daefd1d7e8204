#![allow(unused)]

use log::debug;

use ledger_sia_core::engine::{
    decoder::ADDRESS_LEN, Driver, Engine, Error, Event, Output, Screen, State,
};

/// Driver implementation for test use
pub struct TestDriver {
    /// Fixed seed standing in for the device master seed
    pub seed: [u8; 64],
}

impl TestDriver {
    pub fn new() -> Self {
        Self {
            seed: core::array::from_fn(|i| i as u8),
        }
    }
}

impl Driver for TestDriver {
    fn derive_ed25519(&self, path: &[u32]) -> [u8; 32] {
        slip10_ed25519::derive_ed25519_private_key(&self.seed, path)
    }
}

/// Canonical transaction builder for test vectors
#[derive(Default)]
pub struct TxnBuilder {
    sc_outputs: Vec<([u8; ADDRESS_LEN], u128)>,
    sf_outputs: Vec<([u8; ADDRESS_LEN], u128)>,
    fees: Vec<u128>,
}

impl TxnBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sc_output(mut self, addr: u8, value: u128) -> Self {
        self.sc_outputs.push(([addr; ADDRESS_LEN], value));
        self
    }

    pub fn sf_output(mut self, addr: u8, value: u128) -> Self {
        self.sf_outputs.push(([addr; ADDRESS_LEN], value));
        self
    }

    pub fn fee(mut self, value: u128) -> Self {
        self.fees.push(value);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut b = vec![];

        Self::section(&mut b, 0x00, self.sc_outputs.len());
        for (a, v) in &self.sc_outputs {
            b.extend_from_slice(a);
            Self::value(&mut b, *v);
        }

        Self::section(&mut b, 0x01, self.sf_outputs.len());
        for (a, v) in &self.sf_outputs {
            b.extend_from_slice(a);
            Self::value(&mut b, *v);
        }

        Self::section(&mut b, 0x02, self.fees.len());
        for v in &self.fees {
            Self::value(&mut b, *v);
        }

        b
    }

    fn section(b: &mut Vec<u8>, kind: u8, count: usize) {
        b.push(kind);
        b.extend_from_slice(&(count as u32).to_le_bytes());
    }

    /// Minimal big-endian value encoding
    fn value(b: &mut Vec<u8>, v: u128) {
        let bytes = v.to_be_bytes();
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(15);

        b.push((16 - start) as u8);
        b.extend_from_slice(&bytes[start..]);
    }
}

/// Reference sighash over the scope selector and canonical bytes
pub fn reference_hash(sig_index: u16, txn: &[u8]) -> [u8; 32] {
    use blake2::{digest::consts::U32, Blake2b, Digest};

    let mut h = Blake2b::<U32>::new();
    h.update(sig_index.to_le_bytes());
    h.update(txn);
    h.finalize().into()
}

/// Completed drive of a session up to its first non-review output
pub struct Session {
    pub output: Output,
    /// Screens rendered during element review, in display order
    pub screens: Vec<Screen>,
}

/// Stream a transaction through an engine in packets of `chunk` bytes,
/// paging through every element as it is decoded.
///
/// Stops at the first output requiring host or user action: the final hash,
/// the signing prompt, or a stalled `Loading` state once the stream is
/// exhausted.
pub fn drive(
    e: &mut Engine<TestDriver>,
    key_index: u32,
    sig_index: u16,
    sign: bool,
    txn: &[u8],
    chunk: usize,
) -> Result<Session, Error> {
    let mut screens = vec![];
    let mut chunks = txn.chunks(chunk.max(1));

    let first = chunks.next().unwrap_or(&[]);
    let mut r = e.update(&Event::TxHashInit {
        key_index,
        sig_index,
        sign,
        data: first,
    })?;

    loop {
        match (e.state(), &r) {
            // Render each part of the element under review, then advance
            (State::Element(_), Output::Pending) => {
                screens.push(e.screen()?);
                r = e.advance()?;
            }

            // Signing prompt, hand back to the caller for approve / deny
            (State::Pending, Output::Pending) => {
                screens.push(e.screen()?);
                return Ok(Session { output: r, screens });
            }

            // Decoder wants more bytes
            (State::Loading, _) => {
                let c = match chunks.next() {
                    Some(c) => c,
                    None => return Ok(Session { output: r, screens }),
                };
                r = e.update(&Event::TxHashNext { data: c })?;
            }

            _ => return Ok(Session { output: r, screens }),
        }
    }
}

/// Drive helper with a fresh engine and full-transaction first packet
pub fn drive_oneshot(
    key_index: u32,
    sig_index: u16,
    sign: bool,
    txn: &[u8],
) -> Result<Session, Error> {
    let mut e = Engine::new(TestDriver::new());
    drive(&mut e, key_index, sig_index, sign, txn, 255)
}
