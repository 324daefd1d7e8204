//! Trusted display screen formatting
//!
//! Screens are pure functions of the session state (current element, part
//! index, pending hash), regenerated on demand via [`Engine::screen`][super::Engine::screen]
//! rather than queued, so a redraw can never show stale content.

use core::str::from_utf8;

use emstr::EncodeStr;
use heapless::String;

use crate::helpers::{fmt_dec, to_hex_str, DEC_MAX_LEN};

use super::{
    decoder::{TxElement, ADDRESS_LEN},
    Error,
};

/// Display label length in characters
pub const LABEL_LEN: usize = 24;

/// Display value length in characters (holds a 64-character hex address)
pub const VALUE_LEN: usize = 80;

/// One screen of the element review flow
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Screen {
    pub label: String<LABEL_LEN>,
    pub value: String<VALUE_LEN>,
}

impl Screen {
    fn new(label: &str, value: &str) -> Result<Self, Error> {
        let mut s = Self::default();

        s.label.push_str(label).map_err(|_| Error::InvalidLength)?;
        s.value.push_str(value).map_err(|_| Error::InvalidLength)?;

        Ok(s)
    }
}

/// Number of screens required to review an element.
///
/// Outputs show their destination address then their value, fees have no
/// destination so show the value alone.
pub fn element_parts(elem: &TxElement) -> u8 {
    match elem {
        TxElement::ScOutput { .. } | TxElement::SfOutput { .. } => 2,
        TxElement::MinerFee { .. } => 1,
    }
}

/// Render screen `part` of an element review.
///
/// A part index at or past [`element_parts`] is an internal sequencing fault,
/// not a host-triggerable condition.
pub fn format_element(elem: &TxElement, part: u8) -> Result<Screen, Error> {
    // Label is shared by every part of an element
    let mut label = [0u8; LABEL_LEN];
    let n = match elem {
        TxElement::ScOutput { index, .. } => emstr::write!(&mut label[..], "SC Output #", *index),
        TxElement::SfOutput { index, .. } => emstr::write!(&mut label[..], "SF Output #", *index),
        TxElement::MinerFee { index, .. } => emstr::write!(&mut label[..], "Miner Fee #", *index),
    }
    .map_err(|_| Error::InvalidLength)?;

    let label = from_utf8(&label[..n]).map_err(|_| Error::InvalidLength)?;

    match (elem, part) {
        (TxElement::ScOutput { address, .. }, 0) | (TxElement::SfOutput { address, .. }, 0) => {
            let mut hex = [0u8; 2 * ADDRESS_LEN];
            let addr = to_hex_str(address.as_ref(), &mut hex).map_err(|_| Error::InvalidLength)?;

            Screen::new(label, addr)
        }
        (TxElement::ScOutput { value, .. }, 1) => value_screen(label, *value, " SC"),
        (TxElement::SfOutput { value, .. }, 1) => value_screen(label, *value, " SF"),
        (TxElement::MinerFee { value, .. }, 0) => value_screen(label, *value, " SC"),
        _ => Err(Error::Developer),
    }
}

/// Render the final approval prompt for a signing session
pub fn sign_screen(key_index: u32) -> Result<Screen, Error> {
    let mut buff = [0u8; VALUE_LEN];
    let n = emstr::write!(&mut buff[..], "with key #", key_index, '?')
        .map_err(|_| Error::InvalidLength)?;

    let value = from_utf8(&buff[..n]).map_err(|_| Error::InvalidLength)?;

    Screen::new("Sign this txn", value)
}

/// Render a computed sighash for comparison against the host
pub fn compare_screen(hash: &[u8; 32]) -> Result<Screen, Error> {
    let mut hex = [0u8; 64];
    let h = to_hex_str(hash, &mut hex).map_err(|_| Error::InvalidLength)?;

    Screen::new("Compare Hash:", h)
}

fn value_screen(label: &str, value: u128, unit: &str) -> Result<Screen, Error> {
    let mut buff = [0u8; DEC_MAX_LEN];
    let d = fmt_dec(value, &mut buff).map_err(|_| Error::InvalidLength)?;

    let mut s = Screen::new(label, d)?;
    s.value.push_str(unit).map_err(|_| Error::InvalidLength)?;

    Ok(s)
}

#[cfg(test)]
mod test {
    use crate::engine::decoder::Address;

    use super::*;

    fn sc_output() -> TxElement {
        TxElement::ScOutput {
            index: 2,
            address: Address([0xab; ADDRESS_LEN]),
            value: 1_000_000,
        }
    }

    #[test]
    fn sc_output_screens() {
        let e = sc_output();
        assert_eq!(element_parts(&e), 2);

        let s = format_element(&e, 0).unwrap();
        assert_eq!(s.label.as_str(), "SC Output #2");
        assert_eq!(s.value.as_str(), "ab".repeat(32));

        let s = format_element(&e, 1).unwrap();
        assert_eq!(s.label.as_str(), "SC Output #2");
        assert_eq!(s.value.as_str(), "1000000 SC");
    }

    #[test]
    fn sf_output_screens() {
        let e = TxElement::SfOutput {
            index: 0,
            address: Address([0x01; ADDRESS_LEN]),
            value: 5,
        };
        assert_eq!(element_parts(&e), 2);

        let s = format_element(&e, 1).unwrap();
        assert_eq!(s.label.as_str(), "SF Output #0");
        assert_eq!(s.value.as_str(), "5 SF");
    }

    #[test]
    fn miner_fee_screen() {
        let e = TxElement::MinerFee { index: 1, value: 10 };
        assert_eq!(element_parts(&e), 1);

        let s = format_element(&e, 0).unwrap();
        assert_eq!(s.label.as_str(), "Miner Fee #1");
        assert_eq!(s.value.as_str(), "10 SC");
    }

    /// The widest permitted value must still render in full
    #[test]
    fn max_value_renders() {
        let e = TxElement::MinerFee {
            index: 0,
            value: u128::MAX,
        };

        let s = format_element(&e, 0).unwrap();
        assert_eq!(
            s.value.as_str(),
            "340282366920938463463374607431768211455 SC"
        );
    }

    #[test]
    fn out_of_range_part() {
        assert_eq!(format_element(&sc_output(), 2), Err(Error::Developer));

        let fee = TxElement::MinerFee { index: 0, value: 1 };
        assert_eq!(format_element(&fee, 1), Err(Error::Developer));
    }

    #[test]
    fn approval_prompt() {
        let s = sign_screen(3).unwrap();
        assert_eq!(s.label.as_str(), "Sign this txn");
        assert_eq!(s.value.as_str(), "with key #3?");
    }

    #[test]
    fn hash_comparison() {
        let s = compare_screen(&[0x0f; 32]).unwrap();
        assert_eq!(s.label.as_str(), "Compare Hash:");
        assert_eq!(s.value.as_str(), "0f".repeat(32));
    }
}
