//! Rendering and key derivation helpers

use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroize;

use crate::engine::Driver;

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// Maximum decimal digits of a `u128` value
pub const DEC_MAX_LEN: usize = 39;

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// SLIP-0010 derivation path for signing key `key_index` (`44'/93'/index'`,
/// 93 being the Sia coin type)
pub fn signing_path(key_index: u32) -> [u32; 3] {
    [44 | HARDENED, 93 | HARDENED, key_index | HARDENED]
}

/// Derive signing key `key_index` via the platform driver and sign `hash`.
///
/// The derived seed is zeroized as soon as the key object is constructed, and
/// the key object zeroizes itself on drop.
pub fn derive_and_sign<D: Driver>(drv: &D, key_index: u32, hash: &[u8; 32]) -> [u8; 64] {
    let mut seed = drv.derive_ed25519(&signing_path(key_index));

    let key = SigningKey::from_bytes(&seed);
    seed.zeroize();

    key.sign(hash).to_bytes()
}

#[inline]
pub fn to_hex_slice(data: &[u8], buff: &mut [u8]) -> Result<usize, ()> {
    // check buffer length is valid
    if 2 * data.len() > buff.len() {
        return Err(());
    }

    // write hex
    let mut i = 0;
    for c in data {
        buff[i] = HEX_CHARS[(c >> 4) as usize];
        buff[i + 1] = HEX_CHARS[(c & 0xf) as usize];

        i += 2;
    }

    Ok(i)
}

#[inline]
pub fn to_hex_str<'a>(data: &[u8], buff: &'a mut [u8]) -> Result<&'a str, ()> {
    let n = to_hex_slice(data, buff)?;
    let s = unsafe { core::str::from_utf8_unchecked(&buff[..n]) };
    Ok(s)
}

/// Format a currency value as decimal.
///
/// Values are exact, never scaled or truncated, so `buff` must hold
/// [`DEC_MAX_LEN`] characters for arbitrary inputs.
pub fn fmt_dec(value: u128, buff: &mut [u8]) -> Result<&str, ()> {
    let mut i = buff.len();
    let mut v = value;

    // Write digits from the end of the buffer
    loop {
        if i == 0 {
            return Err(());
        }
        i -= 1;

        buff[i] = b'0' + (v % 10) as u8;
        v /= 10;

        if v == 0 {
            break;
        }
    }

    // Shift down to the front
    let n = buff.len() - i;
    buff.copy_within(i.., 0);

    let s = unsafe { core::str::from_utf8_unchecked(&buff[..n]) };
    Ok(s)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fmt_dec_values() {
        let tests: &[(u128, &str)] = &[
            (0, "0"),
            (7, "7"),
            (10, "10"),
            (1_000_000, "1000000"),
            (u128::MAX, "340282366920938463463374607431768211455"),
        ];

        for (v, s) in tests {
            let mut buff = [0u8; DEC_MAX_LEN];
            assert_eq!(fmt_dec(*v, &mut buff), Ok(*s));
        }
    }

    #[test]
    fn fmt_dec_overflow() {
        let mut buff = [0u8; 2];
        assert_eq!(fmt_dec(100, &mut buff), Err(()));
    }

    #[test]
    fn hex_encoding() {
        let mut buff = [0u8; 8];
        assert_eq!(to_hex_str(&[0x01, 0xab, 0xf0], &mut buff), Ok("01abf0"));

        let mut short = [0u8; 4];
        assert_eq!(to_hex_str(&[0x01, 0xab, 0xf0], &mut short), Err(()));
    }

    #[test]
    fn hardened_signing_path() {
        let path = signing_path(3);

        assert_eq!(path, [0x8000_002c, 0x8000_005d, 0x8000_0003]);
        assert!(path.iter().all(|p| p & HARDENED != 0));
    }
}
