use encdec::Decode;

use ledger_sia_apdu::{
    tx_hash::{TxHashFlags, TxHashInit, TxHashNext, TxInfoReq},
    ApduError, ApduStatic,
};

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Event<'a> {
    None,

    /// Open a hashing session.
    ///
    /// Carries the session parameters followed by the first transaction
    /// bytes; `sign` requests a signature over the final hash instead of the
    /// hash itself.
    TxHashInit {
        key_index: u32,
        sig_index: u16,
        sign: bool,
        data: &'a [u8],
    },

    /// Supply further transaction bytes to an open session
    TxHashNext { data: &'a [u8] },

    /// Fetch session state
    TxGetInfo,
}

/// Helper for decoding APDUs to events
fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event, ApduError>
where
    T: Decode<'a, Error = ApduError>,
    Event<'a>: From<T::Output>,
{
    T::decode(buff).map(|(v, _n)| Event::from(v))
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, buff: &'a [u8]) -> Result<Self, ApduError> {
        match ins {
            TxHashInit::INS => decode_event::<TxHashInit>(buff),
            TxHashNext::INS => decode_event::<TxHashNext>(buff),
            TxInfoReq::INS => decode_event::<TxInfoReq>(buff),
            _ => Err(ApduError::InvalidEncoding),
        }
    }
}

impl<'a> From<TxHashInit<'a>> for Event<'a> {
    fn from(a: TxHashInit<'a>) -> Self {
        Event::TxHashInit {
            key_index: a.key_index,
            sig_index: a.sig_index,
            sign: a.flags.contains(TxHashFlags::SIGN),
            data: a.data,
        }
    }
}

impl<'a> From<TxHashNext<'a>> for Event<'a> {
    fn from(a: TxHashNext<'a>) -> Self {
        Event::TxHashNext { data: a.data }
    }
}

impl<'a> From<TxInfoReq> for Event<'a> {
    fn from(_: TxInfoReq) -> Self {
        Event::TxGetInfo
    }
}
