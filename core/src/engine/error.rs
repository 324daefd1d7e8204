use ledger_sia_apdu::sw;

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength = 0x00,

    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent = 0x01,

    /// Session lifecycle violation (init while a session is open, or a
    /// continuation with no session open)
    #[cfg_attr(feature = "thiserror", error("Improper session initialization"))]
    ImproperInit = 0x02,

    /// Section kind byte does not match the expected section
    #[cfg_attr(feature = "thiserror", error("Invalid element kind"))]
    InvalidKind = 0x03,

    /// Encoded currency value is empty or exceeds the display width
    #[cfg_attr(feature = "thiserror", error("Currency value length out of range"))]
    ValueOverflow = 0x04,

    /// Transaction declares no elements at all
    #[cfg_attr(feature = "thiserror", error("Transaction declares no elements"))]
    EmptyTransaction = 0x05,

    /// Undeclared bytes after the final declared element
    #[cfg_attr(feature = "thiserror", error("Trailing bytes after final element"))]
    TrailingData = 0x06,

    /// Invalid engine state for the requested operation
    #[cfg_attr(feature = "thiserror", error("Invalid engine state"))]
    InvalidState = 0x07,

    /// Internal invariant violation, always fatal to the session
    #[cfg_attr(feature = "thiserror", error("Internal invariant violation"))]
    Developer = 0xf0,
}

impl Error {
    /// Map an error to the status word surfaced to the host
    pub fn status(&self) -> u16 {
        match self {
            Error::ImproperInit => sw::SW_IMPROPER_INIT,
            Error::Developer => sw::SW_DEVELOPER_ERR,
            _ => sw::SW_INVALID_PARAM,
        }
    }
}
