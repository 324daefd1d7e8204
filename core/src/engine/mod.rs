//! The [Engine] provides streaming transaction verification for hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.
//!
//! Exactly one hashing session may be open at a time. The session owns the
//! decoder and running digest; any terminal outcome (hash returned, signature
//! produced, denial, failure) discards both, so no state can leak between
//! transactions.

use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::helpers::derive_and_sign;

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod error;
pub use error::Error;

mod digest;
pub use digest::TxDigest;

pub mod decoder;
pub use decoder::{DecodeResult, TxElement, TxnDecoder};

pub mod display;
pub use display::Screen;

use display::{compare_screen, element_parts, format_element, sign_screen};

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle state, no session open
    Init,

    /// Session open, awaiting further transaction bytes
    Loading,
    /// Element under user review, with the current part index
    Element(u8),
    /// All elements reviewed, signature awaiting user approval
    Pending,

    /// Session complete (hash returned or signature produced)
    Complete,
    /// Session denied by the user
    Denied,
    /// Session failed
    Error,
}

impl State {
    /// A session is active from initialisation until any terminal outcome
    pub fn is_active(&self) -> bool {
        matches!(self, State::Loading | State::Element(_) | State::Pending)
    }
}

/// [Engine] provides hardware-independent transaction hashing and signing
pub struct Engine<DRV: Driver> {
    state: State,

    /// Signing key index for the open session
    key_index: u32,
    /// Signature requested for the open session
    sign: bool,

    decoder: Option<TxnDecoder>,
    element: Option<TxElement>,
    hash: Option<[u8; 32]>,

    drv: DRV,
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// SLIP-0010 derivation of an ed25519 seed for the provided path
    fn derive_ed25519(&self, path: &[u32]) -> [u8; 32];
}

impl<T: Driver> Driver for &mut T {
    fn derive_ed25519(&self, path: &[u32]) -> [u8; 32] {
        T::derive_ed25519(self, path)
    }
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver
    pub const fn new(drv: DRV) -> Self {
        Self {
            state: State::Init,
            key_index: 0,
            sign: false,
            decoder: None,
            element: None,
            hash: None,
            drv,
        }
    }

    /// Handle incoming transaction events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        match (self.state, evt) {
            // Empty event, do nothing
            (_, Event::None) => Ok(Output::None),

            // State polls never touch the session
            (_, Event::TxGetInfo) => Ok(Output::State { state: self.state }),

            // Re-initialisation while a session is open discards it, so two
            // streams can never be spliced under one approval
            (s, Event::TxHashInit { .. }) if s.is_active() => {
                Err(self.fail(Error::ImproperInit))
            }

            // Open a session with the parameters and first transaction bytes
            (
                _,
                Event::TxHashInit {
                    key_index,
                    sig_index,
                    sign,
                    data,
                },
            ) => {
                self.clear();
                self.key_index = *key_index;
                self.sign = *sign;

                let mut decoder = TxnDecoder::new(*sig_index);
                if let Err(e) = decoder.update(data) {
                    return Err(self.fail(e));
                }

                self.decoder = Some(decoder);
                self.state = State::Loading;

                self.step()
            }

            // Append further bytes to a loading session
            (State::Loading, Event::TxHashNext { data }) => {
                let r = match self.decoder.as_mut() {
                    Some(d) => d.update(data),
                    None => Err(Error::Developer),
                };
                if let Err(e) = r {
                    return Err(self.fail(e));
                }

                self.step()
            }

            // Bytes arriving while the user is mid-review or the session
            // awaits approval are out of protocol order
            (s, Event::TxHashNext { .. }) if s.is_active() => {
                Err(self.fail(Error::UnexpectedEvent))
            }

            // Continuation without an open session, including after any
            // terminal outcome, is a lifecycle violation
            (_, Event::TxHashNext { .. }) => Err(self.fail(Error::ImproperInit)),
        }
    }

    /// Advance the open session, driven by the UI next action.
    ///
    /// Pages through the remaining parts of the element under review, then
    /// decodes the next element from the buffered bytes.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn advance(&mut self) -> Result<Output, Error> {
        if let State::Element(part) = self.state {
            let parts = match &self.element {
                Some(e) => element_parts(e),
                None => return Err(self.fail(Error::Developer)),
            };

            if part + 1 < parts {
                self.state = State::Element(part + 1);
                return Ok(Output::Pending);
            }

            self.element = None;
        }

        self.step()
    }

    /// Drive the decoder from the current buffer contents.
    ///
    /// Exactly one element is surfaced per call so the review order always
    /// matches the hash order.
    fn step(&mut self) -> Result<Output, Error> {
        let r = match self.decoder.as_mut() {
            Some(d) => d.next_elem(),
            None => Err(Error::Developer),
        };

        match r {
            // Awaiting further transaction bytes
            Ok(DecodeResult::Partial) => {
                self.state = State::Loading;
                Ok(Output::State { state: self.state })
            }

            // Element decoded, hand over to user review. No host reply
            // until the user has paged through every part
            Ok(DecodeResult::Ready(elem)) => {
                #[cfg(feature = "log")]
                log::debug!("element: {:02x?}", elem);

                self.element = Some(elem);
                self.state = State::Element(0);

                Ok(Output::Pending)
            }

            // All elements consumed, finalize the sighash
            Ok(DecodeResult::Finished) => {
                let hash = match self.decoder.take() {
                    Some(d) => d.finalize(),
                    None => return Err(self.fail(Error::Developer)),
                };
                self.hash = Some(hash);

                match self.sign {
                    true => {
                        self.state = State::Pending;
                        Ok(Output::Pending)
                    }
                    false => {
                        self.state = State::Complete;
                        Ok(Output::TxHash { hash })
                    }
                }
            }

            Err(e) => Err(self.fail(e)),
        }
    }

    /// Approve a pending signing session, producing the signature.
    ///
    /// Only valid in `State::Pending`, after every element has been reviewed.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn approve(&mut self) -> Result<Output, Error> {
        if self.state != State::Pending {
            return Err(Error::InvalidState);
        }

        let hash = match self.hash {
            Some(h) => h,
            None => return Err(self.fail(Error::Developer)),
        };

        let signature = derive_and_sign(&self.drv, self.key_index, &hash);

        self.state = State::Complete;

        Ok(Output::TxSignature { signature })
    }

    /// Deny the open session. User rejection is a terminal outcome, not an
    /// error
    pub fn deny(&mut self) {
        self.clear();
        self.state = State::Denied;
    }

    /// Reset engine state
    pub fn reset(&mut self) {
        self.clear();
        self.state = State::Init;
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Render the screen for the current session state.
    ///
    /// Screens are derived on demand so redraws never show stale content.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn screen(&self) -> Result<Screen, Error> {
        match self.state {
            State::Element(part) => match &self.element {
                Some(e) => format_element(e, part),
                None => Err(Error::Developer),
            },
            State::Pending => sign_screen(self.key_index),
            State::Complete => match (self.sign, &self.hash) {
                (false, Some(h)) => compare_screen(h),
                _ => Err(Error::InvalidState),
            },
            _ => Err(Error::InvalidState),
        }
    }

    /// Discard all session state
    fn clear(&mut self) {
        self.decoder = None;
        self.element = None;
        self.hash = None;
        self.sign = false;
        self.key_index = 0;
    }

    /// Mark the session failed, discarding its state.
    ///
    /// Lifecycle violations return to idle so the next initialisation starts
    /// clean; decode and internal failures park in `State::Error` until the
    /// host opens a fresh session.
    fn fail(&mut self, e: Error) -> Error {
        #[cfg(feature = "log")]
        log::warn!("session failed: {:?}", e);

        self.clear();
        self.state = match e {
            Error::ImproperInit => State::Init,
            _ => State::Error,
        };

        e
    }
}
