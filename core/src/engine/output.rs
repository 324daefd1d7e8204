use encdec::Encode;

use ledger_proto::ApduError;

use crate::apdu;

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    None,

    /// Session state, returned by info polls and packet acknowledgements
    State { state: super::State },

    /// Device is waiting for user input, no reply until review completes
    Pending,

    /// Final sighash of a digest-only session
    TxHash { hash: [u8; 32] },

    /// Signature over the final sighash of an approved signing session
    TxSignature { signature: [u8; 64] },
}

impl Output {
    /// Encode an [`Output`] object to a response [APDU][crate::apdu]
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self.clone() {
            Output::None | Output::Pending => Ok(0),
            Output::State { state } => apdu::tx_hash::TxInfo {
                state: state.state(),
                pad: 0,
                value: state.value(),
            }
            .encode(buff),
            Output::TxHash { hash } => apdu::tx_hash::TxHashResp { hash }.encode(buff),
            Output::TxSignature { signature } => {
                apdu::tx_hash::TxSignResp { signature }.encode(buff)
            }
        }
    }
}

impl PartialEq<super::State> for Output {
    fn eq(&self, other: &super::State) -> bool {
        match self {
            Output::State { state } => state == other,
            _ => false,
        }
    }
}

impl crate::engine::State {
    /// Map [engine](crate::engine) states to [apdu][apdu::state::TxState] states for transmission
    pub fn state(&self) -> apdu::state::TxState {
        use crate::{apdu::state::TxState, engine::State};

        match self {
            State::Init => TxState::Idle,
            State::Loading => TxState::Loading,
            State::Element(_) => TxState::Element,
            State::Pending => TxState::Pending,
            State::Complete => TxState::Complete,
            State::Denied => TxState::Denied,
            State::Error => TxState::Error,
        }
    }

    /// Part index for element review states, zero otherwise
    pub fn value(&self) -> u16 {
        use crate::engine::State;

        match self {
            State::Element(n) => *n as u16,
            _ => 0,
        }
    }
}
