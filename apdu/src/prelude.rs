//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    state::TxState,
    tx_hash::{TxHashFlags, TxHashInit, TxHashNext, TxHashResp, TxInfo, TxInfoReq, TxSignResp},
};
