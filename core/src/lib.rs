//! Sia hardware wallet core
//!
//! This provides a common [Engine][engine] supporting streaming transaction
//! verification, hashing, and signing for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s
//! and [Output][engine::Output]s, see [ledger_sia_apdu] for APDU objects and wire
//! encodings.
//!
//! ## Operations
//!
//! A transaction is streamed to the device in packets of at most 255 bytes and
//! is never buffered in full: the engine decodes one element at a time, feeds
//! every canonical byte into a running BLAKE2b-256 sighash, and shows each
//! element on the trusted display for user review.
//!
//! 1. Issue [`TxHashInit`][ledger_sia_apdu::tx_hash::TxHashInit] with the key
//!    index, signature index, and options to open a session, followed by the
//!    first transaction bytes
//! 2. While the device replies with a [`TxInfo`][ledger_sia_apdu::tx_hash::TxInfo]
//!    in the `Loading` state, issue [`TxHashNext`][ledger_sia_apdu::tx_hash::TxHashNext]
//!    with further transaction bytes. No reply is produced while the user is
//!    paging through a decoded element
//! 3. Once all declared elements are decoded the session terminates with either
//!    a [`TxHashResp`][ledger_sia_apdu::tx_hash::TxHashResp] containing the
//!    32-byte sighash, or, when signing was requested and the user approves,
//!    a [`TxSignResp`][ledger_sia_apdu::tx_hash::TxSignResp] containing a
//!    64-byte ed25519 signature over it
//!
//! Exactly one session may be open at a time: a `TxHashInit` while a session is
//! open and a `TxHashNext` without one both fail with `SW_IMPROPER_INIT`, so a
//! host can neither splice two transactions into one approval nor resume a
//! finished session.

#![cfg_attr(not(feature = "std"), no_std)]

pub use ledger_sia_apdu::{self as apdu};

pub mod engine;

pub mod helpers;
