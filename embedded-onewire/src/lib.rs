#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
//! # embedded-onewire
//! A no-std implementation of the 1-Wire protocol.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing you to implement the protocol on various bus masters.
//! [OneWire] trait defines the basic operations required for 1-Wire communication, such as resetting the bus, writing and reading bytes, and writing and reading bits.
//!
//! The crate also provides the search algorithm for discovering devices on the 1-Wire bus in [OneWireSearch],
//! the [RomId] value type and the 1-Wire CRC-8 in [OneWireCrc].

mod consts;
mod error;
mod rom;
mod search;
mod traits;
mod utils;
pub use consts::*;
pub use error::OneWireError;
pub use rom::RomId;
pub use search::{OneWireSearch, SearchKind, SearchPhase};
pub use traits::{OneWire, Triplet};
pub use utils::{OneWireCrc, crc8};

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
