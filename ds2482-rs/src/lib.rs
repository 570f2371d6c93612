#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

/*! # DS2482
 *
 * Driver for the DS2482-100 single-channel I2C to 1-Wire bridge.
 *
 * The host never drives the 1-Wire line itself: every bus operation is a
 * bridge command followed by polling the status register until the bridge
 * reports the line idle again. [`Ds2482`] implements [`OneWire`] on top of
 * that, and holds a [`OneWireSearch`] cursor to enumerate the bus one device
 * per [`search`](Ds2482::search) call.
 *
 * Timeouts, rejected configuration writes, aborted searches and shorts do not
 * abort the calling operation. They latch a [`Fault`] that callers inspect
 * with [`fault`](Ds2482::fault). Only I2C transport errors are returned as
 * errors.
 */

pub use embedded_onewire::{
    OneWire, OneWireError, OneWireResult, OneWireSearch, RomId, SearchKind, SearchPhase, crc8,
};
mod error;
mod onewire;
mod registers;

pub use error::{Ds2482Error, Fault};
pub use registers::{DeviceConfiguration, DeviceStatus, Ds2482Builder, Register};

/// Results of DS2482-specific function calls.
pub type Ds2482Result<T, E> = Result<T, Ds2482Error<E>>;

/// Fixed part of the 7-bit I2C address.
pub const DS2482_BASE_ADDR: u8 = 0x18;

/// Number of status polls before a busy-wait gives up.
pub const BUSY_POLL_LIMIT: u16 = 1000;

/// Delay between two status polls, in microseconds.
pub const BUSY_POLL_INTERVAL_US: u32 = 20;

/// Level of the AD1/AD0 address pins, selecting one of four bridges on an I2C bus.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AddressPins {
    /// AD1 = 0, AD0 = 0
    #[default]
    Ad00 = 0b00,
    /// AD1 = 0, AD0 = 1
    Ad01 = 0b01,
    /// AD1 = 1, AD0 = 0
    Ad10 = 0b10,
    /// AD1 = 1, AD0 = 1
    Ad11 = 0b11,
}

impl AddressPins {
    /// Decode a 2-bit instance selector.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(Self::Ad00),
            0b01 => Some(Self::Ad01),
            0b10 => Some(Self::Ad10),
            0b11 => Some(Self::Ad11),
            _ => None,
        }
    }

    /// 7-bit I2C address of a bridge strapped this way.
    pub const fn i2c_address(self) -> u8 {
        DS2482_BASE_ADDR | self as u8
    }
}

/// A DS2482 I2C to 1-Wire bridge device.
///
/// Takes ownership of an I2C bus (implementing [`I2c`](embedded_hal::i2c::I2c) trait)
/// and a timer object implementing the [`DelayNs`](embedded_hal::delay::DelayNs) trait.
///
/// Not meant to be shared between execution contexts: the search cursor and
/// the fault latch are plain fields.
pub struct Ds2482<I, D> {
    pub(crate) i2c: I,
    pub(crate) addr: u8,
    pub(crate) delay: D,
    pub(crate) retries: u16,
    pub(crate) fault: Option<Fault>,
    pub(crate) search: OneWireSearch,
}

impl<I, D> Ds2482<I, D> {
    /// Creates a new instance of `Ds2482` with the given I2C interface.
    ///
    /// No bus traffic is generated; use [`Ds2482Builder`] to also reset and
    /// configure the bridge.
    pub fn new(i2c: I, delay: D) -> Self {
        Ds2482 {
            i2c,
            addr: DS2482_BASE_ADDR,
            delay,
            retries: BUSY_POLL_LIMIT,
            fault: None,
            search: OneWireSearch::default(),
        }
    }

    /// Select the bridge by the level of its address pins.
    pub fn with_address_pins(mut self, pins: AddressPins) -> Self {
        self.addr = pins.i2c_address();
        self
    }

    /// Set the retry count.
    ///
    /// The retry count bounds how many times the status register is polled
    /// before a busy-wait gives up. At least one poll is always made.
    pub fn with_retries(mut self, retries: u16) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// 7-bit I2C address of the bridge.
    pub fn i2c_address(&self) -> u8 {
        self.addr
    }

    /// The latched fault, if any.
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Whether a fault has been latched since construction or the last [`clear_fault`](Ds2482::clear_fault).
    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Clears the fault latch, returning what it held.
    pub fn clear_fault(&mut self) -> Option<Fault> {
        self.fault.take()
    }

    pub(crate) fn record(&mut self, fault: Fault) {
        log::warn!("DS2482@{:#04x}: {}", self.addr, fault);
        self.fault.get_or_insert(fault);
    }

    /// Rewinds the search cursor; the next [`search`](Ds2482::search) starts a fresh enumeration.
    pub fn reset_search(&mut self) {
        self.search.reset();
    }

    /// Replaces the search cursor with a fresh one issuing `kind`.
    pub fn set_search_kind(&mut self, kind: SearchKind) {
        self.search = OneWireSearch::new(kind);
    }

    /// Primes the search cursor to start at the first device of `family`.
    pub fn target_family(&mut self, family: u8) {
        self.search.target_family(family);
    }

    /// Makes the next search step skip the remaining devices of the last reported family.
    pub fn skip_family(&mut self) {
        self.search.skip_family();
    }

    /// Phase of the current enumeration.
    pub fn search_phase(&self) -> SearchPhase {
        self.search.phase()
    }

    /// Consume the driver, handing back the I2C bus and the delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}
