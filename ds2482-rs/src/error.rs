use core::fmt;

#[derive(Debug, PartialEq, Eq)]
/// DS2482 Hardware Errors
pub enum Ds2482Error<E> {
    /// I2C bus errors.
    I2c(E),
    /// The bridge did not report a completed device reset within the retry budget.
    RetriesExceeded,
    /// The configuration read back after a write differs from what was written.
    ConfigMismatch {
        /// Configuration nibble written.
        written: u8,
        /// Configuration nibble read back.
        read: u8,
    },
}

impl<E> From<E> for Ds2482Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Ds2482Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C transport error: {e:?}"),
            Self::RetriesExceeded => f.write_str("DS2482 did not complete its device reset"),
            Self::ConfigMismatch { written, read } => write!(
                f,
                "DS2482 configuration mismatch: wrote {written:#04x}, read back {read:#04x}"
            ),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Ds2482Error<E> {}

/// Non-fatal conditions recorded by a [`Ds2482`](crate::Ds2482).
///
/// Operations that hit one of these keep going with the data they have; the
/// first fault is latched until [`clear_fault`](crate::Ds2482::clear_fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The 1-Wire busy bit was still set after the last poll.
    BusyTimeout,
    /// A configuration write was not accepted by the bridge.
    ConfigMismatch,
    /// Id bit and complement both read 1 during a ROM search.
    ProtocolViolation,
    /// A 1-Wire reset sampled the line low at the short-detect time.
    ShortDetected,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BusyTimeout => "1-Wire busy timeout",
            Self::ConfigMismatch => "configuration write not verified",
            Self::ProtocolViolation => "no response during ROM search",
            Self::ShortDetected => "1-Wire short detected",
        })
    }
}
