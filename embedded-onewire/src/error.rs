use core::fmt;

/// One wire communication error type.
#[derive(Debug, PartialEq, Eq)]
pub enum OneWireError<E> {
    /// Encapsulates the error type from the underlying hardware.
    Other(E),
    /// Indicates that no device answered the reset pulse.
    NoDevicePresent,
    /// The id bit and its complement both read 1 during a ROM search.
    ///
    /// No device drove the bus at that position, usually because a device
    /// left the bus mid-search.
    ProtocolViolation,
    /// Indicates that the operation is not implemented by the bus master, such as reading a triplet when not supported.
    Unimplemented,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}

impl<E: fmt::Display> fmt::Display for OneWireError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(e) => write!(f, "bus master error: {e}"),
            Self::NoDevicePresent => f.write_str("no presence pulse on the 1-Wire bus"),
            Self::ProtocolViolation => f.write_str("no device responded during ROM search"),
            Self::Unimplemented => f.write_str("operation not supported by the bus master"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for OneWireError<E> {}
