use core::fmt;

use crate::utils::crc8;

/// 64-bit ROM code identifying a 1-Wire device.
///
/// | Byte | Description |
/// |------|-------------|
/// | 0 | Family code (e.g., 0x28 for DS18B20) |
/// | 1-6 | Serial number, least significant byte first |
/// | 7 | CRC-8 of bytes 0-6 |
///
/// Bit `i` of the ROM is bit `i % 8` of byte `i / 8`; this is the order in
/// which devices shift their ROM onto the bus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RomId([u8; 8]);

impl RomId {
    /// Wrap raw ROM bytes as they appear on the wire.
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Build a ROM from a family code and a 48-bit serial, appending the CRC.
    pub fn from_parts(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [0; 8];
        bytes[0] = family;
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = crc8(&bytes[..7]);
        Self(bytes)
    }

    /// Raw ROM bytes.
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Family code.
    pub const fn family(&self) -> u8 {
        self.0[0]
    }

    /// 48-bit serial number.
    pub fn serial(&self) -> [u8; 6] {
        let mut serial = [0; 6];
        serial.copy_from_slice(&self.0[1..7]);
        serial
    }

    /// CRC byte carried by the ROM.
    pub const fn crc(&self) -> u8 {
        self.0[7]
    }

    /// Whether the carried CRC matches the CRC of the first seven bytes.
    pub fn is_valid(&self) -> bool {
        crc8(&self.0[..7]) == self.0[7]
    }

    /// Value of ROM bit `idx` (0..64).
    pub(crate) fn bit(&self, idx: u8) -> bool {
        self.0[(idx / 8) as usize] & (1 << (idx % 8)) != 0
    }

    pub(crate) fn set_bit(&mut self, idx: u8, value: bool) {
        let mask = 1 << (idx % 8);
        if value {
            self.0[(idx / 8) as usize] |= mask;
        } else {
            self.0[(idx / 8) as usize] &= !mask;
        }
    }
}

impl From<[u8; 8]> for RomId {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl From<RomId> for [u8; 8] {
    fn from(rom: RomId) -> Self {
        rom.0
    }
}

impl From<u64> for RomId {
    /// The family code is the least significant byte.
    fn from(value: u64) -> Self {
        Self(value.to_le_bytes())
    }
}

impl From<RomId> for u64 {
    fn from(rom: RomId) -> Self {
        u64::from_le_bytes(rom.0)
    }
}

impl fmt::Display for RomId {
    /// Printed as sixteen hex digits, CRC first, the way ROM codes are usually labelled.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", u64::from(*self))
    }
}

impl fmt::LowerHex for RomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&u64::from(*self), f)
    }
}
