/// Reflected form of the 1-Wire CRC polynomial `x^8 + x^5 + x^4 + 1`.
const CRC8_POLY: u8 = 0x8c;

#[cfg(feature = "crc-table")]
const CRC8_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut idx = 0;
    while idx < 256 {
        table[idx] = crc8_bitwise(0, idx as u8);
        idx += 1;
    }
    table
};

const fn crc8_bitwise(crc: u8, byte: u8) -> u8 {
    let mut crc = crc;
    let mut byte = byte;
    let mut bit = 0;
    while bit < 8 {
        let mix = (crc ^ byte) & 0x01;
        crc >>= 1;
        if mix != 0 {
            crc ^= CRC8_POLY;
        }
        byte >>= 1;
        bit += 1;
    }
    crc
}

#[derive(Debug, Default, Clone, Copy)]
/// Calculate CRC-8 used in 1-Wire communications.
pub struct OneWireCrc(u8);

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    #[cfg(feature = "crc-table")]
    pub fn update(&mut self, byte: u8) {
        self.0 = CRC8_TABLE[(self.0 ^ byte) as usize];
    }

    /// Update the CRC with the incoming byte.
    #[cfg(not(feature = "crc-table"))]
    pub fn update(&mut self, byte: u8) {
        self.0 = crc8_bitwise(self.0, byte);
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    ///
    /// An empty sequence is never valid.
    pub fn validate(sequence: &[u8]) -> bool {
        !sequence.is_empty() && crc8(sequence) == 0
    }
}

/// Compute the 1-Wire CRC-8 of `bytes`.
///
/// Bits are shifted in LSB first through a right-shifting register, XORed
/// with `0x8c` whenever the outgoing bit differs from the incoming one.
pub fn crc8(bytes: &[u8]) -> u8 {
    let mut crc = OneWireCrc::default();
    for &byte in bytes {
        crc.update(byte);
    }
    crc.value()
}
