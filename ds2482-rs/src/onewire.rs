use crate::{Ds2482, Ds2482Error, Fault};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};
use embedded_onewire::{OneWire, OneWireError, OneWireResult, OneWireSearch, RomId, Triplet};

pub(crate) const ONEWIRE_RESET_CMD: u8 = 0xb4;
pub(crate) const ONEWIRE_WRITE_BYTE: u8 = 0xa5;
pub(crate) const ONEWIRE_READ_BYTE: u8 = 0x96;
pub(crate) const ONEWIRE_SINGLE_BIT: u8 = 0x87;
pub(crate) const ONEWIRE_TRIPLET: u8 = 0x78;

/// Bit 7 of the Single Bit and Triplet parameter byte carries the bit value.
const fn bit_param(bit: bool) -> u8 {
    if bit { 0x80 } else { 0x00 }
}

impl<I2C: I2c<SevenBitAddress>, D: DelayNs> OneWire for Ds2482<I2C, D> {
    type BusError = Ds2482Error<I2C::Error>;

    /// Generates a reset/presence-detect cycle.
    ///
    /// A detected short latches [`Fault::ShortDetected`]; the presence bit is still returned.
    fn reset(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.wait_on_busy()?;
        self.command(&[ONEWIRE_RESET_CMD])?;
        let status = self.wait_on_busy()?;
        if status.short_detect() {
            self.record(Fault::ShortDetected);
        }
        Ok(status.presence_pulse_detect())
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        self.wait_on_busy()?;
        self.command(&[ONEWIRE_WRITE_BYTE, byte])?;
        Ok(())
    }

    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        self.wait_on_busy()?;
        self.command(&[ONEWIRE_READ_BYTE])?;
        // The byte lands in the data register only once the read slots are done.
        self.wait_on_busy()?;
        Ok(self.read_data()?)
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        self.wait_on_busy()?;
        self.command(&[ONEWIRE_SINGLE_BIT, bit_param(bit)])?;
        Ok(())
    }

    /// A write-one slot releases the line, letting a device pull it low.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.write_bit(true)?;
        Ok(self.wait_on_busy()?.single_bit_result())
    }

    fn read_triplet(&mut self, direction: bool) -> OneWireResult<Triplet, Self::BusError> {
        self.wait_on_busy()?;
        self.command(&[ONEWIRE_TRIPLET, bit_param(direction)])?;
        let status = self.wait_on_busy()?;
        Ok(Triplet {
            id_bit: status.single_bit_result(),
            complement_bit: status.triplet_second_bit(),
            direction: status.branch_dir_taken(),
        })
    }
}

impl<I2C: I2c<SevenBitAddress>, D: DelayNs> Ds2482<I2C, D> {
    /// Finds the next device on the 1-Wire bus.
    ///
    /// Call [`reset_search`](Ds2482::reset_search) before the first step of an
    /// enumeration. Returns `Ok(None)` when the enumeration is exhausted or no
    /// device answers the reset. A search aborted because no device responded
    /// also returns `Ok(None)` and latches [`Fault::ProtocolViolation`].
    pub fn search(&mut self) -> OneWireResult<Option<RomId>, Ds2482Error<I2C::Error>> {
        let mut cursor = self.search;
        let res = cursor.next(self);
        self.search = cursor;
        match res {
            Err(OneWireError::ProtocolViolation) => {
                self.record(Fault::ProtocolViolation);
                Ok(None)
            }
            res => res,
        }
    }

    /// Checks whether the device with ROM `rom` is on the bus.
    ///
    /// Uses a separate cursor; an enumeration in progress is not disturbed.
    pub fn verify(&mut self, rom: &RomId) -> OneWireResult<bool, Ds2482Error<I2C::Error>> {
        OneWireSearch::default().verify(self, rom)
    }
}
