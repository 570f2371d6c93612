use crate::{
    OneWireError, OneWireResult, RomId,
    consts::{ONEWIRE_MATCH_ROM_CMD, ONEWIRE_SKIP_ROM_CMD},
};

/// Outcome of one [`OneWire::read_triplet`] step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Triplet {
    /// Wired-AND of the id bit of all participating devices.
    pub id_bit: bool,
    /// Wired-AND of the complement of the id bit of all participating devices.
    pub complement_bit: bool,
    /// Direction written in the third time slot.
    pub direction: bool,
}

/// Trait for 1-Wire communication.
/// This trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
/// writing and reading bytes, and writing and reading bits.
///
/// Every operation blocks until the bus master has finished the corresponding time slots.
pub trait OneWire {
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus.
    ///
    /// # Returns
    /// `true` if at least one device answered with a presence pulse.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails.
    fn reset(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus.
    /// # Arguments
    /// * `byte` - The byte to write to the bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError>;

    /// Reads a byte from the 1-Wire bus.
    /// # Returns
    /// Byte read from the bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError>;

    /// Generates a single write time slot.
    /// # Arguments
    ///
    /// * `bit` - The bit to write.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit from the 1-Wire bus.
    /// # Returns
    /// The bit read from the bus.
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// # Note: Not intended for public API use.
    /// ## This method is internally used by the [search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
    ///
    /// Generates three time slots: two read time slots and one write time slot at the 1-Wire line. The
    /// type of write time slot depends on the result of the read time slots and the direction.
    /// The direction determines the type of write time slot if both read time slots are 0 (a typical
    /// case). In this case, a write-one time slot is generated if `direction` is true and a write-zero time
    /// slot otherwise.
    /// If the read time slots are 0 and 1, they are followed by a write-zero time slot.
    /// If the read time slots are 1 and 0, they are followed by a write-one time slot.
    /// If the read time slots are both 1 (error case), the subsequent write time slot is a write-one.
    ///
    /// # Errors
    /// Bus masters without a triplet primitive return [`OneWireError::Unimplemented`],
    /// in which case the search falls back to [`read_bit`](OneWire::read_bit) and
    /// [`write_bit`](OneWire::write_bit).
    fn read_triplet(&mut self, _direction: bool) -> OneWireResult<Triplet, Self::BusError> {
        Err(OneWireError::Unimplemented)
    }

    /// Sends the Match ROM command followed by `rom`, targeting one device among many.
    ///
    /// The bus must have been reset beforehand.
    fn select(&mut self, rom: &RomId) -> OneWireResult<(), Self::BusError> {
        self.write_byte(ONEWIRE_MATCH_ROM_CMD)?;
        for &b in rom.as_bytes() {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Sends the Skip ROM command, addressing every device on the bus.
    ///
    /// The bus must have been reset beforehand.
    fn skip(&mut self) -> OneWireResult<(), Self::BusError> {
        self.write_byte(ONEWIRE_SKIP_ROM_CMD)
    }

    /// Addresses devices on the 1-Wire bus.
    /// Resets the bus, then selects `rom` or, given [`None`], skips ROM addressing.
    /// Note: A [`read_byte`](OneWire::read_byte) or [`read_bit`](OneWire::read_bit) call will return garbage data if this method is called without specifying a ROM address on a bus with multiple devices.
    ///
    /// # Errors
    /// [`OneWireError::NoDevicePresent`] if nothing answers the reset pulse.
    fn address(&mut self, rom: Option<&RomId>) -> OneWireResult<(), Self::BusError> {
        if !self.reset()? {
            return Err(OneWireError::NoDevicePresent);
        }
        match rom {
            Some(rom) => self.select(rom),
            None => self.skip(),
        }
    }
}
