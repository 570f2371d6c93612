use crate::{
    ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_SEARCH_CMD, OneWire, OneWireResult, RomId, Triplet,
    error::OneWireError,
};

#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Type of search performed using [`OneWireSearch`].
pub enum SearchKind {
    /// Normal search
    #[default]
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devices with alarm
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

/// Where a [`OneWireSearch`] stands in its enumeration pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Fresh cursor, the next step starts from the lowest branch.
    #[default]
    NotStarted,
    /// At least one device was reported and unexplored branches remain.
    InProgress,
    /// The last device was reported; further steps return `None`.
    Exhausted,
}

/// Cursor of the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
///
/// The cursor holds no reference to the bus, so a bus master can own one and
/// step it with itself. Each call to [`next`](OneWireSearch::next) reports one
/// device; a bus with N devices is enumerated in N calls, the N+1-th returning
/// `None`.
///
/// Bit positions are counted from 1 to 64, 0 meaning "no discrepancy".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OneWireSearch {
    kind: SearchKind,
    phase: SearchPhase,
    last_discrepancy: u8,
    last_family_discrepancy: u8,
    rom: RomId,
}

impl OneWireSearch {
    /// Creates a new [`OneWireSearch`] instance.
    ///
    /// # Arguments
    /// * `kind` - [`SearchKind::Normal`] to find every device, [`SearchKind::Alarmed`] for devices in alarm state only.
    pub fn new(kind: SearchKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Rewinds the cursor so the next step starts a fresh enumeration.
    pub fn reset(&mut self) {
        self.phase = SearchPhase::NotStarted;
        self.last_discrepancy = 0;
        self.last_family_discrepancy = 0;
        self.rom = RomId::default();
    }

    /// Current phase of the enumeration.
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Kind of search issued on the bus.
    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    /// Position (1..=64) of the last branch where the 0 path was taken, 0 if none.
    pub fn last_discrepancy(&self) -> u8 {
        self.last_discrepancy
    }

    /// ROM assembled by the last step.
    pub fn rom(&self) -> &RomId {
        &self.rom
    }

    /// Primes the cursor so the next step reports the first device of `family`.
    ///
    /// If no such device exists the next step reports whichever device
    /// follows it in search order; check [`RomId::family`] on the result.
    pub fn target_family(&mut self, family: u8) {
        self.rom = RomId::new([family, 0, 0, 0, 0, 0, 0, 0]);
        self.last_discrepancy = 64;
        self.last_family_discrepancy = 0;
        self.phase = SearchPhase::InProgress;
    }

    /// Makes the next step skip every remaining device sharing the family
    /// code of the last reported device.
    pub fn skip_family(&mut self) {
        self.last_discrepancy = self.last_family_discrepancy;
        self.last_family_discrepancy = 0;
        if self.last_discrepancy == 0 {
            self.phase = SearchPhase::Exhausted;
        }
    }

    /// Searches for the next device on the 1-Wire bus.
    ///
    /// # Returns
    /// * `Ok(Some(rom))` for the next device in search order.
    /// * `Ok(None)` once the enumeration is exhausted, or when nothing answers
    ///   the reset pulse (the cursor is left untouched in that case).
    ///
    /// # Errors
    /// [`OneWireError::ProtocolViolation`] if both the id bit and its
    /// complement read 1. The cursor is left as it was; call
    /// [`reset`](OneWireSearch::reset) before retrying.
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: OneWire>(&mut self, bus: &mut T) -> OneWireResult<Option<RomId>, T::BusError> {
        if self.phase == SearchPhase::Exhausted {
            return Ok(None);
        }
        if !bus.reset()? {
            log::debug!("search: no presence pulse");
            return Ok(None);
        }
        bus.write_byte(self.kind as u8)?;
        let mut last_zero: u8 = 0;
        let mut last_family = self.last_family_discrepancy;
        let mut rom = self.rom;
        for id_bit_num in 1..=64u8 {
            let idx = id_bit_num - 1;
            // Replay the previous path below the last discrepancy, take the
            // 1 branch at it and the 0 branch beyond it.
            let dir = if id_bit_num < self.last_discrepancy {
                rom.bit(idx)
            } else {
                id_bit_num == self.last_discrepancy
            };
            let triplet = match bus.read_triplet(dir) {
                Ok(triplet) => triplet,
                Err(OneWireError::Unimplemented) => Self::bitwise_triplet(bus, dir)?,
                Err(e) => return Err(e),
            };
            if triplet.id_bit && triplet.complement_bit {
                // Nothing in alarm: every device sits out a conditional search.
                if self.kind == SearchKind::Alarmed && id_bit_num == 1 {
                    log::debug!("search: no device in alarm state");
                    return Ok(None);
                }
                log::debug!("search: no response at bit {id_bit_num}");
                return Err(OneWireError::ProtocolViolation);
            }
            if !triplet.id_bit && !triplet.complement_bit && !triplet.direction {
                last_zero = id_bit_num;
                if last_zero < 9 {
                    last_family = last_zero;
                }
            }
            rom.set_bit(idx, triplet.direction);
        }
        self.rom = rom;
        self.last_discrepancy = last_zero;
        self.last_family_discrepancy = last_family;
        self.phase = if last_zero == 0 {
            SearchPhase::Exhausted
        } else {
            SearchPhase::InProgress
        };
        log::debug!("search: found {} (last discrepancy {})", self.rom, last_zero);
        Ok(Some(self.rom))
    }

    /// Checks whether the device with the given ROM code is present on the 1-Wire bus.
    ///
    /// The cursor is reset afterwards; calling [`next`](OneWireSearch::next) starts a new search.
    pub fn verify<T: OneWire>(
        &mut self,
        bus: &mut T,
        rom: &RomId,
    ) -> OneWireResult<bool, T::BusError> {
        self.rom = *rom;
        self.last_discrepancy = 64;
        self.last_family_discrepancy = 0;
        self.phase = SearchPhase::InProgress;
        let res = match self.next(bus) {
            Ok(found) => found == Some(*rom),
            Err(OneWireError::ProtocolViolation) => false,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };
        self.reset();
        Ok(res)
    }

    /// Triplet emulation for bus masters that can only read and write single bits.
    fn bitwise_triplet<T: OneWire>(bus: &mut T, dir: bool) -> OneWireResult<Triplet, T::BusError> {
        let id_bit = bus.read_bit()?;
        let complement_bit = bus.read_bit()?;
        let direction = if id_bit != complement_bit { id_bit } else { dir };
        if !(id_bit && complement_bit) {
            bus.write_bit(direction)?;
        }
        Ok(Triplet {
            id_bit,
            complement_bit,
            direction,
        })
    }
}
