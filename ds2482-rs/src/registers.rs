use crate::{
    AddressPins, BUSY_POLL_INTERVAL_US, BUSY_POLL_LIMIT, Ds2482, Ds2482Error, Ds2482Result, Fault,
};
use bitfield_struct::bitfield;
use embedded_hal::{
    delay::DelayNs,
    i2c::{Error as _, ErrorKind, I2c, SevenBitAddress},
};

pub(crate) const DEVICE_RST_CMD: u8 = 0xf0; // Reset the device
pub(crate) const SET_READ_PTR_CMD: u8 = 0xe1; // Set the read pointer
pub(crate) const WRITE_CONFIG_CMD: u8 = 0xd2; // Write device configuration

/// Registers the read pointer can select.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// [`DeviceStatus`]
    Status = 0xf0,
    /// Byte received by the last 1-Wire Read Byte command.
    Data = 0xe1,
    /// [`DeviceConfiguration`]
    Config = 0xc3,
}

/// Status register for DS2482
///
/// The read-only Status register is the general means for the DS2482 to
/// report bit-type data from the 1-Wire side, 1-Wire busy status, and its own
/// reset status to the host processor. All 1-Wire communication commands and
/// the Device Reset command position the read pointer at the Status register.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct DeviceStatus {
    /// 1WB: the bridge is executing a 1-Wire command. Most commands must
    /// wait for this to return to 0.
    pub onewire_busy: bool,
    /// PPD: updated with every 1-Wire Reset; set if a device answered with a
    /// presence pulse.
    pub presence_pulse_detect: bool,
    /// SD: updated with every 1-Wire Reset; set if the line was low at the
    /// short-detect sampling time. PPD is set too in that case.
    pub short_detect: bool,
    /// LL: logic level of the 1-Wire line, sampled on every status read.
    pub logic_level: bool,
    /// RST: the bridge went through an internal reset. Cleared by the next
    /// configuration write.
    pub device_reset: bool,
    /// SBR: line level sampled in a 1-Wire Single Bit command, or the first
    /// bit of a 1-Wire Triplet.
    pub single_bit_result: bool,
    /// TSB: second bit of a 1-Wire Triplet.
    pub triplet_second_bit: bool,
    /// DIR: direction written by the third slot of a 1-Wire Triplet.
    pub branch_dir_taken: bool,
}

#[bitfield(u8)]
#[derive(PartialEq, Eq)]
/// # Device configuration register
///
/// Selects the 1-Wire features of the bridge. On the wire the upper nibble
/// must carry the one's complement of the lower nibble or the bridge ignores
/// the write; reading the register back returns the lower nibble with the
/// upper nibble cleared.
///
/// After a device reset the register reads 00h.
pub struct DeviceConfiguration {
    /// APU: drive rising edges with the active pullup instead of the
    /// passive pullup resistor. Generally recommended.
    pub active_pullup: bool,
    __reserved: bool,
    /// SPU: strong pullup after the next 1-Wire Write Byte or Single Bit,
    /// for parasitically powered devices. Cleared by the bridge once the
    /// strong pullup ends.
    pub strong_pullup: bool,
    /// 1WS: overdrive speed.
    pub onewire_speed: bool,
    #[bits(4)]
    __complement: u8,
}

impl DeviceConfiguration {
    /// Byte sent with the Write Configuration command.
    pub const fn to_wire(self) -> u8 {
        let cfg = self.into_bits() & 0x0f;
        cfg | ((!cfg & 0x0f) << 4)
    }

    /// Configuration nibble, as the bridge reports it back.
    pub const fn nibble(self) -> u8 {
        self.into_bits() & 0x0f
    }
}

/// Builder for creating a [`Ds2482`] instance with custom configuration.
#[derive(Debug)]
pub struct Ds2482Builder {
    pub(crate) pins: AddressPins,
    pub(crate) retries: u16,
    pub(crate) config: DeviceConfiguration,
}

impl Default for Ds2482Builder {
    fn default() -> Self {
        Ds2482Builder {
            pins: AddressPins::default(),
            retries: BUSY_POLL_LIMIT,
            config: DeviceConfiguration::new(),
        }
    }
}

impl Ds2482Builder {
    /// Selects the bridge by the level of its address pins.
    pub fn with_address_pins(mut self, pins: AddressPins) -> Self {
        self.pins = pins;
        self
    }

    /// Sets the retry count for the device.
    ///
    /// The retry count bounds how many times the status register is polled
    /// before a busy-wait gives up.
    pub fn with_retries(mut self, retries: u16) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the device configuration.
    pub fn with_config(mut self, config: DeviceConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Builds a new `Ds2482` instance, resetting the bridge and applying the configuration.
    ///
    /// # Errors
    /// * [`Ds2482Error::RetriesExceeded`] if the bridge never reports the reset.
    /// * [`Ds2482Error::ConfigMismatch`] if the configuration is not accepted.
    pub fn build<I: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: I,
        delay: D,
    ) -> Ds2482Result<Ds2482<I, D>, I::Error> {
        let mut dev = Ds2482::new(i2c, delay)
            .with_address_pins(self.pins)
            .with_retries(self.retries);
        if !dev.device_reset()?.device_reset() {
            return Err(Ds2482Error::RetriesExceeded);
        }
        let read = dev.write_config(self.config)?;
        if read.nibble() != self.config.nibble() {
            return Err(Ds2482Error::ConfigMismatch {
                written: self.config.nibble(),
                read: read.nibble(),
            });
        }
        Ok(dev)
    }
}

impl<I2C: I2c<SevenBitAddress>, D: DelayNs> Ds2482<I2C, D> {
    /// Sends a bridge command with its parameter bytes.
    pub(crate) fn command(&mut self, bytes: &[u8]) -> Ds2482Result<(), I2C::Error> {
        log::trace!("DS2482@{:#04x} <- {:02x?}", self.addr, bytes);
        self.i2c.write(self.addr, bytes)?;
        Ok(())
    }

    /// Reads one byte from whichever register the read pointer selects.
    fn read_current(&mut self) -> Ds2482Result<u8, I2C::Error> {
        let mut buf = [0; 1];
        self.i2c.read(self.addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Checks whether the bridge acknowledges its address.
    pub fn probe(&mut self) -> Ds2482Result<bool, I2C::Error> {
        match self.i2c.write(self.addr, &[]) {
            Ok(()) => Ok(true),
            Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Points subsequent reads at `reg`.
    pub fn set_read_pointer(&mut self, reg: Register) -> Ds2482Result<(), I2C::Error> {
        self.command(&[SET_READ_PTR_CMD, reg as u8])
    }

    /// Moves the read pointer to `reg` and reads it in one transaction.
    pub fn read_register(&mut self, reg: Register) -> Ds2482Result<u8, I2C::Error> {
        let mut buf = [0; 1];
        self.i2c
            .write_read(self.addr, &[SET_READ_PTR_CMD, reg as u8], &mut buf)?;
        Ok(buf[0])
    }

    /// Get the status of the device.
    pub fn read_status(&mut self) -> Ds2482Result<DeviceStatus, I2C::Error> {
        self.read_register(Register::Status).map(DeviceStatus::from_bits)
    }

    /// Byte received by the last 1-Wire Read Byte command.
    pub fn read_data(&mut self) -> Ds2482Result<u8, I2C::Error> {
        self.read_register(Register::Data)
    }

    /// Current device configuration.
    pub fn read_config(&mut self) -> Ds2482Result<DeviceConfiguration, I2C::Error> {
        self.read_register(Register::Config)
            .map(DeviceConfiguration::from_bits)
    }

    /// Polls the status register until the 1-Wire line is idle.
    ///
    /// Gives up after the retry count, latching [`Fault::BusyTimeout`]; the
    /// last status read is returned either way.
    pub fn wait_on_busy(&mut self) -> Ds2482Result<DeviceStatus, I2C::Error> {
        self.set_read_pointer(Register::Status)?;
        let mut status = DeviceStatus::new();
        for _ in 0..self.retries {
            status = DeviceStatus::from_bits(self.read_current()?);
            if !status.onewire_busy() {
                return Ok(status);
            }
            self.delay.delay_us(BUSY_POLL_INTERVAL_US);
        }
        self.record(Fault::BusyTimeout);
        Ok(status)
    }

    /// Writes the device configuration and reads it back.
    ///
    /// The bridge silently drops writes it does not accept, so a read-back
    /// that differs latches [`Fault::ConfigMismatch`]. Returns the read-back value.
    pub fn write_config(
        &mut self,
        config: DeviceConfiguration,
    ) -> Ds2482Result<DeviceConfiguration, I2C::Error> {
        self.wait_on_busy()?;
        log::trace!("DS2482@{:#04x} config <- {:#04x}", self.addr, config.to_wire());
        // The bridge leaves the read pointer at the configuration register.
        let mut buf = [0; 1];
        self.i2c
            .write_read(self.addr, &[WRITE_CONFIG_CMD, config.to_wire()], &mut buf)?;
        let read = DeviceConfiguration::from_bits(buf[0]);
        if read.nibble() != config.nibble() {
            self.record(Fault::ConfigMismatch);
        }
        Ok(read)
    }

    /// Reset the device.
    ///
    /// Performs a global reset of device state machine logic. Terminates any ongoing 1-Wire
    /// communication and clears the configuration. Polls until the RST status bit is set,
    /// latching [`Fault::BusyTimeout`] if it never is.
    pub fn device_reset(&mut self) -> Ds2482Result<DeviceStatus, I2C::Error> {
        self.command(&[DEVICE_RST_CMD])?;
        let mut status = DeviceStatus::new();
        for _ in 0..self.retries {
            status = DeviceStatus::from_bits(self.read_current()?);
            if status.device_reset() {
                return Ok(status);
            }
            self.delay.delay_us(BUSY_POLL_INTERVAL_US);
        }
        self.record(Fault::BusyTimeout);
        Ok(status)
    }
}
