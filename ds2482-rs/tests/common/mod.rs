//! A DS2482-100 with a multi-drop 1-Wire bus behind it, simulated at the
//! I2C command level. Commands complete instantly unless `stuck_busy` is set.

#![allow(dead_code)]

use embedded_hal::{
    delay::DelayNs,
    i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress},
};
use embedded_onewire::RomId;

const STATUS_1WB: u8 = 1 << 0;
const STATUS_PPD: u8 = 1 << 1;
const STATUS_RST: u8 = 1 << 4;
const STATUS_SBR: u8 = 1 << 5;
const STATUS_TSB: u8 = 1 << 6;
const STATUS_DIR: u8 = 1 << 7;

pub struct SimDevice {
    pub rom: RomId,
    pub alarm: bool,
    /// Bytes shifted out when the device is addressed and read.
    pub payload: Vec<u8>,
    active: bool,
    cursor: usize,
}

impl SimDevice {
    pub fn new(rom: RomId, payload: &[u8]) -> Self {
        Self {
            rom,
            alarm: false,
            payload: payload.to_vec(),
            active: false,
            cursor: 0,
        }
    }

    fn rom_bit(&self, idx: u8) -> bool {
        self.rom.as_bytes()[(idx / 8) as usize] & (1 << (idx % 8)) != 0
    }

    fn next_payload_bit(&mut self) -> bool {
        let byte = self.payload.get(self.cursor / 8).copied().unwrap_or(0xff);
        let bit = byte & (1 << (self.cursor % 8)) != 0;
        self.cursor += 1;
        bit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pointer {
    Status,
    Data,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WirePhase {
    Idle,
    AwaitRom,
    Search { bit: u8 },
    Match { idx: usize },
    Transport,
}

pub struct SimBridge {
    pub address: u8,
    pub devices: Vec<SimDevice>,
    /// The busy bit never clears.
    pub stuck_busy: bool,
    /// XORed into the configuration the bridge stores.
    pub config_corruption: u8,
    /// Every device stops responding once a search reaches this ROM bit.
    pub vanish_at: Option<u8>,
    /// Bytes written after a device was addressed.
    pub function_bytes: Vec<u8>,
    pub status_reads: usize,
    pub wire_resets: usize,
    status: u8,
    data: u8,
    config: u8,
    pointer: Pointer,
    phase: WirePhase,
}

impl SimBridge {
    pub fn new(devices: Vec<SimDevice>) -> Self {
        Self {
            address: 0x18,
            devices,
            stuck_busy: false,
            config_corruption: 0,
            vanish_at: None,
            function_bytes: Vec::new(),
            status_reads: 0,
            wire_resets: 0,
            status: STATUS_RST,
            data: 0,
            config: 0,
            pointer: Pointer::Status,
            phase: WirePhase::Idle,
        }
    }

    pub fn with_roms(roms: &[RomId]) -> Self {
        Self::new(roms.iter().map(|&rom| SimDevice::new(rom, &[])).collect())
    }

    fn handle_write(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        let Some((&cmd, params)) = bytes.split_first() else {
            return Ok(());
        };
        match (cmd, params) {
            (0xf0, []) => {
                self.status = STATUS_RST;
                self.config = 0;
                self.phase = WirePhase::Idle;
                self.pointer = Pointer::Status;
            }
            (0xe1, [ptr]) => {
                self.pointer = match ptr {
                    0xf0 => Pointer::Status,
                    0xe1 => Pointer::Data,
                    0xc3 => Pointer::Config,
                    _ => return Err(ErrorKind::Other),
                };
            }
            (0xd2, [cfg]) => {
                if (cfg >> 4) == (!cfg & 0x0f) {
                    self.config = (cfg & 0x0f) ^ self.config_corruption;
                    self.status &= !STATUS_RST;
                }
                self.pointer = Pointer::Config;
            }
            (0xb4, []) => {
                self.wire_resets += 1;
                self.phase = WirePhase::AwaitRom;
                for dev in self.devices.iter_mut() {
                    dev.active = true;
                    dev.cursor = 0;
                }
                self.status = if self.devices.is_empty() { 0 } else { STATUS_PPD };
                self.pointer = Pointer::Status;
            }
            (0xa5, [byte]) => {
                self.wire_write_byte(*byte);
                self.pointer = Pointer::Status;
            }
            (0x96, []) => {
                let mut byte = 0;
                for i in 0..8 {
                    if self.read_slot() {
                        byte |= 1 << i;
                    }
                }
                self.data = byte;
                self.pointer = Pointer::Status;
            }
            (0x87, [param]) => {
                let bit = if param & 0x80 != 0 { self.read_slot() } else { false };
                self.status = if bit { STATUS_SBR } else { 0 };
                self.pointer = Pointer::Status;
            }
            (0x78, [param]) => {
                self.status = self.triplet(param & 0x80 != 0);
                self.pointer = Pointer::Status;
            }
            _ => return Err(ErrorKind::Other),
        }
        Ok(())
    }

    fn wire_write_byte(&mut self, byte: u8) {
        self.phase = match self.phase {
            WirePhase::AwaitRom => match byte {
                0xf0 => WirePhase::Search { bit: 0 },
                0xec => {
                    for dev in self.devices.iter_mut() {
                        dev.active = dev.alarm;
                    }
                    WirePhase::Search { bit: 0 }
                }
                0x55 => WirePhase::Match { idx: 0 },
                0xcc => WirePhase::Transport,
                _ => WirePhase::Idle,
            },
            WirePhase::Match { idx } => {
                for dev in self.devices.iter_mut() {
                    dev.active &= dev.rom.as_bytes()[idx] == byte;
                }
                if idx == 7 {
                    WirePhase::Transport
                } else {
                    WirePhase::Match { idx: idx + 1 }
                }
            }
            WirePhase::Transport => {
                self.function_bytes.push(byte);
                WirePhase::Transport
            }
            _ => WirePhase::Idle,
        };
    }

    /// Read slot: wired-AND of every addressed device's next payload bit.
    fn read_slot(&mut self) -> bool {
        if self.phase != WirePhase::Transport {
            return true;
        }
        let mut level = true;
        for dev in self.devices.iter_mut().filter(|d| d.active) {
            level &= dev.next_payload_bit();
        }
        level
    }

    fn triplet(&mut self, requested: bool) -> u8 {
        let WirePhase::Search { bit } = self.phase else {
            return STATUS_SBR | STATUS_TSB | STATUS_DIR;
        };
        let silent = self.vanish_at.is_some_and(|at| bit >= at);
        let participants = || self.devices.iter().filter(|d| d.active && !silent);
        let id = participants().all(|d| d.rom_bit(bit));
        let comp = participants().all(|d| !d.rom_bit(bit));
        let dir = if id != comp {
            id
        } else if id {
            true
        } else {
            requested
        };
        for dev in self.devices.iter_mut() {
            if dev.rom_bit(bit) != dir {
                dev.active = false;
            }
        }
        self.phase = if bit == 63 {
            WirePhase::Transport
        } else {
            WirePhase::Search { bit: bit + 1 }
        };
        let mut status = 0;
        if id {
            status |= STATUS_SBR;
        }
        if comp {
            status |= STATUS_TSB;
        }
        if dir {
            status |= STATUS_DIR;
        }
        status
    }

    fn read_pointer(&mut self) -> u8 {
        match self.pointer {
            Pointer::Status => {
                self.status_reads += 1;
                if self.stuck_busy {
                    self.status | STATUS_1WB
                } else {
                    self.status
                }
            }
            Pointer::Data => self.data,
            Pointer::Config => self.config,
        }
    }
}

impl ErrorType for SimBridge {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for SimBridge {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.handle_write(bytes)?,
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.read_pointer();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately.
#[derive(Debug, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
