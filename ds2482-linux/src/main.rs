use clap::{Parser, Subcommand};
use ds2482::{AddressPins, DeviceConfiguration, Ds2482Builder};
use embedded_onewire::{OneWire, RomId, SearchKind};

/// Talk to a 1-Wire bus through a DS2482-100 bridge
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// Level of the AD1/AD0 address pins
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    instance: u8,
    /// Drive rising edges with the active pullup
    #[arg(long)]
    active_pullup: bool,
    /// Status polls before a busy-wait gives up
    #[arg(long, default_value_t = ds2482::BUSY_POLL_LIMIT)]
    retries: u16,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reset the bus and report whether any device answered
    Presence,
    /// Enumerate the devices on the bus
    Scan {
        /// Only report devices in alarm state
        #[arg(long)]
        alarm: bool,
        /// Only report devices of this family code (hex)
        #[arg(long, value_parser = parse_hex_u8)]
        family: Option<u8>,
    },
    /// Address a device, write bytes and read the response
    Transact {
        /// ROM as printed by `scan`; omitted, every device is addressed
        #[arg(long, value_parser = parse_rom)]
        rom: Option<RomId>,
        /// Bytes to write after addressing (hex)
        #[arg(long, value_parser = parse_hex_u8, num_args = 1..)]
        write: Vec<u8>,
        /// Number of bytes to read
        #[arg(long, default_value_t = 0)]
        read: usize,
    },
}

fn parse_hex_u8(s: &str) -> Result<u8, String> {
    u8::from_str_radix(s.trim_start_matches("0x"), 16).map_err(|e| format!("{s}: {e}"))
}

fn parse_rom(s: &str) -> Result<RomId, String> {
    let rom = u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map(RomId::from)
        .map_err(|e| format!("{s}: {e}"))?;
    if !rom.is_valid() {
        log::warn!("ROM {rom} fails its CRC check");
    }
    Ok(rom)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let i2c = linux_embedded_hal::I2cdev::new(&args.path)?;
    let pins = AddressPins::from_bits(args.instance).ok_or("instance must be 0..=3")?;
    let mut bridge = Ds2482Builder::default()
        .with_address_pins(pins)
        .with_retries(args.retries)
        .with_config(DeviceConfiguration::new().with_active_pullup(args.active_pullup))
        .build(i2c, linux_embedded_hal::Delay)?;
    log::debug!("DS2482 ready at {:#04x}", bridge.i2c_address());

    match args.command {
        Command::Presence => {
            let present = bridge.reset()?;
            log::info!("Presence pulse: {}", if present { "yes" } else { "no" });
        }
        Command::Scan { alarm, family } => {
            if alarm {
                bridge.set_search_kind(SearchKind::Alarmed);
            }
            if let Some(family) = family {
                bridge.target_family(family);
            }
            let mut devices = 0;
            while let Some(rom) = bridge.search()? {
                if family.is_some_and(|f| f != rom.family()) {
                    break;
                }
                devices += 1;
                log::info!(
                    "ROM: {rom} family {:02x}{}",
                    rom.family(),
                    if rom.is_valid() { "" } else { " (bad CRC)" }
                );
            }
            log::info!("Found {devices} devices");
        }
        Command::Transact { rom, write, read } => {
            bridge.address(rom.as_ref())?;
            for byte in write {
                bridge.write_byte(byte)?;
            }
            let mut response = Vec::with_capacity(read);
            for _ in 0..read {
                response.push(bridge.read_byte()?);
            }
            if !response.is_empty() {
                log::info!("Response: {response:02x?}");
            }
        }
    }

    if let Some(fault) = bridge.fault() {
        log::warn!("Bridge reported a fault: {fault}");
    }
    Ok(())
}

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    // Parse command line arguments
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
