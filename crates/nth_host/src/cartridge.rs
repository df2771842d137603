use std::ops::RangeInclusive;

const TITLE: RangeInclusive<usize> = 0x134..=0x143;
const CART_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
const HEADER_CHECKSUM: usize = 0x14D;
/// The checksum covers the title up to and including the mask ROM version.
const CHECKSUM_RANGE: RangeInclusive<usize> = 0x134..=0x14C;

const CART_TYPE_BATTERY: &[u8] = &[0x03, 0x06, 0x0F, 0x10, 0x13, 0x1B, 0x1E];
const CART_TYPE_RTC: &[u8] = &[0x0F, 0x10];
const CART_TYPE_MBC2: &[u8] = &[0x05, 0x06];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("ROM is {0} bytes, too short to contain a cartridge header")]
    TooShort(usize),
}

/// Represents the Cartridge Header of a handheld ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    /// Uppercase ASCII, max `16` characters, cut at the first non-printable byte
    pub title: String,
    /// Which memory bank controller and extras (battery, RTC) the cartridge has
    pub cart_type: u8,
    /// ROM size code, `32KB << code`
    pub rom_size: u8,
    /// External RAM size code
    pub ram_size: u8,
    /// Checksum stored in the header
    pub header_checksum: u8,
    /// Checksum we calculated over the header
    pub calculated_checksum: u8,
}

impl CartridgeHeader {
    /// Create a new [CartridgeHeader].
    ///
    /// # Arguments
    ///
    /// * `rom` - The ROM data to parse. Should be the full file's binary contents.
    pub fn new(rom: &[u8]) -> Result<Self, HeaderError> {
        if rom.len() <= HEADER_CHECKSUM {
            return Err(HeaderError::TooShort(rom.len()));
        }

        let title = rom[TITLE]
            .iter()
            .take_while(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|b| *b as char)
            .collect::<String>()
            .trim_end()
            .to_string();

        Ok(Self {
            title,
            cart_type: rom[CART_TYPE],
            rom_size: rom[ROM_SIZE],
            ram_size: rom[RAM_SIZE],
            header_checksum: rom[HEADER_CHECKSUM],
            calculated_checksum: Self::calculate_checksum(rom),
        })
    }

    pub fn checksum_valid(&self) -> bool {
        self.header_checksum == self.calculated_checksum
    }

    pub fn has_battery(&self) -> bool {
        CART_TYPE_BATTERY.contains(&self.cart_type)
    }

    pub fn has_rtc(&self) -> bool {
        CART_TYPE_RTC.contains(&self.cart_type)
    }

    pub fn ram_banks(&self) -> usize {
        match self.ram_size {
            2 => 1,
            3 => 4,
            4 => 16,
            5 => 8,
            _ => 0,
        }
    }

    /// Size of the external RAM in bytes. MBC2 carts have a fixed 512 bytes built into the controller.
    pub fn ram_size_bytes(&self) -> usize {
        if CART_TYPE_MBC2.contains(&self.cart_type) {
            512
        } else {
            self.ram_banks() * 8 * 1024
        }
    }

    /// Size of the ROM in bytes as declared by the header, `None` for unknown codes.
    pub fn rom_size_bytes(&self) -> Option<usize> {
        (self.rom_size <= 8).then(|| (32 * 1024) << self.rom_size)
    }

    fn calculate_checksum(rom: &[u8]) -> u8 {
        rom[CHECKSUM_RANGE]
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_sub(*b).wrapping_sub(1))
    }
}
