//! Stand-in engine used until an emulation core is linked into the shell.
//!
//! It validates the cartridge header, carries the battery RAM and RTC blobs through unchanged (apart from the RTC
//! timestamp) and draws a scrolling test pattern with the held buttons along the top edge.
use nth_host::cartridge::{CartridgeHeader, HeaderError};
use nth_host::engine::Engine;
use nth_host::palette::Shade;
use nth_host::{InputKeys, DISPLAY_HEIGHT, DISPLAY_WIDTH, LCD_BUFFER_SIZE};

/// Clock registers plus their latched copies (5 + 5 little endian words), followed by a 64 bit timestamp.
pub const RTC_BLOB_SIZE: usize = 48;
const RTC_TIMESTAMP: usize = 40;
const BAND_HEIGHT: usize = 8;
const BUTTON_BOX: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum InvalidCartridge {
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("header checksum mismatch (read {read:#04X}, calculated {calculated:#04X})")]
    Checksum { read: u8, calculated: u8 },
}

pub struct PlaceholderEngine {
    ram: Vec<u8>,
    rtc: Vec<u8>,
    lcd: Box<[u8]>,
    buttons: [bool; 8],
    frame: usize,
}

impl Engine for PlaceholderEngine {
    type Error = InvalidCartridge;

    fn new(rom: &[u8], ram: &[u8], rtc: &[u8]) -> Result<Self, Self::Error> {
        let header = CartridgeHeader::new(rom)?;

        if !header.checksum_valid() {
            return Err(InvalidCartridge::Checksum {
                read: header.header_checksum,
                calculated: header.calculated_checksum,
            });
        }

        let ram = if header.has_battery() {
            let mut restored = ram.to_vec();
            restored.resize(header.ram_size_bytes(), 0);
            restored
        } else {
            Vec::new()
        };

        let rtc = match (header.has_rtc(), rtc.len()) {
            (true, RTC_BLOB_SIZE) => rtc.to_vec(),
            (true, _) => vec![0; RTC_BLOB_SIZE],
            (false, _) => Vec::new(),
        };

        Ok(Self {
            ram,
            rtc,
            lcd: vec![Shade::White.code(); LCD_BUFFER_SIZE].into_boxed_slice(),
            buttons: [false; 8],
            frame: 0,
        })
    }

    fn next_frame(&mut self) {
        const BANDS: [Shade; 4] = [Shade::White, Shade::LightGrey, Shade::DarkGrey, Shade::Black];

        self.frame = self.frame.wrapping_add(1);

        for (y, row) in self.lcd.chunks_exact_mut(DISPLAY_WIDTH as usize).enumerate() {
            let band = ((y + self.frame) / BAND_HEIGHT) % BANDS.len();
            row.fill(BANDS[band].code());
        }

        for button in enum_iterator::all::<InputKeys>().filter(|b| self.buttons[b.index()]) {
            let left = 4 + button.index() * (BUTTON_BOX + 4);

            for y in 4..4 + BUTTON_BOX {
                let start = y * DISPLAY_WIDTH as usize + left;
                self.lcd[start..start + BUTTON_BOX].fill(Shade::Black.code());
            }
        }
    }

    fn lcd_buffer(&self) -> &[u8] {
        &self.lcd
    }

    fn set_button(&mut self, key: InputKeys, pressed: bool) {
        self.buttons[key.index()] = pressed;
    }

    fn dump_ram(&self) -> Vec<u8> {
        self.ram.clone()
    }

    fn dump_rtc(&self) -> Vec<u8> {
        self.rtc.clone()
    }

    fn update_rtc_now(&mut self, unix_secs: u64) {
        if let Some(timestamp) = self.rtc.get_mut(RTC_TIMESTAMP..RTC_BLOB_SIZE) {
            timestamp.copy_from_slice(&unix_secs.to_le_bytes());
        }
    }
}

const _: () = assert!(4 + 7 * (BUTTON_BOX + 4) + BUTTON_BOX <= DISPLAY_WIDTH as usize);
const _: () = assert!(4 + BUTTON_BOX <= DISPLAY_HEIGHT as usize);
