//! The contract the host layer consumes from an emulation engine.
//!
//! The engine itself (CPU, PPU, memory bank controller, RTC chip) is an external collaborator, anything
//! implementing [Engine] can be driven by the [crate::session::Session] and [crate::scheduler::RenderScheduler].
use crate::InputKeys;

pub trait Engine: Sized {
    /// Raised when the engine refuses a cartridge.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct an instance for the given cartridge.
    ///
    /// # Arguments
    ///
    /// * `rom` - The full cartridge image.
    /// * `ram` - Battery backed RAM from a previous session, empty if there is none.
    /// * `rtc` - Real time clock state from a previous session, empty if there is none.
    fn new(rom: &[u8], ram: &[u8], rtc: &[u8]) -> Result<Self, Self::Error>;

    /// Advance emulation by exactly one displayable frame.
    fn next_frame(&mut self);

    /// The current LCD contents, one shade code per pixel in row-major order.
    fn lcd_buffer(&self) -> &[u8];

    /// Whether the LCD was switched off for the last frame, in which case the buffer is stale.
    fn lcd_cleared(&self) -> bool {
        false
    }

    /// Press (`true`) or release (`false`) a button. Must be idempotent.
    fn set_button(&mut self, key: InputKeys, pressed: bool);

    /// Current battery backed RAM, empty if the cartridge has none.
    fn dump_ram(&self) -> Vec<u8>;

    /// Current RTC state, empty if the cartridge has no clock.
    fn dump_rtc(&self) -> Vec<u8>;

    /// Inform the engine of the current wall-clock time, in seconds since the Unix epoch.
    fn update_rtc_now(&mut self, _unix_secs: u64) {}
}

#[cfg(test)]
pub(crate) mod mock {
    use crate::engine::Engine;
    use crate::{InputKeys, LCD_BUFFER_SIZE};

    #[derive(Debug, thiserror::Error)]
    #[error("mock engine refused the cartridge")]
    pub struct MockError;

    /// Engine stand-in which records what the host asked of it.
    pub struct MockEngine {
        pub rom: Vec<u8>,
        pub ram: Vec<u8>,
        pub rtc: Vec<u8>,
        pub lcd: Vec<u8>,
        pub cleared: bool,
        pub frames: u32,
        pub buttons: [bool; 8],
        pub button_calls: u32,
        pub rtc_now: Option<u64>,
    }

    impl Engine for MockEngine {
        type Error = MockError;

        /// Refuses empty ROMs and ROMs starting with `0xFF`.
        fn new(rom: &[u8], ram: &[u8], rtc: &[u8]) -> Result<Self, Self::Error> {
            if rom.first().map_or(true, |b| *b == 0xFF) {
                return Err(MockError);
            }

            Ok(Self {
                rom: rom.to_vec(),
                ram: ram.to_vec(),
                rtc: rtc.to_vec(),
                lcd: vec![0xFF; LCD_BUFFER_SIZE],
                cleared: false,
                frames: 0,
                buttons: [false; 8],
                button_calls: 0,
                rtc_now: None,
            })
        }

        /// Darkens the first pixel on every frame so tests can see the advance happened.
        fn next_frame(&mut self) {
            self.frames += 1;
            self.lcd[0] = [0xFF, 0xAA, 0x55, 0x00][(self.frames % 4) as usize];
        }

        fn lcd_buffer(&self) -> &[u8] {
            &self.lcd
        }

        fn lcd_cleared(&self) -> bool {
            self.cleared
        }

        fn set_button(&mut self, key: InputKeys, pressed: bool) {
            self.button_calls += 1;
            self.buttons[key.index()] = pressed;
        }

        fn dump_ram(&self) -> Vec<u8> {
            self.ram.clone()
        }

        fn dump_rtc(&self) -> Vec<u8> {
            self.rtc.clone()
        }

        fn update_rtc_now(&mut self, unix_secs: u64) {
            self.rtc_now = Some(unix_secs);
        }
    }
}
