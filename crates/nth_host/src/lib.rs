pub mod cartridge;
pub mod compositor;
pub mod engine;
pub mod frame;
pub mod framerate;
pub mod input;
mod joypad;
pub mod palette;
pub mod persistence;
pub mod scheduler;
pub mod session;

pub use joypad::InputKeys;

/// Width of the LCD in logical pixels.
pub const DISPLAY_WIDTH: u32 = 160;
/// Height of the LCD in logical pixels.
pub const DISPLAY_HEIGHT: u32 = 144;
/// The amount of bytes the engine's raw pixel buffer holds for one frame.
/// Format is one shade code per pixel, row-major.
pub const LCD_BUFFER_SIZE: usize = (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize;
/// Integer upscale factor used when nothing else is configured.
pub const DEFAULT_SCALE: u32 = 4;
