use crate::palette::RGBA;
use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use std::num::NonZeroU32;
use std::ops::{Deref, DerefMut};

/// An upscaled image of the LCD, ready to be handed to the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledFrame {
    scale: NonZeroU32,
    pixels: Vec<RGBA>,
}

impl ScaledFrame {
    /// Create a frame for the given `scale`, initially filled with `fill`.
    pub fn new(scale: NonZeroU32, fill: RGBA) -> Self {
        let size = (DISPLAY_WIDTH * scale.get()) as usize * (DISPLAY_HEIGHT * scale.get()) as usize;

        Self {
            scale,
            pixels: vec![fill; size],
        }
    }

    pub fn scale(&self) -> NonZeroU32 {
        self.scale
    }

    /// Width in destination pixels, `160 * scale`.
    pub fn width(&self) -> u32 {
        DISPLAY_WIDTH * self.scale.get()
    }

    /// Height in destination pixels, `144 * scale`.
    pub fn height(&self) -> u32 {
        DISPLAY_HEIGHT * self.scale.get()
    }

    /// Returns the pixel at destination coordinates, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<RGBA> {
        if x >= self.width() || y >= self.height() {
            return None;
        }

        self.pixels.get((y * self.width() + x) as usize).copied()
    }

    pub fn fill(&mut self, color: RGBA) {
        self.pixels.fill(color);
    }

    /// Transform the internal buffer into a byte slice in `RGBA_u8` order.
    ///
    /// # Safety
    ///
    /// So long as [RGBA] remains `#[repr(C)]` with four `u8` fields it's safe.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: RGBA is #[repr(C)] and made of 4 u8s, so it has no padding and an alignment of 1.
        unsafe {
            std::slice::from_raw_parts(
                self.pixels.as_ptr() as *const u8,
                self.pixels.len() * core::mem::size_of::<RGBA>(),
            )
        }
    }

    /// Copy the frame into a surface of exactly the same dimensions.
    pub fn copy_to(&self, surface: &mut [u8]) {
        surface.copy_from_slice(self.as_bytes());
    }
}

impl Deref for ScaledFrame {
    type Target = [RGBA];

    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl DerefMut for ScaledFrame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pixels
    }
}
