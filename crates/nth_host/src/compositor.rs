//! Turns the engine's indexed LCD buffer into an upscaled colour image.
use crate::frame::ScaledFrame;
use crate::palette::{self, Shade, UnknownShade, RGBA};
use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH, LCD_BUFFER_SIZE};
use std::num::NonZeroU32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositeError {
    #[error("LCD buffer holds {actual} bytes, expected at least {expected}")]
    BufferTooShort { expected: usize, actual: usize },
    #[error("LCD pixel {index} could not be decoded")]
    Decode {
        index: usize,
        #[source]
        source: UnknownShade,
    },
}

/// Nearest-neighbour upscaler for the LCD.
///
/// Keeps a decoded copy of the logical frame around so a malformed buffer is detected
/// before the destination image is touched.
pub struct Compositor {
    scale: NonZeroU32,
    decoded: Box<[RGBA]>,
    scaled_row: Vec<RGBA>,
}

impl Compositor {
    pub fn new(scale: NonZeroU32) -> Self {
        Self {
            scale,
            decoded: vec![RGBA::default(); LCD_BUFFER_SIZE].into_boxed_slice(),
            scaled_row: Vec::with_capacity((DISPLAY_WIDTH * scale.get()) as usize),
        }
    }

    /// A frame of the right dimensions for this compositor, showing a cleared LCD.
    pub fn new_frame(&self) -> ScaledFrame {
        ScaledFrame::new(self.scale, Shade::White.color())
    }

    /// Composite the `lcd` buffer into `out`.
    ///
    /// Only the first [LCD_BUFFER_SIZE] bytes of `lcd` are read. On error `out` is left as it was.
    pub fn compose(&mut self, lcd: &[u8], out: &mut ScaledFrame) -> Result<(), CompositeError> {
        let lcd = lcd.get(..LCD_BUFFER_SIZE).ok_or(CompositeError::BufferTooShort {
            expected: LCD_BUFFER_SIZE,
            actual: lcd.len(),
        })?;

        for (index, (code, color)) in lcd.iter().zip(self.decoded.iter_mut()).enumerate() {
            *color = palette::decode(*code).map_err(|source| CompositeError::Decode { index, source })?;
        }

        self.ensure_dimensions(out);

        let scale = self.scale.get() as usize;
        let dest_width = DISPLAY_WIDTH as usize * scale;

        for (src_row, dest_rows) in self
            .decoded
            .chunks_exact(DISPLAY_WIDTH as usize)
            .zip(out.chunks_exact_mut(dest_width * scale))
        {
            self.scaled_row.clear();
            for &color in src_row {
                self.scaled_row.extend(std::iter::repeat(color).take(scale));
            }

            for dest_row in dest_rows.chunks_exact_mut(dest_width) {
                dest_row.copy_from_slice(&self.scaled_row);
            }
        }

        Ok(())
    }

    /// Present a switched-off LCD.
    pub fn blank(&self, out: &mut ScaledFrame) {
        self.ensure_dimensions(out);
        out.fill(Shade::White.color());
    }

    fn ensure_dimensions(&self, out: &mut ScaledFrame) {
        if out.scale() != self.scale {
            log::debug!("Resizing frame from scale {} to {}", out.scale(), self.scale);
            *out = self.new_frame();
        }
    }
}

/// The amount of destination pixels a compositor with `scale` produces.
pub const fn scaled_size(scale: u32) -> (u32, u32) {
    (DISPLAY_WIDTH * scale, DISPLAY_HEIGHT * scale)
}

#[cfg(test)]
mod tests {
    use crate::compositor::{scaled_size, CompositeError, Compositor};
    use crate::palette::{decode, Shade, UnknownShade, RGBA};
    use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH, LCD_BUFFER_SIZE};
    use std::num::NonZeroU32;

    const SHADES: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];

    /// A buffer where every pixel gets a shade depending on its position, so neighbouring blocks differ.
    fn patterned_lcd() -> Vec<u8> {
        (0..LCD_BUFFER_SIZE)
            .map(|i| {
                let (x, y) = (i % DISPLAY_WIDTH as usize, i / DISPLAY_WIDTH as usize);
                SHADES[(x + 2 * y) % 4]
            })
            .collect()
    }

    #[test]
    fn test_compose_blocks_are_uniform() {
        let lcd = patterned_lcd();

        for scale in [1, 2, 4] {
            let mut compositor = Compositor::new(NonZeroU32::new(scale).unwrap());
            let mut frame = compositor.new_frame();
            compositor.compose(&lcd, &mut frame).unwrap();

            assert_eq!((frame.width(), frame.height()), scaled_size(scale));

            for y in 0..frame.height() {
                for x in 0..frame.width() {
                    let src = ((y / scale) * DISPLAY_WIDTH + x / scale) as usize;
                    assert_eq!(frame.pixel(x, y), Some(decode(lcd[src]).unwrap()), "({x}, {y}) at scale {scale}");
                }
            }
        }
    }

    #[test]
    fn test_compose_ignores_trailing_bytes() {
        let mut lcd = vec![0x55; LCD_BUFFER_SIZE];
        lcd.extend_from_slice(&[0x12; 64]);
        let mut compositor = Compositor::new(NonZeroU32::new(1).unwrap());
        let mut frame = compositor.new_frame();

        compositor.compose(&lcd, &mut frame).unwrap();

        assert!(frame.iter().all(|px| *px == Shade::DarkGrey.color()));
    }

    #[test]
    fn test_compose_short_buffer() {
        let mut compositor = Compositor::new(NonZeroU32::new(2).unwrap());
        let mut frame = compositor.new_frame();
        let before = frame.clone();

        let result = compositor.compose(&[0x00; LCD_BUFFER_SIZE - 1], &mut frame);

        assert_eq!(
            result,
            Err(CompositeError::BufferTooShort {
                expected: LCD_BUFFER_SIZE,
                actual: LCD_BUFFER_SIZE - 1
            })
        );
        assert_eq!(frame, before);
    }

    #[test]
    fn test_compose_bad_shade_leaves_frame_untouched() {
        let mut compositor = Compositor::new(NonZeroU32::new(1).unwrap());
        let mut frame = compositor.new_frame();
        let before = frame.clone();
        let mut lcd = vec![0x00; LCD_BUFFER_SIZE];
        lcd[LCD_BUFFER_SIZE - 1] = 0x42;

        let result = compositor.compose(&lcd, &mut frame);

        assert_eq!(
            result,
            Err(CompositeError::Decode {
                index: LCD_BUFFER_SIZE - 1,
                source: UnknownShade(0x42)
            })
        );
        assert_eq!(frame, before);
    }

    #[test]
    fn test_compose_resizes_mismatched_frame() {
        let mut compositor = Compositor::new(NonZeroU32::new(3).unwrap());
        let mut frame = Compositor::new(NonZeroU32::new(1).unwrap()).new_frame();

        compositor.compose(&vec![0x00; LCD_BUFFER_SIZE], &mut frame).unwrap();

        assert_eq!(frame.width(), DISPLAY_WIDTH * 3);
        assert_eq!(frame.height(), DISPLAY_HEIGHT * 3);
        assert_eq!(frame.pixel(0, 0), Some(RGBA::grey(0)));
    }

    #[test]
    fn test_blank() {
        let mut compositor = Compositor::new(NonZeroU32::new(2).unwrap());
        let mut frame = compositor.new_frame();
        compositor.compose(&vec![0x00; LCD_BUFFER_SIZE], &mut frame).unwrap();

        compositor.blank(&mut frame);

        assert!(frame.iter().all(|px| px.to_argb() == 0xFFFFFFFF));
    }
}
