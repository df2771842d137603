//! Decoding of the engine's one-byte shade codes into display colours.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct RGBA {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl RGBA {
    /// An opaque grey where every colour channel equals `level`.
    pub const fn grey(level: u8) -> Self {
        RGBA {
            red: level,
            green: level,
            blue: level,
            alpha: 0xFF,
        }
    }

    /// Pack the colour as `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        (self.alpha as u32) << 24 | (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }
}

/// The four shades the LCD can display, stored as the shade code the engine writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Shade {
    Black = 0x00,
    DarkGrey = 0x55,
    LightGrey = 0xAA,
    White = 0xFF,
}

impl Shade {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The fixed display colour for this shade.
    ///
    /// Shade codes are chosen so the code doubles as the grey level.
    pub const fn color(self) -> RGBA {
        RGBA::grey(self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown shade code {0:#04X}")]
pub struct UnknownShade(pub u8);

impl TryFrom<u8> for Shade {
    type Error = UnknownShade;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x00 => Ok(Shade::Black),
            0x55 => Ok(Shade::DarkGrey),
            0xAA => Ok(Shade::LightGrey),
            0xFF => Ok(Shade::White),
            _ => Err(UnknownShade(code)),
        }
    }
}

/// Decode a raw shade code into its display colour.
///
/// Anything other than the four valid codes means the engine produced a malformed frame.
#[inline]
pub fn decode(code: u8) -> Result<RGBA, UnknownShade> {
    Shade::try_from(code).map(Shade::color)
}
