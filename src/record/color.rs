//! Log color palette
//!
//! Display hint carried in the header. Stored as a little-endian u32.

/// Palette values, each a 24-bit RGB code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum LogColor {
    Blue = 0x1E90FF,
    DarkBlue = 0x4682B4,

    Green = 0x3CB371,
    DarkGreen = 0x2E8B57,

    Purple = 0x9370DB,
    Violet = 0x8A2BE2,

    Orange = 0xFF8C00,
    Yellow = 0xDAA520,

    Red = 0xDC143C,
    DarkRed = 0xCD5C5C,

    Teal = 0x008080,
    Olive = 0x6B8E23,
}

impl LogColor {
    /// Every palette entry, in declaration order
    pub const ALL: [LogColor; 12] = [
        LogColor::Blue,
        LogColor::DarkBlue,
        LogColor::Green,
        LogColor::DarkGreen,
        LogColor::Purple,
        LogColor::Violet,
        LogColor::Orange,
        LogColor::Yellow,
        LogColor::Red,
        LogColor::DarkRed,
        LogColor::Teal,
        LogColor::Olive,
    ];

    /// Raw code as written into the color field
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Look up a palette entry by its raw code
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Split into (r, g, b)
    pub fn rgb(self) -> (u8, u8, u8) {
        rgb_of(self.code())
    }
}

/// Split any raw code into (r, g, b), ignoring the top byte
pub(crate) fn rgb_of(code: u32) -> (u8, u8, u8) {
    (
        ((code >> 16) & 0xFF) as u8,
        ((code >> 8) & 0xFF) as u8,
        (code & 0xFF) as u8,
    )
}
