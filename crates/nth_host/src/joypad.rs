/// The eight buttons of the handheld.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, enum_iterator::Sequence)]
pub enum InputKeys {
    Start,
    Select,
    A,
    B,
    Up,
    Down,
    Left,
    Right,
}

impl InputKeys {
    /// Stable index in `0..8`, useful for engines storing button state as a flat array.
    pub const fn index(self) -> usize {
        self as usize
    }
}
