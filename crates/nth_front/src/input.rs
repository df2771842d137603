use nth_host::input::{KeyMap, DEFAULT_BINDINGS};
use winit::event::VirtualKeyCode;

/// The conventional bindings expressed as winit key codes.
pub fn default_key_map() -> KeyMap<VirtualKeyCode> {
    DEFAULT_BINDINGS
        .iter()
        .filter_map(|(name, button)| Some((key_code_for(name)?, *button)))
        .collect()
}

fn key_code_for(name: &str) -> Option<VirtualKeyCode> {
    match name {
        "w" => Some(VirtualKeyCode::W),
        "s" => Some(VirtualKeyCode::S),
        "a" => Some(VirtualKeyCode::A),
        "d" => Some(VirtualKeyCode::D),
        "j" => Some(VirtualKeyCode::J),
        "k" => Some(VirtualKeyCode::K),
        "Enter" => Some(VirtualKeyCode::Return),
        "Backspace" => Some(VirtualKeyCode::Back),
        _ => None,
    }
}
