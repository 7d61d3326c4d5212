//! Static key table: one octave and a third, C4 through E5.
//!
//! Each playable key pairs a note identifier with a terminal key binding and
//! its equal-temperament frequency. The table is the single source of truth
//! for both the input layer (binding lookup) and the display layer (key-cap
//! layout); it is immutable and loaded once.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// Static configuration for one playable key.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct KeyDef {
    /// Note identifier, unique across the table. Used as the registry key.
    pub note: &'static str,
    /// Keyboard character that triggers this note, unique, matched
    /// case-insensitively.
    pub binding: char,
    /// Pitch in Hz (equal temperament, A4 = 440).
    pub frequency: f32,
    pub color: KeyColor,
}

/// The playable keys in pitch order. Bindings follow the home row for white
/// keys and the row above for black keys.
#[rustfmt::skip]
pub static KEYBOARD: [KeyDef; 17] = [
    KeyDef { note: "C", binding: 'a', frequency: 261.63, color: KeyColor::White },
    KeyDef { note: "C#", binding: 'w', frequency: 277.18, color: KeyColor::Black },
    KeyDef { note: "D", binding: 's', frequency: 293.66, color: KeyColor::White },
    KeyDef { note: "D#", binding: 'e', frequency: 311.13, color: KeyColor::Black },
    KeyDef { note: "E", binding: 'd', frequency: 329.63, color: KeyColor::White },
    KeyDef { note: "F", binding: 'f', frequency: 349.23, color: KeyColor::White },
    KeyDef { note: "F#", binding: 't', frequency: 369.99, color: KeyColor::Black },
    KeyDef { note: "G", binding: 'g', frequency: 392.00, color: KeyColor::White },
    KeyDef { note: "G#", binding: 'y', frequency: 415.30, color: KeyColor::Black },
    KeyDef { note: "A", binding: 'h', frequency: 440.00, color: KeyColor::White },
    KeyDef { note: "A#", binding: 'u', frequency: 466.16, color: KeyColor::Black },
    KeyDef { note: "B", binding: 'j', frequency: 493.88, color: KeyColor::White },
    KeyDef { note: "C5", binding: 'k', frequency: 523.25, color: KeyColor::White },
    KeyDef { note: "C#5", binding: 'o', frequency: 554.37, color: KeyColor::Black },
    KeyDef { note: "D5", binding: 'l', frequency: 587.33, color: KeyColor::White },
    KeyDef { note: "D#5", binding: 'p', frequency: 622.25, color: KeyColor::Black },
    KeyDef { note: "E5", binding: ';', frequency: 659.25, color: KeyColor::White },
];

/// Find the key bound to a character, ignoring case.
pub fn find_by_binding(c: char) -> Option<&'static KeyDef> {
    KEYBOARD
        .iter()
        .find(|key| key.binding.eq_ignore_ascii_case(&c))
}

/// Find a key by its note identifier.
pub fn find_by_note(note: &str) -> Option<&'static KeyDef> {
    KEYBOARD.iter().find(|key| key.note == note)
}

pub fn white_keys() -> impl Iterator<Item = &'static KeyDef> {
    KEYBOARD.iter().filter(|key| key.color == KeyColor::White)
}

pub fn black_keys() -> impl Iterator<Item = &'static KeyDef> {
    KEYBOARD.iter().filter(|key| key.color == KeyColor::Black)
}

/// Number of white keys preceding `key` in the table. Positions a black key
/// cap over the boundary after that white key.
pub fn white_keys_before(key: &KeyDef) -> usize {
    KEYBOARD
        .iter()
        .take_while(|k| k.note != key.note)
        .filter(|k| k.color == KeyColor::White)
        .count()
}
