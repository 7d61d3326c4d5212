//! Core engine for `lilt`, a terminal virtual piano.
//!
//! The library is split the same way the instrument is: `dsp` holds the
//! allocation-free signal primitives (oscillator, envelope), `synth` manages
//! the note lifecycle (voices and the note registry), `keymap` carries the
//! static key-to-note table, and `output` owns the shared audio sink. The
//! `lilt` binary layers a ratatui keyboard UI on top.

pub mod dsp;
pub mod keymap;
pub mod output;
pub mod synth; // Note registry and voice lifecycle

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
