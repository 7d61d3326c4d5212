//! Low-level DSP primitives used by the voice layer.
//!
//! These components are allocation-free and realtime-safe, so they can be
//! embedded directly inside voice structs and run from the audio callback.

/// Attack/release envelope generator.
pub mod envelope;
/// Phase-accumulator oscillator with the four classic waveforms.
pub mod oscillator;

pub use envelope::EnvelopeState;
pub use oscillator::Waveform;
