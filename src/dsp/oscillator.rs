use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Audio Oscillator
================

The oscillator is the sound source of every piano voice. It generates a
repeating waveform at a fixed frequency; the envelope then shapes its
amplitude over the life of the note.

Waveform character, from purest to richest:

  Sine      Fundamental only. Smooth, hollow, flute-like.
  Triangle  Odd harmonics falling off as 1/n^2. Soft, mellow.
  Square    Odd harmonics falling off as 1/n. Hollow but punchy.
  Sawtooth  All harmonics falling off as 1/n. Bright and buzzy.

The implementation is a phase accumulator: `phase` walks 0.0 -> 1.0 once per
cycle, advancing by `frequency / sample_rate` each sample, and the waveform
function maps the phase to an output sample. Naive (non-bandlimited) shapes
are fine at piano frequencies for this instrument.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// The next waveform in selector order, wrapping around.
    pub fn cycled(&self) -> Waveform {
        let idx = Self::ALL.iter().position(|w| w == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

pub struct Oscillator {
    waveform: Waveform,
    /// Effective frequency in Hz, detune already applied.
    frequency: f32,
    sample_rate: f32,
    /// Normalized phase in [0, 1).
    phase: f32,
}

impl Oscillator {
    /// Create an oscillator at `frequency` Hz with an optional pitch offset
    /// in cents (100 cents = 1 semitone): `frequency * 2^(cents/1200)`.
    pub fn new(sample_rate: f32, frequency: f32, waveform: Waveform, detune_cents: f32) -> Self {
        let frequency = if detune_cents != 0.0 {
            frequency * 2.0_f32.powf(detune_cents / 1200.0)
        } else {
            frequency
        };

        Self {
            waveform,
            frequency,
            sample_rate,
            phase: 0.0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Advance one sample and return the waveform output in [-1, 1].
    pub fn next_sample(&mut self) -> f32 {
        let sample = match self.waveform {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
        };

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    /// Render a block of samples into the buffer (overwrites).
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
