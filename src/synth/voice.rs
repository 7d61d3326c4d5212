use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::{Oscillator, Waveform};

/// Extra fade-out margin rendered after `note_off`, as a multiple of the
/// envelope's release time. Cutting the oscillator exactly at the end of the
/// exponential ramp can still truncate the -60 dB tail audibly, so the voice
/// keeps running for twice the release window before it is discarded.
const STOP_MARGIN: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// Key down, envelope in attack or held phase.
    Sounding,
    /// Key released, envelope fading; the registry no longer owns this voice.
    Releasing,
    /// Fade-out margin elapsed; safe to discard.
    Finished,
}

/// One sounding note: an oscillator and its dedicated envelope gain.
///
/// A voice is owned exclusively by the registry entry that created it and is
/// never shared or reused across notes.
pub struct Voice {
    osc: Oscillator,
    env: Envelope,
    state: VoiceState,
    /// Samples left to render after release, including the stop margin.
    stop_countdown: u32,
}

impl Voice {
    /// Build a voice wired oscillator -> envelope gain, envelope at level 0.
    /// Does not start the attack; the registry calls [`Voice::start`].
    pub fn new(sample_rate: f32, frequency: f32, waveform: Waveform, detune_cents: f32) -> Self {
        let env = Envelope::new(sample_rate);
        // Armed up front so release() has no arithmetic to do.
        let stop_countdown = (env.release_time() * STOP_MARGIN * sample_rate).ceil() as u32;

        Self {
            osc: Oscillator::new(sample_rate, frequency, waveform, detune_cents),
            env,
            state: VoiceState::Sounding,
            stop_countdown,
        }
    }

    /// Trigger the attack ramp. Called exactly once, right after creation.
    pub fn start(&mut self) {
        self.env.note_on();
    }

    /// Begin the fade-out. The envelope ramps down from its current level,
    /// which is correct even when the attack has not finished.
    pub fn release(&mut self) {
        if self.state == VoiceState::Sounding {
            self.env.note_off();
            self.state = VoiceState::Releasing;
        }
    }

    /// Render this voice additively into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state == VoiceState::Finished {
            return;
        }

        for sample in out.iter_mut() {
            *sample += self.osc.next_sample() * self.env.next_sample();
        }

        if self.state == VoiceState::Releasing {
            let rendered = out.len() as u32;
            self.stop_countdown = self.stop_countdown.saturating_sub(rendered);
            if self.stop_countdown == 0 && !self.env.is_active() {
                self.state = VoiceState::Finished;
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == VoiceState::Finished
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn envelope_level(&self) -> f32 {
        self.env.level()
    }
}
