use crate::MIN_TIME;

/*
Attack/Release Envelope
=======================

A piano key has no decay or sustain stage here: the gain ramps up fast when
the key goes down, holds at the peak while the key stays down, and fades out
when the key comes up.

  Level
   0.7 ┐  ╱──────────╲
       │ ╱            ╲__
   0.0 └╱────────────────╲──→ Time
       Attack   Held   Release

Attack is LINEAR: level walks 0 -> peak in `attack_time` seconds. A linear
ramp over 10ms is enough to avoid the click of starting an oscillator at
full amplitude.

Release is EXPONENTIAL: each sample multiplies the level by a constant
coefficient so that it reaches the floor after `release_time` seconds:

    coefficient = (floor / start)^(1 / (release_time * sample_rate))

An exponential ramp can never reach true zero, so it targets a floor of
0.001 (-60 dB) instead; the voice layer keeps rendering a short margin past
that before discarding the voice.

Key behavior: note_off snapshots the CURRENT level, wherever it is. If the
key is released mid-attack (press, then drag the pointer off the key), the
release starts from the partial level rather than jumping to the nominal
peak. Jumping would be an audible click.
*/

/// Level an exponential release ramps toward (true zero is unreachable).
pub const RELEASE_FLOOR: f32 = 0.001;

/// Attack ramp length for new notes, in seconds.
pub const DEFAULT_ATTACK: f32 = 0.01;

/// Peak gain a voice ramps up to.
pub const DEFAULT_PEAK: f32 = 0.7;

/// Release fade length after a key comes up, in seconds.
pub const DEFAULT_RELEASE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Not triggered yet, or release finished; level = 0
    Attack,  // Ramping linearly up to peak
    Held,    // Holding at peak while the key is down
    Release, // Fading exponentially toward the floor
}

pub struct Envelope {
    attack_time: f32,  // seconds to ramp 0 -> peak
    peak: f32,         // level held while the key is down
    release_time: f32, // seconds to fade current -> floor

    state: EnvelopeState,
    level: f32,
    sample_rate: f32,

    // Release bookkeeping, computed at note_off
    release_coefficient: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(sample_rate, DEFAULT_ATTACK, DEFAULT_PEAK, DEFAULT_RELEASE)
    }

    pub fn with_params(sample_rate: f32, attack: f32, peak: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            peak: peak.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),

            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            release_coefficient: 1.0,
        }
    }

    /// Gate high: start the attack ramp from zero.
    ///
    /// Called exactly once per voice, when the note starts.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.state = EnvelopeState::Attack;
    }

    /// Gate low: fade out from wherever the level currently is.
    ///
    /// Safe to call mid-attack; the ramp starts from the partial level, not
    /// the nominal peak. No-op if the envelope never started or has already
    /// finished.
    pub fn note_off(&mut self) {
        if matches!(self.state, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        if self.level <= RELEASE_FLOOR {
            // Released so early there is nothing to fade.
            self.level = 0.0;
            self.state = EnvelopeState::Idle;
            return;
        }

        // Per-sample multiplier that brings `level` down to the floor in
        // exactly release_time seconds.
        let release_samples = (self.release_time * self.sample_rate).max(1.0);
        self.release_coefficient = (RELEASE_FLOOR / self.level).powf(1.0 / release_samples);
        self.state = EnvelopeState::Release;
    }

    /// Advance one sample and return the current level.
    pub fn next_sample(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let increment = self.peak / (self.attack_time * self.sample_rate);
                self.level += increment;

                if self.level >= self.peak {
                    self.level = self.peak;
                    self.state = EnvelopeState::Held;
                }
            }

            EnvelopeState::Held => {
                self.level = self.peak;
            }

            EnvelopeState::Release => {
                self.level *= self.release_coefficient;

                if self.level <= RELEASE_FLOOR {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// True while the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn release_time(&self) -> f32 {
        self.release_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn advance(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    #[test]
    fn attack_reaches_peak_and_holds() {
        let mut env = Envelope::with_params(SAMPLE_RATE, 0.01, 0.7, 0.1);
        env.note_on();
        advance(&mut env, (0.01 * SAMPLE_RATE) as usize + 1);

        assert_eq!(env.state(), EnvelopeState::Held);
        assert!((env.level() - 0.7).abs() < 1e-6);

        // Held notes stay at the peak indefinitely
        advance(&mut env, 500);
        assert!((env.level() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn release_decays_to_idle_within_release_time() {
        let release = 0.05;
        let mut env = Envelope::with_params(SAMPLE_RATE, 0.01, 0.7, release);
        env.note_on();
        advance(&mut env, 100);

        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Release);
        advance(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn release_mid_attack_starts_from_current_level() {
        let mut env = Envelope::with_params(SAMPLE_RATE, 0.1, 0.7, 0.05);
        env.note_on();
        // Stop a fifth of the way up the attack ramp
        advance(&mut env, (0.02 * SAMPLE_RATE) as usize);
        let partial = env.level();
        assert!(partial > 0.0 && partial < 0.5, "level {partial}");

        env.note_off();
        let next = env.next_sample();
        assert!(
            next <= partial && next > partial * 0.5,
            "release must ramp down from the partial level, got {next}"
        );
    }

    #[test]
    fn release_is_monotonic() {
        let mut env = Envelope::with_params(SAMPLE_RATE, 0.01, 0.7, 0.1);
        env.note_on();
        advance(&mut env, 50);
        env.note_off();

        let mut prev = env.level();
        for _ in 0..200 {
            let level = env.next_sample();
            assert!(level <= prev, "release must never ramp back up");
            prev = level;
        }
    }

    #[test]
    fn note_off_before_note_on_is_inert() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.next_sample(), 0.0);
    }
}
