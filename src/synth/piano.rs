use std::collections::HashMap;

use crate::dsp::oscillator::Waveform;
use crate::synth::voice::Voice;
use crate::MAX_BLOCK_SIZE;

/*
Note Registry
=============

One `Piano` instance owns every sounding voice. The registry maps each note
identifier to its voice and enforces the core invariant:

    at most one voice per note identifier, at any instant

State machine per note:

    Idle ──note_on──> Sounding ──note_off──> Releasing ──> (discarded)

`note_on` on an already-sounding note is a no-op: key auto-repeat and
overlapping pointer/keyboard triggers for the same note must not stack a
second voice or restart the envelope.

`note_off` removes the registry entry IMMEDIATELY, so the key cap
un-highlights at once, and moves the voice to the `fading` list where it
keeps rendering its release tail until it self-discards. The fading voice is
orphaned: nothing can address it by note anymore, and a fresh `note_on` for
the same note while the old voice is still fading creates a new, independent
voice.

All methods are synchronous; callers observe note_on/note_off effects in call
order. The instance is shared between the input thread and the audio callback
behind a mutex, so there is no internal locking here.
*/

/// Default master gain applied to the mixed output of all voices.
pub const DEFAULT_MASTER_VOLUME: f32 = 0.8;

pub struct Piano {
    sample_rate: f32,
    waveform: Waveform,
    master_volume: f32,
    /// The registry: note identifier -> its one sounding voice.
    sounding: HashMap<String, Voice>,
    /// Orphaned voices fading out after note_off.
    fading: Vec<Voice>,
    voice_buffer: Vec<f32>,
}

impl Piano {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            waveform: Waveform::default(),
            master_volume: DEFAULT_MASTER_VOLUME,
            sounding: HashMap::new(),
            fading: Vec::new(),
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Start a note. No-op if the note is already sounding or the frequency
    /// is not positive.
    pub fn note_on(&mut self, note: &str, frequency: f32) {
        if frequency <= 0.0 || self.sounding.contains_key(note) {
            return;
        }

        let mut voice = Voice::new(self.sample_rate, frequency, self.waveform, 0.0);
        voice.start();
        self.sounding.insert(note.to_string(), voice);
    }

    /// Release a note. No-op for notes that are not sounding.
    ///
    /// The registry entry is removed before the voice has finished fading;
    /// key highlighting follows the registry, not the audio tail.
    pub fn note_off(&mut self, note: &str) {
        if let Some(mut voice) = self.sounding.remove(note) {
            voice.release();
            self.fading.push(voice);
        }
    }

    /// Release every sounding note. The active-note set empties synchronously
    /// while the voices fade out on their own.
    pub fn stop_all(&mut self) {
        for (_, mut voice) in self.sounding.drain() {
            voice.release();
            self.fading.push(voice);
        }
    }

    /// Set the waveform used for voices created from now on. Voices already
    /// sounding keep their shape; the input layer calls [`Piano::stop_all`]
    /// first when the selector changes, so no live voice ever plays a timbre
    /// different from the one shown.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set the master gain, silently clamped to [0, 1]. Applied to the next
    /// rendered block; there is no ramp.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// The active-note set: identifiers of notes currently in the registry.
    /// Drives key-highlight rendering.
    pub fn active_notes(&self) -> impl Iterator<Item = &str> {
        self.sounding.keys().map(String::as_str)
    }

    pub fn is_sounding(&self, note: &str) -> bool {
        self.sounding.contains_key(note)
    }

    pub fn active_len(&self) -> usize {
        self.sounding.len()
    }

    /// Number of voices still rendering, including fading ones.
    pub fn voice_count(&self) -> usize {
        self.sounding.len() + self.fading.len()
    }

    /// Mix all voices into `out` and apply the master gain.
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        let block = &mut self.voice_buffer[..out.len()];
        block.fill(0.0);

        for voice in self.sounding.values_mut() {
            voice.render(block);
        }
        for voice in self.fading.iter_mut() {
            voice.render(block);
        }
        self.fading.retain(|voice| !voice.is_finished());

        for (o, &s) in out.iter_mut().zip(block.iter()) {
            *o = s * self.master_volume;
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Retune the engine to the output device rate. Intended for sink
    /// creation time, before any voices exist; voices already sounding keep
    /// the rate they were created with.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }
}
