//! End-to-end note lifecycle scenarios against the public engine API.

use lilt::dsp::Waveform;
use lilt::keymap;
use lilt::synth::Piano;

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 256;

fn render_seconds(piano: &mut Piano, seconds: f32) -> Vec<f32> {
    let mut collected = Vec::new();
    let mut buffer = vec![0.0f32; BLOCK];
    let blocks = ((seconds * SAMPLE_RATE) as usize).div_ceil(BLOCK);
    for _ in 0..blocks {
        piano.render_block(&mut buffer);
        collected.extend_from_slice(&buffer);
    }
    collected
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

#[test]
fn press_and_hold_produces_steady_tone() {
    let mut piano = Piano::new(SAMPLE_RATE);
    piano.note_on("C", 261.63);

    assert_eq!(piano.active_notes().collect::<Vec<_>>(), vec!["C"]);

    // Past the 10ms attack the tone holds at peak * master volume
    let _ = render_seconds(&mut piano, 0.05);
    let held = render_seconds(&mut piano, 0.05);
    assert!((peak(&held) - 0.7 * 0.8).abs() < 0.02);
}

#[test]
fn duplicate_press_does_not_stack_voices() {
    let mut piano = Piano::new(SAMPLE_RATE);
    piano.note_on("C", 261.63);
    let _ = render_seconds(&mut piano, 0.05);
    let single = peak(&render_seconds(&mut piano, 0.05));

    piano.note_on("C", 261.63);
    let still_single = peak(&render_seconds(&mut piano, 0.05));

    assert_eq!(piano.active_len(), 1);
    // A stacked voice would double the amplitude
    assert!((single - still_single).abs() < 0.02);
}

#[test]
fn release_fades_to_silence_within_the_stop_window() {
    let mut piano = Piano::new(SAMPLE_RATE);
    piano.note_on("C", 261.63);
    let _ = render_seconds(&mut piano, 0.05);

    piano.note_off("C");
    assert_eq!(piano.active_len(), 0, "key un-highlights immediately");
    assert_eq!(piano.voice_count(), 1, "tail still rendering");

    // Release is 100ms with a 2x stop margin
    let tail = render_seconds(&mut piano, 0.25);
    assert!(peak(&tail) > 0.0, "the fade itself is audible");
    assert_eq!(piano.voice_count(), 0, "voice discarded after the window");

    let after = render_seconds(&mut piano, 0.05);
    assert_eq!(peak(&after), 0.0);
}

#[test]
fn release_never_jumps_upward_mid_attack() {
    let mut piano = Piano::new(SAMPLE_RATE);
    piano.note_on("C", 261.63);

    // Release 2ms in, a fifth of the way up the 10ms attack ramp
    let mut early = vec![0.0f32; (0.002 * SAMPLE_RATE) as usize];
    piano.render_block(&mut early);
    piano.note_off("C");
    let tail = render_seconds(&mut piano, 0.05);

    // Had the release restarted from the nominal peak, the tail would hit
    // 0.7 * 0.8; from the partial level it stays well below half that.
    assert!(
        peak(&tail) < 0.7 * 0.8 * 0.5,
        "release must start from the current level, peak was {}",
        peak(&tail)
    );
}

#[test]
fn stop_all_releases_every_note_synchronously() {
    let mut piano = Piano::new(SAMPLE_RATE);
    piano.note_on("C", 261.63);
    piano.note_on("D", 293.66);
    piano.note_on("E", 329.63);

    piano.stop_all();
    assert_eq!(piano.active_len(), 0);
    assert_eq!(piano.voice_count(), 3);

    let _ = render_seconds(&mut piano, 0.25);
    assert_eq!(piano.voice_count(), 0);
}

#[test]
fn waveform_switch_applies_to_the_next_note_only() {
    let mut piano = Piano::new(SAMPLE_RATE);
    piano.note_on("C", 261.63);

    // The input layer's selector sequence: stop everything, then switch
    piano.stop_all();
    piano.set_waveform(Waveform::Sawtooth);
    piano.note_on("C", 261.63);

    assert_eq!(piano.waveform(), Waveform::Sawtooth);
    assert_eq!(piano.active_len(), 1);
}

#[test]
fn full_keymap_chord_renders_bounded_output() {
    let mut piano = Piano::new(SAMPLE_RATE);
    for key in keymap::KEYBOARD {
        piano.note_on(key.note, key.frequency);
    }
    assert_eq!(piano.active_len(), keymap::KEYBOARD.len());

    let samples = render_seconds(&mut piano, 0.1);
    let limit = keymap::KEYBOARD.len() as f32 * 0.7 * 0.8;
    assert!(peak(&samples) <= limit + 1e-3);
}

#[test]
fn volume_changes_take_effect_on_the_next_block() {
    let mut piano = Piano::new(SAMPLE_RATE);
    piano.note_on("A", 440.0);
    let _ = render_seconds(&mut piano, 0.05);

    piano.set_master_volume(0.2);
    let quiet = peak(&render_seconds(&mut piano, 0.05));
    assert!((quiet - 0.7 * 0.2).abs() < 0.02);

    piano.set_master_volume(99.0); // clamped to 1.0
    let loud = peak(&render_seconds(&mut piano, 0.05));
    assert!((loud - 0.7).abs() < 0.02);
}
