//! Renders a C major chord offline and prints envelope milestones.
//! Shows the note lifecycle without opening an audio device.
//!
//! Run with: cargo run --example offline_chord

use lilt::synth::Piano;

fn main() {
    let sample_rate = 48_000.0;
    let block_size = 256;
    let mut piano = Piano::new(sample_rate);

    println!("=== Offline Chord ===\n");

    println!("Note on: C, E, G");
    piano.note_on("C", 261.63);
    piano.note_on("E", 329.63);
    piano.note_on("G", 392.00);

    let mut buffer = vec![0.0f32; block_size];
    piano.render_block(&mut buffer);
    let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    println!("  active notes: {}", piano.active_len());
    println!("  peak after first block: {peak:.3}");

    println!("\nNote off: E");
    piano.note_off("E");
    println!("  active notes: {} (E un-highlights at once)", piano.active_len());
    println!("  voices still rendering: {} (E is fading)", piano.voice_count());

    // Let the release tail play out: 100ms release + 2x stop margin
    let blocks = (0.25 * sample_rate) as usize / block_size;
    for _ in 0..blocks {
        piano.render_block(&mut buffer);
    }
    println!("\nAfter the release window:");
    println!("  voices still rendering: {}", piano.voice_count());

    println!("\nStop all");
    piano.stop_all();
    println!("  active notes: {}", piano.active_len());
}
