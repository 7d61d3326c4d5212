//! Benchmarks for the DSP primitives and the full voice mix.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lilt::dsp::envelope::Envelope;
use lilt::dsp::oscillator::{Oscillator, Waveform};
use lilt::keymap;
use lilt::synth::Piano;

const SAMPLE_RATE: f32 = 48_000.0;

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for waveform in Waveform::ALL {
        let mut osc = Oscillator::new(SAMPLE_RATE, 440.0, waveform, 0.0);
        let mut buffer = vec![0.0f32; 256];
        group.bench_function(waveform.label(), |b| {
            b.iter(|| {
                osc.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack/held phase
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("held", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release phase; re-trigger so the exponential path stays hot
        let mut env = Envelope::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                for _ in 0..600 {
                    env.next_sample();
                }
                env.note_off();
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

fn bench_full_keyboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/keyboard");

    for &size in BLOCK_SIZES {
        let mut piano = Piano::new(SAMPLE_RATE);
        for key in keymap::KEYBOARD {
            piano.note_on(key.note, key.frequency);
        }
        let mut buffer = vec![0.0f32; size];

        group.bench_with_input(
            BenchmarkId::new("all_keys_held", size),
            &size,
            |b, _| {
                b.iter(|| {
                    piano.render_block(black_box(&mut buffer));
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oscillator, bench_envelope, bench_full_keyboard);
criterion_main!(benches);
