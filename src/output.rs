//! Shared audio sink: lazy cpal output stream creation and teardown.
//!
//! There is exactly one live sink at a time. The provider creates it on
//! first demand — the input layer asks for it on the first keypress or
//! click, which keeps stream startup tied to a user gesture — and rebuilds
//! it from scratch if asked again after a shutdown.

use std::sync::{Arc, Mutex};

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};

use crate::synth::Piano;
use crate::MAX_BLOCK_SIZE;

/// Ring buffer capacity for the oscilloscope tap.
pub const SCOPE_BUFFER_SIZE: usize = 4096;

/// Owns the cpal output stream and the shared piano it renders.
pub struct SinkProvider {
    piano: Arc<Mutex<Piano>>,
    stream: Option<cpal::Stream>,
}

impl SinkProvider {
    pub fn new(piano: Arc<Mutex<Piano>>) -> Self {
        Self {
            piano,
            stream: None,
        }
    }

    /// Get the sink running. Creates the output stream on the first call and
    /// returns the oscilloscope consumer for it; later calls re-issue
    /// `play()` so a paused stream resumes, and return `None`.
    pub fn ensure_started(&mut self) -> Result<Option<Consumer<f32>>> {
        if let Some(stream) = &self.stream {
            stream.play().wrap_err("failed to resume output stream")?;
            return Ok(None);
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        // No voices exist before the sink does, so retuning the engine to
        // the device rate is safe here.
        self.piano.lock().unwrap().set_sample_rate(sample_rate);

        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_BUFFER_SIZE);
        let piano = self.piano.clone();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let mut piano = piano.lock().unwrap();
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames_remaining = total_frames - frames_written;
                        let frames_to_render = frames_remaining.min(MAX_BLOCK_SIZE);

                        let block = &mut render_buf[..frames_to_render];
                        piano.render_block(block);

                        // Copy to output (mono to all channels)
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                            // Scope tap; dropped samples are fine
                            let _ = scope_tx.push(s);
                        }

                        frames_written += frames_to_render;
                    }
                },
                |err| eprintln!("audio error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;
        self.stream = Some(stream);

        Ok(Some(scope_rx))
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Release every sounding note and tear the stream down. A later
    /// `ensure_started` builds a fresh sink.
    pub fn shutdown(&mut self) {
        self.piano.lock().unwrap().stop_all();
        self.stream = None;
    }
}
