//! Application event loop: terminal input in, note events out.
//!
//! This layer owns everything the engine does not: mapping key presses and
//! mouse gestures to note identifiers, filtering key auto-repeat, triggering
//! sink creation on the first gesture, and feeding the display.

use std::collections::{HashMap, HashSet};
use std::io::stdout;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
    KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal::supports_keyboard_enhancement};
use ratatui::layout::Position;
use ratatui::DefaultTerminal;
use rtrb::Consumer;

use lilt::dsp::Waveform;
use lilt::keymap::{self, KeyDef};
use lilt::output::SinkProvider;
use lilt::synth::Piano;

use super::ui::{self, KeyRects, UiView};

/// Oscilloscope window size.
const VIS_BUFFER_SIZE: usize = 1024;

/// Fallback sustain when the terminal cannot report key releases: a note
/// stays down this long after its last press, so terminal auto-repeat keeps
/// a held key sounding.
const KEY_HOLD: Duration = Duration::from_millis(300);

/// Volume step for the +/- keys.
const VOLUME_STEP: f32 = 0.05;

pub struct App {
    piano: Arc<Mutex<Piano>>,
    provider: SinkProvider,
    /// Set once stream creation has failed; the piano then stays silent but
    /// the UI keeps running.
    audio_failed: bool,
    scope_rx: Option<Consumer<f32>>,
    audio_buffer: Vec<f32>,
    /// Whether the terminal delivers real key-release events.
    release_events: bool,
    /// Fallback hold deadlines, keyed by note identifier.
    held: HashMap<&'static str, Instant>,
    /// Note currently pressed with the mouse, if any.
    mouse_note: Option<&'static str>,
    /// Key-cap hit regions from the last render.
    key_rects: KeyRects,
    should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        // 48kHz placeholder; retuned to the device rate when the sink opens.
        let piano = Arc::new(Mutex::new(Piano::new(48_000.0)));
        let provider = SinkProvider::new(piano.clone());

        Self {
            piano,
            provider,
            audio_failed: false,
            scope_rx: None,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            release_events: false,
            held: HashMap::new(),
            mouse_note: None,
            key_rects: KeyRects::default(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        execute!(stdout(), EnableMouseCapture)?;

        let result = self.event_loop(terminal);

        // Wind down even if the loop errored
        self.provider.shutdown();
        execute!(stdout(), DisableMouseCapture)?;
        if self.release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }

        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.expire_held();

            terminal.draw(|frame| self.render(frame))?;

            // Handle input (non-blocking, ~60fps); drain everything pending
            // so chords do not smear across frames.
            if event::poll(Duration::from_millis(16))? {
                loop {
                    match event::read()? {
                        Event::Key(key) => self.handle_key(key.code, key.kind),
                        Event::Mouse(mouse) => self.handle_mouse(mouse),
                        _ => {}
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut ratatui::Frame) {
        let piano = self.piano.lock().unwrap();
        let active: HashSet<String> = piano.active_notes().map(str::to_string).collect();

        let view = UiView {
            active: &active,
            waveform: piano.waveform(),
            volume: piano.master_volume(),
            sample_rate: piano.sample_rate(),
            audio_running: self.provider.is_running(),
            audio_failed: self.audio_failed,
            audio_buffer: &self.audio_buffer,
        };
        self.key_rects = ui::render(frame, &view);
    }

    /// Pull oscilloscope samples, keeping the most recent window.
    fn poll_audio(&mut self) {
        let Some(rx) = self.scope_rx.as_mut() else {
            return;
        };

        let mut new_samples = Vec::new();
        while let Ok(sample) = rx.pop() {
            new_samples.push(sample);
        }

        if !new_samples.is_empty() {
            self.audio_buffer.extend(new_samples);
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
        }
    }

    /// Release notes whose fallback hold deadline has passed.
    fn expire_held(&mut self) {
        if self.release_events {
            return;
        }
        let now = Instant::now();
        let expired: Vec<_> = self
            .held
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(note, _)| *note)
            .collect();
        if !expired.is_empty() {
            let mut piano = self.piano.lock().unwrap();
            for note in expired {
                piano.note_off(note);
                self.held.remove(note);
            }
        }
    }

    /// Sink creation rides on user gestures. Failure leaves the instrument
    /// silent but responsive; no retry storms.
    fn ensure_audio(&mut self) {
        if self.audio_failed {
            return;
        }
        match self.provider.ensure_started() {
            Ok(Some(rx)) => self.scope_rx = Some(rx),
            Ok(None) => {}
            Err(_) => self.audio_failed = true,
        }
    }

    fn handle_key(&mut self, code: KeyCode, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press => self.handle_key_press(code),
            KeyEventKind::Repeat => {
                // Auto-repeat never retriggers a note; in fallback mode the
                // repeats arrive as presses and refresh the hold deadline.
            }
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = code {
                    if let Some(key) = keymap::find_by_binding(c) {
                        self.piano.lock().unwrap().note_off(key.note);
                    }
                }
            }
        }
    }

    fn handle_key_press(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,

            KeyCode::Tab => {
                let next = self.piano.lock().unwrap().waveform().cycled();
                self.change_waveform(next);
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.change_waveform(Waveform::ALL[c as usize - '1' as usize]);
            }

            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_volume(VOLUME_STEP),
            KeyCode::Char('-') => self.nudge_volume(-VOLUME_STEP),

            KeyCode::Char(c) => {
                if let Some(key) = keymap::find_by_binding(c) {
                    self.press_note(key);
                }
            }
            _ => {}
        }
    }

    fn press_note(&mut self, key: &'static KeyDef) {
        self.ensure_audio();
        self.piano.lock().unwrap().note_on(key.note, key.frequency);
        if !self.release_events {
            self.held.insert(key.note, Instant::now() + KEY_HOLD);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(key) = self.key_rects.hit(position) {
                    self.ensure_audio();
                    self.piano.lock().unwrap().note_on(key.note, key.frequency);
                    self.mouse_note = Some(key.note);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                // Dragging off a key releases it, possibly mid-attack;
                // dragging onto another starts a fresh voice.
                let target = self.key_rects.hit(position);
                let target_note = target.map(|key| key.note);
                if target_note != self.mouse_note {
                    let mut piano = self.piano.lock().unwrap();
                    if let Some(old) = self.mouse_note.take() {
                        piano.note_off(old);
                    }
                    if let Some(key) = target {
                        piano.note_on(key.note, key.frequency);
                        self.mouse_note = Some(key.note);
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(note) = self.mouse_note.take() {
                    self.piano.lock().unwrap().note_off(note);
                }
            }
            _ => {}
        }
    }

    /// Waveform changes never morph live voices; everything sounding is
    /// released first so the timbre on screen always matches the audio.
    fn change_waveform(&mut self, shape: Waveform) {
        {
            let mut piano = self.piano.lock().unwrap();
            piano.stop_all();
            piano.set_waveform(shape);
        }
        self.held.clear();
        self.mouse_note = None;
    }

    fn nudge_volume(&mut self, delta: f32) {
        let mut piano = self.piano.lock().unwrap();
        let volume = piano.master_volume() + delta;
        piano.set_master_volume(volume);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
