//! TUI for lilt: status bar, piano keyboard, oscilloscope, help bar.

mod keyboard;
mod scope;

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use lilt::dsp::Waveform;

pub use keyboard::KeyRects;

/// Everything the display layer reads per frame. Built from the engine under
/// its lock, then rendered without touching shared state again.
pub struct UiView<'a> {
    /// The active-note set driving key-cap highlighting.
    pub active: &'a HashSet<String>,
    pub waveform: Waveform,
    pub volume: f32,
    pub sample_rate: f32,
    pub audio_running: bool,
    pub audio_failed: bool,
    pub audio_buffer: &'a [f32],
}

/// Render one frame. Returns the key-cap hit regions for mouse handling.
pub fn render(frame: &mut Frame, view: &UiView) -> KeyRects {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Status bar
            Constraint::Min(10),    // Keyboard
            Constraint::Length(8),  // Oscilloscope
            Constraint::Length(1),  // Help bar
        ])
        .split(area);

    render_status(frame, chunks[0], view);
    let rects = keyboard::render_keyboard(frame, chunks[1], view.active);
    scope::render_scope(frame, chunks[2], view.audio_buffer);

    let help = Paragraph::new(
        " [a-;] white keys  [w e t y u o p] black keys  [Tab/1-4] waveform  [+/-] volume  [Q] quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);

    rects
}

fn render_status(frame: &mut Frame, area: ratatui::layout::Rect, view: &UiView) {
    let block = Block::default().title(" lilt ").borders(Borders::ALL);

    let peak = view
        .audio_buffer
        .iter()
        .fold(0.0f32, |acc, &x| acc.max(x.abs()));

    // Waveform selector with the current shape highlighted
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, shape) in Waveform::ALL.iter().enumerate() {
        let style = if *shape == view.waveform {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, shape.label()), style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(
        format!(" Vol: {:.0}%  ", view.volume * 100.0),
        Style::default().fg(Color::White),
    ));

    let audio_status = if view.audio_failed {
        Span::styled("audio unavailable", Style::default().fg(Color::Red))
    } else if view.audio_running {
        Span::styled(
            format!("{:.1}kHz  Peak: {:.2}", view.sample_rate / 1000.0, peak),
            Style::default().fg(Color::Magenta),
        )
    } else {
        Span::styled(
            "press a key to start audio",
            Style::default().fg(Color::Yellow),
        )
    };
    spans.push(audio_status);

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
