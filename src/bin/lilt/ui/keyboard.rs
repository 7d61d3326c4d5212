//! Piano keyboard widget: white key caps in a row, black caps overlaid on
//! the upper half at the octave boundaries, active notes highlighted.

use std::collections::HashSet;

use ratatui::{
    layout::{Position, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use lilt::keymap::{self, KeyDef};

/// Key-cap hit regions from the last render, black caps checked first since
/// they overlap the white ones.
#[derive(Default)]
pub struct KeyRects {
    black: Vec<(Rect, &'static KeyDef)>,
    white: Vec<(Rect, &'static KeyDef)>,
}

impl KeyRects {
    pub fn hit(&self, position: Position) -> Option<&'static KeyDef> {
        self.black
            .iter()
            .chain(self.white.iter())
            .find(|(rect, _)| rect.contains(position))
            .map(|(_, key)| *key)
    }
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, active: &HashSet<String>) -> KeyRects {
    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut rects = KeyRects::default();
    if inner.width < 10 || inner.height < 4 {
        return rects;
    }

    let white_count = keymap::white_keys().count() as u16;
    let key_width = (inner.width / white_count).max(1);
    let black_height = inner.height * 3 / 5;
    let black_width = (key_width * 2 / 3).max(1);

    for (i, key) in keymap::white_keys().enumerate() {
        let rect = Rect {
            x: inner.x + i as u16 * key_width,
            y: inner.y,
            width: key_width.saturating_sub(1).max(1),
            height: inner.height,
        };
        render_cap(frame, rect, key, active.contains(key.note), false);
        rects.white.push((rect, key));
    }

    for key in keymap::black_keys() {
        // Centered on the boundary after its left-hand white neighbor
        let boundary = keymap::white_keys_before(key) as u16 * key_width;
        let rect = Rect {
            x: inner.x + boundary.saturating_sub(black_width / 2 + 1),
            y: inner.y,
            width: black_width,
            height: black_height,
        };
        render_cap(frame, rect, key, active.contains(key.note), true);
        rects.black.push((rect, key));
    }

    rects
}

fn render_cap(frame: &mut Frame, rect: Rect, key: &KeyDef, active: bool, black: bool) {
    let style = match (black, active) {
        (false, false) => Style::default().fg(Color::Black).bg(Color::White),
        (false, true) => Style::default().fg(Color::Black).bg(Color::Cyan),
        (true, false) => Style::default().fg(Color::Gray).bg(Color::Black),
        (true, true) => Style::default().fg(Color::Black).bg(Color::Cyan),
    };

    frame.render_widget(Block::default().style(style), rect);

    // Binding and note name on the bottom rows of the cap
    if rect.height >= 2 {
        let label_area = Rect {
            x: rect.x,
            y: rect.y + rect.height - 2,
            width: rect.width,
            height: 2,
        };
        let label = Paragraph::new(format!("{}\n{}", key.binding, key.note))
            .style(style)
            .centered();
        frame.render_widget(label, label_area);
    }
}
