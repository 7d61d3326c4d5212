//! lilt - terminal piano
//!
//! Run with: cargo run
//!
//! Play with the home row (a s d f ...), the row above for the black keys,
//! or click the key caps with the mouse. Tab cycles the waveform.

mod app;
mod ui;

use app::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let mut terminal = ratatui::init();
    let result = App::new().run(&mut terminal);
    ratatui::restore();
    result
}
