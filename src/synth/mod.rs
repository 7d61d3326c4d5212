// Purpose: note lifecycle management.
// This layer sits above the DSP primitives and tracks which notes are
// sounding, one voice per note.

pub mod piano;
pub mod voice;

pub use piano::Piano;
pub use voice::{Voice, VoiceState};
