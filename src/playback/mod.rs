mod format;
mod payload;

pub use format::{format, format_at, DisplayActivity};
pub use payload::{normalize, PayloadError, PayloadWarning, PlaybackEvent};
