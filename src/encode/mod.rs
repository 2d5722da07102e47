//! Encoding sinks.
//!
//! Sinks consume rendered frames in index order once a whole batch has rendered.

/// `ffmpeg`-based sinks (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Numbered PNG sequence output.
pub mod png;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
