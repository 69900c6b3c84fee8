//! Request handlers.

pub mod analyses;
pub mod health;
pub mod playback;

pub use analyses::*;
pub use health::*;
pub use playback::*;
