//! Platform abstraction layer
//!
//! Host-side glue that stays testable off the browser:
//! - Keyboard state to `TickInput` mapping
//! - Frame delta bookkeeping (pause-aware)

pub mod input;
pub mod time;

pub use input::KeyState;
pub use time::FrameClock;
