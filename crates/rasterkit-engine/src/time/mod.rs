//! Frame timing: one [`FrameClock`] per window, ticked once per presented frame.

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
