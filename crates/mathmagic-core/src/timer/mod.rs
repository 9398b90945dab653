mod queue;

pub use queue::{Expired, TimerHandle, TimerQueue, TimerStats};
