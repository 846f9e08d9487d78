mod tick;

pub use tick::{FixedTimestep, drain_ticks};
