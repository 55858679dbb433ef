pub mod stats;

pub use stats::{PersistedStats, StatsRecord};
