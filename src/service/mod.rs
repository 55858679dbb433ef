pub mod loader;
pub mod reconcile;

pub use loader::StatsLoader;
