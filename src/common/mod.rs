pub mod paths;
pub mod progress;

pub use paths::LooperPaths;
