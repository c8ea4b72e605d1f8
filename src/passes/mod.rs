mod detector;
mod types;

pub use detector::detect_passes;
pub use types::Pass;
