pub mod ephemeris;
pub mod error;
pub mod passes;
pub mod recording;
