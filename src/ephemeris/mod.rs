mod interpolate;
mod sample;
mod window;

pub use interpolate::{locate, LocatedPosition};
pub use sample::{PositionSample, RawSample, DEFAULT_ALTITUDE_KM};
pub use window::{EphemerisWindow, RawWindow, SatelliteMeta, SatelliteTrack, WindowError};
