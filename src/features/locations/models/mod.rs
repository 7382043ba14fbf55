mod place;

pub use place::{CapturedLocation, LocationSource, Place, SearchOutcome};
