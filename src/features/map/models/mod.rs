mod filter;
mod marker;

pub use filter::{PostFilter, SortOrder};
pub use marker::{Marker, MarkerDiff, MarkerId, MarkerKind};
