mod directory;

pub use directory::{ContactGroup, Credits, EmergencyContact, ALL_GROUPS, CREDITS, DIRECTORY};
