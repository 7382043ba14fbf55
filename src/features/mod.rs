pub mod categories;
pub mod contacts;
pub mod locations;
pub mod map;
pub mod posts;
