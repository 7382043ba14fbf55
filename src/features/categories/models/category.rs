use crate::features::posts::models::PostKind;

/// Categories a source post can offer
pub const SOURCE_CATEGORIES: &[&str] = &[
    "Water",
    "Electricity",
    "Food",
    "Clothes",
    "Medicine",
    "Shelter",
];

/// Categories a help post can request; a superset of the source categories
pub const HELP_CATEGORIES: &[&str] = &[
    "Water",
    "Electricity",
    "Food",
    "Clothes",
    "Medicine",
    "Shelter",
    "Rescue",
    "Clearing",
    "Volunteers",
];

pub fn categories_for(kind: PostKind) -> &'static [&'static str] {
    match kind {
        PostKind::Source => SOURCE_CATEGORIES,
        PostKind::Help => HELP_CATEGORIES,
    }
}
