mod category;

pub use category::{categories_for, HELP_CATEGORIES, SOURCE_CATEGORIES};
