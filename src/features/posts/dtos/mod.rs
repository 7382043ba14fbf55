mod form_dto;
mod post_dto;

pub use form_dto::*;
pub use post_dto::*;
