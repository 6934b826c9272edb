pub mod category;
pub mod comment;
pub mod contact;
pub mod post;
