pub mod member;
pub mod note_template;
pub mod project;
pub mod role;
pub mod tracker;
pub mod user;
