pub mod course;
pub mod item;
pub mod overlay;
pub mod user;
pub mod view;
