//! Canvas REST client implementing [`duebot_core::lms::LmsApi`].

pub mod client;
pub mod pagination;

pub use client::{CanvasClient, normalize_base_url};
