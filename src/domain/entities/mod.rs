//! Core business entities.

pub mod click_event;
pub mod link;

pub use click_event::ClickEvent;
pub use link::Link;
