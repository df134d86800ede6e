//! Ports - traits at the seams between the feed core and its consumers.

mod event_handler;

pub use event_handler::EventHandler;
