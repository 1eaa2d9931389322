/// Room and state events as they arrive from the homeserver
pub mod event;
/// Well-known event type names and helpers for reading loosely typed event content
pub mod content;
