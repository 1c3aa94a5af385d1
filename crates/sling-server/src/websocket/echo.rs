//! Frame classification for the echo loop.
//!
//! Pure logic, split out of the socket loop so the echo contract (kind
//! and bytes preserved, control frames never echoed) is testable without
//! a live connection.

use axum::extract::ws::Message;

/// What the session should do with one inbound frame.
#[derive(Debug)]
pub enum FrameAction {
    /// Send this frame back to the same peer, unmodified.
    Echo(Message),
    /// Control frame; nothing to send.
    Ignore,
    /// Peer initiated close; end the session.
    Close,
}

/// Classify an inbound frame.
///
/// Text and binary messages are echoed as-is, preserving the frame kind.
/// Ping/Pong are transport liveness (axum answers pings itself) and are
/// never echoed.
pub fn classify(msg: Message) -> FrameAction {
    match msg {
        m @ (Message::Text(_) | Message::Binary(_)) => FrameAction::Echo(m),
        Message::Ping(_) | Message::Pong(_) => FrameAction::Ignore,
        Message::Close(_) => FrameAction::Close,
    }
}

/// Loggable preview of a frame: text content, or a byte count for binary.
pub fn describe(msg: &Message) -> String {
    match msg {
        Message::Text(t) => t.as_str().to_owned(),
        Message::Binary(b) => format!("<{} binary bytes>", b.len()),
        Message::Ping(_) => "<ping>".into(),
        Message::Pong(_) => "<pong>".into(),
        Message::Close(_) => "<close>".into(),
    }
}
