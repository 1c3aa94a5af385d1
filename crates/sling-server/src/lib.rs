//! # sling-server
//!
//! Axum HTTP + `WebSocket` lobby server.
//!
//! - `GET /` — inline HTML echo test page
//! - `GET /ws` — WebSocket upgrade; each connection gets the lowest free
//!   player slot and a per-connection echo loop
//! - `GET /health` — uptime and live player count
//! - `GET /metrics` — Prometheus text (when a recorder is installed)
//! - Graceful shutdown via `CancellationToken` + session `TaskTracker`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod home;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;
