//! Huddle Server
//!
//! Moderation and image-upload core for a small group chat: privileged
//! actions gated by a ranked role, and image uploads admitted one at a time
//! per session.

pub mod api;
pub mod auth;
pub mod composer;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod gateway;
pub mod moderation;
pub mod rooms;
pub mod session;
pub mod storage;
pub mod uploads;
