//! Outbound adapters implementing domain ports.
//!
//! - **http**: reqwest client for the marketplace JSON API
//! - **recovery**: recovery record stores (directory-backed and in-memory)
//! - **push**: in-process broadcast hub for push-delivered positions
//!
//! Adapters translate between domain types and their transport. They contain
//! no booth logic.

pub mod http;
pub mod push;
pub mod recovery;
