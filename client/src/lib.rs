//! Customer-side live queue booth client.
//!
//! The crate is laid out hexagonally: [`domain`] holds the booth types, the
//! state derivation, the position tracker, the coordinator and the ports it
//! drives; [`outbound`] holds adapters for the marketplace HTTP API, local
//! recovery storage and in-process push delivery; [`settings`] loads runtime
//! configuration.

pub mod domain;
pub mod outbound;
pub mod settings;
