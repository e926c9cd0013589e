//! Marketplace HTTP adapters.
//!
//! This module provides a thin reqwest implementation of the remote booth
//! ports.

mod dto;
mod marketplace_api;

pub use marketplace_api::{HttpMarketplaceApi, HttpMarketplaceApiError};
