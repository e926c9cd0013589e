//! Push delivery adapters.

mod broadcast_hub;

pub use broadcast_hub::BroadcastPushHub;
