//! Invite issuance and redemption.
//!
//! Teachers mint short single-use codes; students redeem them to create a
//! teacher-student link. Codes expire after a TTL, collide-retry on
//! generation, and are consumed only by a redemption that actually creates a
//! link.

pub mod code;
pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod store;
