//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They validate input and drive the key and log stores.

pub mod gateway;
pub mod key_service;
pub mod log_service;
pub mod lookup_service;
