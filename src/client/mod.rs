//! Client side of the portal: a typed API client and a local state mirror.

pub mod api;
pub mod mirror;

pub use api::{ClientError, HttpPortalApi, PortalApi};
pub use mirror::{AuthFallback, AuthSource, ClientMirror, Session};
