//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{
    services::{gateway::AccessGateway, lookup_service::LookupProxy},
    store::{KeyStore, LogStore},
};

/// Explicitly constructed context: stores, gateway and lookup proxy.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<dyn KeyStore>,
    pub logs: Arc<dyn LogStore>,
    pub gateway: AccessGateway,
    pub lookup: LookupProxy,
}

impl AppState {
    pub fn new(
        keys: Arc<dyn KeyStore>,
        logs: Arc<dyn LogStore>,
        admin_secret: &str,
        lookup: LookupProxy,
    ) -> Self {
        Self {
            gateway: AccessGateway::new(keys.clone(), admin_secret),
            keys,
            logs,
            lookup,
        }
    }
}
