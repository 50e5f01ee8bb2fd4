//! Route table records and the provider seam the pipeline reads them through.

use log::debug;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// A mounted route: one path and the HTTP methods registered for it.
///
/// The path uses the router's own syntax (`/user/:id`). Several records may share a path
/// when different mounting layers register different methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub methods: BTreeSet<String>,
}

impl Endpoint {
    pub fn new<I, S>(path: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }
}

/// Source of the currently registered routes.
///
/// Implementations must not fail: a provider that cannot determine its routes reports none.
pub trait EndpointProvider: Send + Sync {
    fn list_endpoints(&self) -> Vec<Endpoint>;
}

impl EndpointProvider for Vec<Endpoint> {
    fn list_endpoints(&self) -> Vec<Endpoint> {
        self.clone()
    }
}

/// Registry of routes as they are mounted on a running application.
///
/// Routers register their paths here while they are assembled; the registry is then handed
/// to the synthesizer as an [`EndpointProvider`]. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    endpoints: Arc<RwLock<Vec<Endpoint>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `methods` as mounted on `path`
    pub fn register<I, S>(&self, path: impl Into<String>, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoint = Endpoint::new(path, methods);
        debug!("Registering route {} {:?}", endpoint.path, endpoint.methods);
        match self.endpoints.write() {
            Ok(mut endpoints) => endpoints.push(endpoint),
            Err(poisoned) => poisoned.into_inner().push(endpoint),
        }
    }

    pub fn len(&self) -> usize {
        match self.endpoints.read() {
            Ok(endpoints) => endpoints.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EndpointProvider for RouteTable {
    fn list_endpoints(&self) -> Vec<Endpoint> {
        match self.endpoints.read() {
            Ok(endpoints) => endpoints.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_methods_are_deduplicated() {
        let endpoint = Endpoint::new("/user", ["GET", "GET", "POST"]);
        assert_eq!(endpoint.methods.len(), 2);
        assert!(endpoint.methods.contains("GET"));
        assert!(endpoint.methods.contains("POST"));
    }

    #[test]
    fn test_route_table_keeps_every_registration() {
        let table = RouteTable::new();
        table.register("/user", ["GET"]);
        table.register("/user", ["POST"]);

        let endpoints = table.list_endpoints();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].path, "/user");
        assert_eq!(endpoints[1].path, "/user");
    }

    #[test]
    fn test_route_table_clones_share_state() {
        let table = RouteTable::new();
        let shared = table.clone();
        shared.register("/health", ["GET"]);

        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }
}
