//! Application state for the shift guard API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::guard::GuardService;
use crate::store::IdentityProvider;

/// Shared application state.
///
/// Holds the guard service and the identity provider used to resolve the
/// caller named in the `x-employee-id` header.
#[derive(Clone)]
pub struct AppState {
    guard: Arc<GuardService>,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(guard: GuardService, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            guard: Arc::new(guard),
            identity,
        }
    }

    /// Returns the guard service.
    pub fn guard(&self) -> &GuardService {
        &self.guard
    }

    /// Returns the identity provider.
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }
}
