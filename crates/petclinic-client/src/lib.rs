//! Client access to the pet clinic visits API.
//!
//! - [`VisitApi`] — Trait for anything that can read and record visits
//! - [`HttpVisitClient`] — reqwest implementation talking to the real endpoint
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use petclinic_client::{HttpVisitClient, VisitApi};
//! use petclinic_config::ClientConfig;
//! use petclinic_core::VisitScope;
//!
//! let client = HttpVisitClient::new(&ClientConfig::from_env()?)?;
//! let visits = client.list_visits(&VisitScope::new(1, 1)).await?;
//! ```
//!
//! # Implementing a Custom Backend
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use petclinic_client::VisitApi;
//! use petclinic_core::{NewVisit, Visit, VisitError, VisitScope};
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl VisitApi for Offline {
//!     async fn list_visits(&self, _scope: &VisitScope) -> Result<Vec<Visit>, VisitError> {
//!         Ok(Vec::new())
//!     }
//!     async fn create_visit(&self, _scope: &VisitScope, _visit: &NewVisit) -> Result<(), VisitError> {
//!         Err(VisitError::Request("offline".into()))
//!     }
//! }
//! ```

mod http;

pub use http::HttpVisitClient;

use async_trait::async_trait;

pub use petclinic_core::{NewVisit, Visit, VisitError, VisitScope};

/// Read and write access to one pet's visits collection.
#[async_trait]
pub trait VisitApi: Send + Sync {
    /// Fetches all visits recorded for the scoped pet.
    async fn list_visits(&self, scope: &VisitScope) -> Result<Vec<Visit>, VisitError>;

    /// Records a new visit for the scoped pet.
    ///
    /// Only success or failure is reported; any response body is discarded.
    async fn create_visit(&self, scope: &VisitScope, visit: &NewVisit) -> Result<(), VisitError>;
}
