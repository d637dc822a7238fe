//! # Pet clinic visits
//!
//! Client-side adapter for a pet's visit history: load the visits recorded
//! for a pet, submit a new one, and move on to the owner's page once the
//! backend accepts it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use petclinic::prelude::*;
//!
//! struct Router;
//!
//! impl Navigator for Router {
//!     fn go(&self, route: Route) {
//!         println!("-> {}", route);
//!     }
//! }
//!
//! let client = HttpVisitClient::new(&ClientConfig::from_env()?)?;
//! let controller = VisitsController::new(
//!     Arc::new(client),
//!     Arc::new(Router),
//!     RouteParams::from_pairs([("ownerId", "6"), ("petId", "7")]),
//! );
//!
//! for visit in controller.load().await? {
//!     println!("{:?} {}", visit.date, visit.description);
//! }
//!
//! controller.submit(VisitForm::new().date, "Annual checkup").await?;
//! ```
//!
//! ## Crate Structure
//!
//! | Crate | Description |
//! |-------|-------------|
//! | [`petclinic_core`] | Visit types, route scoping, errors |
//! | [`petclinic_config`] | Client configuration (JSON, env, builder) |
//! | [`petclinic_client`] | `VisitApi` trait and HTTP client |
//! | [`petclinic_visits`] | The list/submit adapter and navigation |
//!
//! ## Endpoints
//!
//! - `GET  api/visit/owners/{ownerId}/pets/{petId}/visits`
//! - `POST api/visit/owners/{ownerId}/pets/{petId}/visits` with `{"date":"yyyy-MM-dd","description":...}`
//!
//! Missing owner or pet ids are sent as `0`.

// Re-export core types
pub use petclinic_core::{
    format_visit_date, parse_visit_date, NewVisit, RouteParams, Visit, VisitError, VisitScope,
    VISIT_DATE_FORMAT,
};

// Re-export config
pub use petclinic_config::{ClientConfig, ClientConfigBuilder, ConfigError};

// Re-export client
pub use petclinic_client::{HttpVisitClient, VisitApi};

// Re-export adapter
pub use petclinic_visits::{Navigator, Route, VisitForm, VisitsController};

/// Prelude module for convenient imports.
///
/// ```rust
/// use petclinic::prelude::*;
///
/// let scope = VisitScope::from(RouteParams::from_pairs([("petId", "7")]));
/// assert_eq!(scope.path(), "api/visit/owners/0/pets/7/visits");
/// ```
pub mod prelude {
    pub use crate::{NewVisit, RouteParams, Visit, VisitError, VisitScope};

    pub use crate::ClientConfig;

    pub use crate::{HttpVisitClient, VisitApi};

    pub use crate::{Navigator, Route, VisitForm, VisitsController};
}
