//! Visit list and submission adapter.
//!
//! Binds a pet's visit list and the "add visit" form to the visits API:
//!
//! - [`VisitsController`] — Loads the pet's visits, submits new ones, navigates on success
//! - [`VisitForm`] — Staged form values (date defaults to today)
//! - [`Navigator`] and [`Route`] — Where the view goes after a successful submit
//!
//! The HTTP client, the navigator and the route parameters are passed in
//! explicitly; nothing is looked up from ambient state.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use petclinic_visits::{Navigator, Route, VisitForm, VisitsController};
//!
//! let controller = VisitsController::new(
//!     Arc::new(HttpVisitClient::new(&config)?),
//!     Arc::new(MyRouter),
//!     RouteParams::from_pairs([("ownerId", "42"), ("petId", "7")]),
//! );
//!
//! // On activation
//! let visits = controller.load().await?;
//!
//! // On submit; navigates to `ownerDetails` with ownerId=42 when accepted
//! let mut form = VisitForm::new();
//! form.description = "Annual checkup".into();
//! controller.submit_form(&form).await?;
//! ```
//!
//! # Failure Policy
//!
//! - A failed load returns the error and leaves the displayed list untouched.
//! - When loads overlap, the most recently started one decides the displayed
//!   list; an older load finishing late only returns its result to its caller.
//! - A failed submit returns the error and does not navigate.
//! - A submit issued while another is still in flight is rejected with
//!   [`VisitError::SubmissionInFlight`] without sending a request.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use petclinic_client::VisitApi;
use petclinic_core::{format_visit_date, NewVisit, RouteParams, Visit, VisitError, VisitScope};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// ============================================================================
// Navigation
// ============================================================================

/// A view the adapter can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The owner's detail page, shown after a visit is recorded.
    OwnerDetails { owner_id: Option<u32> },
}

impl Route {
    /// Router state name.
    pub fn name(&self) -> &'static str {
        match self {
            Route::OwnerDetails { .. } => "ownerDetails",
        }
    }

    /// Router parameters. Absent identifiers are left out.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Route::OwnerDetails { owner_id } => owner_id
                .map(|id| vec![("ownerId", id.to_string())])
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        for (key, value) in self.params() {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Performs view transitions on behalf of the adapter.
pub trait Navigator: Send + Sync {
    fn go(&self, route: Route);
}

// ============================================================================
// Form
// ============================================================================

/// Values staged in the "add visit" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitForm {
    pub date: NaiveDate,
    pub description: String,
}

impl VisitForm {
    /// A fresh form: today's local date and an empty description.
    pub fn new() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            description: String::new(),
        }
    }
}

impl Default for VisitForm {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Clears the in-flight flag when a submission finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Displayed list, tagged with the load that produced it.
#[derive(Default)]
struct Displayed {
    load: u64,
    visits: Option<Vec<Visit>>,
}

/// View-model adapter for one pet's visits.
pub struct VisitsController {
    api: Arc<dyn VisitApi>,
    navigator: Arc<dyn Navigator>,
    params: RouteParams,
    scope: VisitScope,
    loads_started: AtomicU64,
    displayed: RwLock<Displayed>,
    submitting: AtomicBool,
}

impl VisitsController {
    /// Creates an adapter scoped by the calling view's route parameters.
    pub fn new(api: Arc<dyn VisitApi>, navigator: Arc<dyn Navigator>, params: RouteParams) -> Self {
        let scope = VisitScope::from(&params);
        debug!("Visits controller for {}", scope);

        Self {
            api,
            navigator,
            params,
            scope,
            loads_started: AtomicU64::new(0),
            displayed: RwLock::new(Displayed::default()),
            submitting: AtomicBool::new(false),
        }
    }

    /// Route parameters as received.
    pub fn params(&self) -> RouteParams {
        self.params
    }

    /// Resolved owner/pet scope (missing ids are `0`).
    pub fn scope(&self) -> VisitScope {
        self.scope
    }

    /// Fetches the pet's visits and makes them the displayed list.
    ///
    /// On failure the previously displayed list, if any, is kept. A result
    /// that arrives after a later-started load has already been displayed is
    /// returned but not displayed.
    pub async fn load(&self) -> Result<Vec<Visit>, VisitError> {
        let load = self.loads_started.fetch_add(1, Ordering::AcqRel) + 1;

        match self.api.list_visits(&self.scope).await {
            Ok(visits) => {
                let mut displayed = self.displayed.write().await;
                if load > displayed.load {
                    info!("Loaded {} visits for {}", visits.len(), self.scope);
                    displayed.load = load;
                    displayed.visits = Some(visits.clone());
                } else {
                    debug!(
                        "Discarding stale load #{} for {} (showing #{})",
                        load, self.scope, displayed.load
                    );
                }
                Ok(visits)
            }
            Err(e) => {
                warn!("Failed to load visits for {}: {}", self.scope, e);
                Err(e)
            }
        }
    }

    /// The displayed list; `None` until a load succeeds.
    pub async fn visits(&self) -> Option<Vec<Visit>> {
        self.displayed.read().await.visits.clone()
    }

    /// Returns `true` while a submission is waiting on the backend.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Records a visit and, once accepted, navigates to the owner's details.
    ///
    /// The date is sent as `yyyy-MM-dd`; the description is sent as-is.
    pub async fn submit(&self, date: NaiveDate, description: impl Into<String>) -> Result<(), VisitError> {
        let Some(_in_flight) = InFlight::acquire(&self.submitting) else {
            warn!("Ignoring duplicate visit submission for {}", self.scope);
            return Err(VisitError::SubmissionInFlight);
        };

        let visit = NewVisit::new(date, description);
        debug!("Submitting visit on {} for {}", format_visit_date(visit.date), self.scope);

        if let Err(e) = self.api.create_visit(&self.scope, &visit).await {
            warn!("Failed to record visit for {}: {}", self.scope, e);
            return Err(e);
        }

        let route = Route::OwnerDetails {
            owner_id: self.params.owner_id,
        };
        info!("Visit recorded for {}, navigating to {}", self.scope, route);
        self.navigator.go(route);
        Ok(())
    }

    /// Submits the staged form values.
    pub async fn submit_form(&self, form: &VisitForm) -> Result<(), VisitError> {
        self.submit(form.date, form.description.clone()).await
    }
}
