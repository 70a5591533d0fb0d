//! Fetch slots with stale-while-revalidate semantics.
//!
//! A [`Resource`] holds the last good data, the last error and whether a request is in
//! flight. A [`Fetcher`] pairs a resource with the request that fills it.
//!
//! Requests are split into [`Fetcher::begin`] (mark in flight, hand back a `'static` future)
//! and [`Fetcher::complete`] (settle the slot). Callers that only need the result use
//! [`Fetcher::load`] / [`Fetcher::revalidate`]; callers that want to show the in-flight state
//! (a revalidating indicator over the previous list) render between the two halves.
//! A caller that drops the future instead of completing it must call [`Fetcher::abandon`];
//! [`Fetcher::load`] does this itself when it is cancelled.

use crate::client::ProgramsApi;
use crate::models::{Enrollment, Program};
use crate::text::PatientUuid;
use crate::{ProgramsError, ProgramsResult};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::sync::Arc;

/// Observable state of a fetch slot.
#[derive(Debug, PartialEq)]
pub enum FetchState<'a, T> {
    /// No data and no error yet.
    Loading,
    /// The most recent request failed. Takes precedence over any stale data.
    Error(&'a ProgramsError),
    /// Data is present and a re-fetch is in flight.
    Revalidating(&'a T),
    /// Data is present and nothing is in flight.
    Success(&'a T),
}

/// Identifies one request against a [`Resource`]; only the newest ticket may settle it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// A single fetch slot.
#[derive(Debug)]
pub struct Resource<T> {
    data: Option<T>,
    error: Option<ProgramsError>,
    in_flight: Option<Ticket>,
    issued: u64,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: None,
            issued: 0,
        }
    }
}

impl<T> Resource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a new request as in flight, superseding any earlier one.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.in_flight = Some(ticket);
        ticket
    }

    /// Settle the slot with the outcome of `ticket`'s request.
    ///
    /// Returns `false` (and leaves the slot untouched) if `ticket` has been superseded.
    /// A failure keeps previously loaded data; a success clears any earlier error.
    pub fn settle(&mut self, ticket: Ticket, result: ProgramsResult<T>) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
        true
    }

    /// Forget `ticket`'s request without settling the slot.
    ///
    /// Returns `false` if `ticket` is not the request in flight.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        true
    }

    pub fn state(&self) -> FetchState<'_, T> {
        match (&self.error, &self.data) {
            (Some(error), _) => FetchState::Error(error),
            (None, None) => FetchState::Loading,
            (None, Some(data)) if self.in_flight.is_some() => FetchState::Revalidating(data),
            (None, Some(data)) => FetchState::Success(data),
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ProgramsError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }

    pub fn is_validating(&self) -> bool {
        self.in_flight.is_some()
    }
}

type Loader<T> = Arc<dyn Fn() -> BoxFuture<'static, ProgramsResult<T>> + Send + Sync>;

/// A [`Resource`] together with the request that fills it.
pub struct Fetcher<T> {
    key: String,
    loader: Loader<T>,
    resource: Resource<T>,
}

impl<T> std::fmt::Debug for Fetcher<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("key", &self.key)
            .field("resource", &self.resource)
            .finish()
    }
}

impl<T: Send + 'static> Fetcher<T> {
    /// Build a fetcher from an arbitrary loader. `key` names the resource in logs.
    pub fn new<F>(key: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ProgramsResult<T>> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            loader: Arc::new(loader),
            resource: Resource::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Start a request. The returned future does not borrow the fetcher.
    pub fn begin(&mut self) -> (Ticket, BoxFuture<'static, ProgramsResult<T>>) {
        let ticket = self.resource.begin();
        tracing::debug!(key = %self.key, ?ticket, "fetch started");
        (ticket, (self.loader)())
    }

    /// Settle a request started with [`Fetcher::begin`].
    pub fn complete(&mut self, ticket: Ticket, result: ProgramsResult<T>) {
        if let Err(e) = &result {
            tracing::warn!(key = %self.key, error = %e, "fetch failed");
        }
        if !self.resource.settle(ticket, result) {
            tracing::debug!(key = %self.key, ?ticket, "ignoring superseded fetch result");
        }
    }

    /// Drop a request started with [`Fetcher::begin`] whose future will never be completed.
    pub fn abandon(&mut self, ticket: Ticket) {
        if self.resource.abandon(ticket) {
            tracing::debug!(key = %self.key, ?ticket, "fetch abandoned");
        }
    }

    /// Fetch and settle. Also used for the first load on mount.
    ///
    /// If this future is dropped before the request finishes, the slot goes back to its
    /// previous state.
    pub async fn load(&mut self) {
        let (ticket, request) = self.begin();
        let mut pending = PendingLoad {
            resource: &mut self.resource,
            key: &self.key,
            ticket: Some(ticket),
        };
        let result = request.await;
        pending.ticket = None;
        drop(pending);
        self.complete(ticket, result);
    }

    /// Re-fetch while keeping the current data visible.
    pub async fn revalidate(&mut self) {
        self.load().await;
    }

    pub fn state(&self) -> FetchState<'_, T> {
        self.resource.state()
    }

    pub fn resource(&self) -> &Resource<T> {
        &self.resource
    }
}

/// Clears the in-flight marker of a [`Fetcher::load`] that never reached `complete`.
struct PendingLoad<'a, T> {
    resource: &'a mut Resource<T>,
    key: &'a str,
    ticket: Option<Ticket>,
}

impl<T> Drop for PendingLoad<'_, T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            if self.resource.abandon(ticket) {
                tracing::debug!(key = %self.key, ?ticket, "fetch cancelled");
            }
        }
    }
}

impl Fetcher<Vec<Enrollment>> {
    /// Enrollment fetcher for one patient.
    pub fn enrollments(api: Arc<dyn ProgramsApi>, patient: PatientUuid) -> Self {
        let key = format!("enrollments:{patient}");
        Self::new(key, move || {
            let api = Arc::clone(&api);
            let patient = patient.clone();
            async move { api.enrollments(&patient).await }.boxed()
        })
    }
}

impl Fetcher<Vec<Program>> {
    /// Facility program catalog fetcher.
    pub fn available_programs(api: Arc<dyn ProgramsApi>) -> Self {
        Self::new("available-programs", move || {
            let api = Arc::clone(&api);
            async move { api.available_programs().await }.boxed()
        })
    }

    /// Server-computed eligible programs for one patient.
    pub fn eligible_programs(api: Arc<dyn ProgramsApi>, patient: PatientUuid) -> Self {
        let key = format!("eligible-programs:{patient}");
        Self::new(key, move || {
            let api = Arc::clone(&api);
            let patient = patient.clone();
            async move { api.eligible_programs(&patient).await }.boxed()
        })
    }
}
