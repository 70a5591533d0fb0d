//! Explicit "data changed, please refetch" channel.
//!
//! Whatever submits an enrollment or discontinuation form calls [`MutationBus::notify`] for
//! the patient concerned; overviews mounted for that patient hold a [`Subscription`] and
//! revalidate their enrollments when it fires.

use crate::text::PatientUuid;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const DEFAULT_CAPACITY: usize = 16;

/// Publisher side of the mutation channel. Cheap to clone.
#[derive(Clone, Debug)]
pub struct MutationBus {
    tx: broadcast::Sender<PatientUuid>,
}

impl Default for MutationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { tx }
    }

    /// Signal that `patient`'s program enrollments changed. No-op if nobody is listening.
    pub fn notify(&self, patient: &PatientUuid) {
        let listeners = self.tx.send(patient.clone()).unwrap_or(0);
        tracing::debug!(%patient, listeners, "program enrollments changed");
    }

    /// Listen for changes affecting `patient`.
    pub fn subscribe(&self, patient: PatientUuid) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            patient,
        }
    }
}

/// Receiver side, filtered to one patient.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<PatientUuid>,
    patient: PatientUuid,
}

impl Subscription {
    pub fn patient(&self) -> &PatientUuid {
        &self.patient
    }

    /// Wait for the next change to this patient's enrollments.
    ///
    /// Returns `false` once every [`MutationBus`] has been dropped. Missed notifications
    /// (the receiver lagged) count as a change.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.rx.recv().await {
                Ok(patient) if patient == self.patient => return true,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "mutation subscription lagged; revalidating");
                    return true;
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }

    /// Drain queued notifications without waiting. True if any concerned this patient.
    pub fn take_pending(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(patient) => changed |= patient == self.patient,
                Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return changed,
            }
        }
    }
}
