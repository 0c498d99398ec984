//! Optimistic command protocol.
//!
//! A command goes through three steps:
//! 1. the store is updated right away (play/pause only),
//! 2. the command is sent from a detached task,
//! 3. a one-shot reconciliation poll is scheduled, whatever the outcome of 2.
//!
//! There is no rollback. A wrong guess stays on screen until the
//! reconciliation poll (or the next periodic one) overwrites it.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::errors::{ControlError, TransportError};
use crate::model::{CommandIntent, CommandKind};
use crate::shared::{Activation, EngineShared};
use crate::transport::RemoteTransport;

pub(crate) struct CommandCoordinator<T: ?Sized> {
    shared: Arc<EngineShared<T>>,
}

impl<T: RemoteTransport + ?Sized + 'static> CommandCoordinator<T> {
    pub(crate) fn new(shared: Arc<EngineShared<T>>) -> Self {
        Self { shared }
    }

    /// Applies the optimistic effect of `kind`. Synchronous, no I/O.
    pub(crate) fn apply_optimistic(&self, kind: CommandKind, activation: &Activation) -> bool {
        let changed = self
            .shared
            .mutate_if_current(activation.generation, |store| store.apply_optimistic(kind));
        debug!(generation = activation.generation, ?kind, changed, "Optimistic update");
        changed
    }

    /// Sends `kind` and schedules the reconciliation poll.
    ///
    /// The send runs in its own task, so dropping the returned future does
    /// not skip the reconciliation.
    pub(crate) async fn dispatch(
        &self,
        intent: CommandIntent,
        activation: Activation,
    ) -> Result<CommandIntent, ControlError> {
        let shared = self.shared.clone();
        let kind = intent.kind;
        let send = tokio::spawn(async move {
            let result = shared.transport.send_command(kind).await;
            Self::schedule_reconcile(shared, activation);
            result
        });

        let result = send.await.unwrap_or_else(|err| {
            Err(TransportError::Transient(format!("command task failed: {err}")))
        });
        match result {
            Ok(()) => {
                trace!(?kind, "Command accepted");
                Ok(intent)
            }
            Err(err) => {
                warn!(?kind, "Command failed: {err}");
                Err(err.into())
            }
        }
    }

    fn schedule_reconcile(shared: Arc<EngineShared<T>>, activation: Activation) {
        let delay = shared.config.reconcile_delay;

        tokio::spawn(async move {
            let generation = activation.generation;
            tokio::select! {
                _ = activation.cancel.cancelled() => {
                    trace!(generation, "Reconciliation dropped by deactivation");
                }
                _ = async {
                    sleep(delay).await;
                    shared.refresh_current(generation).await;
                } => {
                    trace!(generation, "Reconciliation poll done");
                }
            }
        });
    }
}
