//! Session runtime executor

use super::Envelope;
use crate::chat::ChatService;
use crate::state_machine::transition::describe_failure;
use crate::state_machine::{transition, Effect, Event, SessionContext, SessionState, TransitionError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Owns one session's state and executes the effects of its transitions
pub struct SessionRuntime<C>
where
    C: ChatService + 'static,
{
    context: SessionContext,
    state: SessionState,
    client: Arc<C>,
    event_rx: mpsc::Receiver<Envelope>,
    /// Cloned into spawned requests and timers so they can report back
    event_tx: mpsc::Sender<Envelope>,
    state_tx: watch::Sender<SessionState>,
}

impl<C> SessionRuntime<C>
where
    C: ChatService + 'static,
{
    pub(crate) fn new(
        context: SessionContext,
        client: C,
        event_rx: mpsc::Receiver<Envelope>,
        event_tx: mpsc::Sender<Envelope>,
        state_tx: watch::Sender<SessionState>,
    ) -> Self {
        let state = state_tx.borrow().clone();
        Self {
            context,
            state,
            client: Arc::new(client),
            event_rx,
            event_tx,
            state_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting session runtime");

        loop {
            tokio::select! {
                Some(envelope) = self.event_rx.recv() => {
                    self.process(envelope);
                }
                () = self.state_tx.closed() => break,
                else => break,
            }
        }

        tracing::info!(epoch = self.state.epoch, "Session runtime stopped");
    }

    fn process(&mut self, envelope: Envelope) {
        let Envelope { event, reply } = envelope;

        let outcome = match transition(&self.state, &self.context, event, Utc::now()) {
            Ok(result) => {
                self.state = result.new_state;
                // Publish before any request starts so the UI shows the
                // user's message ahead of the loading indicator
                self.publish();
                for effect in result.effects {
                    self.execute_effect(effect);
                }
                Ok(())
            }
            Err(TransitionError::Stale {
                event_epoch,
                current_epoch,
            }) => {
                tracing::debug!(event_epoch, current_epoch, "Discarding stale event");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, epoch = self.state.epoch, "Event rejected");
                Err(e)
            }
        };

        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }

    fn publish(&self) {
        self.state_tx.send_if_modified(|current| {
            if *current == self.state {
                false
            } else {
                current.clone_from(&self.state);
                true
            }
        });
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::RequestChat {
                epoch,
                request,
                turn,
            } => {
                tracing::debug!(
                    epoch,
                    flow_state = %request.flow_state,
                    "Requesting chat turn"
                );
                let client = Arc::clone(&self.client);
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let event = match client.chat(&request).await {
                        Ok(response) => Event::ChatCompleted {
                            epoch,
                            turn,
                            response,
                        },
                        Err(error) => {
                            tracing::warn!(epoch, "{}", describe_failure(&turn, &error));
                            Event::ChatFailed { epoch, turn, error }
                        }
                    };
                    let _ = event_tx.send(Envelope::internal(event)).await;
                });
            }

            Effect::ScheduleInitialize { epoch, delay } => {
                tracing::debug!(epoch, delay_ms = %delay.as_millis(), "Scheduling re-initialization");
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = event_tx
                        .send(Envelope::internal(Event::ReinitializeTimeout { epoch }))
                        .await;
                });
            }
        }
    }
}
