//! Command server: one dispatcher task fanning requests out to concurrent
//! handler tasks, with all state access funnelled through a single actor.
//!
//! Every request gets exactly one response on its reply channel. Handler
//! failures, including panics, come back as response errors and never stop
//! the dispatcher.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use crate::clock::Clock;
use crate::error::CommandError;
use crate::food::FoodProvider;
use crate::store::StateStore;

mod handle;
mod handlers;
mod protocol;
mod response;
mod state;

pub use handle::ServerHandle;
pub use protocol::{
    AddFoodPayload, AddMealPayload, CreateFoodPayload, ProfilePayload, Request, RequestKind,
    SearchFoodPayload,
};
pub use response::{
    FoodItemView, FoodView, MealView, ProfileView, ReportView, Response, ResponseData,
};

use handle::Envelope;
use handlers::Context;
use state::StateActor;

pub struct CommandServer {
    ctx: Context,
    inbox: mpsc::UnboundedReceiver<Envelope>,
    state_actor: JoinHandle<()>,
}

impl CommandServer {
    /// Start the server on the current runtime.
    ///
    /// Returns the first client handle and the dispatcher task, which ends
    /// after every handle is dropped and in-flight requests are answered.
    pub fn spawn(
        store: Arc<dyn StateStore>,
        foods: Arc<FoodProvider>,
        clock: Arc<dyn Clock>,
    ) -> (ServerHandle, JoinHandle<()>) {
        let (state, state_actor) = StateActor::spawn(store, clock);
        let (tx, inbox) = mpsc::unbounded_channel();
        let server = CommandServer {
            ctx: Context { state, foods },
            inbox,
            state_actor,
        };
        (ServerHandle::new(tx), tokio::spawn(server.run()))
    }

    async fn run(mut self) {
        tracing::info!("command server started");
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                envelope = self.inbox.recv() => match envelope {
                    Some(envelope) => self.dispatch(envelope, &mut in_flight),
                    None => break,
                },
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            }
        }
        while in_flight.join_next().await.is_some() {}

        // The actor exits once the last state handle, ours included, is gone.
        let CommandServer {
            ctx, state_actor, ..
        } = self;
        drop(ctx);
        if let Err(e) = state_actor.await {
            tracing::warn!(error = %e, "state actor ended abnormally");
        }
        tracing::info!("command server stopped");
    }

    fn dispatch(&self, envelope: Envelope, in_flight: &mut JoinSet<()>) {
        let Envelope { request, reply } = envelope;
        let kind = request.kind();
        tracing::debug!(%kind, "request received");

        let ctx = self.ctx.clone();
        in_flight.spawn(async move {
            let started = Instant::now();
            tracing::debug!(%kind, "request dispatched");

            // A separate task so a panicking handler surfaces as a JoinError.
            let response = match tokio::spawn(handlers::handle(ctx, request)).await {
                Ok(result) => Response::from(result),
                Err(e) if e.is_panic() => {
                    Response::failure(CommandError::Internal(format!("{kind} handler panicked")))
                }
                Err(e) => Response::failure(CommandError::Internal(e.to_string())),
            };

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &response.error {
                Some(err) => tracing::warn!(%kind, elapsed_ms, error = %err, "request failed"),
                None => tracing::debug!(%kind, elapsed_ms, "request completed"),
            }
            if reply.send(response).is_err() {
                tracing::debug!(%kind, "caller went away before the response");
            }
        });
    }
}
