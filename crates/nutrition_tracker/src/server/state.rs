//! Single owner of the state store.
//!
//! Every read-modify-write against the store runs inside [`StateActor`], one
//! command at a time. Handlers talk to it through [`StateHandle`]. The actor
//! stops once the last handle is dropped. A command that panics is answered
//! with `Internal` and the actor carries on with the next one.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::error::{CommandError, CommandResult};
use crate::models::{ConsumedFoodEntry, DailyLog, Meal, UserProfile};
use crate::store::StateStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProfileWrite {
    /// Insert, replacing any existing profile.
    Create,
    /// Replace an existing profile; `NotFound` if there is none.
    Update,
}

type Reply<T> = oneshot::Sender<CommandResult<T>>;

enum StateCommand {
    GetProfile {
        reply: Reply<Option<UserProfile>>,
    },
    SaveProfile {
        profile: UserProfile,
        mode: ProfileWrite,
        reply: Reply<UserProfile>,
    },
    Today {
        reply: Reply<DailyLog>,
    },
    AddMeal {
        name: String,
        reply: Reply<usize>,
    },
    AppendEntry {
        meal_index: i64,
        entry: ConsumedFoodEntry,
        reply: Reply<usize>,
    },
}

impl StateCommand {
    fn name(&self) -> &'static str {
        match self {
            StateCommand::GetProfile { .. } => "get_profile",
            StateCommand::SaveProfile { .. } => "save_profile",
            StateCommand::Today { .. } => "today",
            StateCommand::AddMeal { .. } => "add_meal",
            StateCommand::AppendEntry { .. } => "append_entry",
        }
    }
}

pub(crate) struct StateActor {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    rx: mpsc::UnboundedReceiver<StateCommand>,
}

impl StateActor {
    pub(crate) fn spawn(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
    ) -> (StateHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = StateActor { store, clock, rx };
        (StateHandle { tx }, tokio::spawn(actor.run()))
    }

    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            let name = command.name();
            // The reply sender is dropped with the panicking command, which the
            // caller sees as `Internal`.
            if AssertUnwindSafe(self.execute(command)).catch_unwind().await.is_err() {
                tracing::error!(command = name, "state command panicked");
            }
        }
        tracing::debug!("state actor stopped");
    }

    async fn execute(&self, command: StateCommand) {
        match command {
            StateCommand::GetProfile { reply } => {
                let result = self.store.get_user().await.map_err(CommandError::from);
                let _ = reply.send(result);
            }
            StateCommand::SaveProfile {
                profile,
                mode,
                reply,
            } => {
                let _ = reply.send(self.save_profile(profile, mode).await);
            }
            StateCommand::Today { reply } => {
                let _ = reply.send(self.today().await);
            }
            StateCommand::AddMeal { name, reply } => {
                let _ = reply.send(self.add_meal(name).await);
            }
            StateCommand::AppendEntry {
                meal_index,
                entry,
                reply,
            } => {
                let _ = reply.send(self.append_entry(meal_index, entry).await);
            }
        }
    }

    async fn save_profile(
        &self,
        profile: UserProfile,
        mode: ProfileWrite,
    ) -> CommandResult<UserProfile> {
        if mode == ProfileWrite::Update && self.store.get_user().await?.is_none() {
            return Err(CommandError::NotFound("no profile to update".into()));
        }
        self.store.save_user(&profile).await?;
        Ok(profile)
    }

    async fn today(&self) -> CommandResult<DailyLog> {
        Ok(self.store.get_daily_log(self.clock.today()).await?)
    }

    async fn add_meal(&self, name: String) -> CommandResult<usize> {
        let mut log = self.today().await?;
        log.meals.push(Meal::new(name, self.clock.now()));
        self.store.save_daily_log(&log).await?;
        Ok(log.meals.len() - 1)
    }

    async fn append_entry(&self, meal_index: i64, entry: ConsumedFoodEntry) -> CommandResult<usize> {
        let mut log = self.today().await?;
        let index = resolve_meal_index(meal_index, log.meals.len())?;
        log.meals[index].entries.push(entry);
        self.store.save_daily_log(&log).await?;
        Ok(index)
    }
}

/// Position of `meal_index` in a log holding `meal_count` meals.
pub(crate) fn resolve_meal_index(meal_index: i64, meal_count: usize) -> CommandResult<usize> {
    usize::try_from(meal_index)
        .ok()
        .filter(|&i| i < meal_count)
        .ok_or(CommandError::InvalidMealIndex {
            index: meal_index,
            meal_count,
        })
}

#[derive(Clone, Debug)]
pub(crate) struct StateHandle {
    tx: mpsc::UnboundedSender<StateCommand>,
}

impl StateHandle {
    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> StateCommand) -> CommandResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| CommandError::Internal("state actor is not running".into()))?;
        rx.await
            .map_err(|_| CommandError::Internal("state actor dropped the request".into()))?
    }

    pub(crate) async fn get_profile(&self) -> CommandResult<Option<UserProfile>> {
        self.call(|reply| StateCommand::GetProfile { reply }).await
    }

    pub(crate) async fn save_profile(
        &self,
        profile: UserProfile,
        mode: ProfileWrite,
    ) -> CommandResult<UserProfile> {
        self.call(|reply| StateCommand::SaveProfile {
            profile,
            mode,
            reply,
        })
        .await
    }

    /// Snapshot of today's log.
    pub(crate) async fn today(&self) -> CommandResult<DailyLog> {
        self.call(|reply| StateCommand::Today { reply }).await
    }

    pub(crate) async fn add_meal(&self, name: String) -> CommandResult<usize> {
        self.call(|reply| StateCommand::AddMeal { name, reply }).await
    }

    /// Append to the meal at `meal_index` of the log that is current when the
    /// actor runs the command.
    pub(crate) async fn append_entry(
        &self,
        meal_index: i64,
        entry: ConsumedFoodEntry,
    ) -> CommandResult<usize> {
        self.call(|reply| StateCommand::AppendEntry {
            meal_index,
            entry,
            reply,
        })
        .await
    }
}
