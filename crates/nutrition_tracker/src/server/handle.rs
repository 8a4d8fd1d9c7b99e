use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::error::{CommandError, CommandResult};

use super::protocol::{
    AddFoodPayload, AddMealPayload, CreateFoodPayload, ProfilePayload, Request, RequestKind,
    SearchFoodPayload,
};
use super::response::{FoodItemView, FoodView, MealView, ProfileView, ReportView, Response, ResponseData};

/// A request together with its private reply channel.
pub(crate) struct Envelope {
    pub(crate) request: Request,
    pub(crate) reply: oneshot::Sender<Response>,
}

/// Client side of the command server. Cheap to clone; the server shuts down
/// once every handle is gone.
#[derive(Clone, Debug)]
pub struct ServerHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ServerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { tx }
    }

    /// Submit `request` and wait for its response.
    ///
    /// Resolves with `ServerClosed` if the server is gone before it answers.
    pub async fn send(&self, request: Request) -> Response {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Envelope { request, reply }).is_err() {
            return Response::failure(CommandError::ServerClosed);
        }
        rx.await
            .unwrap_or_else(|_| Response::failure(CommandError::ServerClosed))
    }

    /// Decode a loosely typed payload for `kind` and submit it.
    pub async fn send_json(&self, kind: RequestKind, payload: Value) -> Response {
        match Request::from_json(kind, payload) {
            Ok(request) => self.send(request).await,
            Err(err) => Response::failure(err),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub async fn create_profile(&self, payload: ProfilePayload) -> CommandResult<ProfileView> {
        match self.send(Request::CreateProfile(payload)).await.into_result()? {
            ResponseData::Profile(view) => Ok(view),
            other => Err(unexpected(RequestKind::CreateProfile, &other)),
        }
    }

    pub async fn update_profile(&self, payload: ProfilePayload) -> CommandResult<ProfileView> {
        match self.send(Request::UpdateProfile(payload)).await.into_result()? {
            ResponseData::Profile(view) => Ok(view),
            other => Err(unexpected(RequestKind::UpdateProfile, &other)),
        }
    }

    pub async fn get_profile(&self) -> CommandResult<ProfileView> {
        match self.send(Request::GetProfile).await.into_result()? {
            ResponseData::Profile(view) => Ok(view),
            other => Err(unexpected(RequestKind::GetProfile, &other)),
        }
    }

    /// Returns the zero-based index of the new meal.
    pub async fn add_meal(&self, name: impl Into<String>) -> CommandResult<usize> {
        let request = Request::AddMeal(AddMealPayload { name: name.into() });
        match self.send(request).await.into_result()? {
            ResponseData::MealAdded { index } => Ok(index),
            other => Err(unexpected(RequestKind::AddMeal, &other)),
        }
    }

    pub async fn list_meals(&self) -> CommandResult<Vec<MealView>> {
        match self.send(Request::ListMeals).await.into_result()? {
            ResponseData::MealList { meals } => Ok(meals),
            other => Err(unexpected(RequestKind::ListMeals, &other)),
        }
    }

    pub async fn search_food(&self, query: impl Into<String>) -> CommandResult<Vec<FoodView>> {
        let request = Request::SearchFood(SearchFoodPayload {
            query: query.into(),
        });
        match self.send(request).await.into_result()? {
            ResponseData::FoodList { foods } => Ok(foods),
            other => Err(unexpected(RequestKind::SearchFood, &other)),
        }
    }

    pub async fn add_food(
        &self,
        meal_index: i64,
        food_id: impl Into<String>,
        quantity_g: f64,
    ) -> CommandResult<FoodItemView> {
        let request = Request::AddFood(AddFoodPayload {
            meal_index,
            food_id: food_id.into(),
            quantity: quantity_g,
        });
        match self.send(request).await.into_result()? {
            ResponseData::FoodAdded { entry, .. } => Ok(entry),
            other => Err(unexpected(RequestKind::AddFood, &other)),
        }
    }

    /// Add a food to the local catalogue; the view carries its new id.
    pub async fn create_food(&self, payload: CreateFoodPayload) -> CommandResult<FoodView> {
        match self.send(Request::CreateFood(payload)).await.into_result()? {
            ResponseData::FoodCreated(food) => Ok(food),
            other => Err(unexpected(RequestKind::CreateFood, &other)),
        }
    }

    pub async fn get_report(&self) -> CommandResult<ReportView> {
        match self.send(Request::GetReport).await.into_result()? {
            ResponseData::Report(report) => Ok(report),
            other => Err(unexpected(RequestKind::GetReport, &other)),
        }
    }
}

fn unexpected(kind: RequestKind, data: &ResponseData) -> CommandError {
    CommandError::Internal(format!("{kind} answered with {data:?}"))
}
