use std::sync::Arc;

use crate::error::{CommandError, CommandResult};
use crate::food::FoodProvider;
use crate::models::ConsumedFoodEntry;

use super::protocol::{AddFoodPayload, CreateFoodPayload, ProfilePayload, Request};
use super::response::{FoodItemView, FoodView, ProfileView, ReportView, ResponseData, meal_views};
use super::state::{ProfileWrite, StateHandle, resolve_meal_index};

/// What every handler task gets a clone of.
#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) state: StateHandle,
    pub(crate) foods: Arc<FoodProvider>,
}

pub(crate) async fn handle(ctx: Context, request: Request) -> CommandResult<ResponseData> {
    request.validate()?;
    match request {
        Request::CreateProfile(payload) => save_profile(&ctx, &payload, ProfileWrite::Create).await,
        Request::UpdateProfile(payload) => save_profile(&ctx, &payload, ProfileWrite::Update).await,
        Request::GetProfile => {
            let profile = ctx
                .state
                .get_profile()
                .await?
                .ok_or_else(|| CommandError::NotFound("no profile has been created".into()))?;
            Ok(ResponseData::Profile(ProfileView::from(&profile)))
        }
        Request::AddMeal(payload) => {
            let index = ctx.state.add_meal(payload.name.trim().to_string()).await?;
            Ok(ResponseData::MealAdded { index })
        }
        Request::ListMeals => {
            let log = ctx.state.today().await?;
            Ok(ResponseData::MealList {
                meals: meal_views(&log),
            })
        }
        Request::SearchFood(payload) => {
            let foods = ctx.foods.search_foods(payload.query.trim()).await?;
            Ok(ResponseData::FoodList {
                foods: foods.iter().map(FoodView::from).collect(),
            })
        }
        Request::AddFood(payload) => add_food(&ctx, payload).await,
        Request::CreateFood(payload) => create_food(&ctx, &payload).await,
        Request::GetReport => {
            let log = ctx.state.today().await?;
            Ok(ResponseData::Report(ReportView::from(&log)))
        }
    }
}

async fn save_profile(
    ctx: &Context,
    payload: &ProfilePayload,
    mode: ProfileWrite,
) -> CommandResult<ResponseData> {
    let profile = payload.to_profile()?;
    let saved = ctx.state.save_profile(profile, mode).await?;
    Ok(ResponseData::Profile(ProfileView::from(&saved)))
}

/// The index is checked before the food lookup so an obviously bad index
/// costs no remote call, and checked again by the state actor when the
/// entry is appended.
async fn add_food(ctx: &Context, payload: AddFoodPayload) -> CommandResult<ResponseData> {
    let meal_count = ctx.state.today().await?.meals.len();
    resolve_meal_index(payload.meal_index, meal_count)?;

    let food = ctx.foods.get_food_details(payload.food_id.trim()).await?;
    let entry = ConsumedFoodEntry {
        food,
        quantity_g: payload.quantity,
    };
    let view = FoodItemView::from(&entry);
    let meal_index = ctx.state.append_entry(payload.meal_index, entry).await?;
    Ok(ResponseData::FoodAdded {
        meal_index,
        entry: view,
    })
}

async fn create_food(ctx: &Context, payload: &CreateFoodPayload) -> CommandResult<ResponseData> {
    let food = ctx
        .foods
        .add_local_food(payload.name.trim(), payload.per_100g())
        .await?;
    Ok(ResponseData::FoodCreated(FoodView::from(&food)))
}
