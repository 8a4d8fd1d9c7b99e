use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{CommandError, CommandResult};
use crate::models::{ConsumedFoodEntry, DailyLog, Food, Meal, UserProfile};
use crate::nutrition::NutritionTotals;

/// Exactly one of `data` or `error` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub data: Option<ResponseData>,
    pub error: Option<CommandError>,
}

impl Response {
    pub fn success(data: ResponseData) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: CommandError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> CommandResult<ResponseData> {
        match (self.data, self.error) {
            (_, Some(err)) => Err(err),
            (Some(data), None) => Ok(data),
            (None, None) => Err(CommandError::Internal("empty response".into())),
        }
    }
}

impl From<CommandResult<ResponseData>> for Response {
    fn from(result: CommandResult<ResponseData>) -> Self {
        match result {
            Ok(data) => Response::success(data),
            Err(err) => Response::failure(err),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ResponseData {
    Profile(ProfileView),
    MealAdded { index: usize },
    MealList { meals: Vec<MealView> },
    FoodList { foods: Vec<FoodView> },
    FoodAdded { meal_index: usize, entry: FoodItemView },
    FoodCreated(FoodView),
    Report(ReportView),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: String,
    pub goal: String,
    pub bmi: f64,
    /// `None` when the estimate is undefined for the recorded gender.
    pub body_fat_percent: Option<f64>,
}

impl From<&UserProfile> for ProfileView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            age: profile.age,
            weight_kg: profile.weight_kg,
            height_cm: profile.height_cm,
            gender: profile.gender.to_string(),
            goal: profile.goal.clone(),
            bmi: profile.bmi(),
            body_fat_percent: profile.body_fat_percent(),
        }
    }
}

/// A food as offered by search, values per 100 g.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodView {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub per_100g: NutritionTotals,
}

impl From<&Food> for FoodView {
    fn from(food: &Food) -> Self {
        Self {
            id: food.id.clone(),
            name: food.name.clone(),
            per_100g: food.per_100g(),
        }
    }
}

/// A consumed food with nutrients for the eaten quantity.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemView {
    pub food_id: String,
    pub name: String,
    pub quantity_g: f64,
    #[serde(flatten)]
    pub nutrients: NutritionTotals,
}

impl From<&ConsumedFoodEntry> for FoodItemView {
    fn from(entry: &ConsumedFoodEntry) -> Self {
        Self {
            food_id: entry.food.id.clone(),
            name: entry.food.name.clone(),
            quantity_g: entry.quantity_g,
            nutrients: entry.nutrients(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealView {
    pub index: usize,
    pub name: String,
    /// Local `HH:MM` of creation.
    pub time: String,
    pub created_at: DateTime<Utc>,
    pub food_items: Vec<FoodItemView>,
    pub totals: NutritionTotals,
}

impl MealView {
    pub fn new(index: usize, meal: &Meal) -> Self {
        Self {
            index,
            name: meal.name.clone(),
            time: meal
                .created_at
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string(),
            created_at: meal.created_at,
            food_items: meal.entries.iter().map(FoodItemView::from).collect(),
            totals: meal.totals(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub date: NaiveDate,
    pub meal_count: usize,
    #[serde(flatten)]
    pub totals: NutritionTotals,
}

impl From<&DailyLog> for ReportView {
    fn from(log: &DailyLog) -> Self {
        Self {
            date: log.date,
            meal_count: log.meals.len(),
            totals: log.totals(),
        }
    }
}

pub(crate) fn meal_views(log: &DailyLog) -> Vec<MealView> {
    log.meals
        .iter()
        .enumerate()
        .map(|(index, meal)| MealView::new(index, meal))
        .collect()
}
