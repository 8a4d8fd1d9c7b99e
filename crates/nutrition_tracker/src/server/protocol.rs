//! Request side of the command protocol.
//!
//! [`Request`] is closed over the nine request kinds; adding a kind is a
//! compile error in every exhaustive match until it is handled.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CommandError, CommandResult};
use crate::models::{Gender, UserProfile};
use crate::nutrition::NutritionTotals;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    CreateProfile,
    GetProfile,
    UpdateProfile,
    AddMeal,
    ListMeals,
    SearchFood,
    AddFood,
    CreateFood,
    GetReport,
}

impl RequestKind {
    pub const ALL: [RequestKind; 9] = [
        RequestKind::CreateProfile,
        RequestKind::GetProfile,
        RequestKind::UpdateProfile,
        RequestKind::AddMeal,
        RequestKind::ListMeals,
        RequestKind::SearchFood,
        RequestKind::AddFood,
        RequestKind::CreateFood,
        RequestKind::GetReport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::CreateProfile => "CreateProfile",
            RequestKind::GetProfile => "GetProfile",
            RequestKind::UpdateProfile => "UpdateProfile",
            RequestKind::AddMeal => "AddMeal",
            RequestKind::ListMeals => "ListMeals",
            RequestKind::SearchFood => "SearchFood",
            RequestKind::AddFood => "AddFood",
            RequestKind::CreateFood => "CreateFood",
            RequestKind::GetReport => "GetReport",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CommandError::invalid(format!("unknown request kind {s:?}")))
    }
}

/// Payload of CreateProfile and UpdateProfile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    /// Kilograms.
    pub weight: f64,
    /// Centimetres.
    pub height: f64,
    pub gender: String,
    pub goal: String,
}

impl ProfilePayload {
    fn validate(&self) -> CommandResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(CommandError::invalid("first name must not be empty"));
        }
        if self.age <= 0 || u32::try_from(self.age).is_err() {
            return Err(CommandError::invalid(format!(
                "age must be a positive number of years, got {}",
                self.age
            )));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(CommandError::invalid(format!(
                "weight must be positive, got {}",
                self.weight
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(CommandError::invalid(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        Ok(())
    }

    /// Domain profile for a payload that passed validation.
    pub fn to_profile(&self) -> CommandResult<UserProfile> {
        self.validate()?;
        let age = u32::try_from(self.age)
            .map_err(|_| CommandError::invalid(format!("age out of range: {}", self.age)))?;
        Ok(UserProfile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            age,
            weight_kg: self.weight,
            height_cm: self.height,
            gender: Gender::from(self.gender.as_str()),
            goal: self.goal.trim().to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddMealPayload {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchFoodPayload {
    pub query: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFoodPayload {
    /// Zero-based position in today's meal list.
    pub meal_index: i64,
    #[serde(rename = "foodID", alias = "foodId")]
    pub food_id: String,
    /// Grams.
    pub quantity: f64,
}

/// A manually entered food, values per 100 g.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateFoodPayload {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
}

impl CreateFoodPayload {
    pub fn per_100g(&self) -> NutritionTotals {
        NutritionTotals {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
        }
    }

    fn validate(&self) -> CommandResult<()> {
        if self.name.trim().is_empty() {
            return Err(CommandError::invalid("food name must not be empty"));
        }
        let values = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("fiber", self.fiber),
        ];
        for (field, value) in values {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CommandError::invalid(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    CreateProfile(ProfilePayload),
    GetProfile,
    UpdateProfile(ProfilePayload),
    AddMeal(AddMealPayload),
    ListMeals,
    SearchFood(SearchFoodPayload),
    AddFood(AddFoodPayload),
    CreateFood(CreateFoodPayload),
    GetReport,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::CreateProfile(_) => RequestKind::CreateProfile,
            Request::GetProfile => RequestKind::GetProfile,
            Request::UpdateProfile(_) => RequestKind::UpdateProfile,
            Request::AddMeal(_) => RequestKind::AddMeal,
            Request::ListMeals => RequestKind::ListMeals,
            Request::SearchFood(_) => RequestKind::SearchFood,
            Request::AddFood(_) => RequestKind::AddFood,
            Request::CreateFood(_) => RequestKind::CreateFood,
            Request::GetReport => RequestKind::GetReport,
        }
    }

    /// Decode a loosely typed payload for `kind`.
    ///
    /// Kinds without a payload accept `null` or `{}`. Anything that does not
    /// match the expected shape is `InvalidRequest`.
    pub fn from_json(kind: RequestKind, payload: Value) -> CommandResult<Self> {
        Ok(match kind {
            RequestKind::CreateProfile => Request::CreateProfile(decode(kind, payload)?),
            RequestKind::UpdateProfile => Request::UpdateProfile(decode(kind, payload)?),
            RequestKind::AddMeal => Request::AddMeal(decode(kind, payload)?),
            RequestKind::SearchFood => Request::SearchFood(decode(kind, payload)?),
            RequestKind::AddFood => Request::AddFood(decode(kind, payload)?),
            RequestKind::CreateFood => Request::CreateFood(decode(kind, payload)?),
            RequestKind::GetProfile | RequestKind::ListMeals | RequestKind::GetReport => {
                expect_no_payload(kind, &payload)?;
                match kind {
                    RequestKind::GetProfile => Request::GetProfile,
                    RequestKind::ListMeals => Request::ListMeals,
                    _ => Request::GetReport,
                }
            }
        })
    }

    /// Shape checks that do not need state. Meal index range is checked
    /// against the current log by the handler.
    pub fn validate(&self) -> CommandResult<()> {
        match self {
            Request::CreateProfile(p) | Request::UpdateProfile(p) => p.validate(),
            Request::AddMeal(p) => {
                if p.name.trim().is_empty() {
                    return Err(CommandError::invalid("meal name must not be empty"));
                }
                Ok(())
            }
            Request::SearchFood(p) => {
                if p.query.trim().is_empty() {
                    return Err(CommandError::invalid("search query must not be empty"));
                }
                Ok(())
            }
            Request::AddFood(p) => {
                if p.food_id.trim().is_empty() {
                    return Err(CommandError::invalid("food id must not be empty"));
                }
                if !(p.quantity.is_finite() && p.quantity > 0.0) {
                    return Err(CommandError::invalid(format!(
                        "quantity must be a positive number of grams, got {}",
                        p.quantity
                    )));
                }
                Ok(())
            }
            Request::CreateFood(p) => p.validate(),
            Request::GetProfile | Request::ListMeals | Request::GetReport => Ok(()),
        }
    }
}

fn decode<T: DeserializeOwned>(kind: RequestKind, payload: Value) -> CommandResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| CommandError::invalid(format!("{kind} payload: {e}")))
}

fn expect_no_payload(kind: RequestKind, payload: &Value) -> CommandResult<()> {
    match payload {
        Value::Null => Ok(()),
        Value::Object(map) if map.is_empty() => Ok(()),
        other => Err(CommandError::invalid(format!(
            "{kind} takes no payload, got {other}"
        ))),
    }
}
