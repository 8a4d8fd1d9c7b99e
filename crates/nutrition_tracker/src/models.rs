//! Domain model: profile, foods, meals and daily logs.
//!
//! Totals are never stored. Every aggregate is recomputed from the entries
//! through [`crate::nutrition`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::nutrition::{self, NutritionTotals};

/// Format used for daily log keys in every store.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    /// Passed through as entered; body-fat estimate is undefined.
    Other(String),
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Other(value),
        }
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        Gender::from(value.to_string())
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
            Gender::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: Gender,
    pub goal: String,
}

impl UserProfile {
    pub fn bmi(&self) -> f64 {
        nutrition::bmi(self.weight_kg, self.height_cm)
    }

    /// `None` when the gender is not one the approximation knows about.
    pub fn body_fat_percent(&self) -> Option<f64> {
        match self.gender {
            Gender::Other(_) => None,
            _ => Some(nutrition::body_fat_percent(
                self.bmi(),
                self.age,
                &self.gender,
            )),
        }
    }
}

/// A food with nutrient values per 100 g.
///
/// The id is either a remote id (`fdc_<n>`) or a local catalogue id; a given id
/// is assumed to always describe the same nutrients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl Food {
    pub fn per_100g(&self) -> NutritionTotals {
        NutritionTotals {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
        }
    }

    pub fn contribution(&self, quantity_g: f64) -> NutritionTotals {
        nutrition::contribution(self, quantity_g)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsumedFoodEntry {
    pub food: Food,
    pub quantity_g: f64,
}

impl ConsumedFoodEntry {
    pub fn nutrients(&self) -> NutritionTotals {
        self.food.contribution(self.quantity_g)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<ConsumedFoodEntry>,
}

impl Meal {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at,
            entries: Vec::new(),
        }
    }

    pub fn totals(&self) -> NutritionTotals {
        nutrition::meal_totals(&self.entries)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub meals: Vec<Meal>,
}

impl DailyLog {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            meals: Vec::new(),
        }
    }

    pub fn date_key(&self) -> String {
        date_key(self.date)
    }

    pub fn totals(&self) -> NutritionTotals {
        nutrition::day_totals(&self.meals)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}
