//! Nutrition arithmetic.
//!
//! Pure, total functions: no I/O, no failure modes, deterministic for
//! identical inputs. Nutrient values on [`Food`] are per 100 g.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::models::{ConsumedFoodEntry, Food, Gender, Meal};

/// Aggregate of the five tracked nutrients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl NutritionTotals {
    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.calories - other.calories).abs() <= epsilon
            && (self.protein - other.protein).abs() <= epsilon
            && (self.carbs - other.carbs).abs() <= epsilon
            && (self.fat - other.fat).abs() <= epsilon
            && (self.fiber - other.fiber).abs() <= epsilon
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            fiber: self.fiber * factor,
        }
    }
}

impl Add for NutritionTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
            fiber: self.fiber + rhs.fiber,
        }
    }
}

impl AddAssign for NutritionTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Nutrients contributed by `quantity_g` grams of `food`.
pub fn contribution(food: &Food, quantity_g: f64) -> NutritionTotals {
    food.per_100g().scaled(quantity_g / 100.0)
}

pub fn meal_totals(entries: &[ConsumedFoodEntry]) -> NutritionTotals {
    entries.iter().map(ConsumedFoodEntry::nutrients).sum()
}

pub fn day_totals(meals: &[Meal]) -> NutritionTotals {
    meals.iter().map(Meal::totals).sum()
}

/// Body mass index from weight in kg and height in cm.
///
/// Returns 0 when either input is not positive.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Body fat percentage estimated from BMI and age.
///
/// This is a linear BMI-based approximation, not a clinical measurement:
/// `1.20 * bmi + 0.23 * age - 16.2` for men and `- 5.4` otherwise.
/// A non-positive BMI yields 0.
pub fn body_fat_percent(bmi: f64, age: u32, gender: &Gender) -> f64 {
    if bmi <= 0.0 {
        return 0.0;
    }
    let offset = match gender {
        Gender::Male => 16.2,
        Gender::Female | Gender::Other(_) => 5.4,
    };
    1.20 * bmi + 0.23 * f64::from(age) - offset
}
