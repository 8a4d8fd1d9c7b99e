//! Mapping of FDC nutrient records onto the five tracked fields.

use fdc_client::{FdcFood, FdcNutrient};

use crate::models::Food;

/// Prefix that marks a food id as coming from FoodData Central.
pub const REMOTE_ID_PREFIX: &str = "fdc_";

const ENERGY_KCAL: &str = "208";
const PROTEIN: &str = "203";
const CARBS: &str = "205";
const FAT: &str = "204";
const FIBER: &str = "291";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
}

/// How a food id is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodRef<'a> {
    Local(&'a str),
    Remote(u64),
    /// Carries the remote prefix but no numeric id.
    MalformedRemote,
}

impl<'a> FoodRef<'a> {
    pub fn parse(id: &'a str) -> Self {
        match id.strip_prefix(REMOTE_ID_PREFIX) {
            None => FoodRef::Local(id),
            Some(raw) => raw
                .parse::<u64>()
                .map(FoodRef::Remote)
                .unwrap_or(FoodRef::MalformedRemote),
        }
    }
}

pub fn remote_id(fdc_id: u64) -> String {
    format!("{REMOTE_ID_PREFIX}{fdc_id}")
}

/// Build a [`Food`] from a raw FDC record.
///
/// Unknown nutrients are ignored, missing ones are 0 and negative amounts are
/// clamped to 0. A nutrient without a number is matched by name.
pub fn normalize(raw: &FdcFood) -> Food {
    let mut food = Food {
        id: remote_id(raw.fdc_id),
        name: raw.description.trim().to_string(),
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        fiber: 0.0,
    };
    for nutrient in &raw.food_nutrients {
        let Some(field) = classify(nutrient) else {
            continue;
        };
        let amount = nutrient.amount().unwrap_or(0.0).max(0.0);
        let slot = match field {
            Field::Calories => &mut food.calories,
            Field::Protein => &mut food.protein,
            Field::Carbs => &mut food.carbs,
            Field::Fat => &mut food.fat,
            Field::Fiber => &mut food.fiber,
        };
        *slot = amount;
    }
    food
}

fn classify(nutrient: &FdcNutrient) -> Option<Field> {
    if let Some(number) = nutrient.number() {
        return match number.trim() {
            ENERGY_KCAL => Some(Field::Calories),
            PROTEIN => Some(Field::Protein),
            CARBS => Some(Field::Carbs),
            FAT => Some(Field::Fat),
            FIBER => Some(Field::Fiber),
            _ => None,
        };
    }

    let name = nutrient.name()?.trim().to_lowercase();
    match name.as_str() {
        "energy" if nutrient.unit().is_some_and(|u| u.eq_ignore_ascii_case("kcal")) => {
            Some(Field::Calories)
        }
        "protein" => Some(Field::Protein),
        "carbohydrate, by difference" => Some(Field::Carbs),
        "total lipid (fat)" => Some(Field::Fat),
        "fiber, total dietary" => Some(Field::Fiber),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> FdcFood {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_search_hit_codes() {
        let food = normalize(&raw(json!({
            "fdcId": 171077,
            "description": "Chicken, broilers or fryers, breast, meat only, cooked, roasted ",
            "foodNutrients": [
                {"nutrientNumber": "208", "nutrientName": "Energy", "unitName": "KCAL", "value": 165},
                {"nutrientNumber": "203", "nutrientName": "Protein", "unitName": "G", "value": 31.02},
                {"nutrientNumber": "204", "nutrientName": "Total lipid (fat)", "unitName": "G", "value": 3.57},
                {"nutrientNumber": "268", "nutrientName": "Energy", "unitName": "kJ", "value": 690},
                {"nutrientNumber": "301", "nutrientName": "Calcium, Ca", "unitName": "MG", "value": 15}
            ]
        })));
        assert_eq!(food.id, "fdc_171077");
        assert_eq!(
            food.name,
            "Chicken, broilers or fryers, breast, meat only, cooked, roasted"
        );
        assert_eq!(food.calories, 165.0);
        assert_eq!(food.protein, 31.02);
        assert_eq!(food.fat, 3.57);
        assert_eq!(food.carbs, 0.0);
        assert_eq!(food.fiber, 0.0);
    }

    #[test]
    fn maps_detail_record_and_name_fallback() {
        let food = normalize(&raw(json!({
            "fdcId": 9,
            "description": "Oats",
            "foodNutrients": [
                {"nutrient": {"number": 205, "name": "Carbohydrate, by difference", "unitName": "g"}, "amount": 66.3},
                {"nutrient": {"name": "Fiber, total dietary", "unitName": "g"}, "amount": 10.6},
                {"nutrient": {"name": "Energy", "unitName": "kJ"}, "amount": 1635},
                {"nutrient": {"name": "Energy", "unitName": "kcal"}, "amount": 389},
                {"nutrient": {"number": "203"}, "amount": -1.0}
            ]
        })));
        assert_eq!(food.carbs, 66.3);
        assert_eq!(food.fiber, 10.6);
        assert_eq!(food.calories, 389.0);
        assert_eq!(food.protein, 0.0);
    }

    #[test]
    fn parses_food_refs() {
        assert_eq!(FoodRef::parse("f1"), FoodRef::Local("f1"));
        assert_eq!(FoodRef::parse("fdc_42"), FoodRef::Remote(42));
        assert_eq!(FoodRef::parse("fdc_abc"), FoodRef::MalformedRemote);
        assert_eq!(FoodRef::parse("fdc_"), FoodRef::MalformedRemote);
        assert_eq!(remote_id(42), "fdc_42");
    }
}
