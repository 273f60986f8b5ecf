// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal and nutrition summary models.

use serde::{Deserialize, Serialize};

/// One nutrient line in a scan result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutrientAmount {
    pub name: String,
    /// Amount as a display string ("8.0")
    pub amount: String,
    pub unit: String,
    /// Percent of daily value ("16%"), when a reference value exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_value: Option<String>,
}

/// Aggregated nutrition facts for one scanned plate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionSummary {
    /// Where the numbers came from ("USDA FoodData Central",
    /// "AI Estimation", or both)
    pub source: String,
    pub food_name: String,
    pub portion: String,
    /// Total calories as an integer string
    pub calories: String,
    pub nutrients: Vec<NutrientAmount>,
}

/// A scanned meal stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub user_id: String,
    /// When the meal was scanned (ISO 8601)
    pub meal_time: String,
    pub food_name: String,
    pub portion: String,
    pub calories: String,
    /// Detected nutrients, as shown to the user
    pub nutrients_detected: Vec<NutrientAmount>,
    pub source: String,
}
