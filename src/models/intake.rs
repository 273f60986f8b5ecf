// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutrient intake rows, one per nutrient per scanned meal.

use serde::{Deserialize, Serialize};

/// A single nutrient intake record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientIntake {
    pub user_id: String,
    /// Canonical nutrient name ("Protein", "Vitamin C", ...)
    pub nutrient_name: String,
    pub amount: f64,
    pub unit: String,
    /// When the meal was consumed (ISO 8601; range-queried for averages)
    pub meal_time: String,
}
