// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed daily-value reference table and nutrient aggregation.
//!
//! Reference amounts follow the FDA adult daily values used on nutrition
//! labels. All percent-of-DV math in the app goes through here.

use std::collections::HashMap;

use crate::models::NutrientAmount;

/// Calories reference (kcal/day).
pub const CALORIES_DAILY_VALUE: f64 = 2000.0;

/// One reference entry: canonical name, daily value, unit.
#[derive(Debug, Clone, Copy)]
pub struct DailyValue {
    pub name: &'static str,
    pub amount: f64,
    pub unit: &'static str,
}

/// Canonical nutrient order for summaries; macros first, then micros.
pub const DAILY_VALUES: &[DailyValue] = &[
    DailyValue { name: "Protein", amount: 50.0, unit: "g" },
    DailyValue { name: "Carbohydrates", amount: 300.0, unit: "g" },
    DailyValue { name: "Total Fat", amount: 78.0, unit: "g" },
    DailyValue { name: "Fiber", amount: 28.0, unit: "g" },
    DailyValue { name: "Vitamin A", amount: 900.0, unit: "mcg" },
    DailyValue { name: "Vitamin C", amount: 90.0, unit: "mg" },
    DailyValue { name: "Vitamin D", amount: 20.0, unit: "mcg" },
    DailyValue { name: "Iron", amount: 18.0, unit: "mg" },
    DailyValue { name: "Calcium", amount: 1000.0, unit: "mg" },
    DailyValue { name: "Magnesium", amount: 420.0, unit: "mg" },
    DailyValue { name: "Potassium", amount: 4700.0, unit: "mg" },
];

/// Look up the reference entry for a nutrient name.
pub fn daily_value_for(name: &str) -> Option<&'static DailyValue> {
    DAILY_VALUES.iter().find(|dv| dv.name == name)
}

/// Percent of daily value, rounded to the nearest whole percent.
pub fn percent_of_daily_value(name: &str, amount: f64) -> Option<u32> {
    let dv = daily_value_for(name)?;
    if dv.amount <= 0.0 {
        return None;
    }
    Some((amount / dv.amount * 100.0).round() as u32)
}

/// Target label for prompts and summaries, e.g. "90mg/day".
pub fn target_label(name: &str) -> Option<String> {
    daily_value_for(name).map(|dv| format!("{}{}/day", dv.amount, dv.unit))
}

/// Accumulator for per-item nutrient amounts.
///
/// Amounts are summed by canonical name; the unit of the first
/// contribution wins (all sources normalize to the reference units).
#[derive(Debug, Default)]
pub struct NutrientTotals {
    pub calories: f64,
    amounts: HashMap<String, (f64, String)>,
}

impl NutrientTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_calories(&mut self, kcal: f64) {
        self.calories += kcal;
    }

    pub fn add(&mut self, name: &str, amount: f64, unit: &str) {
        let entry = self
            .amounts
            .entry(name.to_string())
            .or_insert_with(|| (0.0, unit.to_string()));
        entry.0 += amount;
    }

    pub fn is_empty(&self) -> bool {
        self.calories == 0.0 && self.amounts.is_empty()
    }

    /// Emit nutrient lines in canonical order (unknown names last, sorted),
    /// with percent-of-DV filled in where a reference value exists.
    pub fn into_nutrient_amounts(mut self) -> Vec<NutrientAmount> {
        let mut out = Vec::with_capacity(self.amounts.len());

        for dv in DAILY_VALUES {
            if let Some((amount, unit)) = self.amounts.remove(dv.name) {
                out.push(make_amount(dv.name, amount, &unit));
            }
        }

        // Anything not in the reference table goes last, in name order
        let mut rest: Vec<_> = self.amounts.into_iter().collect();
        rest.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, (amount, unit)) in rest {
            out.push(make_amount(&name, amount, &unit));
        }

        out
    }
}

fn make_amount(name: &str, amount: f64, unit: &str) -> NutrientAmount {
    NutrientAmount {
        name: name.to_string(),
        amount: format!("{:.1}", amount),
        unit: unit.to_string(),
        daily_value: percent_of_daily_value(name, amount).map(|p| format!("{}%", p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of_daily_value() {
        // The reference arithmetic behind the UI labels
        assert_eq!(percent_of_daily_value("Protein", 8.0), Some(16));
        assert_eq!(percent_of_daily_value("Carbohydrates", 15.0), Some(5));
        assert_eq!(percent_of_daily_value("Vitamin A", 450.0), Some(50));
        assert_eq!(percent_of_daily_value("Iron", 2.5), Some(14));
        assert_eq!(percent_of_daily_value("Calcium", 120.0), Some(12));
        assert_eq!(percent_of_daily_value("Moonrock", 5.0), None);
    }

    #[test]
    fn test_target_label() {
        assert_eq!(target_label("Vitamin C"), Some("90mg/day".to_string()));
        assert_eq!(target_label("Protein"), Some("50g/day".to_string()));
        assert_eq!(target_label("Unknown"), None);
    }

    #[test]
    fn test_totals_sum_and_order() {
        let mut totals = NutrientTotals::new();
        totals.add_calories(180.0);
        totals.add("Iron", 1.5, "mg");
        totals.add("Protein", 5.0, "g");
        totals.add("Protein", 3.0, "g");

        assert_eq!(totals.calories, 180.0);

        let nutrients = totals.into_nutrient_amounts();
        // Canonical order: Protein before Iron
        assert_eq!(nutrients[0].name, "Protein");
        assert_eq!(nutrients[0].amount, "8.0");
        assert_eq!(nutrients[0].daily_value.as_deref(), Some("16%"));
        assert_eq!(nutrients[1].name, "Iron");
    }

    #[test]
    fn test_unknown_nutrients_sort_last() {
        let mut totals = NutrientTotals::new();
        totals.add("Zinc", 2.0, "mg");
        totals.add("Vitamin C", 30.0, "mg");

        let nutrients = totals.into_nutrient_amounts();
        assert_eq!(nutrients[0].name, "Vitamin C");
        assert_eq!(nutrients[1].name, "Zinc");
        assert_eq!(nutrients[1].daily_value, None);
    }

    #[test]
    fn test_empty_totals() {
        assert!(NutrientTotals::new().is_empty());

        let mut totals = NutrientTotals::new();
        totals.add("Protein", 1.0, "g");
        assert!(!totals.is_empty());
    }
}
