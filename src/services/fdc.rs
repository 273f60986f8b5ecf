// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! USDA FoodData Central client.
//!
//! Search is restricted to the curated Foundation and SR Legacy data
//! types; detail responses are reduced to the fixed nutrient table the
//! app tracks.

use crate::error::AppError;
use serde::Deserialize;

/// FDC nutrient IDs mapped to canonical names and units.
const NUTRIENT_MAP: &[(u64, &str, &str)] = &[
    (1008, "Calories", "kcal"),
    (1003, "Protein", "g"),
    (1005, "Carbohydrates", "g"),
    (1004, "Total Fat", "g"),
    (1079, "Fiber", "g"),
    (1106, "Vitamin A", "mcg"),
    (1162, "Vitamin C", "mg"),
    (1114, "Vitamin D", "mcg"),
    (1089, "Iron", "mg"),
    (1087, "Calcium", "mg"),
    (1090, "Magnesium", "mg"),
    (1092, "Potassium", "mg"),
];

/// One nutrient resolved from an FDC food record.
#[derive(Debug, Clone, PartialEq)]
pub struct FdcNutrient {
    pub name: &'static str,
    pub amount: f64,
    pub unit: &'static str,
}

/// USDA FoodData Central API client.
#[derive(Clone)]
pub struct FdcClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FdcClient {
    /// Create a new FDC client. Without an API key every lookup misses,
    /// which callers treat as the estimation-fallback path.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.nal.usda.gov/fdc".to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::NutritionDb("FDC_API_KEY is not configured".to_string()))
    }

    /// Search FDC for a food by name; returns the first hit's FDC ID.
    pub async fn search_food(&self, query: &str) -> Result<Option<u64>, AppError> {
        let url = format!("{}/v1/foods/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.api_key()?),
                ("query", query),
                ("dataType", "Foundation"),
                ("dataType", "SR Legacy"),
                ("pageSize", "1"),
            ])
            .send()
            .await
            .map_err(|e| AppError::NutritionDb(e.to_string()))?;

        let data: SearchResponse = self.check_response_json(response).await?;
        Ok(data.foods.first().map(|f| f.fdc_id))
    }

    /// Fetch a food's nutrient table, reduced to the nutrients we track.
    pub async fn food_nutrients(&self, fdc_id: u64) -> Result<Vec<FdcNutrient>, AppError> {
        let url = format!("{}/v1/food/{}", self.base_url, fdc_id);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key()?)])
            .send()
            .await
            .map_err(|e| AppError::NutritionDb(e.to_string()))?;

        let data: FoodDetail = self.check_response_json(response).await?;

        let nutrients = data
            .food_nutrients
            .into_iter()
            .filter_map(|n| {
                let id = n.nutrient?.id?;
                let (_, name, unit) = NUTRIENT_MAP.iter().find(|(nid, _, _)| *nid == id)?;
                Some(FdcNutrient {
                    name,
                    amount: n.amount.unwrap_or(0.0),
                    unit,
                })
            })
            .collect();

        Ok(nutrients)
    }

    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::NutritionDb(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::NutritionDb(format!("JSON parse error: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "fdcId")]
    fdc_id: u64,
}

#[derive(Debug, Deserialize)]
struct FoodDetail {
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<FoodNutrientEntry>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrientEntry {
    nutrient: Option<NutrientRef>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NutrientRef {
    id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrient_map_covers_tracked_nutrients() {
        let calories = NUTRIENT_MAP.iter().find(|(id, _, _)| *id == 1008).unwrap();
        assert_eq!(calories.1, "Calories");
        assert_eq!(calories.2, "kcal");

        // All mapped IDs are distinct
        let mut ids: Vec<u64> = NUTRIENT_MAP.iter().map(|(id, _, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), NUTRIENT_MAP.len());
    }

    #[test]
    fn test_detail_parsing_reduces_to_tracked_nutrients() {
        let raw = serde_json::json!({
            "foodNutrients": [
                { "nutrient": { "id": 1003 }, "amount": 8.2 },
                { "nutrient": { "id": 9999 }, "amount": 1.0 },
                { "nutrient": { "id": 1087 } },
                { "amount": 3.0 }
            ]
        });

        let detail: FoodDetail = serde_json::from_value(raw).unwrap();
        let tracked: Vec<FdcNutrient> = detail
            .food_nutrients
            .into_iter()
            .filter_map(|n| {
                let id = n.nutrient?.id?;
                let (_, name, unit) = NUTRIENT_MAP.iter().find(|(nid, _, _)| *nid == id)?;
                Some(FdcNutrient {
                    name,
                    amount: n.amount.unwrap_or(0.0),
                    unit,
                })
            })
            .collect();

        assert_eq!(tracked.len(), 2);
        assert_eq!(tracked[0].name, "Protein");
        assert_eq!(tracked[0].amount, 8.2);
        assert_eq!(tracked[1].name, "Calcium");
        assert_eq!(tracked[1].amount, 0.0);
    }
}
