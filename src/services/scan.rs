// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food recognition pipeline.
//!
//! Image -> Gemini vision (enumerate food items) -> per-item USDA lookup
//! -> per-item AI estimation on a miss -> aggregated nutrition summary.
//! Every stage degrades instead of failing: the caller always gets a
//! summary, worst case the static fallback.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Meal, NutrientIntake, NutritionSummary};
use crate::services::daily_values::NutrientTotals;
use crate::services::fdc::FdcClient;
use crate::services::gemini::{extract_json_block, GeminiClient, TEXT_MODEL, VISION_MODEL};
use crate::time_utils::format_utc_rfc3339;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::Deserialize;

const SOURCE_FDC: &str = "USDA FoodData Central";
const SOURCE_AI: &str = "AI Estimation";

const VISION_PROMPT: &str = r#"You are a food recognition AI. Analyze this image and identify EVERY individual food item visible on the plate.

IMPORTANT RULES:
- List each food item separately (e.g., "scrambled eggs", "bacon strips", "toast")
- Do NOT use generic terms like "mixed plate" or "breakfast items"
- Estimate the portion size for each item (e.g., "2 slices", "1 cup", "3 strips")
- If you see multiple items, list ALL of them individually

Respond with ONLY valid JSON (no markdown, no code blocks):

{
  "foods": [
    {"name": "specific food item 1", "portion": "estimated portion"},
    {"name": "specific food item 2", "portion": "estimated portion"}
  ]
}"#;

/// Nutrient line patterns for the AI-estimation text reply.
/// Matched against lowercased lines; the first pattern per line wins.
const NUTRIENT_PATTERNS: &[(&str, &str, &str)] = &[
    ("calorie", "Calories", "kcal"),
    ("protein", "Protein", "g"),
    ("carbohydrate", "Carbohydrates", "g"),
    ("fiber", "Fiber", "g"),
    ("vitamin a", "Vitamin A", "mcg"),
    ("vitamin c", "Vitamin C", "mg"),
    ("vitamin d", "Vitamin D", "mcg"),
    ("fat", "Total Fat", "g"),
    ("iron", "Iron", "mg"),
    ("calcium", "Calcium", "mg"),
    ("potassium", "Potassium", "mg"),
    ("magnesium", "Magnesium", "mg"),
];

/// One food item recognized on the plate.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FoodItem {
    pub name: String,
    #[serde(default = "default_portion")]
    pub portion: String,
}

fn default_portion() -> String {
    "1 serving".to_string()
}

impl FoodItem {
    fn placeholder() -> Self {
        Self {
            name: "Mixed Plate".to_string(),
            portion: "1 serving".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VisionReply {
    #[serde(default)]
    foods: Vec<FoodItem>,
}

/// Food scanning pipeline service.
#[derive(Clone)]
pub struct FoodScanService {
    gemini: GeminiClient,
    fdc: FdcClient,
    db: FirestoreDb,
}

impl FoodScanService {
    pub fn new(gemini: GeminiClient, fdc: FdcClient, db: FirestoreDb) -> Self {
        Self { gemini, fdc, db }
    }

    /// Run the full pipeline for one image.
    ///
    /// The only hard failure is an undecodable image payload; everything
    /// downstream degrades to estimates or the static fallback.
    pub async fn scan(&self, user_id: &str, image_base64: &str) -> Result<NutritionSummary, AppError> {
        let image_bytes = decode_image(image_base64)?;

        let items = self.recognize_items(&image_bytes).await;
        tracing::info!(user_id, count = items.len(), "Recognized food items");

        let summary = self.resolve_nutrition(&items).await;

        // Best-effort persistence; a scan result is never lost to a DB hiccup
        if let Err(e) = self.persist(user_id, &summary).await {
            tracing::warn!(user_id, error = %e, "Failed to persist scanned meal");
        }

        Ok(summary)
    }

    /// Ask the vision model for the list of food items on the plate.
    async fn recognize_items(&self, image_bytes: &[u8]) -> Vec<FoodItem> {
        let raw = match self
            .gemini
            .generate_vision(VISION_MODEL, VISION_PROMPT, image_bytes)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Food extraction failed");
                return vec![FoodItem::placeholder()];
            }
        };

        let items = parse_food_items(&raw);
        if items.is_empty() {
            vec![FoodItem::placeholder()]
        } else {
            items
        }
    }

    /// Look up each item in FDC, estimating with the model on a miss, and
    /// aggregate the totals.
    async fn resolve_nutrition(&self, items: &[FoodItem]) -> NutritionSummary {
        let mut totals = NutrientTotals::new();
        let mut used_fdc = false;
        let mut used_ai = false;

        for item in items {
            match self.lookup_fdc(&item.name).await {
                Ok(Some(nutrients)) => {
                    used_fdc = true;
                    for n in nutrients {
                        if n.name == "Calories" {
                            totals.add_calories(n.amount);
                        } else {
                            totals.add(n.name, n.amount, n.unit);
                        }
                    }
                }
                Ok(None) => {
                    used_ai = true;
                    self.estimate_item(item, &mut totals).await;
                }
                Err(e) => {
                    tracing::warn!(food = %item.name, error = %e, "FDC lookup failed");
                    used_ai = true;
                    self.estimate_item(item, &mut totals).await;
                }
            }
        }

        let source = match (used_fdc, used_ai) {
            (true, false) => SOURCE_FDC.to_string(),
            (true, true) => format!("{} + {}", SOURCE_FDC, SOURCE_AI),
            _ => SOURCE_AI.to_string(),
        };

        if totals.is_empty() {
            return fallback_summary(items);
        }

        NutritionSummary {
            source,
            food_name: combined_name(items),
            portion: combined_portion(items),
            calories: format!("{}", totals.calories.round() as i64),
            nutrients: totals.into_nutrient_amounts(),
        }
    }

    async fn lookup_fdc(
        &self,
        name: &str,
    ) -> Result<Option<Vec<crate::services::fdc::FdcNutrient>>, AppError> {
        let Some(fdc_id) = self.fdc.search_food(name).await? else {
            return Ok(None);
        };
        tracing::debug!(food = name, fdc_id, "FDC hit, fetching nutrients");
        let nutrients = self.fdc.food_nutrients(fdc_id).await?;
        Ok(Some(nutrients))
    }

    /// Text-only model estimate for a single item, folded into the totals.
    async fn estimate_item(&self, item: &FoodItem, totals: &mut NutrientTotals) {
        let prompt = format!(
            "Estimate the total nutritional value for this meal: {} of {}\n\n\
             Provide estimates per the total portions listed. Format as:\n\
             Calories: [number] kcal\n\
             Protein: [number] g\n\
             Carbohydrates: [number] g\n\
             Total Fat: [number] g\n\
             Fiber: [number] g\n\
             Vitamin A: [number] mcg\n\
             Vitamin C: [number] mg\n\
             Iron: [number] mg\n\
             Calcium: [number] mg\n\
             Potassium: [number] mg\n\n\
             Be specific with numbers.",
            item.portion, item.name
        );

        match self.gemini.generate_text(TEXT_MODEL, &prompt).await {
            Ok(reply) => parse_estimate_lines(&reply, totals),
            Err(e) => {
                tracing::warn!(food = %item.name, error = %e, "AI estimation failed");
            }
        }
    }

    /// Store one meal row plus one intake row per nutrient.
    async fn persist(&self, user_id: &str, summary: &NutritionSummary) -> Result<(), AppError> {
        let meal_time = format_utc_rfc3339(Utc::now());

        let meal = Meal {
            user_id: user_id.to_string(),
            meal_time: meal_time.clone(),
            food_name: summary.food_name.clone(),
            portion: summary.portion.clone(),
            calories: summary.calories.clone(),
            nutrients_detected: summary.nutrients.clone(),
            source: summary.source.clone(),
        };
        self.db.insert_meal(&meal).await?;

        let intake: Vec<NutrientIntake> = summary
            .nutrients
            .iter()
            .filter_map(|n| {
                let amount: f64 = n.amount.parse().ok()?;
                Some(NutrientIntake {
                    user_id: user_id.to_string(),
                    nutrient_name: n.name.clone(),
                    amount,
                    unit: n.unit.clone(),
                    meal_time: meal_time.clone(),
                })
            })
            .collect();

        self.db.batch_insert_intake(&intake).await
    }
}

/// Strip a data-URL prefix and decode the image payload.
fn decode_image(image_base64: &str) -> Result<Vec<u8>, AppError> {
    let payload = match image_base64.split_once("base64,") {
        Some((_, rest)) => rest,
        None => image_base64,
    };

    STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::BadRequest("Image is not valid base64".to_string()))
}

/// Parse the vision model's reply into food items.
///
/// Tolerates markdown fences and surrounding prose; drops placeholder
/// names the model was told not to produce.
pub fn parse_food_items(raw: &str) -> Vec<FoodItem> {
    let Some(json) = extract_json_block(raw) else {
        return Vec::new();
    };

    let reply: VisionReply = match serde_json::from_str(&json) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "Vision reply was not valid JSON");
            return Vec::new();
        }
    };

    reply
        .foods
        .into_iter()
        .filter(|item| {
            let name = item.name.to_lowercase();
            !name.is_empty() && !name.contains("food item") && !name.contains("generic")
        })
        .collect()
}

/// Parse "Nutrient: <number> <unit>" lines from an estimation reply.
pub fn parse_estimate_lines(reply: &str, totals: &mut NutrientTotals) {
    for line in reply.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_lower = line.to_lowercase();

        for (pattern, name, unit) in NUTRIENT_PATTERNS {
            if line_lower.contains(pattern) {
                if let Some(amount) = extract_first_number(line) {
                    if *name == "Calories" {
                        totals.add_calories(amount);
                    } else {
                        totals.add(name, amount, unit);
                    }
                }
                break;
            }
        }
    }
}

/// First decimal number in a line ("Protein: 12.5 g" -> 12.5).
fn extract_first_number(line: &str) -> Option<f64> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let rest = &line[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Static fallback when every lookup and estimate came back empty.
fn fallback_summary(items: &[FoodItem]) -> NutritionSummary {
    let mut totals = NutrientTotals::new();
    totals.add_calories(250.0);
    totals.add("Protein", 10.0, "g");
    totals.add("Carbohydrates", 30.0, "g");
    totals.add("Total Fat", 8.0, "g");

    NutritionSummary {
        source: SOURCE_AI.to_string(),
        food_name: combined_name(items),
        portion: combined_portion(items),
        calories: "250".to_string(),
        nutrients: totals.into_nutrient_amounts(),
    }
}

fn combined_name(items: &[FoodItem]) -> String {
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    if names.is_empty() {
        "Mixed Plate".to_string()
    } else {
        names.join(", ")
    }
}

fn combined_portion(items: &[FoodItem]) -> String {
    let portions: Vec<String> = items
        .iter()
        .map(|i| format!("{} of {}", i.portion, i.name))
        .collect();
    format!("Overall: {}", portions.join(", "))
}
