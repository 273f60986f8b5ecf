// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Symptom advisor.
//!
//! Aggregates recent nutrient intake into daily averages, asks the model
//! for a structured deficiency analysis, and degrades through two fallback
//! layers (heuristic text extraction, then a canned recommendation set) so
//! the chat endpoint always answers.

use std::collections::BTreeMap;

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{SymptomAnalysis, SymptomLog};
use crate::services::daily_values::target_label;
use crate::services::gemini::{extract_json_block, GeminiClient, TEXT_MODEL};
use crate::time_utils::format_utc_rfc3339;
use chrono::{Duration, Utc};
use serde::Deserialize;

/// Window for the intake aggregate.
const INTAKE_WINDOW_DAYS: i64 = 7;

/// Nutrients recognized by the heuristic text extractor.
const COMMON_NUTRIENTS: &[&str] = &[
    "Vitamin D",
    "Vitamin B12",
    "Vitamin C",
    "Vitamin A",
    "Vitamin E",
    "Iron",
    "Magnesium",
    "Calcium",
    "Zinc",
    "Potassium",
    "Omega-3",
    "Folate",
    "Vitamin B6",
];

/// Sentence markers that identify diet advice in free text.
const FOOD_KEYWORDS: &[&str] = &["eat", "food", "diet", "consume", "include", "rich in", "source"];

const MAX_EXTRACTED_NUTRIENTS: usize = 5;
const MAX_EXTRACTED_RECOMMENDATIONS: usize = 4;

/// Daily-average intake for one nutrient over the window.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeAverage {
    pub amount: f64,
    pub unit: String,
    /// Reference target label ("90mg/day"), if one exists
    pub target: Option<String>,
}

/// Structured verdict requested from the model.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    analysis: String,
    #[serde(default)]
    recommended_nutrients: Vec<String>,
    #[serde(default)]
    diet_suggestions: Vec<String>,
}

/// Symptom analysis service.
#[derive(Clone)]
pub struct AdvisorService {
    gemini: GeminiClient,
    db: FirestoreDb,
}

impl AdvisorService {
    pub fn new(gemini: GeminiClient, db: FirestoreDb) -> Self {
        Self { gemini, db }
    }

    /// Analyze free-text symptoms against the user's recent intake.
    pub async fn analyze(&self, user_id: &str, symptoms: &str) -> SymptomAnalysis {
        // Intake context is best-effort: an empty aggregate still produces
        // a useful (if less personalized) analysis
        let intake = match self.aggregate_intake(user_id).await {
            Ok(intake) => intake,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Intake aggregation failed");
                BTreeMap::new()
            }
        };

        let prompt = build_prompt(symptoms, &intake);

        let analysis = match self.gemini.generate_text(TEXT_MODEL, &prompt).await {
            Ok(reply) => parse_verdict(&reply),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Symptom analysis model call failed");
                canned_fallback()
            }
        };

        let log = SymptomLog {
            user_id: user_id.to_string(),
            symptoms: symptoms.to_string(),
            analysis: analysis.analysis.clone(),
            created_at: format_utc_rfc3339(Utc::now()),
        };
        if let Err(e) = self.db.insert_symptom_log(&log).await {
            tracing::warn!(user_id, error = %e, "Failed to store symptom log");
        }

        analysis
    }

    /// Aggregate the last 7 days of intake into daily averages.
    ///
    /// The divisor is the number of distinct days that actually have data
    /// (at most the window, at least 1), so sparse logs aren't diluted.
    pub async fn aggregate_intake(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, IntakeAverage>, AppError> {
        let cutoff = Utc::now() - Duration::days(INTAKE_WINDOW_DAYS);
        let rows = self
            .db
            .get_intake_since(user_id, &format_utc_rfc3339(cutoff))
            .await?;

        Ok(average_by_day(
            rows.iter()
                .map(|r| (r.nutrient_name.as_str(), r.amount, r.unit.as_str(), r.meal_time.as_str())),
        ))
    }
}

/// Sum amounts per nutrient and divide by the distinct days observed.
pub fn average_by_day<'a, I>(rows: I) -> BTreeMap<String, IntakeAverage>
where
    I: Iterator<Item = (&'a str, f64, &'a str, &'a str)>,
{
    let mut totals: BTreeMap<String, IntakeAverage> = BTreeMap::new();
    let mut days = std::collections::HashSet::new();

    for (name, amount, unit, meal_time) in rows {
        // Distinct calendar days: the date prefix of the RFC3339 timestamp
        days.insert(meal_time.get(..10).unwrap_or(meal_time).to_string());

        let entry = totals.entry(name.to_string()).or_insert_with(|| IntakeAverage {
            amount: 0.0,
            unit: unit.to_string(),
            target: target_label(name),
        });
        entry.amount += amount;
    }

    let divisor = days.len().max(1) as f64;
    for avg in totals.values_mut() {
        avg.amount = (avg.amount / divisor * 10.0).round() / 10.0;
    }

    totals
}

/// Build the advisor prompt with the intake context inline.
pub fn build_prompt(symptoms: &str, intake: &BTreeMap<String, IntakeAverage>) -> String {
    let mut intake_context = String::new();
    if !intake.is_empty() {
        intake_context.push_str("\n\nUser's Current Nutritional Intake (daily average, last 7 days):\n");
        for (name, avg) in intake {
            intake_context.push_str(&format!(
                "- {}: {}{} (Target: {})\n",
                name,
                avg.amount,
                avg.unit,
                avg.target.as_deref().unwrap_or("N/A")
            ));
        }
    }

    format!(
        r#"You are a compassionate AI nutritional assistant. A user describes their symptoms: "{symptoms}"
{intake_context}
Your task:
1. Analyze the symptoms in relation to their current nutritional intake (if provided)
2. Identify potential vitamin or nutrient deficiencies that could cause these symptoms
3. Compare their intake to recommended daily values
4. Provide specific, actionable dietary advice
5. Be empathetic and supportive

Important:
- If intake data shows they're low in certain nutrients, mention this connection
- Suggest specific foods rich in the nutrients they're lacking
- Always remind them to consult healthcare professionals for serious concerns
- Keep your response conversational but informative

Respond with ONLY valid JSON (no markdown, no code blocks):

{{
  "analysis": "warm, helpful response (2-3 paragraphs)",
  "recommended_nutrients": ["nutrient 1", "nutrient 2"],
  "diet_suggestions": ["specific suggestion 1", "specific suggestion 2"]
}}"#
    )
}

/// Parse the model reply, degrading to heuristic extraction when the
/// promised JSON doesn't materialize.
pub fn parse_verdict(reply: &str) -> SymptomAnalysis {
    if let Some(json) = extract_json_block(reply) {
        if let Ok(verdict) = serde_json::from_str::<ModelVerdict>(&json) {
            if !verdict.analysis.is_empty() {
                return SymptomAnalysis {
                    analysis: verdict.analysis,
                    recommended_nutrients: verdict.recommended_nutrients,
                    diet_suggestions: verdict.diet_suggestions,
                };
            }
        }
    }

    tracing::warn!("Model verdict was not parseable JSON, extracting heuristically");
    SymptomAnalysis {
        analysis: reply.trim().to_string(),
        recommended_nutrients: extract_nutrients(reply),
        diet_suggestions: extract_diet_recommendations(reply),
    }
}

/// Pick out known nutrient names mentioned in free text.
pub fn extract_nutrients(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    COMMON_NUTRIENTS
        .iter()
        .filter(|n| text_lower.contains(&n.to_lowercase()))
        .take(MAX_EXTRACTED_NUTRIENTS)
        .map(|n| n.to_string())
        .collect()
}

/// Pick out sentences that read like diet advice.
pub fn extract_diet_recommendations(text: &str) -> Vec<String> {
    text.split('.')
        .filter_map(|sentence| {
            let lower = sentence.to_lowercase();
            if FOOD_KEYWORDS.iter().any(|k| lower.contains(k)) {
                let clean = sentence.trim();
                if clean.len() > 20 {
                    return Some(clean.to_string());
                }
            }
            None
        })
        .take(MAX_EXTRACTED_RECOMMENDATIONS)
        .collect()
}

/// Fixed recommendation set used when the model is unreachable.
pub fn canned_fallback() -> SymptomAnalysis {
    SymptomAnalysis {
        analysis: "I'm having trouble analyzing your symptoms right now. Based on common \
                   concerns, I recommend considering Vitamin D, B12, and Iron levels, as \
                   deficiencies in these are common and can cause fatigue. Please consult \
                   with a healthcare professional for personalized advice."
            .to_string(),
        recommended_nutrients: vec![
            "Vitamin D".to_string(),
            "Vitamin B12".to_string(),
            "Iron".to_string(),
            "Magnesium".to_string(),
        ],
        diet_suggestions: vec![
            "Include leafy greens like spinach and kale".to_string(),
            "Add fatty fish like salmon for Omega-3s".to_string(),
            "Incorporate citrus fruits for Vitamin C".to_string(),
            "Consider fortified cereals or supplements".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_by_day_distinct_day_divisor() {
        let rows = [
            ("Protein", 30.0, "g", "2026-03-01T08:00:00Z"),
            ("Protein", 30.0, "g", "2026-03-01T19:00:00Z"),
            ("Protein", 60.0, "g", "2026-03-02T12:00:00Z"),
            ("Iron", 9.0, "mg", "2026-03-02T12:00:00Z"),
        ];

        let averages = average_by_day(rows.iter().copied());

        // Two distinct days: (30 + 30 + 60) / 2 = 60
        assert_eq!(averages["Protein"].amount, 60.0);
        assert_eq!(averages["Protein"].unit, "g");
        assert_eq!(averages["Protein"].target.as_deref(), Some("50g/day"));
        // Iron only logged once, still divided by the 2 observed days
        assert_eq!(averages["Iron"].amount, 4.5);
    }

    #[test]
    fn test_average_by_day_rounds_to_one_decimal() {
        let rows = [
            ("Fiber", 10.0, "g", "2026-03-01T08:00:00Z"),
            ("Fiber", 10.0, "g", "2026-03-02T08:00:00Z"),
            ("Fiber", 10.0, "g", "2026-03-03T08:00:00Z"),
        ];
        let averages = average_by_day(rows.iter().copied());
        assert_eq!(averages["Fiber"].amount, 10.0);

        let rows = [
            ("Fiber", 10.0, "g", "2026-03-01T08:00:00Z"),
            ("Fiber", 5.0, "g", "2026-03-02T08:00:00Z"),
            ("Fiber", 5.0, "g", "2026-03-03T08:00:00Z"),
        ];
        let averages = average_by_day(rows.iter().copied());
        assert_eq!(averages["Fiber"].amount, 6.7);
    }

    #[test]
    fn test_average_by_day_empty() {
        let averages = average_by_day(std::iter::empty());
        assert!(averages.is_empty());
    }

    #[test]
    fn test_build_prompt_includes_intake_lines() {
        let mut intake = BTreeMap::new();
        intake.insert(
            "Vitamin C".to_string(),
            IntakeAverage {
                amount: 30.5,
                unit: "mg".to_string(),
                target: Some("90mg/day".to_string()),
            },
        );

        let prompt = build_prompt("tired all the time", &intake);
        assert!(prompt.contains("\"tired all the time\""));
        assert!(prompt.contains("- Vitamin C: 30.5mg (Target: 90mg/day)"));
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn test_build_prompt_without_intake() {
        let prompt = build_prompt("headaches", &BTreeMap::new());
        assert!(!prompt.contains("Current Nutritional Intake"));
    }

    #[test]
    fn test_parse_verdict_structured() {
        let reply = r#"```json
{"analysis": "You may be low on iron.", "recommended_nutrients": ["Iron"], "diet_suggestions": ["Eat more lentils and spinach daily"]}
```"#;
        let verdict = parse_verdict(reply);
        assert_eq!(verdict.analysis, "You may be low on iron.");
        assert_eq!(verdict.recommended_nutrients, vec!["Iron"]);
        assert_eq!(verdict.diet_suggestions.len(), 1);
    }

    #[test]
    fn test_parse_verdict_falls_back_to_extraction() {
        let reply = "Your fatigue could point to low Vitamin D and Iron. \
                     You should eat more leafy greens and fortified cereals every morning. \
                     Please consult a professional.";
        let verdict = parse_verdict(reply);

        assert_eq!(verdict.analysis, reply);
        assert!(verdict.recommended_nutrients.contains(&"Vitamin D".to_string()));
        assert!(verdict.recommended_nutrients.contains(&"Iron".to_string()));
        assert_eq!(verdict.diet_suggestions.len(), 1);
        assert!(verdict.diet_suggestions[0].contains("leafy greens"));
    }

    #[test]
    fn test_extract_nutrients_caps_at_five() {
        let text = "vitamin d vitamin b12 vitamin c vitamin a vitamin e iron magnesium";
        let found = extract_nutrients(text);
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_extract_diet_recommendations_filters_short_sentences() {
        let text = "Eat well. You should include plenty of leafy greens in your meals. Ok.";
        let recs = extract_diet_recommendations(text);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("leafy greens"));
    }

    #[test]
    fn test_canned_fallback_shape() {
        let fallback = canned_fallback();
        assert_eq!(fallback.recommended_nutrients.len(), 4);
        assert_eq!(fallback.diet_suggestions.len(), 4);
        assert!(fallback.analysis.contains("healthcare professional"));
    }
}
