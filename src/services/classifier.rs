// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyword classifier for calendar events.
//!
//! Maps event title + description text to a stress level and a category,
//! and attaches a fixed food-suggestion list per stress level. Pure
//! functions, deterministic, first matching rule wins.

use crate::models::{EventCategory, FoodSuggestion, StressLevel};

/// Keywords that mark an event as high-stress.
const HIGH_STRESS_KEYWORDS: &[&str] = &["exam", "test", "interview", "presentation", "deadline"];

/// Keywords that mark an event as low-stress (recovery/relaxation).
const LOW_STRESS_KEYWORDS: &[&str] = &["workout", "gym", "yoga", "meditation", "break", "relax"];

/// Category rules, checked in order; the first match wins.
const CATEGORY_RULES: &[(&[&str], EventCategory)] = &[
    (&["exam", "test"], EventCategory::Exam),
    (&["presentation"], EventCategory::Presentation),
    (&["meeting"], EventCategory::Meeting),
    (&["workout", "gym"], EventCategory::Workout),
    (&["class", "lecture"], EventCategory::Class),
];

const HIGH_STRESS_SUGGESTIONS: &[FoodSuggestion] = &[
    FoodSuggestion {
        name: "Blueberries",
        reason: "Rich in antioxidants, supports brain health and reduces stress",
    },
    FoodSuggestion {
        name: "Dark Chocolate",
        reason: "Contains flavonoids that improve focus and mood",
    },
    FoodSuggestion {
        name: "Walnuts",
        reason: "High in omega-3s for cognitive function",
    },
    FoodSuggestion {
        name: "Green Tea",
        reason: "L-theanine promotes calm alertness",
    },
    FoodSuggestion {
        name: "Salmon",
        reason: "Omega-3 fatty acids reduce anxiety and improve brain function",
    },
    FoodSuggestion {
        name: "Avocado",
        reason: "Healthy fats support brain health and concentration",
    },
];

const MEDIUM_STRESS_SUGGESTIONS: &[FoodSuggestion] = &[
    FoodSuggestion {
        name: "Bananas",
        reason: "Natural energy boost with potassium",
    },
    FoodSuggestion {
        name: "Oatmeal",
        reason: "Sustained energy release, prevents blood sugar crashes",
    },
    FoodSuggestion {
        name: "Greek Yogurt",
        reason: "Protein and probiotics support gut-brain connection",
    },
    FoodSuggestion {
        name: "Almonds",
        reason: "Vitamin E protects brain cells",
    },
];

const LOW_STRESS_SUGGESTIONS: &[FoodSuggestion] = &[
    FoodSuggestion {
        name: "Berries",
        reason: "Antioxidants support overall wellness",
    },
    FoodSuggestion {
        name: "Leafy Greens",
        reason: "Nutrients support general health",
    },
    FoodSuggestion {
        name: "Whole Grains",
        reason: "Steady energy throughout the day",
    },
];

/// Stress level and category for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub stress_level: StressLevel,
    pub category: EventCategory,
}

/// Classify an event from its title and description.
pub fn classify_event(title: &str, description: &str) -> Classification {
    let combined = format!("{} {}", title, description).to_lowercase();

    Classification {
        stress_level: stress_level(&combined),
        category: category(&combined),
    }
}

fn stress_level(combined: &str) -> StressLevel {
    if HIGH_STRESS_KEYWORDS.iter().any(|k| combined.contains(k))
        || (combined.contains("meeting") && combined.contains("important"))
    {
        StressLevel::High
    } else if LOW_STRESS_KEYWORDS.iter().any(|k| combined.contains(k)) {
        StressLevel::Low
    } else {
        StressLevel::Medium
    }
}

fn category(combined: &str) -> EventCategory {
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|k| combined.contains(k)) {
            return *category;
        }
    }
    EventCategory::Other
}

/// Fixed food suggestions for a stress level.
pub fn food_suggestions(stress_level: StressLevel) -> &'static [FoodSuggestion] {
    match stress_level {
        StressLevel::High => HIGH_STRESS_SUGGESTIONS,
        StressLevel::Medium => MEDIUM_STRESS_SUGGESTIONS,
        StressLevel::Low => LOW_STRESS_SUGGESTIONS,
    }
}
