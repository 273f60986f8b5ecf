// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod event;
pub mod intake;
pub mod meal;
pub mod symptom;
pub mod user;

pub use event::{CalendarEvent, EventCategory, FoodSuggestion, StressLevel};
pub use intake::NutrientIntake;
pub use meal::{Meal, NutrientAmount, NutritionSummary};
pub use symptom::{SymptomAnalysis, SymptomLog};
pub use user::{OAuthToken, User};
