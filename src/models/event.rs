// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar event projections.
//!
//! These are derived per request from the Google Calendar API response and
//! never persisted.

use serde::{Deserialize, Serialize};

/// Stress level derived from event text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

/// Event category derived from event text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Exam,
    Presentation,
    Meeting,
    Workout,
    Class,
    Other,
}

/// A food suggestion attached to an event based on its stress level.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FoodSuggestion {
    pub name: &'static str,
    pub reason: &'static str,
}

/// Calendar event as returned by `GET /api/calendar/events`.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// Event start (RFC3339 datetime, or all-day date)
    pub date: String,
    #[serde(rename = "type")]
    pub category: EventCategory,
    pub stress_level: StressLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub food_suggestions: Vec<FoodSuggestion>,
}
