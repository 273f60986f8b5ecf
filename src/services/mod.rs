// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod advisor;
pub mod classifier;
pub mod daily_values;
pub mod fdc;
pub mod gemini;
pub mod google_calendar;
pub mod scan;

pub use advisor::AdvisorService;
pub use fdc::FdcClient;
pub use gemini::GeminiClient;
pub use google_calendar::{CalendarClient, CalendarService};
pub use scan::FoodScanService;
