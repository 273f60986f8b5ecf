// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NutriTrack: nutrition tracking backed by calendar context
//!
//! This crate provides the backend API for scanning food photos into
//! nutrient estimates, correlating symptoms with recent intake, and
//! classifying upcoming calendar events by stress level.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{AdvisorService, CalendarService, FoodScanService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub calendar: CalendarService,
    pub scanner: FoodScanService,
    pub advisor: AdvisorService,
}
