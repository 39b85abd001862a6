#![forbid(unsafe_code)]

//! Core domain model and business logic for the workout composer.
//!
//! This crate provides:
//! - Domain types (profiles, check-ins, blueprints, plans)
//! - Exercise catalog management
//! - Deterministic blueprint generation
//! - Prompt assembly and response validation
//! - Local fallback planning
//! - Composition cache, single-flight coalescing and the orchestrator

pub mod types;
pub mod synonyms;
pub mod error;
pub mod config;
pub mod logging;
pub mod catalog;
pub mod blueprint;
pub mod prompt;
pub mod validator;
pub mod fallback;
pub mod cache;
pub mod flight;
pub mod history;
pub mod client;
pub mod composer;

// Re-export commonly used types
pub use error::{ClientError, ComposerError, Error, Result, ValidationError};
pub use types::*;
pub use config::Config;
pub use catalog::{ExerciseCatalog, StaticCatalog};
pub use blueprint::generate_blueprint;
pub use cache::{CompositionCache, FileCacheStore, MemoryCacheStore};
pub use history::{JsonlPlanHistory, PlanHistory};
pub use client::{GenerativeClient, HttpGenerativeClient};
pub use composer::{ComposedWorkout, ComposerConfig, CompositionSource, WorkoutComposer};
