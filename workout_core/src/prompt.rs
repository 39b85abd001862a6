//! Prompt assembly for the generative service.
//!
//! Turns a blueprint, the filtered catalog and recent history into the
//! two-part request the generative client sends, plus the cache key the
//! composer uses for lookup and coalescing.
//!
//! Assembly is deterministic: identical inputs give byte-identical text and
//! keys. The seed only reorders and subsets the catalog section.

use crate::config::PromptConfig;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Version of the cache key derivation itself
const CACHE_KEY_VERSION: &str = "compose-key-v1";

const PERSONA: &str = "You are an experienced strength and conditioning coach. \
You design exactly one workout session at a time and reply with strict JSON only.";

const VERBATIM_NAMES: &str = "Use exercise names exactly as they appear in the exercise catalog. \
Do not invent, rename or abbreviate exercises.";

const ANTI_REPETITION: &str = "The athlete trained recently. Do not repeat any exercise listed \
under \"Prohibited exercises\"; choose alternatives for the same muscle group.";

const REPLY_SHAPE: &str = r#"Reply with a single JSON object of this shape:
{"title": string, "phases": [{"kind": string, "exercises": [{"name": string, "muscleGroup": string, "equipment": string, "sets": int, "reps": string, "restSeconds": int, "notes": string}], "activity": {"kind": string, "title": string, "durationMinutes": int, "notes": string}}], "notes": string}
Use "exercises" for exercise phases and "activity" for guided phases. Keep phases in blueprint order."#;

fn goal_guidance(goal: Goal) -> &'static str {
    match goal {
        Goal::Hypertrophy => {
            "Goal: hypertrophy. Prioritise compound lifts early, controlled eccentrics \
             and enough volume per muscle. Accessory work should complement the main lifts."
        }
        Goal::WeightLoss => {
            "Goal: weight_loss. Keep the heart rate elevated with full-body movements, \
             short rests and smooth transitions. Favour movements that are safe when tired."
        }
        Goal::Endurance => {
            "Goal: endurance. Build work capacity with higher repetitions, steady pacing \
             and moderate loads. Avoid maximal efforts."
        }
        Goal::Conditioning => {
            "Goal: conditioning. Mix strength and cardio in circuits, push intensity in \
             the finisher, and keep technique crisp under fatigue."
        }
        Goal::Performance => {
            "Goal: performance. Lead with explosive, low-repetition power work while fresh, \
             then move to functional patterns. Quality over quantity."
        }
    }
}

/// The request sent to the generative service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_text: String,
    pub user_text: String,
    pub cache_key: String,
    pub metadata: PromptMetadata,
}

/// Diagnostic facts about an assembled request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptMetadata {
    pub goal: Goal,
    pub focus: FocusArea,
    pub seed: u64,
    pub schema_version: String,
    pub catalog_entries: usize,
    pub prohibited_exercises: Vec<String>,
}

/// Stable signature of the profile fields that shape a plan
pub fn profile_signature(profile: &UserProfile) -> String {
    let conditions: Vec<&str> = profile.conditions.iter().map(|c| c.label()).collect();
    format!(
        "id={};goal={};structure={};method={};level={};conditions={};frequency={}",
        profile.id.trim().to_lowercase(),
        profile.goal.label(),
        profile.structure.label(),
        profile.method.label(),
        profile.level.label(),
        conditions.join(","),
        profile.weekly_frequency
    )
}

/// Stable signature of a check-in
pub fn check_in_signature(check_in: &DailyCheckIn) -> String {
    let areas: Vec<&str> = check_in.sore_areas.iter().map(|m| m.label()).collect();
    format!(
        "focus={};soreness={};areas={};energy={}",
        check_in.focus.label(),
        check_in.soreness.label(),
        areas.join(","),
        check_in.energy_level()
    )
}

/// Content hash identifying one composition request
///
/// Depends only on the normalised profile and check-in, the blueprint
/// schema version and the seed. Catalog content and wall-clock time do not
/// participate.
pub fn cache_key(
    profile: &UserProfile,
    check_in: &DailyCheckIn,
    schema_version: &str,
    seed: u64,
) -> String {
    let profile_sig = profile_signature(profile);
    let check_in_sig = check_in_signature(check_in);
    let seed = seed.to_string();

    let mut hasher = Sha256::new();
    for part in [
        CACHE_KEY_VERSION,
        profile_sig.as_str(),
        check_in_sig.as_str(),
        schema_version,
        seed.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Builds generation requests from blueprints
#[derive(Clone, Debug, Default)]
pub struct PromptAssembler {
    config: PromptConfig,
}

impl PromptAssembler {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        blueprint: &Blueprint,
        catalog: &[CatalogExercise],
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        recent_plans: &[WorkoutPlan],
    ) -> GenerationRequest {
        let prohibited = prohibited_exercises(recent_plans);
        let presented = self.present_catalog(blueprint, catalog);

        let system_text = system_text(blueprint, !prohibited.is_empty());
        let user_text = user_text(blueprint, &presented, profile, check_in, &prohibited);
        let cache_key = cache_key(profile, check_in, &blueprint.schema_version, blueprint.seed);

        tracing::debug!(
            "Assembled prompt: {} catalog entries, {} prohibited, key {}",
            presented.len(),
            prohibited.len(),
            cache_key
        );

        GenerationRequest {
            system_text,
            user_text,
            cache_key,
            metadata: PromptMetadata {
                goal: blueprint.goal,
                focus: blueprint.focus,
                seed: blueprint.seed,
                schema_version: blueprint.schema_version.clone(),
                catalog_entries: presented.len(),
                prohibited_exercises: prohibited,
            },
        }
    }

    /// Equipment-filtered catalog, shuffled by the blueprint seed and capped
    fn present_catalog<'a>(
        &self,
        blueprint: &Blueprint,
        catalog: &'a [CatalogExercise],
    ) -> Vec<&'a CatalogExercise> {
        let mut entries: Vec<&CatalogExercise> = catalog
            .iter()
            .filter(|e| blueprint.equipment.contains(&e.equipment))
            .collect();
        // Sort first so the shuffle is independent of the catalog's input order
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);

        let mut rng = ChaCha8Rng::seed_from_u64(blueprint.seed);
        entries.shuffle(&mut rng);
        entries.truncate(self.config.max_catalog_entries);
        entries
    }
}

/// Sorted, de-duplicated exercise names from recent plans
fn prohibited_exercises(recent_plans: &[WorkoutPlan]) -> Vec<String> {
    recent_plans
        .iter()
        .flat_map(|plan| plan.exercise_names())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn equipment_list(equipment: &BTreeSet<Equipment>) -> String {
    equipment
        .iter()
        .map(|e| e.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn muscle_list(muscles: &BTreeSet<MuscleGroup>) -> String {
    if muscles.is_empty() {
        return "none".to_string();
    }
    muscles
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn system_text(blueprint: &Blueprint, has_history: bool) -> String {
    let mut text = String::new();
    text.push_str(PERSONA);
    text.push_str("\n\n");
    text.push_str(goal_guidance(blueprint.goal));
    text.push_str("\n\n");
    let _ = writeln!(
        text,
        "Allowed equipment: {}. Never prescribe anything else.",
        equipment_list(&blueprint.equipment)
    );
    text.push_str(VERBATIM_NAMES);
    text.push('\n');
    if has_history {
        text.push_str(ANTI_REPETITION);
        text.push('\n');
    }
    text.push('\n');
    text.push_str(REPLY_SHAPE);
    text
}

fn user_text(
    blueprint: &Blueprint,
    catalog: &[&CatalogExercise],
    profile: &UserProfile,
    check_in: &DailyCheckIn,
    prohibited: &[String],
) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "Workout blueprint: {}", blueprint.title);
    let _ = writeln!(text, "Goal: {}", blueprint.goal.label());
    let _ = writeln!(text, "Focus: {}", blueprint.focus.label());
    let _ = writeln!(text, "Intensity: {}", blueprint.intensity.label());
    let _ = writeln!(text, "Estimated duration: {} minutes", blueprint.estimated_minutes);
    let _ = writeln!(
        text,
        "Recovery mode: {}",
        if blueprint.recovery_mode { "yes" } else { "no" }
    );
    let _ = writeln!(
        text,
        "Allowed equipment: {}",
        equipment_list(&blueprint.equipment)
    );

    text.push_str("\nPhases, in order:\n");
    for (i, block) in blueprint.blocks.iter().enumerate() {
        match block.guided {
            Some(spec) => {
                let _ = writeln!(
                    text,
                    "{}. {} \"{}\": guided {} activity for {} minutes",
                    i + 1,
                    block.kind.label(),
                    block.title,
                    spec.kind.label(),
                    spec.duration_minutes
                );
            }
            None => {
                let _ = writeln!(
                    text,
                    "{}. {} \"{}\": {} exercises; target {}; avoid {}; sets {}, reps {}, rest {} s, RPE {}",
                    i + 1,
                    block.kind.label(),
                    block.title,
                    block.exercise_count,
                    muscle_list(&block.target_muscles),
                    muscle_list(&block.avoid_muscles),
                    block.sets,
                    block.reps,
                    block.rest_seconds,
                    block.rpe
                );
            }
        }
    }

    text.push_str("\nExercise catalog (name, muscle group, equipment, difficulty):\n");
    for exercise in catalog {
        let _ = writeln!(
            text,
            "- {} ({}, {}, {})",
            exercise.name,
            exercise.muscle_group.label(),
            exercise.equipment.label(),
            exercise.difficulty.label()
        );
    }

    let conditions: Vec<&str> = profile.conditions.iter().map(|c| c.label()).collect();
    text.push_str("\nAthlete:\n");
    let _ = writeln!(
        text,
        "- level {}, method {}, {} sessions per week",
        profile.level.label(),
        profile.method.label(),
        profile.weekly_frequency
    );
    let _ = writeln!(
        text,
        "- health conditions: {}",
        if conditions.is_empty() {
            "none".to_string()
        } else {
            conditions.join(", ")
        }
    );
    let _ = writeln!(
        text,
        "- today: focus {}, soreness {}, sore areas {}, energy {}/10",
        check_in.focus.label(),
        check_in.soreness.label(),
        muscle_list(&check_in.sore_areas),
        check_in.energy_level()
    );

    if !prohibited.is_empty() {
        text.push_str("\nProhibited exercises (used in recent workouts, do not repeat):\n");
        for name in prohibited {
            let _ = writeln!(text, "- {}", name);
        }
    }

    text
}
