//! Validation of generative-service replies against a blueprint.
//!
//! Replies are semi-structured text. JSON is pulled out with a three-stage
//! scanner, then checked in a fixed order:
//! 1. phases present
//! 2. every phase kind recognised
//! 3. phase kinds fit the blueprint's sequence
//! 4. exercise counts within the target plus or minus slack
//! 5. sets, reps and rest inside the block's ranges
//! 6. exercise names known to the catalog
//!
//! Any failure rejects the whole reply.

use crate::config::{UnknownExercisePolicy, ValidationConfig};
use crate::error::ValidationError;
use crate::synonyms;
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Reply shape sent by the generative service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    #[serde(default)]
    title: String,
    #[serde(default)]
    phases: Vec<RawPhase>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPhase {
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    exercises: Vec<RawExercise>,
    #[serde(default)]
    activity: Option<RawActivity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExercise {
    name: String,
    #[serde(default)]
    muscle_group: Option<String>,
    #[serde(default)]
    equipment: Option<String>,
    sets: RawNumber,
    reps: RawNumber,
    rest_seconds: RawNumber,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivity {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    title: String,
    duration_minutes: RawNumber,
    #[serde(default)]
    notes: Option<String>,
}

/// Numbers arrive as integers, floats or text such as `"8-12"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u32),
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn range(&self) -> Option<Bounds> {
        match self {
            RawNumber::Int(n) => Some(Bounds::exactly(*n)),
            RawNumber::Float(f) if *f >= 0.0 && f.fract() == 0.0 => {
                Some(Bounds::exactly(*f as u32))
            }
            RawNumber::Float(_) => None,
            RawNumber::Text(text) => parse_range(text),
        }
    }

    fn single(&self) -> Option<u32> {
        self.range().filter(|b| b.min == b.max).map(|b| b.min)
    }

    fn describe(&self) -> String {
        match self {
            RawNumber::Int(n) => n.to_string(),
            RawNumber::Float(f) => f.to_string(),
            RawNumber::Text(t) => format!("{:?}", t),
        }
    }
}

fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parse `"8"`, `"8-12"`, `"8–12"` or `"8 to 12"` into bounds
fn parse_range(text: &str) -> Option<Bounds> {
    let normalized = text
        .trim()
        .to_lowercase()
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace(" to ", "-");

    let mut parts = normalized.splitn(2, '-');
    let low = leading_number(parts.next()?)?;
    let high = match parts.next() {
        Some(rest) => leading_number(rest)?,
        None => low,
    };
    (low <= high).then_some(Bounds::new(low, high))
}

/// Pull a JSON object out of free text
///
/// Tries the whole text, then the first fenced code block, then the first
/// balanced `{...}` span.
pub fn extract_json(text: &str) -> Result<Value, ValidationError> {
    if let Some(value) = parse_object(text) {
        return Ok(value);
    }
    if let Some(value) = fenced_block(text).and_then(parse_object) {
        tracing::debug!("Extracted reply JSON from fenced block");
        return Ok(value);
    }
    if let Some(value) = balanced_object(text).and_then(parse_object) {
        tracing::debug!("Extracted reply JSON from embedded object");
        return Ok(value);
    }

    let preview: String = text.chars().take(80).collect();
    Err(ValidationError::InvalidJson(format!(
        "no JSON object found in reply starting {:?}",
        preview
    )))
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .filter(Value::is_object)
}

/// Contents of the first ``` fenced block, without its language tag
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let after_fence = &text[start..];
    // Skip an info string such as `json`
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// First balanced `{...}` span, ignoring braces inside JSON strings
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Checks generative replies against a blueprint and the catalog
#[derive(Clone, Debug)]
pub struct ResponseValidator {
    config: ValidationConfig,
    /// Lowercased name to catalog entry
    catalog: HashMap<String, CatalogExercise>,
}

impl ResponseValidator {
    pub fn new(config: ValidationConfig, catalog: Vec<CatalogExercise>) -> Self {
        let catalog = catalog
            .into_iter()
            .map(|e| (e.name.trim().to_lowercase(), e))
            .collect();
        Self { config, catalog }
    }

    /// Validate a raw reply, returning the structured plan
    pub fn validate(&self, raw: &str, blueprint: &Blueprint) -> Result<WorkoutPlan, ValidationError> {
        let value = extract_json(raw)?;
        let reply: RawPlan = serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;

        if reply.phases.is_empty() {
            return Err(ValidationError::MissingPhases);
        }

        let mut kinds = Vec::with_capacity(reply.phases.len());
        for (index, phase) in reply.phases.iter().enumerate() {
            match synonyms::parse_phase_kind(&phase.kind) {
                Some(kind) => kinds.push(kind),
                None => {
                    return Err(ValidationError::UnknownPhaseKind {
                        index,
                        kind: phase.kind.clone(),
                    })
                }
            }
        }

        let mapping = self.map_phases(&kinds, blueprint)?;

        for (index, (phase, &block_index)) in reply.phases.iter().zip(&mapping).enumerate() {
            self.check_count(index, phase, &blueprint.blocks[block_index])?;
        }
        for (index, (phase, &block_index)) in reply.phases.iter().zip(&mapping).enumerate() {
            check_ranges(index, phase, &blueprint.blocks[block_index])?;
        }

        let mut phases = Vec::with_capacity(reply.phases.len());
        for (index, (phase, &block_index)) in reply.phases.into_iter().zip(&mapping).enumerate() {
            let block = &blueprint.blocks[block_index];
            phases.push(self.build_phase(index, phase, block)?);
        }

        let title = if reply.title.trim().is_empty() {
            blueprint.title.clone()
        } else {
            reply.title.trim().to_string()
        };

        Ok(WorkoutPlan {
            title,
            focus: blueprint.focus,
            duration_minutes: blueprint.estimated_minutes,
            intensity: blueprint.intensity,
            phases,
            notes: reply.notes.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Map each reply phase to a blueprint block, preserving order
    fn map_phases(
        &self,
        kinds: &[PhaseKind],
        blueprint: &Blueprint,
    ) -> Result<Vec<usize>, ValidationError> {
        let expected = blueprint.phase_kinds();
        let mismatch = || ValidationError::PhaseCountMismatch {
            expected: expected.iter().map(|k| k.label().to_string()).collect(),
            found: kinds.iter().map(|k| k.label().to_string()).collect(),
        };

        if self.config.strict_phase_count && kinds != expected.as_slice() {
            return Err(mismatch());
        }

        let mut mapping = Vec::with_capacity(kinds.len());
        let mut cursor = 0;
        for kind in kinds {
            let offset = expected[cursor..]
                .iter()
                .position(|k| k == kind)
                .ok_or_else(mismatch)?;
            mapping.push(cursor + offset);
            cursor += offset + 1;
        }

        if let Some(primary) = blueprint.primary_block_index() {
            if !mapping.contains(&primary) {
                return Err(mismatch());
            }
        }
        Ok(mapping)
    }

    fn check_count(
        &self,
        index: usize,
        phase: &RawPhase,
        block: &BlockBlueprint,
    ) -> Result<(), ValidationError> {
        let count = phase.exercises.len();
        if block.is_guided() && count == 0 {
            return Ok(());
        }

        let target = block.exercise_count as usize;
        let slack = self.config.exercise_count_slack as usize;
        let min = if block.is_guided() {
            0
        } else {
            target.saturating_sub(slack).max(1)
        };
        let max = target + slack;

        if count < min || count > max {
            return Err(ValidationError::ExerciseCountOutOfBounds {
                index,
                count,
                min,
                max,
            });
        }
        Ok(())
    }

    fn build_phase(
        &self,
        index: usize,
        phase: RawPhase,
        block: &BlockBlueprint,
    ) -> Result<PlanPhase, ValidationError> {
        let title = phase
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| block.title.clone());

        if phase.exercises.is_empty() {
            if let Some(spec) = block.guided {
                let activity = guided_activity(phase.activity, spec, &block.title);
                return Ok(PlanPhase {
                    kind: block.kind,
                    title,
                    content: PhaseContent::Activity { activity },
                });
            }
        }

        let submitted = phase.exercises.len();
        let mut exercises = Vec::with_capacity(submitted);
        for raw in phase.exercises {
            match self.catalog.get(&raw.name.trim().to_lowercase()) {
                Some(known) => exercises.push(prescription(raw, known)),
                None => {
                    tracing::warn!("Reply phase {} names unknown exercise {:?}", index, raw.name);
                }
            }
        }

        let dropped = submitted - exercises.len();
        let rejected = dropped > 0
            && self.config.unknown_exercise_policy == UnknownExercisePolicy::Reject;
        if exercises.is_empty() || rejected {
            let target = block.exercise_count as usize;
            let slack = self.config.exercise_count_slack as usize;
            return Err(ValidationError::ExerciseCountOutOfBounds {
                index,
                count: exercises.len(),
                min: target.saturating_sub(slack).max(1),
                max: target + slack,
            });
        }
        if dropped > 0 {
            tracing::info!("Dropped {} unknown exercises from phase {}", dropped, index);
        }

        Ok(PlanPhase {
            kind: block.kind,
            title,
            content: PhaseContent::Exercises { exercises },
        })
    }
}

fn check_ranges(index: usize, phase: &RawPhase, block: &BlockBlueprint) -> Result<(), ValidationError> {
    let violation = |exercise: &RawExercise, detail: String| ValidationError::RepRangeViolation {
        index,
        exercise: exercise.name.clone(),
        detail,
    };

    for exercise in &phase.exercises {
        match exercise.sets.single() {
            Some(sets) if block.sets.contains(sets) => {}
            _ => {
                return Err(violation(
                    exercise,
                    format!("sets {} outside {}", exercise.sets.describe(), block.sets),
                ))
            }
        }
        match exercise.reps.range() {
            Some(reps) if block.reps.covers(&reps) => {}
            _ => {
                return Err(violation(
                    exercise,
                    format!("reps {} outside {}", exercise.reps.describe(), block.reps),
                ))
            }
        }
        match exercise.rest_seconds.single() {
            Some(rest) if block.rest_seconds.contains(rest) => {}
            _ => {
                return Err(violation(
                    exercise,
                    format!(
                        "rest {} outside {} seconds",
                        exercise.rest_seconds.describe(),
                        block.rest_seconds
                    ),
                ))
            }
        }
    }
    Ok(())
}

/// Prescription using the catalog's canonical name, muscle group and equipment
///
/// Only called after `check_ranges` has accepted the numbers.
fn prescription(raw: RawExercise, known: &CatalogExercise) -> ExercisePrescription {
    if let Some(group) = raw.muscle_group.as_deref() {
        if synonyms::parse_muscle_group(group) != known.muscle_group {
            tracing::debug!(
                "Reply labels {} as {:?}; using catalog group {}",
                known.name,
                group,
                known.muscle_group
            );
        }
    }
    if let Some(equipment) = raw.equipment.as_deref() {
        if synonyms::parse_equipment(equipment) != known.equipment {
            tracing::debug!(
                "Reply labels {} equipment as {:?}; using catalog equipment {}",
                known.name,
                equipment,
                known.equipment
            );
        }
    }

    ExercisePrescription {
        name: known.name.clone(),
        muscle_group: known.muscle_group,
        equipment: known.equipment,
        sets: raw.sets.single().unwrap_or_default(),
        reps: raw.reps.range().unwrap_or(Bounds::exactly(0)),
        rest_seconds: raw.rest_seconds.single().unwrap_or_default(),
        tip: raw.notes.filter(|n| !n.trim().is_empty()),
    }
}

/// Activity from the reply, or from the block's guided settings when missing
fn guided_activity(
    raw: Option<RawActivity>,
    spec: GuidedActivitySpec,
    block_title: &str,
) -> GuidedActivity {
    match raw {
        Some(raw) => GuidedActivity {
            kind: if raw.kind.trim().is_empty() {
                spec.kind
            } else {
                synonyms::parse_activity_kind(&raw.kind)
            },
            title: if raw.title.trim().is_empty() {
                block_title.to_string()
            } else {
                raw.title
            },
            duration_minutes: raw
                .duration_minutes
                .single()
                .filter(|m| *m > 0)
                .unwrap_or(spec.duration_minutes),
            notes: raw.notes.filter(|n| !n.trim().is_empty()),
        },
        None => GuidedActivity {
            kind: spec.kind,
            title: block_title.to_string(),
            duration_minutes: spec.duration_minutes,
            notes: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::generate_blueprint_on;
    use crate::catalog::default_catalog;
    use crate::error::ValidationErrorKind;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn hypertrophy_blueprint() -> Blueprint {
        let profile = UserProfile {
            id: "athlete".into(),
            goal: Goal::Hypertrophy,
            structure: TrainingStructure::FullGym,
            method: TrainingMethod::Traditional,
            level: ExperienceLevel::Intermediate,
            conditions: BTreeSet::new(),
            weekly_frequency: 3,
        };
        let check_in = DailyCheckIn {
            focus: FocusArea::Upper,
            soreness: SorenessLevel::None,
            sore_areas: BTreeSet::new(),
            energy: 6,
        };
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        generate_blueprint_on(&profile, &check_in, Some(7), day)
    }

    fn validator() -> ResponseValidator {
        ResponseValidator::new(ValidationConfig::default(), default_catalog().to_vec())
    }

    const VALID_REPLY: &str = r#"{
        "title": "Upper Body Strength",
        "phases": [
            {"kind": "warmup", "exercises": [
                {"name": "Arm Circles", "muscleGroup": "shoulders", "equipment": "bodyweight", "sets": 1, "reps": "10", "restSeconds": 0}
            ]},
            {"kind": "strength", "exercises": [
                {"name": "Bench Press", "muscleGroup": "chest", "equipment": "barbell", "sets": 5, "reps": "5-8", "restSeconds": 180, "notes": "Pause on the chest"}
            ]}
        ]
    }"#;

    fn kind_of(result: Result<WorkoutPlan, ValidationError>) -> ValidationErrorKind {
        match result {
            Ok(plan) => panic!("expected failure, got plan {:?}", plan.title),
            Err(e) => e.kind(),
        }
    }

    #[test]
    fn test_valid_reply_produces_plan() {
        let bp = hypertrophy_blueprint();
        let plan = validator().validate(VALID_REPLY, &bp).unwrap();

        assert_eq!(plan.title, "Upper Body Strength");
        assert_eq!(plan.phases.len(), 2);
        assert_eq!(plan.phases[1].kind, PhaseKind::Strength);
        let bench = &plan.phases[1].exercises()[0];
        assert_eq!(bench.name, "Bench Press");
        assert_eq!(bench.sets, 5);
        assert_eq!(bench.reps, Bounds::new(5, 8));
        assert_eq!(bench.rest_seconds, 180);
        assert_eq!(bench.tip.as_deref(), Some("Pause on the chest"));
    }

    #[test]
    fn test_extract_json_from_prose() {
        let fenced = format!("Here is your workout:\n```json\n{}\n```\nEnjoy!", VALID_REPLY);
        assert!(extract_json(&fenced).is_ok());

        let embedded = format!("Sure! {} Let me know if you want changes.", VALID_REPLY);
        assert!(extract_json(&embedded).is_ok());

        let braces_in_strings = r#"Plan: {"title": "a } tricky { title", "phases": []} done"#;
        let value = extract_json(braces_in_strings).unwrap();
        assert_eq!(value["title"], "a } tricky { title");
    }

    #[test]
    fn test_non_json_is_invalid() {
        let bp = hypertrophy_blueprint();
        assert_eq!(
            kind_of(validator().validate("I cannot help with that.", &bp)),
            ValidationErrorKind::InvalidJson
        );
        assert_eq!(
            kind_of(validator().validate("{\"title\": \"unterminated\"", &bp)),
            ValidationErrorKind::InvalidJson
        );
    }

    #[test]
    fn test_empty_phases_is_missing_phases() {
        let bp = hypertrophy_blueprint();
        assert_eq!(
            kind_of(validator().validate(r#"{"title": "x", "phases": []}"#, &bp)),
            ValidationErrorKind::MissingPhases
        );
        assert_eq!(
            kind_of(validator().validate(r#"{"title": "x"}"#, &bp)),
            ValidationErrorKind::MissingPhases
        );
    }

    #[test]
    fn test_bogus_kind_is_unknown_phase_kind() {
        let bp = hypertrophy_blueprint();
        let reply = r#"{"title": "x", "phases": [{"kind": "bogus", "exercises": []}]}"#;
        let err = validator().validate(reply, &bp).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownPhaseKind {
                index: 0,
                kind: "bogus".into()
            }
        );
    }

    #[test]
    fn test_out_of_order_phases_mismatch() {
        let bp = hypertrophy_blueprint();
        let reply = r#"{"title": "x", "phases": [
            {"kind": "strength", "exercises": [{"name": "Bench Press", "sets": 4, "reps": "6-8", "restSeconds": 120}]},
            {"kind": "warmup", "exercises": [{"name": "Arm Circles", "sets": 1, "reps": 10, "restSeconds": 0}]}
        ]}"#;
        assert_eq!(
            kind_of(validator().validate(reply, &bp)),
            ValidationErrorKind::PhaseCountMismatch
        );
    }

    #[test]
    fn test_missing_primary_phase_mismatch() {
        let bp = hypertrophy_blueprint();
        let reply = r#"{"title": "x", "phases": [
            {"kind": "warmup", "exercises": [{"name": "Arm Circles", "sets": 1, "reps": 10, "restSeconds": 0}]}
        ]}"#;
        assert_eq!(
            kind_of(validator().validate(reply, &bp)),
            ValidationErrorKind::PhaseCountMismatch
        );
    }

    #[test]
    fn test_strict_phase_count_requires_every_phase() {
        let bp = hypertrophy_blueprint();
        let strict = ResponseValidator::new(
            ValidationConfig {
                strict_phase_count: true,
                ..ValidationConfig::default()
            },
            default_catalog().to_vec(),
        );
        assert_eq!(
            kind_of(strict.validate(VALID_REPLY, &bp)),
            ValidationErrorKind::PhaseCountMismatch
        );
    }

    #[test]
    fn test_too_many_exercises_out_of_bounds() {
        let bp = hypertrophy_blueprint();
        let exercise = r#"{"name": "Bench Press", "sets": 4, "reps": "6-8", "restSeconds": 120}"#;
        let reply = format!(
            r#"{{"title": "x", "phases": [{{"kind": "strength", "exercises": [{}]}}]}}"#,
            vec![exercise; 6].join(",")
        );
        let err = validator().validate(&reply, &bp).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ExerciseCountOutOfBounds {
                index: 0,
                count: 6,
                min: 1,
                max: 5
            }
        );
    }

    #[test]
    fn test_rep_range_violations() {
        let bp = hypertrophy_blueprint();
        for exercise in [
            r#"{"name": "Bench Press", "sets": 8, "reps": "6-8", "restSeconds": 120}"#,
            r#"{"name": "Bench Press", "sets": 4, "reps": "3-20", "restSeconds": 120}"#,
            r#"{"name": "Bench Press", "sets": 4, "reps": "AMRAP", "restSeconds": 120}"#,
            r#"{"name": "Bench Press", "sets": 4, "reps": "6-8", "restSeconds": 600}"#,
        ] {
            let reply = format!(
                r#"{{"title": "x", "phases": [{{"kind": "strength", "exercises": [{}]}}]}}"#,
                exercise
            );
            assert_eq!(
                kind_of(validator().validate(&reply, &bp)),
                ValidationErrorKind::RepRangeViolation,
                "{}",
                exercise
            );
        }
    }

    #[test]
    fn test_unknown_exercises_dropped_or_rejected() {
        let bp = hypertrophy_blueprint();
        let reply = r#"{"title": "x", "phases": [{"kind": "strength", "exercises": [
            {"name": "bench press", "sets": 4, "reps": "6 to 8", "restSeconds": 120},
            {"name": "Laser Curl", "sets": 4, "reps": "6-8", "restSeconds": 120}
        ]}]}"#;

        let plan = validator().validate(reply, &bp).unwrap();
        let names: Vec<_> = plan.exercise_names().collect();
        assert_eq!(names, vec!["Bench Press"]);

        let rejecting = ResponseValidator::new(
            ValidationConfig {
                unknown_exercise_policy: UnknownExercisePolicy::Reject,
                ..ValidationConfig::default()
            },
            default_catalog().to_vec(),
        );
        assert_eq!(
            kind_of(rejecting.validate(reply, &bp)),
            ValidationErrorKind::ExerciseCountOutOfBounds
        );

        let only_unknown = r#"{"title": "x", "phases": [{"kind": "strength", "exercises": [
            {"name": "Laser Curl", "sets": 4, "reps": "6-8", "restSeconds": 120}
        ]}]}"#;
        assert_eq!(
            kind_of(validator().validate(only_unknown, &bp)),
            ValidationErrorKind::ExerciseCountOutOfBounds
        );
    }

    #[test]
    fn test_guided_phase_uses_reply_activity_or_blueprint() {
        let bp = hypertrophy_blueprint();
        let reply = r#"{"title": "x", "phases": [
            {"kind": "strength", "exercises": [{"name": "Bench Press", "sets": 4, "reps": "6-8", "restSeconds": 120}]},
            {"kind": "cool-down", "activity": {"kind": "stretch", "title": "Easy Stretch", "durationMinutes": 7}}
        ]}"#;
        let plan = validator().validate(reply, &bp).unwrap();
        match &plan.phases[1].content {
            PhaseContent::Activity { activity } => {
                assert_eq!(activity.title, "Easy Stretch");
                assert_eq!(activity.duration_minutes, 7);
            }
            other => panic!("expected activity, got {:?}", other),
        }

        let bare = r#"{"title": "x", "phases": [
            {"kind": "strength", "exercises": [{"name": "Bench Press", "sets": 4, "reps": "6-8", "restSeconds": 120}]},
            {"kind": "cooldown"}
        ]}"#;
        let plan = validator().validate(bare, &bp).unwrap();
        match &plan.phases[1].content {
            PhaseContent::Activity { activity } => {
                assert_eq!(activity.kind, GuidedActivityKind::Stretching);
                assert_eq!(activity.duration_minutes, 5);
            }
            other => panic!("expected activity, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range("8"), Some(Bounds::exactly(8)));
        assert_eq!(parse_range("8-12"), Some(Bounds::new(8, 12)));
        assert_eq!(parse_range("8\u{2013}12"), Some(Bounds::new(8, 12)));
        assert_eq!(parse_range("8 to 12"), Some(Bounds::new(8, 12)));
        assert_eq!(parse_range("10 per side"), Some(Bounds::exactly(10)));
        assert_eq!(parse_range("12-8"), None);
        assert_eq!(parse_range("max"), None);
    }
}
