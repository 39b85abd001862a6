//! Deterministic local planner.
//!
//! Builds a blueprint-compliant plan straight from the catalog with no
//! network access. Used when generation fails, is disabled, or the caller
//! is offline.

use crate::catalog::is_compatible;
use crate::error::ComposerError;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeSet, HashSet};

/// Mixes the block index into the blueprint seed
const BLOCK_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFallbackComposer;

impl LocalFallbackComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose a plan for `blueprint` from `catalog`
    ///
    /// The primary block picks first, so it only fails when no compatible
    /// exercise exists at all. Other blocks take what is left, and blocks
    /// with no eligible exercises are omitted.
    pub fn compose(
        &self,
        catalog: &[CatalogExercise],
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        blueprint: &Blueprint,
    ) -> Result<WorkoutPlan, ComposerError> {
        let primary = blueprint.primary_block_index();
        let mut used: HashSet<&str> = HashSet::new();
        let mut filled: Vec<Option<PlanPhase>> = vec![None; blueprint.blocks.len()];

        // Sorted so selection does not depend on the catalog's input order
        let mut sorted: Vec<&CatalogExercise> = catalog.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let order = primary
            .into_iter()
            .chain((0..blueprint.blocks.len()).filter(|i| Some(*i) != primary));

        for index in order {
            let block = &blueprint.blocks[index];
            if let Some(guided) = block.guided {
                filled[index] = Some(PlanPhase {
                    kind: block.kind,
                    title: block.title.clone(),
                    content: PhaseContent::Activity {
                        activity: GuidedActivity {
                            kind: guided.kind,
                            title: block.title.clone(),
                            duration_minutes: guided.duration_minutes,
                            notes: None,
                        },
                    },
                });
                continue;
            }

            let mut avoid = block.avoid_muscles.clone();
            if blueprint.recovery_mode {
                avoid.extend(check_in.sore_areas.iter().copied());
            }

            let usable: Vec<&CatalogExercise> = sorted
                .iter()
                .copied()
                .filter(|e| is_compatible(e, &blueprint.equipment, profile.level))
                .filter(|e| !avoid.contains(&e.muscle_group))
                .filter(|e| !used.contains(e.name.as_str()))
                .collect();

            let mut eligible: Vec<&CatalogExercise> = usable
                .iter()
                .copied()
                .filter(|e| block.target_muscles.contains(&e.muscle_group))
                .collect();

            if eligible.is_empty() && Some(index) == primary {
                tracing::info!(
                    "No targeted exercises for {} block, widening to any compatible exercise",
                    block.kind
                );
                eligible = usable;
            }
            if eligible.is_empty() {
                if Some(index) == primary {
                    tracing::warn!("Fallback cannot fill primary {} block", block.kind);
                    return Err(ComposerError::NoCompatibleBlocks);
                }
                tracing::info!("Omitting {} block: no eligible exercises", block.kind);
                continue;
            }

            let seed = blueprint.seed ^ (index as u64 + 1).wrapping_mul(BLOCK_SEED_MIX);
            let chosen = select(eligible, block.exercise_count as usize, seed);

            let exercises: Vec<ExercisePrescription> = chosen
                .into_iter()
                .map(|exercise| {
                    used.insert(exercise.name.as_str());
                    ExercisePrescription {
                        name: exercise.name.clone(),
                        muscle_group: exercise.muscle_group,
                        equipment: exercise.equipment,
                        sets: block.sets.pick_for(profile.level),
                        reps: Bounds::exactly(block.reps.pick_for(profile.level)),
                        rest_seconds: rest_for(block.rest_seconds, profile.level),
                        tip: first_sentence(&exercise.instructions),
                    }
                })
                .collect();

            filled[index] = Some(PlanPhase {
                kind: block.kind,
                title: block.title.clone(),
                content: PhaseContent::Exercises { exercises },
            });
        }

        let phases: Vec<PlanPhase> = filled.into_iter().flatten().collect();

        let notes = if blueprint.recovery_mode {
            "Recovery session: keep every set comfortable and skip anything that aggravates soreness."
        } else {
            "Built offline from the exercise catalog."
        };

        let plan = WorkoutPlan {
            title: blueprint.title.clone(),
            focus: blueprint.focus,
            duration_minutes: blueprint.estimated_minutes,
            intensity: blueprint.intensity,
            phases,
            notes: Some(notes.to_string()),
        };
        tracing::debug!(
            "Fallback composed {:?} with {} exercises",
            plan.title,
            plan.exercise_count()
        );
        Ok(plan)
    }
}

/// Pick up to `count` exercises, spreading the choice across muscle groups
fn select(mut eligible: Vec<&CatalogExercise>, count: usize, seed: u64) -> Vec<&CatalogExercise> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    eligible.shuffle(&mut rng);

    // Group in shuffled order, then deal one per group per round
    let mut groups: Vec<(MuscleGroup, Vec<&CatalogExercise>)> = Vec::new();
    for exercise in eligible {
        match groups.iter_mut().find(|(m, _)| *m == exercise.muscle_group) {
            Some((_, list)) => list.push(exercise),
            None => groups.push((exercise.muscle_group, vec![exercise])),
        }
    }

    let mut chosen = Vec::with_capacity(count);
    let mut round = 0;
    while chosen.len() < count {
        let mut picked_any = false;
        for (_, list) in &groups {
            if let Some(exercise) = list.get(round) {
                picked_any = true;
                if chosen.len() < count {
                    chosen.push(*exercise);
                }
            }
        }
        if !picked_any {
            break;
        }
        round += 1;
    }
    chosen
}

/// Beginners rest longest, advanced athletes shortest
fn rest_for(rest: Bounds, level: ExperienceLevel) -> u32 {
    match level {
        ExperienceLevel::Beginner => rest.max,
        ExperienceLevel::Intermediate => rest.midpoint(),
        ExperienceLevel::Advanced => rest.min,
    }
}

fn first_sentence(instructions: &str) -> Option<String> {
    let trimmed = instructions.trim();
    if trimmed.is_empty() {
        return None;
    }
    let sentence = match trimmed.find(". ") {
        Some(end) => &trimmed[..=end],
        None => trimmed,
    };
    Some(sentence.to_string())
}

/// Muscles covered by a plan, used by callers that summarise fallback output
pub fn muscles_covered(plan: &WorkoutPlan) -> BTreeSet<MuscleGroup> {
    plan.phases
        .iter()
        .flat_map(|p| p.exercises().iter().map(|e| e.muscle_group))
        .collect()
}
