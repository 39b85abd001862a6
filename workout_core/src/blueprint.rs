//! Blueprint engine: the deterministic structural contract for one workout.
//!
//! A blueprint fixes the phases, exercise counts, set/rep/rest ranges and
//! equipment limits before any exercise is chosen. It is a pure function of
//! the profile, the check-in and the seed:
//! - The goal selects a phase template
//! - Soreness, energy and health conditions adjust intensity and recovery mode
//! - The training structure alone decides the equipment constraint
//!
//! Unsupported goal/focus combinations fall back to a full-body template so
//! generation never fails.

use crate::types::*;
use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Version tag folded into every cache key; bump when block semantics change
pub const BLUEPRINT_SCHEMA_VERSION: &str = "blueprint-v2";

/// Seconds of work assumed per set when estimating duration
const SECONDS_PER_SET: u32 = 40;

/// Phase that carries the main training stimulus for a goal
pub fn primary_phase_kind(goal: Goal) -> PhaseKind {
    match goal {
        Goal::Hypertrophy | Goal::Performance => PhaseKind::Strength,
        Goal::WeightLoss | Goal::Conditioning => PhaseKind::Conditioning,
        Goal::Endurance => PhaseKind::Aerobic,
    }
}

/// Which muscles a block draws from
#[derive(Clone, Copy, Debug)]
enum MuscleRole {
    Warmup,
    Primary,
    Secondary,
    Conditioning,
    Guided,
}

/// Static description of one block before personalisation
#[derive(Clone, Copy, Debug)]
struct BlockTemplate {
    kind: PhaseKind,
    title: &'static str,
    role: MuscleRole,
    /// Exercise count for beginner, intermediate, advanced
    counts: [u32; 3],
    sets: Bounds,
    reps: Bounds,
    rest: Bounds,
    rpe: u8,
    guided: Option<GuidedActivityKind>,
    /// Guided duration for beginner, intermediate, advanced
    minutes: [u32; 3],
}

const WARMUP: BlockTemplate = BlockTemplate {
    kind: PhaseKind::Warmup,
    title: "Dynamic Warm-up",
    role: MuscleRole::Warmup,
    counts: [2, 2, 2],
    sets: Bounds::new(1, 2),
    reps: Bounds::new(8, 15),
    rest: Bounds::new(0, 30),
    rpe: 4,
    guided: None,
    minutes: [0, 0, 0],
};

const fn guided(
    kind: PhaseKind,
    title: &'static str,
    activity: GuidedActivityKind,
    minutes: [u32; 3],
    rpe: u8,
) -> BlockTemplate {
    BlockTemplate {
        kind,
        title,
        role: MuscleRole::Guided,
        counts: [0, 0, 0],
        sets: Bounds::exactly(1),
        reps: Bounds::new(1, 30),
        rest: Bounds::new(0, 30),
        rpe,
        guided: Some(activity),
        minutes,
    }
}

const STRETCH_COOLDOWN: BlockTemplate = guided(
    PhaseKind::Cooldown,
    "Cooldown Stretch",
    GuidedActivityKind::Stretching,
    [5, 5, 5],
    2,
);

const MOBILITY_COOLDOWN: BlockTemplate = guided(
    PhaseKind::Cooldown,
    "Mobility Cooldown",
    GuidedActivityKind::Mobility,
    [5, 6, 8],
    2,
);

const WALK_COOLDOWN: BlockTemplate = guided(
    PhaseKind::Cooldown,
    "Walk and Breathe",
    GuidedActivityKind::Walk,
    [5, 5, 5],
    2,
);

const HYPERTROPHY: &[BlockTemplate] = &[
    WARMUP,
    BlockTemplate {
        kind: PhaseKind::Strength,
        title: "Strength",
        role: MuscleRole::Primary,
        counts: [2, 3, 4],
        sets: Bounds::new(3, 5),
        reps: Bounds::new(5, 12),
        rest: Bounds::new(90, 180),
        rpe: 8,
        guided: None,
        minutes: [0, 0, 0],
    },
    BlockTemplate {
        kind: PhaseKind::Accessory,
        title: "Accessory Work",
        role: MuscleRole::Secondary,
        counts: [2, 3, 3],
        sets: Bounds::new(2, 4),
        reps: Bounds::new(8, 15),
        rest: Bounds::new(45, 90),
        rpe: 7,
        guided: None,
        minutes: [0, 0, 0],
    },
    STRETCH_COOLDOWN,
];

const WEIGHT_LOSS: &[BlockTemplate] = &[
    WARMUP,
    BlockTemplate {
        kind: PhaseKind::Conditioning,
        title: "Conditioning Circuit",
        role: MuscleRole::Conditioning,
        counts: [4, 5, 6],
        sets: Bounds::new(2, 4),
        reps: Bounds::new(10, 20),
        rest: Bounds::new(15, 45),
        rpe: 7,
        guided: None,
        minutes: [0, 0, 0],
    },
    WALK_COOLDOWN,
];

const ENDURANCE: &[BlockTemplate] = &[
    WARMUP,
    guided(
        PhaseKind::Aerobic,
        "Steady Aerobic Block",
        GuidedActivityKind::SteadyCardio,
        [15, 20, 25],
        6,
    ),
    BlockTemplate {
        kind: PhaseKind::Accessory,
        title: "Muscular Endurance",
        role: MuscleRole::Primary,
        counts: [2, 3, 4],
        sets: Bounds::new(2, 3),
        reps: Bounds::new(12, 20),
        rest: Bounds::new(30, 60),
        rpe: 6,
        guided: None,
        minutes: [0, 0, 0],
    },
    STRETCH_COOLDOWN,
];

const CONDITIONING: &[BlockTemplate] = &[
    WARMUP,
    BlockTemplate {
        kind: PhaseKind::Conditioning,
        title: "Metabolic Circuit",
        role: MuscleRole::Conditioning,
        counts: [3, 4, 5],
        sets: Bounds::new(3, 4),
        reps: Bounds::new(8, 15),
        rest: Bounds::new(20, 60),
        rpe: 8,
        guided: None,
        minutes: [0, 0, 0],
    },
    BlockTemplate {
        kind: PhaseKind::Finisher,
        title: "Finisher",
        role: MuscleRole::Conditioning,
        counts: [1, 1, 2],
        sets: Bounds::new(1, 2),
        reps: Bounds::new(10, 20),
        rest: Bounds::new(0, 30),
        rpe: 9,
        guided: None,
        minutes: [0, 0, 0],
    },
    MOBILITY_COOLDOWN,
];

const PERFORMANCE: &[BlockTemplate] = &[
    WARMUP,
    BlockTemplate {
        kind: PhaseKind::Strength,
        title: "Explosive Power",
        role: MuscleRole::Primary,
        counts: [2, 3, 3],
        sets: Bounds::new(3, 5),
        reps: Bounds::new(3, 6),
        rest: Bounds::new(120, 180),
        rpe: 8,
        guided: None,
        minutes: [0, 0, 0],
    },
    BlockTemplate {
        kind: PhaseKind::Conditioning,
        title: "Functional Circuit",
        role: MuscleRole::Conditioning,
        counts: [2, 3, 4],
        sets: Bounds::new(2, 4),
        reps: Bounds::new(6, 12),
        rest: Bounds::new(45, 90),
        rpe: 7,
        guided: None,
        minutes: [0, 0, 0],
    },
    MOBILITY_COOLDOWN,
];

/// Full-body, moderate, four-phase template used for unsupported combinations
const DEFAULT_TEMPLATE: &[BlockTemplate] = &[
    WARMUP,
    BlockTemplate {
        kind: PhaseKind::Strength,
        title: "Strength",
        role: MuscleRole::Primary,
        counts: [2, 3, 3],
        sets: Bounds::new(2, 4),
        reps: Bounds::new(8, 12),
        rest: Bounds::new(60, 120),
        rpe: 7,
        guided: None,
        minutes: [0, 0, 0],
    },
    BlockTemplate {
        kind: PhaseKind::Accessory,
        title: "Accessory Work",
        role: MuscleRole::Secondary,
        counts: [2, 2, 3],
        sets: Bounds::new(2, 3),
        reps: Bounds::new(10, 15),
        rest: Bounds::new(45, 90),
        rpe: 6,
        guided: None,
        minutes: [0, 0, 0],
    },
    STRETCH_COOLDOWN,
];

fn template_for(goal: Goal) -> &'static [BlockTemplate] {
    match goal {
        Goal::Hypertrophy => HYPERTROPHY,
        Goal::WeightLoss => WEIGHT_LOSS,
        Goal::Endurance => ENDURANCE,
        Goal::Conditioning => CONDITIONING,
        Goal::Performance => PERFORMANCE,
    }
}

fn goal_title(goal: Goal) -> &'static str {
    match goal {
        Goal::Hypertrophy => "Hypertrophy",
        Goal::WeightLoss => "Fat Burn",
        Goal::Endurance => "Endurance",
        Goal::Conditioning => "Conditioning",
        Goal::Performance => "Performance",
    }
}

fn base_intensity(goal: Goal) -> Intensity {
    match goal {
        Goal::Hypertrophy | Goal::Endurance => Intensity::Moderate,
        Goal::WeightLoss | Goal::Conditioning | Goal::Performance => Intensity::High,
    }
}

/// Strength-oriented goals have no sensible cardio-only template
fn is_supported(goal: Goal, focus: FocusArea) -> bool {
    !(matches!(goal, Goal::Hypertrophy | Goal::Performance) && focus == FocusArea::Cardio)
}

fn level_index(level: ExperienceLevel) -> usize {
    match level {
        ExperienceLevel::Beginner => 0,
        ExperienceLevel::Intermediate => 1,
        ExperienceLevel::Advanced => 2,
    }
}

/// Derive the variation seed for a profile, check-in and calendar day
///
/// The same inputs on the same day always give the same seed; the next day
/// gives a different one.
pub fn derive_seed(profile: &UserProfile, check_in: &DailyCheckIn, day: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(profile.id.as_bytes());
    for part in [
        profile.goal.label(),
        profile.structure.label(),
        profile.level.label(),
        check_in.focus.label(),
        check_in.soreness.label(),
    ] {
        hasher.update(b"|");
        hasher.update(part.as_bytes());
    }
    hasher.update(b"|");
    hasher.update(day.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// True when soreness is high and concentrated on what the user wants to train
pub fn needs_recovery(check_in: &DailyCheckIn) -> bool {
    let focus_muscles: BTreeSet<MuscleGroup> = check_in
        .focus
        .primary_muscles()
        .union(&check_in.focus.secondary_muscles())
        .copied()
        .collect();
    let concentrated = check_in
        .sore_areas
        .iter()
        .any(|m| *m == MuscleGroup::FullBody || focus_muscles.contains(m));

    match check_in.soreness {
        SorenessLevel::Severe => check_in.sore_areas.is_empty() || concentrated,
        SorenessLevel::Moderate => concentrated,
        SorenessLevel::None | SorenessLevel::Light => false,
    }
}

/// Generate a blueprint, deriving the seed from today's date when omitted
pub fn generate_blueprint(
    profile: &UserProfile,
    check_in: &DailyCheckIn,
    seed: Option<u64>,
) -> Blueprint {
    generate_blueprint_on(profile, check_in, seed, Utc::now().date_naive())
}

/// Generate a blueprint as of a specific calendar day
pub fn generate_blueprint_on(
    profile: &UserProfile,
    check_in: &DailyCheckIn,
    seed: Option<u64>,
    day: NaiveDate,
) -> Blueprint {
    let seed = seed.unwrap_or_else(|| derive_seed(profile, check_in, day));
    let supported = is_supported(profile.goal, check_in.focus);

    let (focus, templates, mut intensity) = if supported {
        (
            check_in.focus,
            template_for(profile.goal),
            base_intensity(profile.goal),
        )
    } else {
        tracing::info!(
            "Unsupported combination {} / {}, using full-body default template",
            profile.goal,
            check_in.focus
        );
        (FocusArea::FullBody, DEFAULT_TEMPLATE, Intensity::Moderate)
    };

    let recovery_mode = needs_recovery(check_in);
    let energy = check_in.energy_level();
    let capped = profile
        .conditions
        .iter()
        .any(|c| matches!(c, HealthCondition::Hypertension | HealthCondition::Pregnancy));

    if supported {
        if energy <= 3 {
            intensity = intensity.lowered();
        } else if energy >= 8 && check_in.soreness == SorenessLevel::None {
            intensity = intensity.raised();
        }
    }
    if recovery_mode {
        tracing::info!(
            "Recovery mode: {} soreness in {:?}",
            check_in.soreness,
            check_in.sore_areas
        );
        intensity = Intensity::Low;
    }
    if capped {
        intensity = intensity.min(Intensity::Moderate);
    }

    let blocks: Vec<BlockBlueprint> = templates
        .iter()
        .map(|template| build_block(template, focus, profile, check_in, recovery_mode, capped))
        .collect();

    let mut estimated_minutes = estimate_minutes(&blocks);
    if energy <= 3 || recovery_mode {
        estimated_minutes = (estimated_minutes * 4 / 5).max(10);
    }

    let mut title = format!("{} {}", focus.display_name(), goal_title(profile.goal));
    if recovery_mode {
        title.push_str(" (Recovery)");
    }

    let blueprint = Blueprint {
        title,
        focus,
        goal: profile.goal,
        structure: profile.structure,
        level: profile.level,
        intensity,
        estimated_minutes,
        seed,
        recovery_mode,
        schema_version: BLUEPRINT_SCHEMA_VERSION.to_string(),
        blocks,
        equipment: profile.structure.allowed_equipment(),
    };

    tracing::debug!(
        "Generated blueprint {:?}: {:?}, {} minutes, seed {}",
        blueprint.title,
        blueprint.phase_kinds(),
        blueprint.estimated_minutes,
        blueprint.seed
    );
    blueprint
}

fn build_block(
    template: &BlockTemplate,
    focus: FocusArea,
    profile: &UserProfile,
    check_in: &DailyCheckIn,
    recovery_mode: bool,
    capped: bool,
) -> BlockBlueprint {
    let level = level_index(profile.level);
    let working = template.guided.is_none() && template.kind != PhaseKind::Warmup;

    let mut target_muscles: BTreeSet<MuscleGroup> = match template.role {
        MuscleRole::Warmup => {
            let mut muscles = focus.primary_muscles();
            muscles.insert(MuscleGroup::Cardio);
            muscles
        }
        MuscleRole::Primary => focus.primary_muscles(),
        MuscleRole::Secondary => focus.secondary_muscles(),
        MuscleRole::Conditioning => {
            let mut muscles = focus.primary_muscles();
            muscles.insert(MuscleGroup::FullBody);
            muscles.insert(MuscleGroup::Cardio);
            muscles
        }
        MuscleRole::Guided => BTreeSet::new(),
    };

    let mut avoid_muscles = BTreeSet::new();
    if recovery_mode {
        avoid_muscles.extend(check_in.sore_areas.iter().copied());
    }
    if profile.conditions.contains(&HealthCondition::LowerBackPain) {
        avoid_muscles.insert(MuscleGroup::LowerBack);
    }
    if profile.conditions.contains(&HealthCondition::KneePain)
        && matches!(template.kind, PhaseKind::Conditioning | PhaseKind::Finisher)
    {
        avoid_muscles.insert(MuscleGroup::Quadriceps);
    }
    target_muscles.retain(|m| !avoid_muscles.contains(m));

    let mut exercise_count = template.counts[level];
    if recovery_mode && exercise_count > 1 {
        exercise_count -= 1;
    }

    let mut sets = template.sets;
    if working && profile.weekly_frequency >= 5 && sets.max > sets.min {
        sets.max -= 1;
    }

    let mut rest = template.rest;
    if working && matches!(profile.method, TrainingMethod::Circuit | TrainingMethod::Hiit) {
        rest.max = (rest.max / 2).max(rest.min);
    }

    let mut rpe = template.rpe;
    if recovery_mode {
        rpe = rpe.saturating_sub(2).max(1);
    }
    if capped {
        rpe = rpe.min(7);
    }

    let title = match template.role {
        MuscleRole::Primary if template.title == "Strength" => {
            format!("{} Strength", focus.display_name())
        }
        _ => template.title.to_string(),
    };

    BlockBlueprint {
        kind: template.kind,
        title,
        exercise_count,
        target_muscles,
        avoid_muscles,
        sets,
        reps: template.reps,
        rest_seconds: rest,
        rpe,
        guided: template.guided.map(|kind| GuidedActivitySpec {
            kind,
            duration_minutes: template.minutes[level],
        }),
    }
}

fn estimate_minutes(blocks: &[BlockBlueprint]) -> u32 {
    let seconds: u32 = blocks
        .iter()
        .map(|block| match block.guided {
            Some(spec) => spec.duration_minutes * 60,
            None => {
                block.exercise_count
                    * block.sets.midpoint()
                    * (SECONDS_PER_SET + block.rest_seconds.midpoint())
            }
        })
        .sum();
    seconds.div_ceil(60).max(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(goal: Goal, structure: TrainingStructure, level: ExperienceLevel) -> UserProfile {
        UserProfile {
            id: "user-1".into(),
            goal,
            structure,
            method: TrainingMethod::Traditional,
            level,
            conditions: BTreeSet::new(),
            weekly_frequency: 3,
        }
    }

    fn check_in(focus: FocusArea, soreness: SorenessLevel) -> DailyCheckIn {
        DailyCheckIn {
            focus,
            soreness,
            sore_areas: BTreeSet::new(),
            energy: 6,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    const ALL_GOALS: [Goal; 5] = [
        Goal::Hypertrophy,
        Goal::WeightLoss,
        Goal::Endurance,
        Goal::Conditioning,
        Goal::Performance,
    ];

    #[test]
    fn test_same_inputs_give_identical_blueprints() {
        let p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Intermediate);
        let c = check_in(FocusArea::Upper, SorenessLevel::None);

        let first = generate_blueprint_on(&p, &c, Some(42), day(1));
        let second = generate_blueprint_on(&p, &c, Some(42), day(1));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_derived_seed_is_stable_within_a_day() {
        let p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Intermediate);
        let c = check_in(FocusArea::Upper, SorenessLevel::None);

        assert_eq!(derive_seed(&p, &c, day(1)), derive_seed(&p, &c, day(1)));
        assert_ne!(derive_seed(&p, &c, day(1)), derive_seed(&p, &c, day(2)));

        let bp = generate_blueprint_on(&p, &c, None, day(1));
        assert_eq!(bp.seed, derive_seed(&p, &c, day(1)));
    }

    #[test]
    fn test_hypertrophy_template() {
        let p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Intermediate);
        let bp = generate_blueprint_on(&p, &check_in(FocusArea::Upper, SorenessLevel::None), Some(1), day(1));

        assert_eq!(
            bp.phase_kinds(),
            vec![
                PhaseKind::Warmup,
                PhaseKind::Strength,
                PhaseKind::Accessory,
                PhaseKind::Cooldown
            ]
        );
        assert_eq!(bp.blocks[1].title, "Upper Body Strength");
        assert_eq!(bp.blocks[1].exercise_count, 3);
        assert!(bp.blocks[3].is_guided());
        assert_eq!(bp.schema_version, BLUEPRINT_SCHEMA_VERSION);
        assert!(!bp.recovery_mode);
    }

    #[test]
    fn test_weight_loss_template() {
        let p = profile(Goal::WeightLoss, TrainingStructure::HomeGym, ExperienceLevel::Beginner);
        let bp = generate_blueprint_on(&p, &check_in(FocusArea::FullBody, SorenessLevel::Light), Some(1), day(1));

        assert_eq!(
            bp.phase_kinds(),
            vec![PhaseKind::Warmup, PhaseKind::Conditioning, PhaseKind::Cooldown]
        );
        assert_eq!(bp.blocks[1].title, "Conditioning Circuit");
    }

    #[test]
    fn test_performance_template() {
        let p = profile(Goal::Performance, TrainingStructure::FullGym, ExperienceLevel::Advanced);
        let bp = generate_blueprint_on(&p, &check_in(FocusArea::Lower, SorenessLevel::None), Some(1), day(1));

        let titles: Vec<_> = bp.blocks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Dynamic Warm-up", "Explosive Power", "Functional Circuit", "Mobility Cooldown"]
        );
    }

    #[test]
    fn test_equipment_follows_structure_only() {
        let p = profile(Goal::Conditioning, TrainingStructure::Bodyweight, ExperienceLevel::Advanced);
        let bp = generate_blueprint_on(&p, &check_in(FocusArea::Core, SorenessLevel::None), Some(9), day(1));

        assert_eq!(bp.equipment, BTreeSet::from([Equipment::Bodyweight]));

        for structure in [
            TrainingStructure::FullGym,
            TrainingStructure::HomeGym,
            TrainingStructure::Dumbbells,
            TrainingStructure::Outdoor,
        ] {
            let p = profile(Goal::Conditioning, structure, ExperienceLevel::Advanced);
            let bp = generate_blueprint_on(&p, &check_in(FocusArea::Core, SorenessLevel::None), Some(9), day(1));
            assert!(bp.equipment.is_subset(&structure.allowed_equipment()));
        }
    }

    #[test]
    fn test_severe_soreness_on_focus_triggers_recovery() {
        let p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Intermediate);
        let mut c = check_in(FocusArea::Upper, SorenessLevel::Severe);
        c.sore_areas.insert(MuscleGroup::Chest);

        let normal = generate_blueprint_on(
            &p,
            &check_in(FocusArea::Upper, SorenessLevel::None),
            Some(3),
            day(1),
        );
        let bp = generate_blueprint_on(&p, &c, Some(3), day(1));

        assert!(bp.recovery_mode);
        assert_eq!(bp.intensity, Intensity::Low);
        assert_eq!(bp.phase_kinds(), normal.phase_kinds());
        for (block, base) in bp.blocks.iter().zip(&normal.blocks) {
            assert!(block.avoid_muscles.contains(&MuscleGroup::Chest));
            assert!(!block.target_muscles.contains(&MuscleGroup::Chest));
            if !block.is_guided() && base.exercise_count > 1 {
                assert_eq!(block.exercise_count, base.exercise_count - 1);
            }
        }
    }

    #[test]
    fn test_soreness_elsewhere_does_not_trigger_recovery() {
        let p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Intermediate);
        let mut c = check_in(FocusArea::Upper, SorenessLevel::Moderate);
        c.sore_areas.insert(MuscleGroup::Calves);

        let bp = generate_blueprint_on(&p, &c, Some(3), day(1));
        assert!(!bp.recovery_mode);
        assert!(bp.blocks.iter().all(|b| b.avoid_muscles.is_empty()));
    }

    #[test]
    fn test_unsupported_combination_uses_default_template() {
        let p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Beginner);
        let bp = generate_blueprint_on(&p, &check_in(FocusArea::Cardio, SorenessLevel::None), Some(5), day(1));

        assert_eq!(bp.focus, FocusArea::FullBody);
        assert_eq!(bp.intensity, Intensity::Moderate);
        assert_eq!(bp.blocks.len(), 4);
        assert_eq!(bp.blocks[1].title, "Full Body Strength");
    }

    #[test]
    fn test_every_exercise_block_has_at_least_one_exercise() {
        for goal in ALL_GOALS {
            for level in [
                ExperienceLevel::Beginner,
                ExperienceLevel::Intermediate,
                ExperienceLevel::Advanced,
            ] {
                for soreness in [SorenessLevel::None, SorenessLevel::Severe] {
                    let p = profile(goal, TrainingStructure::HomeGym, level);
                    let bp = generate_blueprint_on(&p, &check_in(FocusArea::Lower, soreness), Some(11), day(1));
                    for block in &bp.blocks {
                        assert!(
                            block.is_guided() || block.exercise_count >= 1,
                            "{:?} block {:?} has no exercises",
                            goal,
                            block.kind
                        );
                        assert!(block.sets.min <= block.sets.max);
                        assert!(block.rest_seconds.min <= block.rest_seconds.max);
                    }
                }
            }
        }
    }

    #[test]
    fn test_seed_never_changes_shape() {
        for goal in ALL_GOALS {
            let p = profile(goal, TrainingStructure::FullGym, ExperienceLevel::Intermediate);
            let c = check_in(FocusArea::Lower, SorenessLevel::Light);
            let a = generate_blueprint_on(&p, &c, Some(1), day(1));
            let b = generate_blueprint_on(&p, &c, Some(2), day(1));
            assert_eq!(a.phase_kinds(), b.phase_kinds());
            let counts = |bp: &Blueprint| bp.blocks.iter().map(|b| b.exercise_count).collect::<Vec<_>>();
            assert_eq!(counts(&a), counts(&b));
        }
    }

    #[test]
    fn test_hypertension_caps_intensity_and_rpe() {
        let mut p = profile(Goal::Conditioning, TrainingStructure::FullGym, ExperienceLevel::Advanced);
        p.conditions.insert(HealthCondition::Hypertension);
        let mut c = check_in(FocusArea::FullBody, SorenessLevel::None);
        c.energy = 10;

        let bp = generate_blueprint_on(&p, &c, Some(1), day(1));
        assert_eq!(bp.intensity, Intensity::Moderate);
        assert!(bp.blocks.iter().all(|b| b.rpe <= 7));
    }

    #[test]
    fn test_lower_back_pain_avoids_lower_back() {
        let mut p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Beginner);
        p.conditions.insert(HealthCondition::LowerBackPain);

        let bp = generate_blueprint_on(&p, &check_in(FocusArea::Core, SorenessLevel::None), Some(1), day(1));
        assert!(bp
            .blocks
            .iter()
            .all(|b| b.avoid_muscles.contains(&MuscleGroup::LowerBack)
                && !b.target_muscles.contains(&MuscleGroup::LowerBack)));
    }

    #[test]
    fn test_low_energy_lowers_intensity() {
        let p = profile(Goal::WeightLoss, TrainingStructure::HomeGym, ExperienceLevel::Beginner);
        let mut c = check_in(FocusArea::FullBody, SorenessLevel::None);
        c.energy = 2;

        let tired = generate_blueprint_on(&p, &c, Some(1), day(1));
        c.energy = 6;
        let normal = generate_blueprint_on(&p, &c, Some(1), day(1));

        assert_eq!(tired.intensity, Intensity::Moderate);
        assert_eq!(normal.intensity, Intensity::High);
        assert!(tired.estimated_minutes < normal.estimated_minutes);
    }

    #[test]
    fn test_circuit_method_shortens_rest() {
        let mut p = profile(Goal::Hypertrophy, TrainingStructure::FullGym, ExperienceLevel::Intermediate);
        p.method = TrainingMethod::Circuit;
        let bp = generate_blueprint_on(&p, &check_in(FocusArea::Upper, SorenessLevel::None), Some(1), day(1));

        assert_eq!(bp.blocks[1].rest_seconds, Bounds::new(90, 90));
        assert_eq!(bp.blocks[0].rest_seconds, Bounds::new(0, 30));
    }
}
