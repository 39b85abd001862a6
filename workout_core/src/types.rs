//! Core domain types for the workout composition engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Profile and daily check-in inputs
//! - Catalog exercises and their classification enums
//! - Blueprints (the structural contract for one workout)
//! - Workout plans (the final artifact)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Classification Enums
// ============================================================================

/// Training goal of the user
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Hypertrophy,
    WeightLoss,
    Endurance,
    Conditioning,
    Performance,
}

impl Goal {
    pub fn label(self) -> &'static str {
        match self {
            Goal::Hypertrophy => "hypertrophy",
            Goal::WeightLoss => "weight_loss",
            Goal::Endurance => "endurance",
            Goal::Conditioning => "conditioning",
            Goal::Performance => "performance",
        }
    }
}

/// Where (and with what) the user trains
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStructure {
    FullGym,
    HomeGym,
    Dumbbells,
    Bodyweight,
    Outdoor,
}

impl TrainingStructure {
    pub fn label(self) -> &'static str {
        match self {
            TrainingStructure::FullGym => "full_gym",
            TrainingStructure::HomeGym => "home_gym",
            TrainingStructure::Dumbbells => "dumbbells",
            TrainingStructure::Bodyweight => "bodyweight",
            TrainingStructure::Outdoor => "outdoor",
        }
    }

    /// Equipment a user with this structure can use.
    ///
    /// Every blueprint's equipment constraint is derived from this and nothing else.
    pub fn allowed_equipment(self) -> BTreeSet<Equipment> {
        use Equipment::*;
        let items: &[Equipment] = match self {
            TrainingStructure::FullGym => &[
                Barbell, Dumbbell, Kettlebell, Machine, Cable, Bands, PullupBar, Bench,
                CardioMachine, Bodyweight,
            ],
            TrainingStructure::HomeGym => {
                &[Dumbbell, Kettlebell, Bands, PullupBar, Bench, Bodyweight]
            }
            TrainingStructure::Dumbbells => &[Dumbbell, Bodyweight],
            TrainingStructure::Bodyweight => &[Bodyweight],
            TrainingStructure::Outdoor => &[Bodyweight, PullupBar],
        };
        items.iter().copied().collect()
    }
}

/// Equipment class of a catalog exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Machine,
    Cable,
    Bands,
    PullupBar,
    Bench,
    CardioMachine,
    Bodyweight,
}

impl Equipment {
    pub fn label(self) -> &'static str {
        match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Kettlebell => "kettlebell",
            Equipment::Machine => "machine",
            Equipment::Cable => "cable",
            Equipment::Bands => "bands",
            Equipment::PullupBar => "pullup_bar",
            Equipment::Bench => "bench",
            Equipment::CardioMachine => "cardio_machine",
            Equipment::Bodyweight => "bodyweight",
        }
    }
}

/// Preferred way of training
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMethod {
    Traditional,
    Circuit,
    Hiit,
}

impl TrainingMethod {
    pub fn label(self) -> &'static str {
        match self {
            TrainingMethod::Traditional => "traditional",
            TrainingMethod::Circuit => "circuit",
            TrainingMethod::Hiit => "hiit",
        }
    }
}

/// Experience level, ordered from least to most experienced
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

/// Health conditions that constrain programming
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    Hypertension,
    Pregnancy,
    LowerBackPain,
    KneePain,
    Other,
}

impl HealthCondition {
    pub fn label(self) -> &'static str {
        match self {
            HealthCondition::Hypertension => "hypertension",
            HealthCondition::Pregnancy => "pregnancy",
            HealthCondition::LowerBackPain => "lower_back_pain",
            HealthCondition::KneePain => "knee_pain",
            HealthCondition::Other => "other",
        }
    }
}

/// Body region the user wants to train today
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Upper,
    Lower,
    FullBody,
    Core,
    Cardio,
}

impl FocusArea {
    pub fn label(self) -> &'static str {
        match self {
            FocusArea::Upper => "upper",
            FocusArea::Lower => "lower",
            FocusArea::FullBody => "full_body",
            FocusArea::Core => "core",
            FocusArea::Cardio => "cardio",
        }
    }

    /// Human-readable name used in titles
    pub fn display_name(self) -> &'static str {
        match self {
            FocusArea::Upper => "Upper Body",
            FocusArea::Lower => "Lower Body",
            FocusArea::FullBody => "Full Body",
            FocusArea::Core => "Core",
            FocusArea::Cardio => "Cardio",
        }
    }

    /// Large muscle groups trained by the main working block
    pub fn primary_muscles(self) -> BTreeSet<MuscleGroup> {
        use MuscleGroup::*;
        let items: &[MuscleGroup] = match self {
            FocusArea::Upper => &[Chest, Back, Shoulders],
            FocusArea::Lower => &[Quadriceps, Hamstrings, Glutes],
            FocusArea::FullBody => &[Chest, Back, Quadriceps, Glutes],
            FocusArea::Core => &[Core, LowerBack],
            FocusArea::Cardio => &[FullBody, Cardio],
        };
        items.iter().copied().collect()
    }

    /// Smaller muscle groups trained by accessory work
    pub fn secondary_muscles(self) -> BTreeSet<MuscleGroup> {
        use MuscleGroup::*;
        let items: &[MuscleGroup] = match self {
            FocusArea::Upper => &[Biceps, Triceps, Shoulders],
            FocusArea::Lower => &[Glutes, Calves, Hamstrings],
            FocusArea::FullBody => &[Shoulders, Hamstrings, Core],
            FocusArea::Core => &[Core, Glutes],
            FocusArea::Cardio => &[Core, Quadriceps],
        };
        items.iter().copied().collect()
    }
}

/// Self-reported soreness, ordered from none to severe
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SorenessLevel {
    None,
    Light,
    Moderate,
    Severe,
}

impl SorenessLevel {
    pub fn label(self) -> &'static str {
        match self {
            SorenessLevel::None => "none",
            SorenessLevel::Light => "light",
            SorenessLevel::Moderate => "moderate",
            SorenessLevel::Severe => "severe",
        }
    }
}

/// Muscle group an exercise primarily trains
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quadriceps,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    LowerBack,
    FullBody,
    Cardio,
}

impl MuscleGroup {
    pub fn label(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Quadriceps => "quadriceps",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
            MuscleGroup::Core => "core",
            MuscleGroup::LowerBack => "lower_back",
            MuscleGroup::FullBody => "full_body",
            MuscleGroup::Cardio => "cardio",
        }
    }
}

/// Kind of a workout phase
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Warmup,
    Strength,
    Accessory,
    Conditioning,
    Aerobic,
    Finisher,
    Cooldown,
}

impl PhaseKind {
    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Warmup => "warmup",
            PhaseKind::Strength => "strength",
            PhaseKind::Accessory => "accessory",
            PhaseKind::Conditioning => "conditioning",
            PhaseKind::Aerobic => "aerobic",
            PhaseKind::Finisher => "finisher",
            PhaseKind::Cooldown => "cooldown",
        }
    }
}

/// Session intensity, ordered from low to high
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

impl Intensity {
    pub fn label(self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Moderate => "moderate",
            Intensity::High => "high",
        }
    }

    /// One step lower, saturating at `Low`
    pub fn lowered(self) -> Self {
        match self {
            Intensity::High => Intensity::Moderate,
            _ => Intensity::Low,
        }
    }

    /// One step higher, saturating at `High`
    pub fn raised(self) -> Self {
        match self {
            Intensity::Low => Intensity::Moderate,
            _ => Intensity::High,
        }
    }
}

/// Kind of a guided (non-exercise) activity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GuidedActivityKind {
    Mobility,
    Stretching,
    Breathing,
    Walk,
    SteadyCardio,
}

impl GuidedActivityKind {
    pub fn label(self) -> &'static str {
        match self {
            GuidedActivityKind::Mobility => "mobility",
            GuidedActivityKind::Stretching => "stretching",
            GuidedActivityKind::Breathing => "breathing",
            GuidedActivityKind::Walk => "walk",
            GuidedActivityKind::SteadyCardio => "steady_cardio",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_via_label!(
    Goal,
    TrainingStructure,
    Equipment,
    TrainingMethod,
    ExperienceLevel,
    HealthCondition,
    FocusArea,
    SorenessLevel,
    MuscleGroup,
    PhaseKind,
    Intensity,
    GuidedActivityKind,
);

// ============================================================================
// Bounds
// ============================================================================

/// Inclusive numeric range used for sets, reps and rest
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// True when `other` lies entirely within these bounds
    pub fn covers(&self, other: &Bounds) -> bool {
        other.min <= other.max && self.contains(other.min) && self.contains(other.max)
    }

    pub fn midpoint(&self) -> u32 {
        self.min + (self.max - self.min) / 2
    }

    /// Value picked for an experience level: beginners get the lower bound,
    /// advanced athletes the upper bound.
    pub fn pick_for(&self, level: ExperienceLevel) -> u32 {
        match level {
            ExperienceLevel::Beginner => self.min,
            ExperienceLevel::Intermediate => self.midpoint(),
            ExperienceLevel::Advanced => self.max,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

// ============================================================================
// Request Inputs
// ============================================================================

/// The user's training profile, immutable for the duration of a request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub goal: Goal,
    pub structure: TrainingStructure,
    pub method: TrainingMethod,
    pub level: ExperienceLevel,
    #[serde(default)]
    pub conditions: BTreeSet<HealthCondition>,
    pub weekly_frequency: u8,
}

/// Same-day check-in; only ever hashed, never persisted
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCheckIn {
    pub focus: FocusArea,
    pub soreness: SorenessLevel,
    #[serde(default)]
    pub sore_areas: BTreeSet<MuscleGroup>,
    /// Energy on a 1-10 scale
    pub energy: u8,
}

impl DailyCheckIn {
    /// Energy clamped into the 1-10 scale
    pub fn energy_level(&self) -> u8 {
        self.energy.clamp(1, 10)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A reference exercise from the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogExercise {
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub equipment: Equipment,
    pub difficulty: ExperienceLevel,
    pub instructions: String,
    pub media_url: Option<String>,
}

// ============================================================================
// Blueprint
// ============================================================================

/// A guided activity taking the place of exercises in a block
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GuidedActivitySpec {
    pub kind: GuidedActivityKind,
    pub duration_minutes: u32,
}

/// Structural contract for a single phase
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockBlueprint {
    pub kind: PhaseKind,
    pub title: String,
    pub exercise_count: u32,
    pub target_muscles: BTreeSet<MuscleGroup>,
    pub avoid_muscles: BTreeSet<MuscleGroup>,
    pub sets: Bounds,
    pub reps: Bounds,
    pub rest_seconds: Bounds,
    pub rpe: u8,
    pub guided: Option<GuidedActivitySpec>,
}

impl BlockBlueprint {
    pub fn is_guided(&self) -> bool {
        self.guided.is_some()
    }
}

/// Structural contract for one workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Blueprint {
    pub title: String,
    pub focus: FocusArea,
    pub goal: Goal,
    pub structure: TrainingStructure,
    pub level: ExperienceLevel,
    pub intensity: Intensity,
    pub estimated_minutes: u32,
    pub seed: u64,
    pub recovery_mode: bool,
    pub schema_version: String,
    pub blocks: Vec<BlockBlueprint>,
    pub equipment: BTreeSet<Equipment>,
}

impl Blueprint {
    pub fn phase_kinds(&self) -> Vec<PhaseKind> {
        self.blocks.iter().map(|b| b.kind).collect()
    }

    /// Index of the main working block, if any
    pub fn primary_block_index(&self) -> Option<usize> {
        let primary = crate::blueprint::primary_phase_kind(self.goal);
        self.blocks
            .iter()
            .position(|b| b.kind == primary && !b.is_guided())
            .or_else(|| {
                self.blocks.iter().position(|b| {
                    !b.is_guided() && !matches!(b.kind, PhaseKind::Warmup | PhaseKind::Cooldown)
                })
            })
    }
}

// ============================================================================
// Workout Plan
// ============================================================================

/// One prescribed exercise within a phase
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExercisePrescription {
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub equipment: Equipment,
    pub sets: u32,
    pub reps: Bounds,
    pub rest_seconds: u32,
    pub tip: Option<String>,
}

/// A guided activity within a phase
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuidedActivity {
    pub kind: GuidedActivityKind,
    pub title: String,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

/// What a phase contains
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseContent {
    Exercises { exercises: Vec<ExercisePrescription> },
    Activity { activity: GuidedActivity },
}

/// One phase of a composed workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanPhase {
    pub kind: PhaseKind,
    pub title: String,
    pub content: PhaseContent,
}

impl PlanPhase {
    pub fn exercises(&self) -> &[ExercisePrescription] {
        match &self.content {
            PhaseContent::Exercises { exercises } => exercises,
            PhaseContent::Activity { .. } => &[],
        }
    }
}

/// The final workout artifact
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub title: String,
    pub focus: FocusArea,
    pub duration_minutes: u32,
    pub intensity: Intensity,
    pub phases: Vec<PlanPhase>,
    pub notes: Option<String>,
}

impl WorkoutPlan {
    /// Names of every prescribed exercise, in phase order
    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.phases
            .iter()
            .flat_map(|p| p.exercises().iter().map(|e| e.name.as_str()))
    }

    pub fn exercise_count(&self) -> usize {
        self.phases.iter().map(|p| p.exercises().len()).sum()
    }
}

/// How a plan was produced
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanProvenance {
    Generated,
    Fallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bodyweight_structure_allows_only_bodyweight() {
        let allowed = TrainingStructure::Bodyweight.allowed_equipment();
        assert_eq!(allowed.len(), 1);
        assert!(allowed.contains(&Equipment::Bodyweight));
    }

    #[test]
    fn test_every_structure_allows_bodyweight() {
        for structure in [
            TrainingStructure::FullGym,
            TrainingStructure::HomeGym,
            TrainingStructure::Dumbbells,
            TrainingStructure::Bodyweight,
            TrainingStructure::Outdoor,
        ] {
            assert!(structure
                .allowed_equipment()
                .contains(&Equipment::Bodyweight));
        }
    }

    #[test]
    fn test_bounds_pick_for_level() {
        let reps = Bounds::new(6, 12);
        assert_eq!(reps.pick_for(ExperienceLevel::Beginner), 6);
        assert_eq!(reps.pick_for(ExperienceLevel::Intermediate), 9);
        assert_eq!(reps.pick_for(ExperienceLevel::Advanced), 12);
    }

    #[test]
    fn test_bounds_covers() {
        let allowed = Bounds::new(5, 12);
        assert!(allowed.covers(&Bounds::new(5, 8)));
        assert!(!allowed.covers(&Bounds::new(4, 8)));
        assert!(!allowed.covers(&Bounds::new(8, 6)));
    }

    #[test]
    fn test_bounds_display() {
        assert_eq!(Bounds::new(5, 8).to_string(), "5-8");
        assert_eq!(Bounds::exactly(10).to_string(), "10");
    }

    #[test]
    fn test_intensity_steps_saturate() {
        assert_eq!(Intensity::Low.lowered(), Intensity::Low);
        assert_eq!(Intensity::High.raised(), Intensity::High);
        assert_eq!(Intensity::Moderate.raised(), Intensity::High);
    }

    #[test]
    fn test_labels_match_serde_names() {
        let json = serde_json::to_string(&Goal::WeightLoss).unwrap();
        assert_eq!(json, format!("\"{}\"", Goal::WeightLoss.label()));
        let json = serde_json::to_string(&Equipment::PullupBar).unwrap();
        assert_eq!(json, format!("\"{}\"", Equipment::PullupBar.label()));
    }
}
