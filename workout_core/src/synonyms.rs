//! Label lookup tables.
//!
//! Every natural-language label accepted from config files, the CLI, or a
//! generation reply maps to exactly one enum value through an explicit table.
//! Each table has one documented default for unrecognised input; phase kinds
//! have none because an unknown kind is a validation failure.

use crate::types::*;

/// Lowercase, trim, and fold `-` and spaces into `_`
pub fn normalize(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
        .collect()
}

fn lookup<T: Copy>(table: &[(&str, T)], label: &str) -> Option<T> {
    let key = normalize(label);
    table
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, value)| *value)
}

const GOALS: &[(&str, Goal)] = &[
    ("hypertrophy", Goal::Hypertrophy),
    ("muscle_gain", Goal::Hypertrophy),
    ("build_muscle", Goal::Hypertrophy),
    ("bulk", Goal::Hypertrophy),
    ("weight_loss", Goal::WeightLoss),
    ("fat_loss", Goal::WeightLoss),
    ("lose_weight", Goal::WeightLoss),
    ("cut", Goal::WeightLoss),
    ("endurance", Goal::Endurance),
    ("stamina", Goal::Endurance),
    ("aerobic", Goal::Endurance),
    ("conditioning", Goal::Conditioning),
    ("general_fitness", Goal::Conditioning),
    ("fitness", Goal::Conditioning),
    ("health", Goal::Conditioning),
    ("performance", Goal::Performance),
    ("athletic", Goal::Performance),
    ("athletic_performance", Goal::Performance),
    ("power", Goal::Performance),
];

/// Parse a goal label. Default: `Conditioning`.
pub fn parse_goal(label: &str) -> Goal {
    lookup(GOALS, label).unwrap_or(Goal::Conditioning)
}

const STRUCTURES: &[(&str, TrainingStructure)] = &[
    ("full_gym", TrainingStructure::FullGym),
    ("gym", TrainingStructure::FullGym),
    ("commercial_gym", TrainingStructure::FullGym),
    ("home_gym", TrainingStructure::HomeGym),
    ("home", TrainingStructure::HomeGym),
    ("garage", TrainingStructure::HomeGym),
    ("dumbbells", TrainingStructure::Dumbbells),
    ("dumbbell", TrainingStructure::Dumbbells),
    ("dumbbells_only", TrainingStructure::Dumbbells),
    ("bodyweight", TrainingStructure::Bodyweight),
    ("body_weight", TrainingStructure::Bodyweight),
    ("no_equipment", TrainingStructure::Bodyweight),
    ("calisthenics", TrainingStructure::Bodyweight),
    ("outdoor", TrainingStructure::Outdoor),
    ("outdoors", TrainingStructure::Outdoor),
    ("park", TrainingStructure::Outdoor),
];

/// Parse a training structure label. Default: `Bodyweight`, the structure that
/// assumes the least equipment.
pub fn parse_structure(label: &str) -> TrainingStructure {
    lookup(STRUCTURES, label).unwrap_or(TrainingStructure::Bodyweight)
}

const METHODS: &[(&str, TrainingMethod)] = &[
    ("traditional", TrainingMethod::Traditional),
    ("straight_sets", TrainingMethod::Traditional),
    ("sets", TrainingMethod::Traditional),
    ("circuit", TrainingMethod::Circuit),
    ("circuits", TrainingMethod::Circuit),
    ("supersets", TrainingMethod::Circuit),
    ("hiit", TrainingMethod::Hiit),
    ("intervals", TrainingMethod::Hiit),
    ("tabata", TrainingMethod::Hiit),
];

/// Parse a training method label. Default: `Traditional`.
pub fn parse_method(label: &str) -> TrainingMethod {
    lookup(METHODS, label).unwrap_or(TrainingMethod::Traditional)
}

const LEVELS: &[(&str, ExperienceLevel)] = &[
    ("beginner", ExperienceLevel::Beginner),
    ("novice", ExperienceLevel::Beginner),
    ("new", ExperienceLevel::Beginner),
    ("intermediate", ExperienceLevel::Intermediate),
    ("medium", ExperienceLevel::Intermediate),
    ("advanced", ExperienceLevel::Advanced),
    ("expert", ExperienceLevel::Advanced),
    ("experienced", ExperienceLevel::Advanced),
];

/// Parse an experience level label. Default: `Beginner`.
pub fn parse_level(label: &str) -> ExperienceLevel {
    lookup(LEVELS, label).unwrap_or(ExperienceLevel::Beginner)
}

const FOCUS_AREAS: &[(&str, FocusArea)] = &[
    ("upper", FocusArea::Upper),
    ("upper_body", FocusArea::Upper),
    ("push", FocusArea::Upper),
    ("pull", FocusArea::Upper),
    ("arms", FocusArea::Upper),
    ("lower", FocusArea::Lower),
    ("lower_body", FocusArea::Lower),
    ("legs", FocusArea::Lower),
    ("full_body", FocusArea::FullBody),
    ("full", FocusArea::FullBody),
    ("fullbody", FocusArea::FullBody),
    ("total_body", FocusArea::FullBody),
    ("core", FocusArea::Core),
    ("abs", FocusArea::Core),
    ("cardio", FocusArea::Cardio),
    ("conditioning", FocusArea::Cardio),
];

/// Parse a focus area label. Default: `FullBody`.
pub fn parse_focus(label: &str) -> FocusArea {
    lookup(FOCUS_AREAS, label).unwrap_or(FocusArea::FullBody)
}

const SORENESS_LEVELS: &[(&str, SorenessLevel)] = &[
    ("none", SorenessLevel::None),
    ("no", SorenessLevel::None),
    ("not_sore", SorenessLevel::None),
    ("fresh", SorenessLevel::None),
    ("0", SorenessLevel::None),
    ("light", SorenessLevel::Light),
    ("mild", SorenessLevel::Light),
    ("slight", SorenessLevel::Light),
    ("low", SorenessLevel::Light),
    ("1", SorenessLevel::Light),
    ("moderate", SorenessLevel::Moderate),
    ("medium", SorenessLevel::Moderate),
    ("some", SorenessLevel::Moderate),
    ("2", SorenessLevel::Moderate),
    ("severe", SorenessLevel::Severe),
    ("high", SorenessLevel::Severe),
    ("very_sore", SorenessLevel::Severe),
    ("intense", SorenessLevel::Severe),
    ("3", SorenessLevel::Severe),
];

/// Parse a soreness label. Default: `Light`, which never triggers recovery mode
/// on its own.
pub fn parse_soreness(label: &str) -> SorenessLevel {
    lookup(SORENESS_LEVELS, label).unwrap_or(SorenessLevel::Light)
}

const CONDITIONS: &[(&str, HealthCondition)] = &[
    ("hypertension", HealthCondition::Hypertension),
    ("high_blood_pressure", HealthCondition::Hypertension),
    ("pregnancy", HealthCondition::Pregnancy),
    ("pregnant", HealthCondition::Pregnancy),
    ("lower_back_pain", HealthCondition::LowerBackPain),
    ("back_pain", HealthCondition::LowerBackPain),
    ("lumbar_pain", HealthCondition::LowerBackPain),
    ("knee_pain", HealthCondition::KneePain),
    ("bad_knees", HealthCondition::KneePain),
    ("knee_injury", HealthCondition::KneePain),
];

/// Parse a health condition label. Default: `Other`, which carries no
/// programming constraint.
pub fn parse_condition(label: &str) -> HealthCondition {
    lookup(CONDITIONS, label).unwrap_or(HealthCondition::Other)
}

const MUSCLE_GROUPS: &[(&str, MuscleGroup)] = &[
    ("chest", MuscleGroup::Chest),
    ("pecs", MuscleGroup::Chest),
    ("back", MuscleGroup::Back),
    ("lats", MuscleGroup::Back),
    ("upper_back", MuscleGroup::Back),
    ("shoulders", MuscleGroup::Shoulders),
    ("shoulder", MuscleGroup::Shoulders),
    ("delts", MuscleGroup::Shoulders),
    ("biceps", MuscleGroup::Biceps),
    ("triceps", MuscleGroup::Triceps),
    ("quadriceps", MuscleGroup::Quadriceps),
    ("quads", MuscleGroup::Quadriceps),
    ("hamstrings", MuscleGroup::Hamstrings),
    ("hamstring", MuscleGroup::Hamstrings),
    ("glutes", MuscleGroup::Glutes),
    ("glute", MuscleGroup::Glutes),
    ("calves", MuscleGroup::Calves),
    ("calf", MuscleGroup::Calves),
    ("core", MuscleGroup::Core),
    ("abs", MuscleGroup::Core),
    ("abdominals", MuscleGroup::Core),
    ("lower_back", MuscleGroup::LowerBack),
    ("lumbar", MuscleGroup::LowerBack),
    ("full_body", MuscleGroup::FullBody),
    ("legs", MuscleGroup::Quadriceps),
    ("cardio", MuscleGroup::Cardio),
];

/// Parse a muscle group label. Default: `FullBody`.
pub fn parse_muscle_group(label: &str) -> MuscleGroup {
    lookup(MUSCLE_GROUPS, label).unwrap_or(MuscleGroup::FullBody)
}

const EQUIPMENT: &[(&str, Equipment)] = &[
    ("barbell", Equipment::Barbell),
    ("dumbbell", Equipment::Dumbbell),
    ("dumbbells", Equipment::Dumbbell),
    ("kettlebell", Equipment::Kettlebell),
    ("kettlebells", Equipment::Kettlebell),
    ("machine", Equipment::Machine),
    ("cable", Equipment::Cable),
    ("cables", Equipment::Cable),
    ("bands", Equipment::Bands),
    ("band", Equipment::Bands),
    ("resistance_band", Equipment::Bands),
    ("pullup_bar", Equipment::PullupBar),
    ("pull_up_bar", Equipment::PullupBar),
    ("bench", Equipment::Bench),
    ("cardio_machine", Equipment::CardioMachine),
    ("treadmill", Equipment::CardioMachine),
    ("bike", Equipment::CardioMachine),
    ("rower", Equipment::CardioMachine),
    ("bodyweight", Equipment::Bodyweight),
    ("body_weight", Equipment::Bodyweight),
    ("none", Equipment::Bodyweight),
];

/// Parse an equipment label. Default: `Bodyweight`.
pub fn parse_equipment(label: &str) -> Equipment {
    lookup(EQUIPMENT, label).unwrap_or(Equipment::Bodyweight)
}

const PHASE_KINDS: &[(&str, PhaseKind)] = &[
    ("warmup", PhaseKind::Warmup),
    ("warm_up", PhaseKind::Warmup),
    ("activation", PhaseKind::Warmup),
    ("strength", PhaseKind::Strength),
    ("main", PhaseKind::Strength),
    ("explosive", PhaseKind::Strength),
    ("power", PhaseKind::Strength),
    ("accessory", PhaseKind::Accessory),
    ("accessories", PhaseKind::Accessory),
    ("hypertrophy", PhaseKind::Accessory),
    ("conditioning", PhaseKind::Conditioning),
    ("circuit", PhaseKind::Conditioning),
    ("conditioning_circuit", PhaseKind::Conditioning),
    ("functional", PhaseKind::Conditioning),
    ("metcon", PhaseKind::Conditioning),
    ("aerobic", PhaseKind::Aerobic),
    ("cardio", PhaseKind::Aerobic),
    ("finisher", PhaseKind::Finisher),
    ("cooldown", PhaseKind::Cooldown),
    ("cool_down", PhaseKind::Cooldown),
    ("recovery", PhaseKind::Cooldown),
];

/// Parse a phase kind label. There is no default: returns `None` for
/// unrecognised kinds.
pub fn parse_phase_kind(label: &str) -> Option<PhaseKind> {
    lookup(PHASE_KINDS, label)
}

const ACTIVITY_KINDS: &[(&str, GuidedActivityKind)] = &[
    ("mobility", GuidedActivityKind::Mobility),
    ("stretching", GuidedActivityKind::Stretching),
    ("stretch", GuidedActivityKind::Stretching),
    ("breathing", GuidedActivityKind::Breathing),
    ("breathwork", GuidedActivityKind::Breathing),
    ("walk", GuidedActivityKind::Walk),
    ("walking", GuidedActivityKind::Walk),
    ("steady_cardio", GuidedActivityKind::SteadyCardio),
    ("cardio", GuidedActivityKind::SteadyCardio),
    ("run", GuidedActivityKind::SteadyCardio),
    ("cycling", GuidedActivityKind::SteadyCardio),
];

/// Parse a guided activity label. Default: `Mobility`.
pub fn parse_activity_kind(label: &str) -> GuidedActivityKind {
    lookup(ACTIVITY_KINDS, label).unwrap_or(GuidedActivityKind::Mobility)
}
