//! Exercise catalog: built-in reference data, CSV loading, and validation.
//!
//! The composer only ever sees the catalog through the [`ExerciseCatalog`]
//! trait, so a remote catalog service can replace the static one.

use crate::synonyms;
use crate::types::*;
use crate::Result;
use async_trait::async_trait;
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Collaborator supplying exercises compatible with a user's setup
#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    /// Exercises usable with `structure` and `equipment_allowed` at `level`,
    /// sorted by name.
    async fn list_exercises(
        &self,
        structure: TrainingStructure,
        equipment_allowed: &BTreeSet<Equipment>,
        level: ExperienceLevel,
    ) -> Result<Vec<CatalogExercise>>;
}

/// True when an exercise can be performed with the given equipment at `level`
pub fn is_compatible(
    exercise: &CatalogExercise,
    equipment_allowed: &BTreeSet<Equipment>,
    level: ExperienceLevel,
) -> bool {
    equipment_allowed.contains(&exercise.equipment) && exercise.difficulty <= level
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Vec<CatalogExercise>> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static [CatalogExercise] {
    &DEFAULT_CATALOG
}

/// In-memory catalog backed by a list of exercises
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    exercises: Vec<CatalogExercise>,
}

impl StaticCatalog {
    pub fn new(exercises: Vec<CatalogExercise>) -> Self {
        Self { exercises }
    }

    /// Catalog holding the built-in exercises
    pub fn builtin() -> Self {
        Self::new(default_catalog().to_vec())
    }

    /// Load a catalog from a CSV file
    ///
    /// Columns: `name,muscle_group,equipment,difficulty,instructions,media_url`.
    /// Labels go through the synonym tables; rows with an empty name are skipped
    /// with a warning.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut exercises = Vec::new();
        for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
            match result {
                Ok(row) if row.name.is_empty() => {
                    tracing::warn!("Skipping catalog row {} with empty name", row_num + 1);
                }
                Ok(row) => exercises.push(row.into()),
                Err(e) => {
                    tracing::warn!("Failed to parse catalog row {}: {}", row_num + 1, e);
                }
            }
        }

        tracing::info!("Loaded {} exercises from {:?}", exercises.len(), path);
        Ok(Self::new(exercises))
    }

    pub fn exercises(&self) -> &[CatalogExercise] {
        &self.exercises
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        validate_exercises(&self.exercises)
    }
}

#[async_trait]
impl ExerciseCatalog for StaticCatalog {
    async fn list_exercises(
        &self,
        structure: TrainingStructure,
        equipment_allowed: &BTreeSet<Equipment>,
        level: ExperienceLevel,
    ) -> Result<Vec<CatalogExercise>> {
        let permitted: BTreeSet<Equipment> = structure
            .allowed_equipment()
            .intersection(equipment_allowed)
            .copied()
            .collect();

        let mut matching: Vec<CatalogExercise> = self
            .exercises
            .iter()
            .filter(|e| is_compatible(e, &permitted, level))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            "Catalog returned {} of {} exercises for {} / {}",
            matching.len(),
            self.exercises.len(),
            structure,
            level
        );
        Ok(matching)
    }
}

/// CSV row format for catalog files
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    muscle_group: String,
    equipment: String,
    difficulty: String,
    #[serde(default)]
    instructions: String,
    #[serde(default)]
    media_url: Option<String>,
}

impl From<CsvRow> for CatalogExercise {
    fn from(row: CsvRow) -> Self {
        CatalogExercise {
            name: row.name,
            muscle_group: synonyms::parse_muscle_group(&row.muscle_group),
            equipment: synonyms::parse_equipment(&row.equipment),
            difficulty: synonyms::parse_level(&row.difficulty),
            instructions: row.instructions,
            media_url: row.media_url.filter(|url| !url.is_empty()),
        }
    }
}

/// Check a list of exercises for problems
pub fn validate_exercises(exercises: &[CatalogExercise]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for exercise in exercises {
        if exercise.name.trim().is_empty() {
            errors.push("Exercise has empty name".to_string());
            continue;
        }
        if !seen.insert(exercise.name.to_lowercase()) {
            errors.push(format!("Duplicate exercise name '{}'", exercise.name));
        }
        if exercise.instructions.trim().is_empty() {
            errors.push(format!("Exercise '{}' has no instructions", exercise.name));
        }
    }

    if exercises.is_empty() {
        errors.push("Catalog has no exercises".to_string());
    } else if !exercises
        .iter()
        .any(|e| e.equipment == Equipment::Bodyweight)
    {
        errors.push("Catalog has no bodyweight exercises".to_string());
    }

    errors
}

fn ex(
    name: &str,
    muscle_group: MuscleGroup,
    equipment: Equipment,
    difficulty: ExperienceLevel,
    instructions: &str,
) -> CatalogExercise {
    CatalogExercise {
        name: name.into(),
        muscle_group,
        equipment,
        difficulty,
        instructions: instructions.into(),
        media_url: None,
    }
}

/// Builds the built-in exercise catalog
#[rustfmt::skip]
fn build_default_catalog() -> Vec<CatalogExercise> {
    use Equipment::*;
    use ExperienceLevel::*;
    use MuscleGroup as M;

    vec![
        // Chest
        ex("Bench Press", M::Chest, Barbell, Intermediate,
            "Lower the bar to mid-chest under control, then press to lockout."),
        ex("Dumbbell Bench Press", M::Chest, Dumbbell, Beginner,
            "Press both dumbbells up from chest level, keeping wrists stacked."),
        ex("Incline Dumbbell Press", M::Chest, Dumbbell, Intermediate,
            "On a 30 degree incline, press the dumbbells up and slightly together."),
        ex("Push-Up", M::Chest, Bodyweight, Beginner,
            "Keep a straight line from head to heels and lower the chest to the floor."),
        ex("Decline Push-Up", M::Chest, Bodyweight, Intermediate,
            "Feet elevated, lower under control and press back up."),
        ex("Cable Fly", M::Chest, Cable, Beginner,
            "With a soft elbow bend, bring the handles together in front of the chest."),
        ex("Chest Press Machine", M::Chest, Machine, Beginner,
            "Press the handles forward without locking the elbows hard."),
        // Back
        ex("Barbell Row", M::Back, Barbell, Intermediate,
            "Hinge to 45 degrees and row the bar to the lower ribs."),
        ex("Pull-Up", M::Back, PullupBar, Intermediate,
            "From a dead hang, pull until the chin clears the bar."),
        ex("Lat Pulldown", M::Back, Cable, Beginner,
            "Pull the bar to the upper chest, driving the elbows down."),
        ex("One-Arm Dumbbell Row", M::Back, Dumbbell, Beginner,
            "Brace on a bench and row the dumbbell toward the hip."),
        ex("Inverted Row", M::Back, PullupBar, Beginner,
            "Body straight under a low bar, pull the chest to the bar."),
        ex("Band Pull-Apart", M::Back, Bands, Beginner,
            "Arms straight, pull the band apart until it touches the chest."),
        ex("Prone Y-T-W Raise", M::Back, Bodyweight, Beginner,
            "Lying face down, raise the arms through Y, T and W positions."),
        // Shoulders
        ex("Overhead Press", M::Shoulders, Barbell, Intermediate,
            "Press the bar overhead from the front rack, squeezing the glutes."),
        ex("Dumbbell Shoulder Press", M::Shoulders, Dumbbell, Beginner,
            "Press the dumbbells overhead from shoulder height."),
        ex("Lateral Raise", M::Shoulders, Dumbbell, Beginner,
            "Raise the dumbbells out to the side until arms are parallel to the floor."),
        ex("Pike Push-Up", M::Shoulders, Bodyweight, Intermediate,
            "Hips high, lower the head toward the floor between the hands."),
        ex("Arm Circles", M::Shoulders, Bodyweight, Beginner,
            "Make controlled circles, gradually increasing their size."),
        ex("Face Pull", M::Shoulders, Cable, Beginner,
            "Pull the rope toward the face, elbows high, rotating the hands out."),
        // Arms
        ex("Dumbbell Curl", M::Biceps, Dumbbell, Beginner,
            "Curl without swinging, keeping elbows pinned to the sides."),
        ex("Barbell Curl", M::Biceps, Barbell, Beginner,
            "Curl the bar to shoulder height and lower slowly."),
        ex("Chin-Up", M::Biceps, PullupBar, Intermediate,
            "Underhand grip, pull until the chin clears the bar."),
        ex("Band Curl", M::Biceps, Bands, Beginner,
            "Stand on the band and curl the handles to the shoulders."),
        ex("Towel Curl", M::Biceps, Bodyweight, Beginner,
            "Loop a towel under one foot and curl against the leg's resistance."),
        ex("Triceps Pushdown", M::Triceps, Cable, Beginner,
            "Extend the elbows fully while keeping upper arms still."),
        ex("Bench Dip", M::Triceps, Bodyweight, Beginner,
            "Hands on a bench behind you, lower until elbows reach 90 degrees."),
        ex("Overhead Dumbbell Extension", M::Triceps, Dumbbell, Beginner,
            "Lower the dumbbell behind the head and extend to lockout."),
        ex("Diamond Push-Up", M::Triceps, Bodyweight, Intermediate,
            "Hands close together under the chest, elbows tracking back."),
        // Quadriceps
        ex("Back Squat", M::Quadriceps, Barbell, Intermediate,
            "Bar on the upper back, squat to depth with a neutral spine."),
        ex("Goblet Squat", M::Quadriceps, Kettlebell, Beginner,
            "Hold the bell at the chest and sit between the heels."),
        ex("Bodyweight Squat", M::Quadriceps, Bodyweight, Beginner,
            "Sit back and down, knees tracking over the toes."),
        ex("Leg Press", M::Quadriceps, Machine, Beginner,
            "Lower the sled until the knees reach 90 degrees, then press."),
        ex("Walking Lunge", M::Quadriceps, Bodyweight, Beginner,
            "Step forward into a lunge, alternating legs with each step."),
        ex("Bulgarian Split Squat", M::Quadriceps, Dumbbell, Intermediate,
            "Rear foot elevated, lower straight down on the front leg."),
        ex("Pistol Squat", M::Quadriceps, Bodyweight, Advanced,
            "Squat on one leg with the other held straight in front."),
        // Posterior chain
        ex("Romanian Deadlift", M::Hamstrings, Barbell, Intermediate,
            "Hinge at the hips with soft knees until the hamstrings stretch."),
        ex("Dumbbell Romanian Deadlift", M::Hamstrings, Dumbbell, Beginner,
            "Slide the dumbbells down the thighs by hinging at the hips."),
        ex("Lying Leg Curl", M::Hamstrings, Machine, Beginner,
            "Curl the pad toward the glutes without lifting the hips."),
        ex("Nordic Curl", M::Hamstrings, Bodyweight, Advanced,
            "Anchor the heels and lower the torso as slowly as possible."),
        ex("Hip Thrust", M::Glutes, Barbell, Intermediate,
            "Upper back on a bench, drive the hips up to full extension."),
        ex("Glute Bridge", M::Glutes, Bodyweight, Beginner,
            "Lying on the back, drive through the heels to lift the hips."),
        ex("Kettlebell Swing", M::Glutes, Kettlebell, Intermediate,
            "Hike the bell back and snap the hips to float it to chest height."),
        ex("Dumbbell Step-Up", M::Glutes, Dumbbell, Beginner,
            "Step onto a box, driving through the whole front foot."),
        ex("Standing Calf Raise", M::Calves, Bodyweight, Beginner,
            "Rise onto the balls of the feet and pause at the top."),
        ex("Seated Calf Raise", M::Calves, Machine, Beginner,
            "Lower the heels fully, then press up through the forefoot."),
        // Core and lower back
        ex("Plank", M::Core, Bodyweight, Beginner,
            "Forearms down, hold a straight line while bracing the abs."),
        ex("Dead Bug", M::Core, Bodyweight, Beginner,
            "Lower opposite arm and leg while keeping the low back flat."),
        ex("Hanging Knee Raise", M::Core, PullupBar, Intermediate,
            "From a hang, raise the knees toward the chest without swinging."),
        ex("Cable Woodchop", M::Core, Cable, Intermediate,
            "Rotate through the torso to pull the handle diagonally across the body."),
        ex("Russian Twist", M::Core, Bodyweight, Beginner,
            "Lean back slightly and rotate the shoulders side to side."),
        ex("Bird Dog", M::LowerBack, Bodyweight, Beginner,
            "On all fours, extend opposite arm and leg and hold briefly."),
        ex("Back Extension", M::LowerBack, Bench, Intermediate,
            "Hinge over the pad and raise the torso to a neutral line."),
        // Full body and cardio
        ex("Burpee", M::FullBody, Bodyweight, Intermediate,
            "Drop to a push-up, jump the feet in, and jump up."),
        ex("Bear Crawl", M::FullBody, Bodyweight, Beginner,
            "Knees hovering, crawl forward moving opposite hand and foot."),
        ex("Dumbbell Thruster", M::FullBody, Dumbbell, Intermediate,
            "Front squat the dumbbells and drive them overhead in one motion."),
        ex("Kettlebell Clean and Press", M::FullBody, Kettlebell, Advanced,
            "Clean the bell to the rack position and press it overhead."),
        ex("Power Clean", M::FullBody, Barbell, Advanced,
            "Pull the bar explosively from the floor and catch it in the front rack."),
        ex("Box Jump", M::FullBody, Bodyweight, Intermediate,
            "Swing the arms and jump onto the box, landing softly."),
        ex("Jumping Jacks", M::Cardio, Bodyweight, Beginner,
            "Jump the feet wide while raising the arms overhead."),
        ex("Mountain Climbers", M::Cardio, Bodyweight, Beginner,
            "From a plank, drive the knees toward the chest alternately."),
        ex("High Knees", M::Cardio, Bodyweight, Beginner,
            "Run in place driving the knees to hip height."),
        ex("Rowing Machine Intervals", M::Cardio, CardioMachine, Beginner,
            "Drive with the legs first, then lean back and pull."),
        ex("Assault Bike Sprint", M::Cardio, CardioMachine, Intermediate,
            "Push and pull the handles hard while pedalling at maximum effort."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(default_catalog().len() >= 40);
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = validate_exercises(default_catalog());
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_every_muscle_group_is_covered() {
        for muscle in [
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Quadriceps,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Calves,
            MuscleGroup::Core,
            MuscleGroup::LowerBack,
            MuscleGroup::FullBody,
            MuscleGroup::Cardio,
        ] {
            assert!(
                default_catalog()
                    .iter()
                    .any(|e| e.muscle_group == muscle && e.equipment == Equipment::Bodyweight),
                "No bodyweight exercise for {}",
                muscle
            );
        }
    }

    #[test]
    fn test_validate_flags_duplicates() {
        let exercises = vec![
            ex("Plank", MuscleGroup::Core, Equipment::Bodyweight, ExperienceLevel::Beginner, "Hold."),
            ex("plank", MuscleGroup::Core, Equipment::Bodyweight, ExperienceLevel::Beginner, "Hold."),
        ];
        let errors = validate_exercises(&exercises);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Duplicate"));
    }

    #[tokio::test]
    async fn test_bodyweight_structure_filters_equipment() {
        let catalog = StaticCatalog::builtin();
        let allowed = TrainingStructure::Bodyweight.allowed_equipment();

        let exercises = catalog
            .list_exercises(
                TrainingStructure::Bodyweight,
                &allowed,
                ExperienceLevel::Advanced,
            )
            .await
            .unwrap();

        assert!(!exercises.is_empty());
        assert!(exercises.iter().all(|e| e.equipment == Equipment::Bodyweight));
    }

    #[tokio::test]
    async fn test_level_filters_difficulty() {
        let catalog = StaticCatalog::builtin();
        let allowed = TrainingStructure::FullGym.allowed_equipment();

        let exercises = catalog
            .list_exercises(TrainingStructure::FullGym, &allowed, ExperienceLevel::Beginner)
            .await
            .unwrap();

        assert!(exercises
            .iter()
            .all(|e| e.difficulty == ExperienceLevel::Beginner));
        assert!(!exercises.iter().any(|e| e.name == "Bench Press"));
    }

    #[tokio::test]
    async fn test_listing_is_sorted_by_name() {
        let catalog = StaticCatalog::builtin();
        let allowed = TrainingStructure::FullGym.allowed_equipment();

        let exercises = catalog
            .list_exercises(TrainingStructure::FullGym, &allowed, ExperienceLevel::Advanced)
            .await
            .unwrap();

        let names: Vec<_> = exercises.iter().map(|e| e.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_load_from_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.csv");
        std::fs::write(
            &path,
            "name,muscle_group,equipment,difficulty,instructions,media_url\n\
             Sandbag Carry,full body,bodyweight,beginner,Walk tall.,\n\
             Landmine Press,shoulders,barbell,intermediate,Press the bar up and in.,https://example.com/lp\n\
             ,chest,barbell,beginner,nameless,\n",
        )
        .unwrap();

        let catalog = StaticCatalog::from_csv(&path).unwrap();
        assert_eq!(catalog.exercises().len(), 2);

        let carry = &catalog.exercises()[0];
        assert_eq!(carry.muscle_group, MuscleGroup::FullBody);
        assert_eq!(carry.media_url, None);

        let press = &catalog.exercises()[1];
        assert_eq!(press.equipment, Equipment::Barbell);
        assert_eq!(press.difficulty, ExperienceLevel::Intermediate);
        assert_eq!(press.media_url.as_deref(), Some("https://example.com/lp"));
    }
}
