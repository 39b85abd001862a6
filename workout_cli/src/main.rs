use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use workout_core::cache::CacheStore;
use workout_core::config::CacheBackend;
use workout_core::fallback::muscles_covered;
use workout_core::synonyms;
use workout_core::*;

#[derive(Parser)]
#[command(name = "workout")]
#[command(about = "Personalized daily workout composer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to the standard config path)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose today's workout (default)
    Compose {
        #[command(flatten)]
        request: RequestArgs,

        /// Skip the generative service and plan locally
        #[arg(long)]
        offline: bool,

        /// Print the composed workout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the structural blueprint without composing
    Blueprint {
        #[command(flatten)]
        request: RequestArgs,

        /// Print the blueprint as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record the last composed workout as completed
    Complete,

    /// Manage the composition cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect the exercise catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete expired cache entries
    Purge,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Validate the configured catalog
    Check,
}

/// Profile overrides and today's check-in
#[derive(Args, Clone, Default)]
struct RequestArgs {
    /// Training goal (e.g. hypertrophy, weight loss, endurance)
    #[arg(long)]
    goal: Option<String>,

    /// Training structure (full gym, home gym, bodyweight, ...)
    #[arg(long)]
    structure: Option<String>,

    /// Experience level (beginner, intermediate, advanced)
    #[arg(long)]
    level: Option<String>,

    /// Training method (traditional, circuit, hiit, ...)
    #[arg(long)]
    method: Option<String>,

    /// Focus for today (upper, lower, push, pull, legs, core, cardio, ...)
    #[arg(long, default_value = "full body")]
    focus: String,

    /// Soreness level (none, mild, moderate, severe)
    #[arg(long, default_value = "none")]
    soreness: String,

    /// Sore muscle group; repeat for several
    #[arg(long = "sore-area")]
    sore_areas: Vec<String>,

    /// Energy from 1 to 10
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(1..=10))]
    energy: u8,

    /// Variation seed (defaults to one derived from the profile and date)
    #[arg(long)]
    seed: Option<u64>,
}

impl RequestArgs {
    /// Request used when no subcommand is given
    fn default_request() -> Self {
        Self {
            focus: "full body".into(),
            soreness: "none".into(),
            energy: 6,
            ..Self::default()
        }
    }

    fn profile(&self, config: &Config) -> UserProfile {
        let mut profile = config.profile.to_profile();
        if let Some(goal) = &self.goal {
            profile.goal = synonyms::parse_goal(goal);
        }
        if let Some(structure) = &self.structure {
            profile.structure = synonyms::parse_structure(structure);
        }
        if let Some(level) = &self.level {
            profile.level = synonyms::parse_level(level);
        }
        if let Some(method) = &self.method {
            profile.method = synonyms::parse_method(method);
        }
        profile
    }

    fn check_in(&self) -> DailyCheckIn {
        DailyCheckIn {
            focus: synonyms::parse_focus(&self.focus),
            soreness: synonyms::parse_soreness(&self.soreness),
            sore_areas: self
                .sore_areas
                .iter()
                .map(|a| synonyms::parse_muscle_group(a))
                .collect(),
            energy: self.energy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    workout_core::logging::init_for_cli(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    match cli.command {
        Some(Commands::Compose {
            request,
            offline,
            json,
        }) => cmd_compose(&config, &request, offline, json).await,
        Some(Commands::Blueprint { request, json }) => cmd_blueprint(&config, &request, json),
        Some(Commands::Complete) => cmd_complete(&config),
        Some(Commands::Cache {
            action: CacheAction::Purge,
        }) => cmd_cache_purge(&config).await,
        Some(Commands::Catalog {
            action: CatalogAction::Check,
        }) => cmd_catalog_check(&config),
        None => {
            // Default to "compose" command
            cmd_compose(&config, &RequestArgs::default_request(), false, false).await
        }
    }
}

fn load_catalog(config: &Config) -> Result<StaticCatalog> {
    let catalog = match &config.catalog.path {
        Some(path) => StaticCatalog::from_csv(path)?,
        None => StaticCatalog::builtin(),
    };

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn build_client(config: &Config, offline: bool) -> Option<Arc<dyn GenerativeClient>> {
    if offline || !config.generation.enabled {
        return None;
    }
    match HttpGenerativeClient::from_config(&config.generation) {
        Ok(client) if client.has_credential() => Some(Arc::new(client)),
        Ok(_) => {
            tracing::warn!(
                "{} is not set, composing locally",
                config.generation.api_key_env
            );
            None
        }
        Err(e) => {
            tracing::warn!("Generative client unavailable, composing locally: {}", e);
            None
        }
    }
}

fn build_cache(config: &Config) -> CompositionCache {
    let store: Arc<dyn CacheStore> = match config.cache.backend {
        CacheBackend::File => Arc::new(FileCacheStore::new(config.cache_dir())),
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
    };
    CompositionCache::from_config(store, &config.cache)
}

async fn cmd_compose(config: &Config, request: &RequestArgs, offline: bool, json: bool) -> Result<()> {
    std::fs::create_dir_all(&config.data.data_dir)?;

    let catalog = load_catalog(config)?;
    let client = build_client(config, offline);
    let history = JsonlPlanHistory::new(config.history_path());

    let mut composer_config = ComposerConfig::from(config);
    composer_config.generation_enabled = client.is_some();

    let composer = WorkoutComposer::new(
        composer_config,
        Arc::new(catalog),
        client,
        Arc::new(history),
        build_cache(config),
    );

    let profile = request.profile(config);
    let check_in = request.check_in();
    let composed = composer
        .compose_with_seed(&profile, &check_in, request.seed)
        .await?;

    save_last_plan(&config.last_plan_path(), &composed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&composed)?);
    } else {
        display_workout(&composed);
    }
    Ok(())
}

fn cmd_blueprint(config: &Config, request: &RequestArgs, json: bool) -> Result<()> {
    let profile = request.profile(config);
    let check_in = request.check_in();
    let blueprint = generate_blueprint(&profile, &check_in, request.seed);

    if json {
        println!("{}", serde_json::to_string_pretty(&blueprint)?);
        return Ok(());
    }

    println!("\n{}", blueprint.title);
    println!(
        "  {} intensity, ~{} min, seed {}",
        blueprint.intensity, blueprint.estimated_minutes, blueprint.seed
    );
    if blueprint.recovery_mode {
        println!("  Recovery mode");
    }
    println!();
    for (i, block) in blueprint.blocks.iter().enumerate() {
        match block.guided {
            Some(spec) => println!(
                "  {}. {} ({}): {} for {} min",
                i + 1,
                block.title,
                block.kind,
                spec.kind,
                spec.duration_minutes
            ),
            None => println!(
                "  {}. {} ({}): {} exercises, {} sets x {} reps, rest {}s, RPE {}",
                i + 1,
                block.title,
                block.kind,
                block.exercise_count,
                block.sets,
                block.reps,
                block.rest_seconds,
                block.rpe
            ),
        }
    }
    println!();
    Ok(())
}

fn cmd_complete(config: &Config) -> Result<()> {
    let path = config.last_plan_path();
    if !path.exists() {
        println!("No composed workout to complete - run `workout compose` first.");
        return Ok(());
    }

    let contents = std::fs::read_to_string(&path)?;
    let composed: ComposedWorkout = serde_json::from_str(&contents)?;

    let history = JsonlPlanHistory::new(config.history_path());
    let record = history.record_completed(&composed.plan)?;
    std::fs::remove_file(&path)?;

    println!("✓ Logged \"{}\" as completed", record.plan.title);
    println!("  History: {}", history.path().display());
    Ok(())
}

async fn cmd_cache_purge(config: &Config) -> Result<()> {
    let store = FileCacheStore::new(config.cache_dir());
    let purged = store.purge_expired().await?;
    println!("✓ Purged {} expired cache entries", purged);
    Ok(())
}

fn cmd_catalog_check(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let exercises = catalog.exercises();
    let groups: BTreeSet<_> = exercises.iter().map(|e| e.muscle_group).collect();
    println!(
        "✓ Catalog OK: {} exercises across {} muscle groups",
        exercises.len(),
        groups.len()
    );
    Ok(())
}

fn save_last_plan(path: &Path, composed: &ComposedWorkout) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(composed)?)?;
    Ok(())
}

fn display_workout(composed: &ComposedWorkout) {
    let plan = &composed.plan;
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", plan.title.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {} | {} intensity | ~{} min",
        plan.focus.display_name(),
        plan.intensity,
        plan.duration_minutes
    );

    for phase in &plan.phases {
        println!();
        println!("  {} ({})", phase.title, phase.kind);
        match &phase.content {
            PhaseContent::Exercises { exercises } => {
                for exercise in exercises {
                    println!(
                        "  → {}: {} x {}, rest {}s",
                        exercise.name, exercise.sets, exercise.reps, exercise.rest_seconds
                    );
                    if let Some(tip) = &exercise.tip {
                        println!("      {}", tip);
                    }
                }
            }
            PhaseContent::Activity { activity } => {
                println!("  → {} for {} min", activity.title, activity.duration_minutes);
                if let Some(notes) = &activity.notes {
                    println!("      {}", notes);
                }
            }
        }
    }

    let muscles: Vec<String> = muscles_covered(plan).iter().map(|m| m.to_string()).collect();
    if !muscles.is_empty() {
        println!();
        println!("  Muscles: {}", muscles.join(", "));
    }
    if let Some(notes) = &plan.notes {
        println!();
        println!("  ℹ {}", notes);
    }

    println!();
    let source = match composed.source {
        CompositionSource::Cached => "cache",
        CompositionSource::Generated => "generated",
        CompositionSource::Fallback => "local planner",
    };
    println!("  Source: {}", source);
    println!();
}
