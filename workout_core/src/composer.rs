//! Workout composition orchestrator.
//!
//! Each request runs an explicit state machine:
//!
//! ```text
//! CacheCheck --hit--> Done
//!     | miss
//!     v
//! Generate --reply--> Validate --ok--> Done (cached as generated)
//!     |                  |
//!     +--error--> Retry <+--invalid
//!                  |  \
//!                  |   +--budget left--> Generate
//!                  v
//!               Fallback --> Done (cached as fallback)
//! ```
//!
//! Requests sharing a cache key are coalesced into one flight. The overall
//! deadline starts when the flight starts and covers the cache lookup,
//! catalog and history loading, generation and backoff. Once it passes the
//! request goes straight to Fallback.

use crate::blueprint::generate_blueprint;
use crate::cache::{CacheAudit, CompositionCache};
use crate::catalog::ExerciseCatalog;
use crate::client::GenerativeClient;
use crate::config::{
    Config, PromptConfig, ValidationConfig, MAX_REQUEST_TIMEOUT_SECS, MAX_RETRY_BACKOFF_MS,
    MAX_RETRY_CAP,
};
use crate::error::{ClientError, ComposerError, ValidationError};
use crate::fallback::LocalFallbackComposer;
use crate::flight::SingleFlight;
use crate::history::PlanHistory;
use crate::prompt::{self, GenerationRequest, PromptAssembler};
use crate::types::*;
use crate::validator::ResponseValidator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Orchestrator settings, passed in explicitly
#[derive(Clone, Debug)]
pub struct ComposerConfig {
    pub generation_enabled: bool,
    /// Additional attempts after the first
    pub max_retries: u32,
    /// First backoff; doubles per retry
    pub retry_backoff: Duration,
    /// Budget for one request, from cache lookup through the last retry
    pub request_timeout: Duration,
    pub history_limit: usize,
    pub prompt: PromptConfig,
    pub validation: ValidationConfig,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ComposerConfig {
    fn from(config: &Config) -> Self {
        Self {
            generation_enabled: config.generation.enabled,
            max_retries: config.generation.max_retries.min(MAX_RETRY_CAP),
            retry_backoff: Duration::from_millis(
                config.generation.retry_backoff_ms.min(MAX_RETRY_BACKOFF_MS),
            ),
            request_timeout: Duration::from_secs(
                config
                    .generation
                    .request_timeout_secs
                    .min(MAX_REQUEST_TIMEOUT_SECS),
            ),
            history_limit: config.prompt.history_limit,
            prompt: config.prompt.clone(),
            validation: config.validation.clone(),
        }
    }
}

/// Where a returned plan came from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompositionSource {
    /// Served from a live cache entry
    Cached,
    /// Generated and validated this request
    Generated,
    /// Built by the local planner this request
    Fallback,
}

/// A composed plan plus how it was produced
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComposedWorkout {
    pub plan: WorkoutPlan,
    pub source: CompositionSource,
    pub cache_key: String,
    /// Generation attempts made by this request
    pub attempts: u32,
    pub blueprint: Blueprint,
}

#[derive(Debug)]
enum AttemptFailure {
    Client(ClientError),
    Validation(ValidationError),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Client(e) => write!(f, "{}", e),
            AttemptFailure::Validation(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
enum FallbackReason {
    GenerationDisabled,
    NoClient,
    PermanentError,
    RetriesExhausted,
    DeadlineExceeded,
}

#[derive(Debug)]
enum ComposeState {
    CacheCheck,
    Generate { attempt: u32 },
    Validate { attempt: u32, raw: String },
    Retry { attempt: u32, failure: AttemptFailure },
    Fallback { reason: FallbackReason },
    Done(CompositionSource, WorkoutPlan),
}

/// Everything a request needs once the cache has missed
struct Prepared {
    catalog: Vec<CatalogExercise>,
    request: Option<GenerationRequest>,
    validator: Option<ResponseValidator>,
}

struct Inner {
    config: ComposerConfig,
    catalog: Arc<dyn ExerciseCatalog>,
    client: Option<Arc<dyn GenerativeClient>>,
    history: Arc<dyn PlanHistory>,
    cache: CompositionCache,
    assembler: PromptAssembler,
    fallback: LocalFallbackComposer,
    flights: SingleFlight<Result<ComposedWorkout, ComposerError>>,
}

/// Composes workouts: cache, generation with bounded retry, validation and
/// local fallback
#[derive(Clone)]
pub struct WorkoutComposer {
    inner: Arc<Inner>,
}

impl WorkoutComposer {
    pub fn new(
        config: ComposerConfig,
        catalog: Arc<dyn ExerciseCatalog>,
        client: Option<Arc<dyn GenerativeClient>>,
        history: Arc<dyn PlanHistory>,
        cache: CompositionCache,
    ) -> Self {
        let assembler = PromptAssembler::new(config.prompt.clone());
        Self {
            inner: Arc::new(Inner {
                config,
                catalog,
                client,
                history,
                cache,
                assembler,
                fallback: LocalFallbackComposer::new(),
                flights: SingleFlight::new(),
            }),
        }
    }

    pub fn cache(&self) -> &CompositionCache {
        &self.inner.cache
    }

    /// Compose today's workout
    pub async fn compose(
        &self,
        profile: &UserProfile,
        check_in: &DailyCheckIn,
    ) -> Result<ComposedWorkout, ComposerError> {
        self.compose_with_seed(profile, check_in, None).await
    }

    /// Compose with an explicit variation seed
    pub async fn compose_with_seed(
        &self,
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        seed: Option<u64>,
    ) -> Result<ComposedWorkout, ComposerError> {
        let blueprint = generate_blueprint(profile, check_in, seed);
        let key = prompt::cache_key(profile, check_in, &blueprint.schema_version, blueprint.seed);

        let inner = Arc::clone(&self.inner);
        let profile = profile.clone();
        let check_in = check_in.clone();
        let flight_key = key.clone();
        let work = async move { inner.run(profile, check_in, blueprint, flight_key).await };

        match self.inner.flights.run(&key, work).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Composition for {} did not finish: {}", key, e);
                Err(ComposerError::AllAttemptsExhausted)
            }
        }
    }
}

impl Inner {
    async fn run(
        &self,
        profile: UserProfile,
        check_in: DailyCheckIn,
        blueprint: Blueprint,
        key: String,
    ) -> Result<ComposedWorkout, ComposerError> {
        let started = Instant::now();
        let deadline = started.checked_add(self.config.request_timeout).unwrap_or_else(|| {
            started + Duration::from_secs(MAX_REQUEST_TIMEOUT_SECS)
        });
        let mut prepared: Option<Prepared> = None;
        let mut attempts = 0;
        let mut state = ComposeState::CacheCheck;

        loop {
            state = match state {
                ComposeState::CacheCheck => match timeout_at(deadline, self.cache.get(&key))
                    .await
                    .unwrap_or_else(|_| {
                        tracing::warn!("Cache lookup for {} timed out, treating as a miss", key);
                        None
                    }) {
                    Some(entry) => {
                        tracing::info!("Cache hit for {} ({:?})", key, entry.provenance);
                        ComposeState::Done(CompositionSource::Cached, entry.plan)
                    }
                    None => {
                        tracing::debug!("Cache miss for {}", key);
                        let ready = self
                            .prepare(&profile, &check_in, &blueprint, deadline)
                            .await?;
                        let next = if !self.config.generation_enabled {
                            ComposeState::Fallback {
                                reason: FallbackReason::GenerationDisabled,
                            }
                        } else if self.client.is_none() {
                            ComposeState::Fallback {
                                reason: FallbackReason::NoClient,
                            }
                        } else if Instant::now() >= deadline {
                            ComposeState::Fallback {
                                reason: FallbackReason::DeadlineExceeded,
                            }
                        } else {
                            ComposeState::Generate { attempt: 1 }
                        };
                        prepared = Some(ready);
                        next
                    }
                },

                ComposeState::Generate { attempt } => {
                    let (Some(client), Some(request)) = (
                        self.client.as_ref(),
                        prepared.as_ref().and_then(|p| p.request.as_ref()),
                    ) else {
                        return Err(ComposerError::AllAttemptsExhausted);
                    };
                    attempts = attempt;
                    tracing::debug!("Generation attempt {} for {}", attempt, key);

                    let call = client.generate(&request.system_text, &request.user_text);
                    match timeout_at(deadline, call).await {
                        Err(_) => ComposeState::Fallback {
                            reason: FallbackReason::DeadlineExceeded,
                        },
                        Ok(Ok(raw)) => ComposeState::Validate { attempt, raw },
                        Ok(Err(e)) => ComposeState::Retry {
                            attempt,
                            failure: AttemptFailure::Client(e),
                        },
                    }
                }

                ComposeState::Validate { attempt, raw } => {
                    let Some(validator) = prepared.as_ref().and_then(|p| p.validator.as_ref())
                    else {
                        return Err(ComposerError::AllAttemptsExhausted);
                    };
                    match validator.validate(&raw, &blueprint) {
                        Ok(plan) => {
                            self.store(&key, &plan, PlanProvenance::Generated, &blueprint)
                                .await;
                            ComposeState::Done(CompositionSource::Generated, plan)
                        }
                        Err(e) => ComposeState::Retry {
                            attempt,
                            failure: AttemptFailure::Validation(e),
                        },
                    }
                }

                ComposeState::Retry { attempt, failure } => {
                    tracing::warn!("Generation attempt {} for {} failed: {}", attempt, key, failure);
                    let permanent = matches!(&failure, AttemptFailure::Client(e) if !e.is_retryable());
                    if permanent {
                        ComposeState::Fallback {
                            reason: FallbackReason::PermanentError,
                        }
                    } else if attempt > self.config.max_retries {
                        ComposeState::Fallback {
                            reason: FallbackReason::RetriesExhausted,
                        }
                    } else {
                        let resume_at = self
                            .config
                            .retry_backoff
                            .checked_mul(2u32.saturating_pow(attempt - 1))
                            .and_then(|backoff| Instant::now().checked_add(backoff));
                        let within_deadline = resume_at.filter(|at| *at < deadline);
                        if let Some(at) = within_deadline {
                            tokio::time::sleep_until(at).await;
                            ComposeState::Generate {
                                attempt: attempt + 1,
                            }
                        } else {
                            ComposeState::Fallback {
                                reason: FallbackReason::DeadlineExceeded,
                            }
                        }
                    }
                }

                ComposeState::Fallback { reason } => {
                    tracing::info!("Falling back to local planner for {}: {:?}", key, reason);
                    let Some(ready) = prepared.as_ref() else {
                        return Err(ComposerError::AllAttemptsExhausted);
                    };
                    let plan =
                        self.fallback
                            .compose(&ready.catalog, &profile, &check_in, &blueprint)?;
                    self.store(&key, &plan, PlanProvenance::Fallback, &blueprint)
                        .await;
                    ComposeState::Done(CompositionSource::Fallback, plan)
                }

                ComposeState::Done(source, plan) => {
                    tracing::info!(
                        "Composed {:?} ({:?}, {} exercises, {} attempts)",
                        plan.title,
                        source,
                        plan.exercise_count(),
                        attempts
                    );
                    return Ok(ComposedWorkout {
                        plan,
                        source,
                        cache_key: key,
                        attempts,
                        blueprint,
                    });
                }
            };
        }
    }

    /// Load the catalog, history and request needed after a cache miss
    async fn prepare(
        &self,
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        blueprint: &Blueprint,
        deadline: Instant,
    ) -> Result<Prepared, ComposerError> {
        let lookup =
            self.catalog
                .list_exercises(blueprint.structure, &blueprint.equipment, blueprint.level);
        let catalog = match timeout_at(deadline, lookup).await {
            Ok(Ok(catalog)) => catalog,
            Ok(Err(e)) => {
                tracing::error!("Exercise catalog unavailable: {}", e);
                return Err(ComposerError::CatalogUnavailable(e.to_string()));
            }
            Err(_) => {
                tracing::error!("Exercise catalog lookup timed out");
                return Err(ComposerError::CatalogUnavailable(
                    "catalog lookup timed out".into(),
                ));
            }
        };

        if !self.config.generation_enabled || self.client.is_none() {
            return Ok(Prepared {
                catalog,
                request: None,
                validator: None,
            });
        }

        let history = self
            .history
            .list_recent_completed_plans(self.config.history_limit);
        let recent = match timeout_at(deadline, history).await {
            Ok(Ok(plans)) => plans,
            Ok(Err(e)) => {
                tracing::warn!("Could not load plan history, continuing without it: {}", e);
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Plan history timed out, continuing without it");
                Vec::new()
            }
        };

        let request = self
            .assembler
            .assemble(blueprint, &catalog, profile, check_in, &recent);
        let validator = ResponseValidator::new(self.config.validation.clone(), catalog.clone());
        Ok(Prepared {
            catalog,
            request: Some(request),
            validator: Some(validator),
        })
    }

    /// Cache a plan; a failed write only costs a future cache miss
    async fn store(
        &self,
        key: &str,
        plan: &WorkoutPlan,
        provenance: PlanProvenance,
        blueprint: &Blueprint,
    ) {
        let audit = CacheAudit::from_blueprint(blueprint);
        if let Err(e) = self.cache.put(key, plan.clone(), provenance, audit).await {
            tracing::warn!("Failed to cache plan under {}: {}", key, e);
        }
    }
}
