//! Completed-plan history for anti-repetition.
//!
//! Completed plans are appended to a JSONL (JSON Lines) file with file
//! locking. The composer only reads history through [`PlanHistory`].

use crate::types::WorkoutPlan;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Collaborator supplying recently completed plans
#[async_trait]
pub trait PlanHistory: Send + Sync {
    /// Up to `limit` completed plans, newest first
    async fn list_recent_completed_plans(&self, limit: usize) -> Result<Vec<WorkoutPlan>>;
}

/// One line of the history log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedPlanRecord {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub plan: WorkoutPlan,
}

impl CompletedPlanRecord {
    pub fn new(plan: WorkoutPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            completed_at: Utc::now(),
            plan,
        }
    }
}

/// JSONL-backed history log
#[derive(Clone, Debug)]
pub struct JsonlPlanHistory {
    path: PathBuf,
}

impl JsonlPlanHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a completed plan to the log
    pub fn record_completed(&self, plan: &WorkoutPlan) -> Result<CompletedPlanRecord> {
        let record = CompletedPlanRecord::new(plan.clone());
        self.append(&record)?;
        Ok(record)
    }

    pub fn append(&self, record: &CompletedPlanRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Recorded completed plan {} ({:?})", record.id, record.plan.title);
        Ok(())
    }

    /// Every readable record in file order; corrupt lines are skipped
    pub fn read_records(&self) -> Result<Vec<CompletedPlanRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();
        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CompletedPlanRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        "Skipping corrupt history line {} in {:?}: {}",
                        line_num + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        file.unlock()?;
        Ok(records)
    }

    /// Up to `limit` records, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<CompletedPlanRecord>> {
        let mut records = self.read_records()?;
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[async_trait]
impl PlanHistory for JsonlPlanHistory {
    async fn list_recent_completed_plans(&self, limit: usize) -> Result<Vec<WorkoutPlan>> {
        let history = self.clone();
        let records = tokio::task::spawn_blocking(move || history.recent(limit))
            .await
            .map_err(|e| Error::Other(format!("history task failed: {}", e)))??;
        Ok(records.into_iter().map(|r| r.plan).collect())
    }
}

/// Fixed history held in memory, newest first
#[derive(Clone, Debug, Default)]
pub struct InMemoryPlanHistory {
    plans: Vec<WorkoutPlan>,
}

impl InMemoryPlanHistory {
    pub fn new(plans: Vec<WorkoutPlan>) -> Self {
        Self { plans }
    }
}

#[async_trait]
impl PlanHistory for InMemoryPlanHistory {
    async fn list_recent_completed_plans(&self, limit: usize) -> Result<Vec<WorkoutPlan>> {
        Ok(self.plans.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn plan(title: &str) -> WorkoutPlan {
        WorkoutPlan {
            title: title.into(),
            focus: FocusArea::FullBody,
            duration_minutes: 30,
            intensity: Intensity::Moderate,
            phases: vec![PlanPhase {
                kind: PhaseKind::Conditioning,
                title: "Circuit".into(),
                content: PhaseContent::Exercises {
                    exercises: vec![ExercisePrescription {
                        name: "Burpee".into(),
                        muscle_group: MuscleGroup::FullBody,
                        equipment: Equipment::Bodyweight,
                        sets: 3,
                        reps: Bounds::exactly(12),
                        rest_seconds: 30,
                        tip: None,
                    }],
                },
            }],
            notes: None,
        }
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let history = JsonlPlanHistory::new(dir.path().join("history.jsonl"));
        assert!(history.read_records().unwrap().is_empty());
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let dir = TempDir::new().unwrap();
        let history = JsonlPlanHistory::new(dir.path().join("nested/history.jsonl"));

        let base = Utc::now();
        for (i, title) in ["first", "second", "third"].iter().enumerate() {
            let mut record = CompletedPlanRecord::new(plan(title));
            record.completed_at = base + Duration::minutes(i as i64);
            history.append(&record).unwrap();
        }

        let recent = history.recent(2).unwrap();
        let titles: Vec<_> = recent.iter().map(|r| r.plan.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second"]);
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        let history = JsonlPlanHistory::new(&path);

        history.record_completed(&plan("good")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{not json").unwrap();
            writeln!(file).unwrap();
        }
        history.record_completed(&plan("also good")).unwrap();

        let records = history.read_records().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_trait_returns_plans() {
        let dir = TempDir::new().unwrap();
        let history = JsonlPlanHistory::new(dir.path().join("history.jsonl"));
        history.record_completed(&plan("only")).unwrap();

        let plans = history.list_recent_completed_plans(3).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].exercise_names().collect::<Vec<_>>(), vec!["Burpee"]);

        let memory = InMemoryPlanHistory::new(vec![plan("a"), plan("b")]);
        assert_eq!(memory.list_recent_completed_plans(1).await.unwrap().len(), 1);
    }
}
