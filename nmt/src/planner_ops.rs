use chrono::{DateTime, Utc};
use nmt_core::errors::NmtError;
use nmt_core::models::ChangeOperation;
use nmt_planner::PathResult;

use crate::{Attractor, Store};

impl Store {
    /// `createAttractor` (spec §6): embeds `description` to place the
    /// attractor in the same space neurons live in.
    pub fn create_attractor(
        &self,
        name: String,
        description: String,
        priority: u8,
        deadline: Option<DateTime<Utc>>,
        prerequisites: Vec<String>,
    ) -> Result<Attractor, NmtError> {
        let embedding = self.embedder.embed(&description)?;
        let attractor = self
            .planner
            .create_attractor(name, description, embedding, priority, deadline, prerequisites)?;
        self.sync.record_change(
            "attractor",
            ChangeOperation::Create,
            &attractor.id,
            serde_json::to_value(&attractor)?,
        )?;
        Ok(attractor)
    }

    pub fn get_attractor(&self, id: &str) -> Result<Attractor, NmtError> {
        Ok(self.planner.get_attractor(id)?)
    }

    pub fn record_attractor_activation(&self, id: &str) -> Result<(), NmtError> {
        Ok(self.planner.record_activation(id)?)
    }

    /// Ages every attractor's strength by wall-clock time and prunes the
    /// ones that fall below the admissibility floor (spec §3).
    pub fn decay_and_prune_attractors(&self, half_life_hours: f64) -> Result<Vec<String>, NmtError> {
        Ok(self.planner.decay_and_prune(half_life_hours)?)
    }

    /// `findPathToAttractor` (spec §6). `max_depth` is not threaded
    /// per-call; the planner is bounded by `PlannerConfig::max_depth` at
    /// startup (DESIGN.md open question).
    pub fn find_path_to_attractor(
        &self,
        start: &str,
        attractor_id: &str,
        _max_depth: Option<usize>,
    ) -> Result<PathResult, NmtError> {
        Ok(self.planner.find_path_to_attractor(start, attractor_id)?)
    }

    pub fn find_alternative_paths(
        &self,
        start: &str,
        attractor_id: &str,
        k: usize,
        _max_depth: Option<usize>,
    ) -> Result<Vec<PathResult>, NmtError> {
        Ok(self.planner.find_alternative_paths(start, attractor_id, k)?)
    }

    pub fn bidirectional_a_star(&self, start: &str, attractor_id: &str) -> Result<PathResult, NmtError> {
        Ok(self.planner.bidirectional_a_star(start, attractor_id)?)
    }
}
