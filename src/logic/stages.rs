//! Round counters for Swiss and battle royale, and stage transitions of multi-stage brackets.

use crate::logic::advancement::propose_advancement;
use crate::models::{
    BattleRoyaleConfig, BattleRoyaleProgress, Bracket, BracketState, EliminationRule, EngineError,
    FormatProgress, ParticipantId, Stage, Standing, SwissConfig, SwissProgress,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

impl SwissProgress {
    pub fn new(config: SwissConfig) -> Self {
        Self {
            config,
            current_round: 1,
        }
    }

    pub fn is_final_round(&self) -> bool {
        self.current_round >= self.config.total_rounds
    }

    /// Move to the next round. Returns the new round number.
    pub fn advance(&mut self) -> Result<u32, EngineError> {
        if self.is_final_round() {
            return Err(EngineError::StateConflict(format!(
                "round {} is the last Swiss round",
                self.current_round
            )));
        }
        self.current_round += 1;
        Ok(self.current_round)
    }
}

impl BattleRoyaleProgress {
    pub fn new(config: BattleRoyaleConfig, entrants: usize) -> Self {
        let lobbies = config.effective_lobbies(entrants);
        Self {
            config,
            current_round: 1,
            lobbies,
            remaining: entrants as u32,
        }
    }

    pub fn is_final_round(&self) -> bool {
        self.current_round >= self.config.total_rounds
    }

    /// Leave the current round, applying the elimination rule attached to it if any.
    /// Returns the rule that was applied.
    pub fn advance(&mut self) -> Result<Option<EliminationRule>, EngineError> {
        if self.is_final_round() {
            return Err(EngineError::StateConflict(format!(
                "round {} is the last battle royale round",
                self.current_round
            )));
        }
        let rule = self.config.rule_after(self.current_round).copied();
        if let Some(rule) = rule {
            if self.remaining.saturating_sub(rule.eliminate_bottom) < 2 {
                return Err(EngineError::StateConflict(format!(
                    "eliminating {} would leave fewer than 2 of {} standing",
                    rule.eliminate_bottom, self.remaining
                )));
            }
            self.remaining -= rule.eliminate_bottom;
        }
        self.current_round += 1;
        Ok(rule)
    }
}

impl Bracket {
    fn ensure_in_progress(&self) -> Result<(), EngineError> {
        if self.state == BracketState::Completed {
            return Err(EngineError::StateConflict(
                "the bracket is completed".to_string(),
            ));
        }
        Ok(())
    }

    fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.state = BracketState::Completed;
        self.completed_at = Some(now);
        log::info!("bracket {} completed", self.id);
    }

    pub fn advance_swiss_round(&mut self) -> Result<u32, EngineError> {
        self.ensure_in_progress()?;
        match &mut self.progress {
            FormatProgress::Swiss(p) => p.advance(),
            _ => Err(EngineError::StateConflict(format!(
                "a {} bracket has no Swiss rounds",
                self.format
            ))),
        }
    }

    pub fn advance_battle_royale_round(&mut self) -> Result<Option<EliminationRule>, EngineError> {
        self.ensure_in_progress()?;
        match &mut self.progress {
            FormatProgress::BattleRoyale(p) => p.advance(),
            _ => Err(EngineError::StateConflict(format!(
                "a {} bracket has no battle royale rounds",
                self.format
            ))),
        }
    }

    /// Complete a custom bracket through its confirmed `Complete` action, keeping both states in step.
    pub(crate) fn complete_custom(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.ensure_in_progress()?;
        let custom = self.custom_mut().ok_or_else(|| {
            EngineError::StateConflict("only custom brackets are completed manually".to_string())
        })?;
        custom.complete(now)?;
        self.mark_completed(now);
        Ok(())
    }

    fn stage_mut(&mut self, order: u32) -> Result<&mut Stage, EngineError> {
        match &mut self.progress {
            FormatProgress::MultiStage { stages } => stages
                .iter_mut()
                .find(|s| s.order == order)
                .ok_or_else(|| EngineError::NotFound(format!("stage {}", order))),
            _ => Err(EngineError::StateConflict(
                "the bracket has no stages".to_string(),
            )),
        }
    }

    /// Store a stage's standings; `final_standings` marks the stage completed.
    /// Completing the last stage completes the bracket.
    pub fn record_stage_standings(
        &mut self,
        order: u32,
        standings: Vec<Standing>,
        final_standings: bool,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.ensure_in_progress()?;
        let last_order = self.stages().iter().map(|s| s.order).max();
        let stage = self.stage_mut(order)?;
        if !stage.is_generated {
            return Err(EngineError::StateConflict(format!(
                "stage {} has not been generated",
                stage.name
            )));
        }
        if stage.is_completed {
            return Err(EngineError::StateConflict(format!(
                "stage {} is already completed",
                stage.name
            )));
        }
        let mut seen = HashSet::new();
        for s in &standings {
            if !stage.seeds.contains(&s.participant.id) {
                return Err(EngineError::StructuralConflict(format!(
                    "{} is not seeded in stage {}",
                    s.participant.display_name, stage.name
                )));
            }
            if !seen.insert(s.participant.id) {
                return Err(EngineError::StructuralConflict(format!(
                    "{} appears more than once in the standings",
                    s.participant.display_name
                )));
            }
        }
        stage.standings = standings;
        stage.is_completed = final_standings;
        if final_standings && Some(order) == last_order {
            self.mark_completed(now);
        }
        Ok(())
    }

    /// Seed and generate the stage after `order` with the confirmed, possibly reordered,
    /// qualifiers. They must be exactly the participants the advancement rule selects.
    pub fn confirm_advancement(
        &mut self,
        order: u32,
        seeds: &[ParticipantId],
    ) -> Result<(), EngineError> {
        self.ensure_in_progress()?;
        let proposal = propose_advancement(self.stage_mut(order)?)?;
        let expected: HashSet<ParticipantId> = proposal.seed_ids().into_iter().collect();
        let given: HashSet<ParticipantId> = seeds.iter().copied().collect();
        if given.len() != seeds.len() {
            return Err(EngineError::StructuralConflict(
                "a participant is seeded more than once".to_string(),
            ));
        }
        if given != expected {
            return Err(EngineError::StructuralConflict(
                "confirmed seeds must be exactly the qualifying participants".to_string(),
            ));
        }
        let next = self.stage_mut(order + 1).map_err(|_| {
            EngineError::StateConflict(format!("stage {} is the final stage", order))
        })?;
        if next.is_generated {
            return Err(EngineError::StateConflict(format!(
                "stage {} has already been generated",
                next.name
            )));
        }
        next.seeds = seeds.to_vec();
        next.is_generated = true;
        log::info!(
            "advanced {} participant(s) into stage {} ({})",
            seeds.len(),
            next.order,
            next.name
        );
        Ok(())
    }
}
