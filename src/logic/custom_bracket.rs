//! Custom bracket lifecycle: round/match CRUD, slot assignment, results, reordering, completion.
//!
//! Every mutation checks all of its preconditions before touching state, so a rejected call
//! leaves the bracket exactly as it was. Round positions stay dense (1..=R) and match numbers stay
//! dense within their round after every operation.

use crate::logic::validate::validate_round_fields;
use crate::models::{
    CustomBracket, CustomBracketStatus, CustomMatch, CustomRound, EngineError, MatchId,
    MatchResult, MatchSchedule, ParticipantId, Pending, PendingAction, ResultInput, RoundMove,
    RoundUpdate, Slot, ValidationReport,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

fn default_round_name(round: u32) -> String {
    format!("Round {}", round)
}

/// Check a result against the match and its round's best-of, and resolve the winner.
pub fn resolve_result(
    best_of: u8,
    m: &CustomMatch,
    input: &ResultInput,
) -> Result<MatchResult, EngineError> {
    let (Some(p1), Some(p2)) = (m.slot1, m.slot2) else {
        return Err(EngineError::StructuralConflict(
            "both slots must be filled before entering a result".to_string(),
        ));
    };

    let mut report = ValidationReport::new();
    for (field, score) in [("score1", input.score1), ("score2", input.score2)] {
        if score < 0 {
            report.error(field, "Scores cannot be negative");
        } else if u32::try_from(score).is_err() {
            report.error(field, format!("Score {} is too large", score));
        }
    }
    if best_of > 1 && !report.has_errors() {
        let cap = i64::from(best_of.div_ceil(2));
        for (field, score) in [("score1", input.score1), ("score2", input.score2)] {
            if score > cap {
                report.error(
                    field,
                    format!("A best-of-{} score cannot exceed {} (got {})", best_of, cap, score),
                );
            }
        }
        if input.score1 == cap && input.score2 == cap {
            report.error(
                "score",
                format!("Both sides cannot reach {} wins in a best-of-{}", cap, best_of),
            );
        }
    }
    report.into_result()?;

    let winner_id = match input.winner_id {
        Some(w) if w == p1 || w == p2 => w,
        Some(_) => {
            return Err(EngineError::StructuralConflict(
                "winner must be one of the match participants".to_string(),
            ))
        }
        None if input.score1 > input.score2 => p1,
        None if input.score2 > input.score1 => p2,
        None => {
            return Err(EngineError::config(
                "winnerId",
                "Scores are tied; choose the winner explicitly",
            ))
        }
    };

    let (Ok(score1), Ok(score2)) = (u32::try_from(input.score1), u32::try_from(input.score2)) else {
        return Err(EngineError::config("score", "Scores are out of range"));
    };
    Ok(MatchResult {
        score1,
        score2,
        winner_id,
        winner_overridden: input.winner_id.is_some(),
    })
}

impl CustomBracket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self) -> bool {
        self.status == CustomBracketStatus::Completed
    }

    fn ensure_editable(&self) -> Result<(), EngineError> {
        if self.is_completed() {
            return Err(EngineError::StateConflict(
                "the bracket is completed and can no longer be changed".to_string(),
            ));
        }
        Ok(())
    }

    /// Record a successful mutation.
    fn touch(&mut self) {
        self.revision += 1;
        if !self.is_completed() {
            self.status = if self.rounds.is_empty() {
                CustomBracketStatus::NoRounds
            } else {
                CustomBracketStatus::InProgress
            };
        }
    }

    fn renumber_rounds(&mut self) {
        for (i, r) in self.rounds.iter_mut().enumerate() {
            r.round = i as u32 + 1;
        }
    }

    fn renumber_matches(round: &mut CustomRound) {
        for (i, m) in round.matches.iter_mut().enumerate() {
            m.match_number = i as u32 + 1;
        }
    }

    pub fn round(&self, round: u32) -> Option<&CustomRound> {
        self.rounds.iter().find(|r| r.round == round)
    }

    fn round_index(&self, round: u32) -> Result<usize, EngineError> {
        self.rounds
            .iter()
            .position(|r| r.round == round)
            .ok_or_else(|| EngineError::StructuralConflict(format!("round {} does not exist", round)))
    }

    /// (round index, match index) of a match.
    fn locate(&self, id: MatchId) -> Result<(usize, usize), EngineError> {
        self.rounds
            .iter()
            .enumerate()
            .find_map(|(ri, r)| r.matches.iter().position(|m| m.id == id).map(|mi| (ri, mi)))
            .ok_or_else(|| EngineError::StructuralConflict(format!("match {} does not exist", id)))
    }

    pub fn find_match(&self, id: MatchId) -> Option<&CustomMatch> {
        self.rounds.iter().find_map(|r| r.find_match(id))
    }

    pub fn match_count(&self) -> usize {
        self.rounds.iter().map(|r| r.matches.len()).sum()
    }

    /// Matches still missing a result; shown to the operator before completing.
    pub fn matches_without_result(&self) -> usize {
        self.rounds
            .iter()
            .flat_map(|r| &r.matches)
            .filter(|m| !m.has_result())
            .count()
    }

    /// Append a round at the next position. Returns its position.
    pub fn add_round(&mut self, best_of: u8, name: Option<String>) -> Result<u32, EngineError> {
        self.ensure_editable()?;
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        validate_round_fields(name.as_deref(), Some(best_of)).into_result()?;
        let round = self.rounds.len() as u32 + 1;
        self.rounds.push(CustomRound {
            round,
            name: name.unwrap_or_else(|| default_round_name(round)),
            best_of,
            matches: Vec::new(),
        });
        self.touch();
        log::debug!("custom bracket: added round {}", round);
        Ok(round)
    }

    /// Rename a round or change its best-of. Existing results must still fit the new best-of.
    pub fn update_round(&mut self, round: u32, update: &RoundUpdate) -> Result<(), EngineError> {
        self.ensure_editable()?;
        let ri = self.round_index(round)?;
        let name = update.name.as_ref().map(|n| n.trim().to_string());
        validate_round_fields(name.as_deref(), update.best_of).into_result()?;

        if let Some(best_of) = update.best_of {
            for m in &self.rounds[ri].matches {
                if let Some(result) = &m.result {
                    let input = ResultInput {
                        score1: i64::from(result.score1),
                        score2: i64::from(result.score2),
                        winner_id: Some(result.winner_id),
                    };
                    if resolve_result(best_of, m, &input).is_err() {
                        return Err(EngineError::StructuralConflict(format!(
                            "the result of match {} does not fit best-of-{}",
                            m.match_number, best_of
                        )));
                    }
                }
            }
        }

        let r = &mut self.rounds[ri];
        if let Some(name) = name {
            r.name = if name.is_empty() {
                default_round_name(round)
            } else {
                name
            };
        }
        if let Some(best_of) = update.best_of {
            r.best_of = best_of;
        }
        self.touch();
        Ok(())
    }

    pub(crate) fn delete_round(&mut self, round: u32) -> Result<CustomRound, EngineError> {
        self.ensure_editable()?;
        let ri = self.round_index(round)?;
        let removed = self.rounds.remove(ri);
        self.renumber_rounds();
        self.touch();
        log::debug!("custom bracket: deleted round {}", round);
        Ok(removed)
    }

    /// Move one round to a new position; the rounds in between shift by one.
    pub fn reorder_round(&mut self, round: u32, new_position: u32) -> Result<(), EngineError> {
        self.reorder_rounds(&[RoundMove {
            round,
            new_position,
        }])
    }

    /// Place each moved round at its new position and fill the remaining positions with the
    /// other rounds in their current order. Positions are renumbered 1..=R afterwards.
    pub fn reorder_rounds(&mut self, moves: &[RoundMove]) -> Result<(), EngineError> {
        self.ensure_editable()?;
        let total = self.rounds.len() as u32;
        let mut moved = HashSet::new();
        let mut targets = HashSet::new();
        for mv in moves {
            self.round_index(mv.round)?;
            if mv.new_position < 1 || mv.new_position > total {
                return Err(EngineError::StructuralConflict(format!(
                    "position {} is outside 1..={}",
                    mv.new_position, total
                )));
            }
            if !moved.insert(mv.round) {
                return Err(EngineError::StructuralConflict(format!(
                    "round {} is moved more than once",
                    mv.round
                )));
            }
            if !targets.insert(mv.new_position) {
                return Err(EngineError::StructuralConflict(format!(
                    "two rounds are moved to position {}",
                    mv.new_position
                )));
            }
        }
        if moves.iter().all(|mv| mv.round == mv.new_position) {
            return Ok(());
        }

        let mut slots: Vec<Option<CustomRound>> = vec![None; self.rounds.len()];
        let mut rest = Vec::new();
        for r in self.rounds.drain(..) {
            match moves.iter().find(|mv| mv.round == r.round) {
                Some(mv) => slots[(mv.new_position - 1) as usize] = Some(r),
                None => rest.push(r),
            }
        }
        let mut rest = rest.into_iter();
        self.rounds = slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| rest.next()))
            .collect();
        self.renumber_rounds();
        self.touch();
        Ok(())
    }

    /// Append a match at the next position in a round.
    pub fn add_match(&mut self, round: u32) -> Result<MatchId, EngineError> {
        self.ensure_editable()?;
        let ri = self.round_index(round)?;
        let r = &mut self.rounds[ri];
        let m = CustomMatch::new(r.matches.len() as u32 + 1);
        let id = m.id;
        r.matches.push(m);
        self.touch();
        log::debug!("custom bracket: added match {} to round {}", id, round);
        Ok(id)
    }

    pub(crate) fn delete_match(&mut self, id: MatchId) -> Result<CustomMatch, EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        let removed = self.rounds[ri].matches.remove(mi);
        Self::renumber_matches(&mut self.rounds[ri]);
        self.touch();
        Ok(removed)
    }

    /// Move a match within its round.
    pub fn reorder_match(&mut self, id: MatchId, new_position: u32) -> Result<(), EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        let len = self.rounds[ri].matches.len() as u32;
        if new_position < 1 || new_position > len {
            return Err(EngineError::StructuralConflict(format!(
                "position {} is outside 1..={}",
                new_position, len
            )));
        }
        let target = (new_position - 1) as usize;
        if target == mi {
            return Ok(());
        }
        let r = &mut self.rounds[ri];
        let m = r.matches.remove(mi);
        r.matches.insert(target, m);
        Self::renumber_matches(r);
        self.touch();
        Ok(())
    }

    /// Set or clear one slot. A participant cannot hold both slots of a match.
    pub fn assign_slot(
        &mut self,
        id: MatchId,
        slot: Slot,
        participant: Option<ParticipantId>,
    ) -> Result<(), EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        let m = &self.rounds[ri].matches[mi];
        if m.slot(slot) == participant {
            return Ok(());
        }
        if let Some(p) = participant {
            if m.slot(slot.other()) == Some(p) {
                return Err(EngineError::StructuralConflict(format!(
                    "participant {} already holds the other slot of this match",
                    p
                )));
            }
        }
        if m.has_result() {
            return Err(EngineError::StructuralConflict(
                "clear the result before changing the participants".to_string(),
            ));
        }
        *self.rounds[ri].matches[mi].slot_mut(slot) = participant;
        self.touch();
        Ok(())
    }

    /// Record a result. The winner is the higher score unless given explicitly; ties need it.
    pub fn set_result(&mut self, id: MatchId, input: ResultInput) -> Result<MatchResult, EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        let round = &self.rounds[ri];
        let result = resolve_result(round.best_of, &round.matches[mi], &input)?;
        let m = &mut self.rounds[ri].matches[mi];
        if m.result.as_ref() != Some(&result) {
            m.result = Some(result.clone());
            self.touch();
        }
        Ok(result)
    }

    pub(crate) fn clear_result(&mut self, id: MatchId) -> Result<(), EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        if self.rounds[ri].matches[mi].result.take().is_some() {
            self.touch();
        }
        Ok(())
    }

    pub(crate) fn complete(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.ensure_editable()?;
        if self.status == CustomBracketStatus::NoRounds {
            return Err(EngineError::StateConflict(
                "a bracket without rounds cannot be completed".to_string(),
            ));
        }
        let open = self.matches_without_result();
        self.status = CustomBracketStatus::Completed;
        self.completed_at = Some(now);
        self.revision += 1;
        log::info!("custom bracket completed ({} matches without result)", open);
        Ok(())
    }

    pub fn set_schedule(&mut self, id: MatchId, schedule: MatchSchedule) -> Result<(), EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        self.rounds[ri].matches[mi].schedule = schedule;
        self.touch();
        Ok(())
    }

    /// Recompute every match status from its schedule at `now`. Returns how many changed.
    pub fn refresh_statuses(&mut self, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for m in self.rounds.iter_mut().flat_map(|r| r.matches.iter_mut()) {
            let status = m.schedule.status_at(now, m.has_result());
            if status != m.status {
                m.status = status;
                changed += 1;
            }
        }
        if changed > 0 {
            self.revision += 1;
        }
        changed
    }

    fn pending(&self, action: PendingAction, summary: String) -> Pending {
        Pending {
            action,
            summary,
            revision: self.revision,
        }
    }

    pub fn propose_delete_round(&self, round: u32) -> Result<Pending, EngineError> {
        self.ensure_editable()?;
        let r = &self.rounds[self.round_index(round)?];
        let with_results = r.matches.iter().filter(|m| m.has_result()).count();
        let summary = format!(
            "Delete {} (round {}) and its {} match(es), {} with a recorded result",
            r.name,
            round,
            r.matches.len(),
            with_results
        );
        Ok(self.pending(PendingAction::DeleteRound { round }, summary))
    }

    pub fn propose_delete_match(&self, id: MatchId) -> Result<Pending, EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        let r = &self.rounds[ri];
        let m = &r.matches[mi];
        let mut summary = format!("Delete match {} of {}", m.match_number, r.name);
        if m.has_result() {
            summary.push_str(" and its recorded result");
        }
        Ok(self.pending(PendingAction::DeleteMatch { match_id: id }, summary))
    }

    pub fn propose_clear_result(&self, id: MatchId) -> Result<Pending, EngineError> {
        self.ensure_editable()?;
        let (ri, mi) = self.locate(id)?;
        let r = &self.rounds[ri];
        let m = &r.matches[mi];
        let result = m.result.as_ref().ok_or_else(|| {
            EngineError::StructuralConflict(format!(
                "match {} of {} has no result to clear",
                m.match_number, r.name
            ))
        })?;
        let summary = format!(
            "Clear the {}-{} result of match {} in {}",
            result.score1, result.score2, m.match_number, r.name
        );
        Ok(self.pending(PendingAction::ClearResult { match_id: id }, summary))
    }

    /// Completing is allowed with open matches; the summary says how many.
    pub fn propose_complete(&self) -> Result<Pending, EngineError> {
        self.ensure_editable()?;
        if self.status == CustomBracketStatus::NoRounds {
            return Err(EngineError::StateConflict(
                "a bracket without rounds cannot be completed".to_string(),
            ));
        }
        let open = self.matches_without_result();
        let summary = if open == 0 {
            format!("Complete the bracket; all {} matches have results", self.match_count())
        } else {
            format!(
                "Complete the bracket; {} of {} matches have no result",
                open,
                self.match_count()
            )
        };
        Ok(self.pending(PendingAction::Complete, summary))
    }

    /// Apply a proposed action. Rejected when the bracket changed since it was proposed.
    pub fn confirm(&mut self, pending: &Pending, now: DateTime<Utc>) -> Result<(), EngineError> {
        if pending.revision != self.revision {
            return Err(EngineError::StateConflict(
                "the bracket changed since this action was proposed; review it again".to_string(),
            ));
        }
        match pending.action {
            PendingAction::DeleteRound { round } => self.delete_round(round).map(|_| ()),
            PendingAction::DeleteMatch { match_id } => self.delete_match(match_id).map(|_| ()),
            PendingAction::ClearResult { match_id } => self.clear_result(match_id),
            PendingAction::Complete => self.complete(now),
        }
    }
}
