//! Custom (manual) bracket: rounds, matches, slots and results.

use crate::models::participant::ParticipantId;
use crate::models::schedule::{MatchSchedule, MatchStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a custom match.
pub type MatchId = Uuid;

/// Which side of a match. Serialized as `1` / `2`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(format!("slot must be 1 or 2, got {}", other)),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        match slot {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

/// A recorded result. `winner_overridden` is set when the operator picked the winner.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub score1: u32,
    pub score2: u32,
    pub winner_id: ParticipantId,
    pub winner_overridden: bool,
}

/// Result as entered by the operator, before validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInput {
    pub score1: i64,
    pub score2: i64,
    #[serde(default)]
    pub winner_id: Option<ParticipantId>,
}

impl ResultInput {
    pub fn scores(score1: i64, score2: i64) -> Self {
        Self {
            score1,
            score2,
            winner_id: None,
        }
    }

    pub fn with_winner(mut self, winner_id: ParticipantId) -> Self {
        self.winner_id = Some(winner_id);
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMatch {
    pub id: MatchId,
    /// 1-based position within its round.
    pub match_number: u32,
    pub slot1: Option<ParticipantId>,
    pub slot2: Option<ParticipantId>,
    pub result: Option<MatchResult>,
    #[serde(default)]
    pub schedule: MatchSchedule,
    #[serde(default)]
    pub status: MatchStatus,
}

impl CustomMatch {
    pub fn new(match_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_number,
            slot1: None,
            slot2: None,
            result: None,
            schedule: MatchSchedule::default(),
            status: MatchStatus::Scheduled,
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<ParticipantId> {
        match slot {
            Slot::One => self.slot1,
            Slot::Two => self.slot2,
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: Slot) -> &mut Option<ParticipantId> {
        match slot {
            Slot::One => &mut self.slot1,
            Slot::Two => &mut self.slot2,
        }
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRound {
    /// 1-based position. Positions of a bracket's rounds are always 1..=R.
    pub round: u32,
    pub name: String,
    pub best_of: u8,
    pub matches: Vec<CustomMatch>,
}

impl CustomRound {
    pub fn find_match(&self, id: MatchId) -> Option<&CustomMatch> {
        self.matches.iter().find(|m| m.id == id)
    }
}

/// Partial update for a round.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub best_of: Option<u8>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomBracketStatus {
    #[default]
    NoRounds,
    InProgress,
    Completed,
}

/// A fully manual bracket. Rounds are kept sorted by position; `revision` moves on every mutation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomBracket {
    pub status: CustomBracketStatus,
    pub rounds: Vec<CustomRound>,
    pub revision: u64,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A destructive operation waiting for confirmation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    DeleteRound { round: u32 },
    DeleteMatch { match_id: MatchId },
    ClearResult { match_id: MatchId },
    Complete,
}

/// First half of a two-phase destructive call. Only valid against the revision it was proposed at.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pending {
    pub action: PendingAction,
    /// What confirming will do, for the operator.
    pub summary: String,
    pub revision: u64,
}
