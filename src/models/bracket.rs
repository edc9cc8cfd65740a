//! Bracket aggregate: state, format progress, stages and standings.

use crate::models::custom::CustomBracket;
use crate::models::format::{
    AdvancementRule, BattleRoyaleConfig, BestOfOverride, BracketFormat, Group, SwissConfig,
};
use crate::models::participant::{ParticipantId, ParticipantProfile};
use crate::models::request::StageConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a tournament.
pub type TournamentId = uuid::Uuid;
/// Unique identifier for a generated bracket.
pub type BracketId = uuid::Uuid;

/// A tournament without a bracket has none (`Option<Bracket>`); once generated it is in progress.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketState {
    #[default]
    InProgress,
    /// Terminal: no structural mutation is accepted.
    Completed,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

/// One line of a stage's final standings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub participant: ParticipantProfile,
    #[serde(default)]
    pub group: Option<String>,
    /// 1-based; within a group for grouped stages.
    pub rank: u32,
    #[serde(default)]
    pub record: Record,
}

/// A participant proposed for the next stage, with why it qualified ("1st in Group A").
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancingSeed {
    pub participant: ParticipantProfile,
    pub group: Option<String>,
    pub reason: String,
}

/// Result of `calculateAdvancement`. The operator may reorder it before confirming.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancementProposal {
    pub stage_order: u32,
    pub rule: AdvancementRule,
    pub seeds: Vec<AdvancingSeed>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissProgress {
    pub config: SwissConfig,
    /// 1-based round currently being played.
    pub current_round: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRoyaleProgress {
    pub config: BattleRoyaleConfig,
    /// 1-based round currently being played.
    pub current_round: u32,
    pub lobbies: u32,
    /// Participants still standing.
    pub remaining: u32,
}

/// One stage of a multi-stage bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub order: u32,
    pub name: String,
    pub format: BracketFormat,
    pub is_visible: bool,
    pub advancement_rule: Option<AdvancementRule>,
    pub config: StageConfig,
    pub is_generated: bool,
    pub is_completed: bool,
    pub seeds: Vec<ParticipantId>,
    pub standings: Vec<Standing>,
}

impl Stage {
    /// Group names in definition order (empty for ungrouped stages).
    pub fn group_order(&self) -> Vec<String> {
        self.config
            .groups
            .as_ref()
            .map(|groups| groups.iter().map(|g| g.name.clone()).collect())
            .unwrap_or_default()
    }
}

/// Per-format progress of a generated bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatProgress {
    Elimination { grand_finals_reset: bool },
    RoundRobin,
    Swiss(SwissProgress),
    BattleRoyale(BattleRoyaleProgress),
    Custom(CustomBracket),
    MultiStage { stages: Vec<Stage> },
}

/// A generated bracket, as returned by `getBracket`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub id: BracketId,
    pub tournament_id: TournamentId,
    pub format: BracketFormat,
    pub state: BracketState,
    pub seeds: Vec<ParticipantId>,
    pub groups: Vec<Group>,
    pub default_best_of: u8,
    pub best_of_per_round: Vec<BestOfOverride>,
    pub auto_advance: bool,
    pub progress: FormatProgress,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Bracket {
    pub fn is_completed(&self) -> bool {
        self.state == BracketState::Completed
    }

    pub fn custom(&self) -> Option<&CustomBracket> {
        match &self.progress {
            FormatProgress::Custom(c) => Some(c),
            _ => None,
        }
    }

    pub fn custom_mut(&mut self) -> Option<&mut CustomBracket> {
        match &mut self.progress {
            FormatProgress::Custom(c) => Some(c),
            _ => None,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        match &self.progress {
            FormatProgress::MultiStage { stages } => stages,
            _ => &[],
        }
    }
}
