//! Request contracts of the external bracket service. Field names are camelCase on the wire.

use crate::models::custom::{ResultInput, Slot};
use crate::models::format::{
    AdvancementRule, BattleRoyaleConfig, BestOfOverride, BracketFormat, Group, SwissConfig,
};
use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub name: String,
    pub team_ids: Vec<ParticipantId>,
}

impl From<&Group> for GroupPayload {
    fn from(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            team_ids: group.members.clone(),
        }
    }
}

impl From<GroupPayload> for Group {
    fn from(payload: GroupPayload) -> Self {
        Self {
            name: payload.name,
            members: payload.team_ids,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRoundPayload {
    pub name: String,
    pub best_of: u8,
    pub matches: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CustomConfigPayload {
    pub rounds: Vec<CustomRoundPayload>,
}

/// Format-specific part of a stage; only the field for the stage's format is set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grand_finals_reset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swiss_config: Option<SwissConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_royale_config: Option<BattleRoyaleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<CustomConfigPayload>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSpec {
    pub stage_order: u32,
    pub name: String,
    pub bracket_type: BracketFormat,
    pub is_visible_in_app: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advancement_rule: Option<AdvancementRule>,
    pub config: StageConfig,
}

/// Body of `generateBracket`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub bracket_type: BracketFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds: Option<Vec<ParticipantId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_best_of: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_advance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grand_finals_reset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_of_per_round: Option<Vec<BestOfOverride>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swiss_config: Option<SwissConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_royale_config: Option<BattleRoyaleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<CustomConfigPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<StageSpec>>,
}

impl GenerationRequest {
    /// A request with only the bracket type set.
    pub fn bare(bracket_type: BracketFormat) -> Self {
        Self {
            bracket_type,
            seeds: None,
            groups: None,
            default_best_of: None,
            auto_advance: None,
            grand_finals_reset: None,
            best_of_per_round: None,
            swiss_config: None,
            battle_royale_config: None,
            custom_config: None,
            stages: None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoundRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub best_of: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundMove {
    pub round: u32,
    pub new_position: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReorderRoundsRequest {
    pub rounds: Vec<RoundMove>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AddMatchRequest {
    pub round: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderMatchRequest {
    pub new_position: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignSlotRequest {
    pub slot: Slot,
    pub team_id: Option<ParticipantId>,
}

/// Body of `setResult`: either scores (with optional winner override) or `{ "clear": true }`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetResultRequest {
    #[serde(rename_all = "camelCase")]
    Scores {
        team1_score: i64,
        team2_score: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner_id: Option<ParticipantId>,
    },
    Clear { clear: bool },
}

impl From<ResultInput> for SetResultRequest {
    fn from(input: ResultInput) -> Self {
        SetResultRequest::Scores {
            team1_score: input.score1,
            team2_score: input.score2,
            winner_id: input.winner_id,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfirmAdvancementRequest {
    pub seeds: Vec<ParticipantId>,
}
