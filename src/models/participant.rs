//! Participants: teams or players, and the normalized profile bracket logic works with.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (team or player).
pub type ParticipantId = Uuid;

/// Which kind of participant a tournament is played with. Only one kind is active per tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationType {
    #[default]
    Team,
    Player,
}

impl ParticipationType {
    /// Plural noun used in validation messages ("teams" / "players").
    pub fn plural(self) -> &'static str {
        match self {
            ParticipationType::Team => "teams",
            ParticipationType::Player => "players",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            ParticipationType::Team => "team",
            ParticipationType::Player => "player",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: ParticipantId,
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: ParticipantId,
    pub nickname: String,
    pub photo: Option<String>,
}

/// A bracket participant. Bracket logic reads it through [`Participant::profile`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    Team(Team),
    Player(Player),
}

/// Normalized `{id, displayName, media}` projection of a participant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    pub id: ParticipantId,
    pub display_name: String,
    pub media: Option<String>,
}

impl Participant {
    /// A new team with a fresh id.
    pub fn team(name: impl Into<String>) -> Self {
        Participant::Team(Team {
            id: Uuid::new_v4(),
            name: name.into(),
            logo: None,
        })
    }

    /// A new player with a fresh id.
    pub fn player(nickname: impl Into<String>) -> Self {
        Participant::Player(Player {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            photo: None,
        })
    }

    pub fn id(&self) -> ParticipantId {
        match self {
            Participant::Team(t) => t.id,
            Participant::Player(p) => p.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Participant::Team(t) => &t.name,
            Participant::Player(p) => &p.nickname,
        }
    }

    pub fn media(&self) -> Option<&str> {
        match self {
            Participant::Team(t) => t.logo.as_deref(),
            Participant::Player(p) => p.photo.as_deref(),
        }
    }

    pub fn kind(&self) -> ParticipationType {
        match self {
            Participant::Team(_) => ParticipationType::Team,
            Participant::Player(_) => ParticipationType::Player,
        }
    }

    pub fn profile(&self) -> ParticipantProfile {
        ParticipantProfile {
            id: self.id(),
            display_name: self.display_name().to_string(),
            media: self.media().map(str::to_string),
        }
    }
}
