//! SeedList: the ordered participant list every format starts from.

use crate::models::error::EngineError;
use crate::models::participant::{Participant, ParticipantId, ParticipationType, Player, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant at its 1-based position in a [`SeedList`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Seed<'a> {
    pub rank: usize,
    pub participant: &'a Participant,
}

/// Ordered participants of a single kind. Participant ids are unique within the list.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeedList")]
pub struct SeedList {
    kind: ParticipationType,
    participants: Vec<Participant>,
}

/// Wire shape of a [`SeedList`]; converted through [`SeedList::from_participants`].
#[derive(Deserialize)]
struct RawSeedList {
    kind: ParticipationType,
    participants: Vec<Participant>,
}

impl TryFrom<RawSeedList> for SeedList {
    type Error = EngineError;

    fn try_from(raw: RawSeedList) -> Result<Self, Self::Error> {
        Self::from_participants(raw.kind, raw.participants)
    }
}

/// One row of a seed CSV import: `name` is required, `id` and `media` are optional.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    #[serde(default)]
    media: Option<String>,
}

impl SeedList {
    pub fn new(kind: ParticipationType) -> Self {
        Self {
            kind,
            participants: Vec::new(),
        }
    }

    /// Build a list from participants in order. Fails on a duplicate id or a kind mismatch.
    pub fn from_participants(
        kind: ParticipationType,
        participants: impl IntoIterator<Item = Participant>,
    ) -> Result<Self, EngineError> {
        let mut list = Self::new(kind);
        for p in participants {
            list.push(p)?;
        }
        Ok(list)
    }

    /// Import seeds from CSV with a header row (`name`, optional `id` and `media`), in file order.
    pub fn from_csv_reader<R: std::io::Read>(
        kind: ParticipationType,
        reader: R,
    ) -> Result<Self, EngineError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut list = Self::new(kind);
        for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
            // Header is line 1.
            let line = line + 2;
            let row = row
                .map_err(|e| EngineError::InvalidArgument(format!("seed CSV line {}: {}", line, e)))?;
            if row.name.is_empty() {
                return Err(EngineError::InvalidArgument(format!(
                    "seed CSV line {}: name is empty",
                    line
                )));
            }
            let id = row.id.unwrap_or_else(Uuid::new_v4);
            let media = row.media.filter(|m| !m.is_empty());
            let participant = match kind {
                ParticipationType::Team => Participant::Team(Team {
                    id,
                    name: row.name,
                    logo: media,
                }),
                ParticipationType::Player => Participant::Player(Player {
                    id,
                    nickname: row.name,
                    photo: media,
                }),
            };
            list.push(participant)?;
        }
        Ok(list)
    }

    pub fn kind(&self) -> ParticipationType {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Seeds in list order, ranked from 1.
    pub fn seeds(&self) -> impl Iterator<Item = Seed<'_>> {
        self.participants
            .iter()
            .enumerate()
            .map(|(i, participant)| Seed {
                rank: i + 1,
                participant,
            })
    }

    pub fn ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(Participant::id).collect()
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.get(id).is_some()
    }

    /// 1-based rank of a participant.
    pub fn rank_of(&self, id: ParticipantId) -> Option<usize> {
        self.index_of(id).map(|i| i + 1)
    }

    fn index_of(&self, id: ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| p.id() == id)
    }

    fn require_index(&self, id: ParticipantId) -> Result<usize, EngineError> {
        self.index_of(id)
            .ok_or_else(|| EngineError::NotFound(format!("participant {}", id)))
    }

    /// Append a participant as the lowest seed.
    pub fn push(&mut self, participant: Participant) -> Result<(), EngineError> {
        if participant.kind() != self.kind {
            return Err(EngineError::StructuralConflict(format!(
                "this seed list holds {}, not {}",
                self.kind.plural(),
                participant.kind().plural()
            )));
        }
        if self.contains(participant.id()) {
            return Err(EngineError::StructuralConflict(format!(
                "{} is already seeded",
                participant.display_name()
            )));
        }
        self.participants.push(participant);
        Ok(())
    }

    pub fn remove(&mut self, id: ParticipantId) -> Result<Participant, EngineError> {
        let idx = self.require_index(id)?;
        Ok(self.participants.remove(idx))
    }

    /// Swap a participant with the one seeded directly above it.
    pub fn move_up(&mut self, id: ParticipantId) -> Result<(), EngineError> {
        let idx = self.require_index(id)?;
        if idx == 0 {
            return Err(EngineError::StructuralConflict(
                "participant is already the top seed".to_string(),
            ));
        }
        self.participants.swap(idx, idx - 1);
        Ok(())
    }

    /// Swap a participant with the one seeded directly below it.
    pub fn move_down(&mut self, id: ParticipantId) -> Result<(), EngineError> {
        let idx = self.require_index(id)?;
        if idx + 1 >= self.participants.len() {
            return Err(EngineError::StructuralConflict(
                "participant is already the bottom seed".to_string(),
            ));
        }
        self.participants.swap(idx, idx + 1);
        Ok(())
    }

    /// Move a participant to a 1-based rank, shifting the seeds in between.
    pub fn move_to(&mut self, id: ParticipantId, rank: usize) -> Result<(), EngineError> {
        let idx = self.require_index(id)?;
        if rank == 0 || rank > self.participants.len() {
            return Err(EngineError::InvalidArgument(format!(
                "rank {} is outside 1..={}",
                rank,
                self.participants.len()
            )));
        }
        let p = self.participants.remove(idx);
        self.participants.insert(rank - 1, p);
        Ok(())
    }

    /// Randomize the seeding order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.participants.shuffle(rng);
    }
}
