//! Manual group editing for round robin configuration.

use crate::logic::distribute::{auto_distribute, group_name, snake_distribute};
use crate::models::{EngineError, Group, ParticipantId, RoundRobinConfig, SeedList};

impl RoundRobinConfig {
    /// Groups filled by [`auto_distribute`].
    pub fn auto(seeds: &SeedList, group_count: usize) -> Result<Self, EngineError> {
        Ok(Self {
            groups: auto_distribute(seeds, group_count)?,
        })
    }

    /// Groups filled by [`snake_distribute`].
    pub fn snake(seeds: &SeedList, group_count: usize) -> Result<Self, EngineError> {
        Ok(Self {
            groups: snake_distribute(seeds, group_count)?,
        })
    }

    fn require_group(&self, index: usize) -> Result<(), EngineError> {
        if index >= self.groups.len() {
            return Err(EngineError::NotFound(format!("group #{}", index + 1)));
        }
        Ok(())
    }

    /// Append an empty group with the next default name. Returns its index.
    pub fn add_group(&mut self) -> usize {
        let index = self.groups.len();
        self.groups.push(Group::new(group_name(index)));
        index
    }

    pub fn rename_group(&mut self, index: usize, name: impl Into<String>) -> Result<(), EngineError> {
        self.require_group(index)?;
        self.groups[index].name = name.into();
        Ok(())
    }

    /// Remove a group; its members become unassigned.
    pub fn remove_group(&mut self, index: usize) -> Result<Group, EngineError> {
        self.require_group(index)?;
        Ok(self.groups.remove(index))
    }

    /// Put a participant in a group, taking it out of any other group first.
    pub fn assign(&mut self, participant: ParticipantId, index: usize) -> Result<(), EngineError> {
        self.require_group(index)?;
        if self.groups[index].contains(participant) {
            return Ok(());
        }
        self.unassign(participant);
        self.groups[index].members.push(participant);
        Ok(())
    }

    /// Take a participant out of whichever group holds it. Returns whether it was assigned.
    pub fn unassign(&mut self, participant: ParticipantId) -> bool {
        let mut found = false;
        for g in &mut self.groups {
            let before = g.members.len();
            g.members.retain(|m| *m != participant);
            found |= g.members.len() != before;
        }
        found
    }

    /// Index of the group holding a participant.
    pub fn group_of(&self, participant: ParticipantId) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(participant))
    }

    /// Members of all groups, group by group, in member order.
    pub fn flattened(&self) -> Vec<ParticipantId> {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().copied())
            .collect()
    }
}
