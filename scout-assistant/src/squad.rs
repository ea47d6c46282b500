// Squad formations, slot assignment, and per-slot alternates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SquadError;
use crate::player::PlayerId;

/// A (slot label, player) pair handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub slot: String,
    pub player_id: PlayerId,
}

impl Assignment {
    pub fn new(slot: impl Into<String>, player_id: impl Into<String>) -> Self {
        Assignment {
            slot: slot.into(),
            player_id: PlayerId::new(player_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Formations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "4-4-2")]
    F442,
    #[serde(rename = "4-3-3")]
    F433,
    #[serde(rename = "4-2-3-1")]
    F4231,
    #[serde(rename = "3-5-2")]
    F352,
    #[serde(rename = "3-4-3")]
    F343,
    #[serde(rename = "5-3-2")]
    F532,
}

impl Formation {
    pub const ALL: [Formation; 6] = [
        Formation::F442,
        Formation::F433,
        Formation::F4231,
        Formation::F352,
        Formation::F343,
        Formation::F532,
    ];

    /// Slot labels in display order, goalkeeper first.
    pub fn slots(&self) -> &'static [&'static str] {
        match self {
            Formation::F442 => &["GK", "LB", "CB", "CB", "RB", "LM", "CM", "CM", "RM", "ST", "ST"],
            Formation::F433 => &["GK", "LB", "CB", "CB", "RB", "CM", "DM", "CM", "LW", "ST", "RW"],
            Formation::F4231 => {
                &["GK", "LB", "CB", "CB", "RB", "DM", "DM", "LW", "AM", "RW", "ST"]
            }
            Formation::F352 => &["GK", "CB", "CB", "CB", "LWB", "CM", "DM", "CM", "RWB", "ST", "ST"],
            Formation::F343 => &["GK", "CB", "CB", "CB", "LM", "CM", "CM", "RM", "LW", "ST", "RW"],
            Formation::F532 => {
                &["GK", "LWB", "CB", "CB", "CB", "RWB", "CM", "DM", "CM", "ST", "ST"]
            }
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Formation::F442 => "4-4-2",
            Formation::F433 => "4-3-3",
            Formation::F4231 => "4-2-3-1",
            Formation::F352 => "3-5-2",
            Formation::F343 => "3-4-3",
            Formation::F532 => "5-3-2",
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

impl FromStr for Formation {
    type Err = SquadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Formation::ALL
            .iter()
            .copied()
            .find(|f| f.display_str() == trimmed || f.display_str().replace('-', "") == trimmed)
            .ok_or_else(|| SquadError::UnknownFormation(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Squad
// ---------------------------------------------------------------------------

/// One formation slot: the active player plus bench options for the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadSlot {
    pub label: String,
    pub active: Option<PlayerId>,
    #[serde(default)]
    pub alternates: Vec<PlayerId>,
}

impl SquadSlot {
    pub fn empty(label: impl Into<String>) -> Self {
        SquadSlot {
            label: label.into(),
            active: None,
            alternates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub id: String,
    pub name: String,
    pub formation: Formation,
    pub slots: Vec<SquadSlot>,
}

impl Squad {
    /// Create a squad with one empty slot per formation position.
    pub fn new(id: impl Into<String>, name: impl Into<String>, formation: Formation) -> Self {
        Squad {
            id: id.into(),
            name: name.into(),
            formation,
            slots: formation.slots().iter().map(|l| SquadSlot::empty(*l)).collect(),
        }
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut SquadSlot, SquadError> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(SquadError::SlotOutOfRange { index, len })
    }

    /// Drop a player from every slot, active or alternate.
    fn detach(&mut self, player: &PlayerId) {
        for slot in &mut self.slots {
            if slot.active.as_ref() == Some(player) {
                slot.active = None;
            }
            slot.alternates.retain(|p| p != player);
        }
    }

    /// Make `player` the active player of slot `index`.
    ///
    /// The player is first removed from wherever else they sit in the squad.
    /// The slot's previous active player moves to the front of its
    /// alternates.
    pub fn assign(&mut self, index: usize, player: PlayerId) -> Result<(), SquadError> {
        self.slot_mut(index)?;
        if self.slots[index].active.as_ref() == Some(&player) {
            return Ok(());
        }
        self.detach(&player);
        let slot = self.slot_mut(index)?;
        if let Some(previous) = slot.active.replace(player) {
            slot.alternates.insert(0, previous);
        }
        Ok(())
    }

    /// Slot index where `player` is currently active, if any.
    pub fn active_slot_of(&self, player: &PlayerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.active.as_ref() == Some(player))
    }

    /// Add a bench option for slot `index`. Adding an existing alternate is a
    /// no-op. A player who starts in any slot cannot also be an alternate.
    pub fn add_alternate(&mut self, index: usize, player: PlayerId) -> Result<(), SquadError> {
        self.slot_mut(index)?;
        if let Some(active_in) = self.active_slot_of(&player) {
            return Err(SquadError::AlreadyActive {
                player_id: player,
                index: active_in,
            });
        }
        let slot = self.slot_mut(index)?;
        if !slot.alternates.contains(&player) {
            slot.alternates.push(player);
        }
        Ok(())
    }

    /// Swap an alternate into the active spot of slot `index`.
    ///
    /// The promoted player is removed from every other slot first, so a
    /// player is never active twice.
    pub fn promote_alternate(&mut self, index: usize, player: &PlayerId) -> Result<(), SquadError> {
        let slot = self.slot_mut(index)?;
        let Some(pos) = slot.alternates.iter().position(|p| p == player) else {
            return Err(SquadError::NotAnAlternate {
                player_id: player.clone(),
                index,
            });
        };
        self.detach(player);
        let slot = self.slot_mut(index)?;
        if let Some(previous) = slot.active.replace(player.clone()) {
            let at = pos.min(slot.alternates.len());
            slot.alternates.insert(at, previous);
        }
        Ok(())
    }

    /// Clear the active player and alternates of slot `index`.
    pub fn clear_slot(&mut self, index: usize) -> Result<(), SquadError> {
        let slot = self.slot_mut(index)?;
        slot.active = None;
        slot.alternates.clear();
        Ok(())
    }

    /// Active players with their slot labels.
    pub fn starter_assignments(&self) -> Vec<Assignment> {
        self.slots
            .iter()
            .filter_map(|s| {
                s.active.as_ref().map(|p| Assignment {
                    slot: s.label.clone(),
                    player_id: p.clone(),
                })
            })
            .collect()
    }

    /// Alternates with the label of the slot they cover.
    pub fn alternate_assignments(&self) -> Vec<Assignment> {
        self.slots
            .iter()
            .flat_map(|s| {
                s.alternates.iter().map(move |p| Assignment {
                    slot: s.label.clone(),
                    player_id: p.clone(),
                })
            })
            .collect()
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.active.is_some()).count()
    }
}
