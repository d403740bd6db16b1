//! Scene identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies each scene the client can show.
///
/// The set is closed: adding a scene means adding a variant here, which
/// forces every exhaustive match (factories, guards) to account for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneId {
    /// Title screen; the designated initial scene.
    Title,
    /// Town hub menu.
    Hub,
    /// Character-creation wizard.
    CharacterCreation,
    /// Tavern roster where the party is assembled.
    PartyRoster,
    /// Training grounds.
    Training,
    /// Trading post.
    Shop,
    /// Temple of healing.
    Temple,
    /// Inn, for resting.
    Inn,
    /// Edge of town where expeditions are staged.
    ExpeditionStaging,
    /// Dungeon exploration.
    Dungeon,
    /// Combat encounter.
    Encounter,
}

impl SceneId {
    /// Every scene, in declaration order.
    pub const ALL: [SceneId; 11] = [
        SceneId::Title,
        SceneId::Hub,
        SceneId::CharacterCreation,
        SceneId::PartyRoster,
        SceneId::Training,
        SceneId::Shop,
        SceneId::Temple,
        SceneId::Inn,
        SceneId::ExpeditionStaging,
        SceneId::Dungeon,
        SceneId::Encounter,
    ];

    /// The scene the application starts in.
    pub const INITIAL: SceneId = SceneId::Title;

    /// Stable snake_case name, used in logs and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SceneId::Title => "title",
            SceneId::Hub => "hub",
            SceneId::CharacterCreation => "character_creation",
            SceneId::PartyRoster => "party_roster",
            SceneId::Training => "training",
            SceneId::Shop => "shop",
            SceneId::Temple => "temple",
            SceneId::Inn => "inn",
            SceneId::ExpeditionStaging => "expedition_staging",
            SceneId::Dungeon => "dungeon",
            SceneId::Encounter => "encounter",
        }
    }

    /// Whether the scene only makes sense with at least one party member.
    #[must_use]
    pub fn requires_party(self) -> bool {
        matches!(
            self,
            SceneId::Training
                | SceneId::Shop
                | SceneId::Temple
                | SceneId::Inn
                | SceneId::ExpeditionStaging
                | SceneId::Dungeon
                | SceneId::Encounter
        )
    }

    /// Whether the scene is a town service only reachable while safe.
    #[must_use]
    pub fn is_town_service(self) -> bool {
        matches!(
            self,
            SceneId::Training | SceneId::Shop | SceneId::Temple | SceneId::Inn
        )
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scene: {0}")]
pub struct UnknownScene(pub String);

impl FromStr for SceneId {
    type Err = UnknownScene;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SceneId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownScene(s.to_owned()))
    }
}
