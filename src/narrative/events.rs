//! Immersive world events
//!
//! Notable happenings (births, deaths, chases, packs falling apart) are
//! reported with bilingual text and a severity. The host decides which ones
//! the player gets to see.

use serde::{Deserialize, Serialize};

use crate::core::types::{CreatureId, Tick};
use crate::narrative::translator::{Locale, Translator};
use crate::spatial::grid::GridPos;
use crate::world::player::PlayerSnapshot;

/// Events above this severity are shown regardless of distance
pub const ALWAYS_SHOWN_SEVERITY: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Birth,
    DeathStarvation,
    DeathPredation,
    ChaseStarted,
    PackSeparation,
    MemberLost,
}

impl EventKind {
    pub fn key(&self) -> &'static str {
        match self {
            EventKind::Birth => "event.birth",
            EventKind::DeathStarvation => "event.death_starvation",
            EventKind::DeathPredation => "event.death_predation",
            EventKind::ChaseStarted => "event.chase_started",
            EventKind::PackSeparation => "event.pack_separation",
            EventKind::MemberLost => "event.member_lost",
        }
    }

    pub fn default_severity(&self) -> u8 {
        match self {
            EventKind::Birth => 20,
            EventKind::DeathStarvation => 60,
            EventKind::DeathPredation => 85,
            EventKind::ChaseStarted => 50,
            EventKind::PackSeparation => 40,
            EventKind::MemberLost => 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub en: String,
    pub vi: String,
}

impl BilingualText {
    pub fn render(translator: &dyn Translator, key: &str, params: &[(&str, &str)]) -> Self {
        Self {
            en: translator.translate(Locale::En, key, params),
            vi: translator.translate(Locale::Vi, key, params),
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Vi => &self.vi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmersiveEvent {
    pub kind: EventKind,
    /// Creatures involved; the subject first
    pub creatures: Vec<CreatureId>,
    pub location: GridPos,
    pub text: BilingualText,
    pub tick: Tick,
    /// 0-100
    pub severity: u8,
}

impl ImmersiveEvent {
    pub fn new(
        kind: EventKind,
        creatures: Vec<CreatureId>,
        location: GridPos,
        tick: Tick,
        translator: &dyn Translator,
        params: &[(&str, &str)],
    ) -> Self {
        Self {
            kind,
            creatures,
            location,
            text: BilingualText::render(translator, kind.key(), params),
            tick,
            severity: kind.default_severity(),
        }
    }

    pub fn birth(id: CreatureId, species: &str, location: GridPos, tick: Tick, tr: &dyn Translator) -> Self {
        Self::new(EventKind::Birth, vec![id], location, tick, tr, &[("species", species)])
    }

    pub fn starvation(id: CreatureId, species: &str, location: GridPos, tick: Tick, tr: &dyn Translator) -> Self {
        Self::new(EventKind::DeathStarvation, vec![id], location, tick, tr, &[("species", species)])
    }

    pub fn predation(
        prey: CreatureId,
        prey_species: &str,
        predator: CreatureId,
        predator_species: &str,
        location: GridPos,
        tick: Tick,
        tr: &dyn Translator,
    ) -> Self {
        Self::new(
            EventKind::DeathPredation,
            vec![prey, predator],
            location,
            tick,
            tr,
            &[("species", prey_species), ("predator", predator_species)],
        )
    }

    pub fn chase_started(id: CreatureId, species: &str, location: GridPos, tick: Tick, tr: &dyn Translator) -> Self {
        Self::new(EventKind::ChaseStarted, vec![id], location, tick, tr, &[("species", species)])
    }

    pub fn pack_separation(members: Vec<CreatureId>, location: GridPos, tick: Tick, tr: &dyn Translator) -> Self {
        Self::new(EventKind::PackSeparation, members, location, tick, tr, &[])
    }

    pub fn member_lost(id: CreatureId, species: &str, location: GridPos, tick: Tick, tr: &dyn Translator) -> Self {
        Self::new(EventKind::MemberLost, vec![id], location, tick, tr, &[("species", species)])
    }
}

/// Whether the player should be told about an event
pub fn should_display_event(event: &ImmersiveEvent, player: &PlayerSnapshot, view_radius: i32) -> bool {
    event.severity > ALWAYS_SHOWN_SEVERITY || event.location.chebyshev(&player.position) <= view_radius
}
