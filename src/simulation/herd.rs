//! Pack coordination
//!
//! Pack geometry is computed once per tick from the registry snapshot. The
//! center of mass is continuous; all distances against it are Chebyshev so
//! they agree with the square perception used everywhere else.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::config::HerdConfig;
use crate::core::types::{CreatureId, PackId, Vec2};
use crate::creature::state::CreatureState;
use crate::creature::traits::CreatureTraits;
use crate::spatial::grid::{Direction, GridPos};

/// Sociability above which a creature seeks company
pub const PACK_SOCIABILITY_THRESHOLD: f32 = 40.0;

/// Snapshot of one pack for the current tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackState {
    pub pack: PackId,
    pub alpha: Option<CreatureId>,
    pub members: Vec<CreatureId>,
    pub center: Vec2,
    /// 0.0 (scattered) to 1.0 (tight)
    pub cohesion: f32,
    pub mean_aggression: f32,
}

impl PackState {
    /// Returns None for an empty member list
    pub fn from_members(pack: PackId, members: &[&CreatureState], config: &HerdConfig) -> Option<Self> {
        let positions: Vec<GridPos> = members.iter().map(|m| m.position).collect();
        let center = center_of_mass(&positions)?;
        let mean_aggression =
            members.iter().map(|m| m.traits.aggression).sum::<f32>() / members.len() as f32;

        let mut ids: Vec<CreatureId> = members.iter().map(|m| m.id).collect();
        ids.sort();

        Some(Self {
            pack,
            alpha: elect_alpha(members.iter().map(|m| (m.id, &m.traits))),
            members: ids,
            center,
            cohesion: evaluate_pack_cohesion(&positions, center, config.max_spread),
            mean_aggression,
        })
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Nearest grid cell to the center of mass
    pub fn center_cell(&self) -> GridPos {
        GridPos::new(self.center.x.round() as i32, self.center.y.round() as i32)
    }

    pub fn is_lost(&self, position: GridPos, config: &HerdConfig) -> bool {
        is_lost_from_pack(position, self.center, config.lost_distance)
    }
}

pub fn prefers_pack(traits: &CreatureTraits) -> bool {
    traits.sociability > PACK_SOCIABILITY_THRESHOLD
}

pub fn center_of_mass(positions: &[GridPos]) -> Option<Vec2> {
    if positions.is_empty() {
        return None;
    }
    let sum = positions
        .iter()
        .fold(Vec2::default(), |acc, p| acc + p.as_vec2());
    Some(sum * (1.0 / positions.len() as f32))
}

/// Steering vector for one member
///
/// Inside the separation radius the member is pushed away from the center;
/// outside it is pulled back, harder the more sociable it is.
pub fn calculate_flocking_movement(
    position: GridPos,
    traits: &CreatureTraits,
    center: Vec2,
    config: &HerdConfig,
) -> Vec2 {
    let here = position.as_vec2();
    if here.chebyshev(&center) < config.separation_radius {
        (here - center).normalize()
    } else {
        (center - here).normalize() * (traits.sociability / 100.0).clamp(0.0, 1.0)
    }
}

/// Snap a steering vector to the nearest of the eight directions
pub fn steer_direction(vector: Vec2) -> Option<Direction> {
    // sin(22.5 deg): below this a component rounds to zero
    const AXIS_CUTOFF: f32 = 0.3827;

    let unit = vector.normalize();
    let snap = |c: f32| {
        if c > AXIS_CUTOFF {
            1
        } else if c < -AXIS_CUTOFF {
            -1
        } else {
            0
        }
    };
    Direction::from_delta(snap(unit.x), snap(unit.y))
}

pub fn alpha_score(traits: &CreatureTraits) -> f32 {
    traits.health * 0.5 + traits.speed * 10.0 + traits.aggression
}

/// Strongest member leads; ties go to the lowest id
pub fn elect_alpha<'a>(members: impl IntoIterator<Item = (CreatureId, &'a CreatureTraits)>) -> Option<CreatureId> {
    members
        .into_iter()
        .max_by_key(|(id, traits)| (OrderedFloat(alpha_score(traits)), Reverse(*id)))
        .map(|(id, _)| id)
}

/// 1.0 while every member is within `max_spread` of the center, falling
/// linearly to 0.0 at twice that
pub fn evaluate_pack_cohesion(positions: &[GridPos], center: Vec2, max_spread: f32) -> f32 {
    let max_distance = positions
        .iter()
        .map(|p| OrderedFloat(p.as_vec2().chebyshev(&center)))
        .max()
        .map(|d| d.0)
        .unwrap_or(0.0);

    if max_distance <= max_spread {
        1.0
    } else {
        (1.0 - (max_distance - max_spread) / max_spread).clamp(0.0, 1.0)
    }
}

pub fn should_pack_hunt(pack: &PackState, config: &HerdConfig) -> bool {
    pack.cohesion >= config.pack_hunt_cohesion && pack.mean_aggression > config.pack_hunt_aggression
}

/// Added to a member's hunt success chance
pub fn pack_hunting_bonus(pack_size: usize, cohesion: f32) -> f32 {
    (pack_size as f32 * 0.05).min(0.3) + cohesion.clamp(0.0, 1.0) * 0.2
}

pub fn is_lost_from_pack(position: GridPos, center: Vec2, lost_distance: f32) -> bool {
    position.as_vec2().chebyshev(&center) > lost_distance
}

/// Cells per move for a member seeking its pack
pub fn regroup_steps(config: &HerdConfig) -> u32 {
    config.urgent_speed_multiplier.round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::temperament::Disposition;

    fn member(x: i32, y: i32) -> CreatureState {
        CreatureState::new("wolf", GridPos::new(x, y), Disposition::Aggressive)
            .with_pack(PackId(1))
            .with_traits(CreatureTraits {
                aggression: 60.0,
                sociability: 80.0,
                ..CreatureTraits::default()
            })
    }

    fn scattered_pack() -> Vec<CreatureState> {
        vec![member(0, 0), member(1, 0), member(0, 1), member(1, 1), member(32, 0)]
    }

    #[test]
    fn test_scattered_pack_loses_straggler() {
        let config = HerdConfig::default();
        let creatures = scattered_pack();
        let refs: Vec<&CreatureState> = creatures.iter().collect();
        let pack = PackState::from_members(PackId(1), &refs, &config).unwrap();

        assert!((pack.center.x - 6.8).abs() < 1e-4);
        assert!((pack.center.y - 0.4).abs() < 1e-4);
        assert!(pack.cohesion > 0.0 && pack.cohesion < 1.0, "cohesion was {}", pack.cohesion);
        assert!(pack.is_lost(GridPos::new(32, 0), &config));
        assert!(!pack.is_lost(GridPos::new(0, 0), &config));
        assert!(!should_pack_hunt(&pack, &config));
    }

    #[test]
    fn test_tight_pack_hunts_together() {
        let config = HerdConfig::default();
        let creatures: Vec<_> = scattered_pack().into_iter().take(4).collect();
        let refs: Vec<&CreatureState> = creatures.iter().collect();
        let pack = PackState::from_members(PackId(1), &refs, &config).unwrap();

        assert_eq!(pack.cohesion, 1.0);
        assert!(should_pack_hunt(&pack, &config));
        assert!((pack_hunting_bonus(pack.size(), pack.cohesion) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_empty_pack() {
        assert!(PackState::from_members(PackId(1), &[], &HerdConfig::default()).is_none());
    }

    #[test]
    fn test_pack_bonus_caps_size_term() {
        assert!((pack_hunting_bonus(20, 0.0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_flocking_separates_then_gathers() {
        let config = HerdConfig::default();
        let traits = CreatureTraits {
            sociability: 50.0,
            ..CreatureTraits::default()
        };
        let center = Vec2::new(0.0, 0.0);

        let close = calculate_flocking_movement(GridPos::new(1, 0), &traits, center, &config);
        assert!(close.x > 0.0, "should push away from center");

        let far = calculate_flocking_movement(GridPos::new(10, 0), &traits, center, &config);
        assert!(far.x < 0.0, "should pull toward center");
        assert!((far.length() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_steer_direction_snaps() {
        assert_eq!(steer_direction(Vec2::new(-3.0, 0.2)), Some(Direction::West));
        assert_eq!(steer_direction(Vec2::new(1.0, 1.0)), Some(Direction::SouthEast));
        assert_eq!(steer_direction(Vec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_alpha_is_strongest() {
        let weak = CreatureTraits {
            health: 10.0,
            ..CreatureTraits::default()
        };
        let strong = CreatureTraits {
            health: 90.0,
            ..CreatureTraits::default()
        };
        let a = CreatureId::new();
        let b = CreatureId::new();
        assert_eq!(elect_alpha([(a, &weak), (b, &strong)]), Some(b));
    }

    #[test]
    fn test_alpha_tie_breaks_on_id() {
        let traits = CreatureTraits::default();
        let a = CreatureId::new();
        let b = CreatureId::new();
        let lowest = a.min(b);
        assert_eq!(elect_alpha([(a, &traits), (b, &traits)]), Some(lowest));
        assert_eq!(elect_alpha([(b, &traits), (a, &traits)]), Some(lowest));
    }

    #[test]
    fn test_prefers_pack() {
        assert!(!prefers_pack(&CreatureTraits::default()));
        assert!(prefers_pack(&CreatureTraits {
            sociability: 41.0,
            ..CreatureTraits::default()
        }));
    }

    #[test]
    fn test_regroup_steps() {
        assert_eq!(regroup_steps(&HerdConfig::default()), 2);
    }
}
