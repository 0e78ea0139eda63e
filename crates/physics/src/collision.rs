//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for the kinds of bodies in the scene.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (floor, walls, ceiling)
    Environment = 1 << 0,
    /// Player body
    Player = 1 << 1,
    /// Fired projectiles
    Projectile = 1 << 2,
}

impl CollisionGroup {
    /// Membership and filter for this group.
    pub fn membership_and_filter(self) -> (Group, Group) {
        let membership = Group::from_bits_retain(self as u32);
        let filter = match self {
            Self::Environment => Group::ALL,
            Self::Player => Group::from_bits_retain(Self::Environment as u32),
            Self::Projectile => {
                Group::from_bits_retain(Self::Environment as u32 | Self::Projectile as u32)
            }
        };
        (membership, filter)
    }

    /// Rapier interaction groups for colliders in this group.
    pub fn interaction_groups(self) -> InteractionGroups {
        let (membership, filter) = self.membership_and_filter();
        InteractionGroups::new(membership, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projectiles_ignore_player() {
        let projectile = CollisionGroup::Projectile.interaction_groups();
        let player = CollisionGroup::Player.interaction_groups();
        assert!(!projectile.test(player));
    }

    #[test]
    fn everything_hits_environment() {
        let env = CollisionGroup::Environment.interaction_groups();
        assert!(CollisionGroup::Projectile.interaction_groups().test(env));
        assert!(CollisionGroup::Player.interaction_groups().test(env));
    }
}
