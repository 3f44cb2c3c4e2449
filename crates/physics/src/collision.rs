//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (planet surface, boulders)
    Environment = 1 << 0,
    /// Walking agents
    Agent = 1 << 1,
    /// Vehicle hulls and floors
    Vehicle = 1 << 2,
    /// Spaceship door panels
    VesselDoor = 1 << 3,
    /// Loose physics objects
    Debris = 1 << 4,
}

impl CollisionGroup {
    /// Membership and filter masks for this group.
    pub fn masks(self) -> (Group, Group) {
        let membership = Group::from_bits_retain(self as u32);
        let filter = match self {
            Self::Environment => Group::ALL,
            Self::Agent => Group::from_bits_retain(
                Self::Environment as u32
                    | Self::Agent as u32
                    | Self::Vehicle as u32
                    | Self::VesselDoor as u32
                    | Self::Debris as u32,
            ),
            Self::Vehicle => Group::from_bits_retain(
                Self::Environment as u32 | Self::Agent as u32 | Self::Vehicle as u32 | Self::Debris as u32,
            ),
            // Doors only stop agents; the hull they hang on already collides with the world.
            Self::VesselDoor => Group::from_bits_retain(Self::Agent as u32),
            Self::Debris => Group::from_bits_retain(
                Self::Environment as u32 | Self::Agent as u32 | Self::Vehicle as u32 | Self::Debris as u32,
            ),
        };
        (membership, filter)
    }

    /// Rapier interaction groups for this group.
    pub fn interaction_groups(self) -> InteractionGroups {
        let (membership, filter) = self.masks();
        InteractionGroups::new(membership, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doors_only_block_agents() {
        let (_, filter) = CollisionGroup::VesselDoor.masks();
        assert!(filter.contains(Group::from_bits_retain(CollisionGroup::Agent as u32)));
        assert!(!filter.contains(Group::from_bits_retain(CollisionGroup::Environment as u32)));
    }

    #[test]
    fn agents_collide_with_environment() {
        let (membership, filter) = CollisionGroup::Agent.masks();
        assert_eq!(membership.bits(), CollisionGroup::Agent as u32);
        assert!(filter.contains(Group::from_bits_retain(CollisionGroup::Environment as u32)));
    }
}
