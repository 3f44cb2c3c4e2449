//! Per-tick agent snapshot for external consumers (e.g. position broadcast).

use crate::Agent;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub is_grounded: bool,
    pub is_swimming: bool,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            position: agent.position,
            rotation: agent.orientation,
            velocity: agent.velocity,
            is_grounded: agent.is_grounded(),
            is_swimming: agent.is_swimming(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocomotionState;

    #[test]
    fn snapshot_reports_state_flags_and_serializes() {
        let mut agent = Agent::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::Y);
        agent.state = LocomotionState::Swimming;
        let snap = AgentSnapshot::from(&agent);
        assert!(snap.is_swimming && !snap.is_grounded);

        let text = ron::to_string(&snap).unwrap();
        assert!(text.contains("is_swimming"));
        let back: AgentSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(back, snap);
    }
}
