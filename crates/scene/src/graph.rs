//! Scene layer trait and a headless scene graph.

use crate::{Camera, CameraMode};
use engine_core::{Transform, TransformRaw};

/// Handle to a scene node (an agent or vehicle visual).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),
}

/// What the simulation needs from the scene/render layer.
pub trait SceneLayer {
    /// Add a visual node at `transform`.
    fn add_node(&mut self, transform: Transform) -> NodeId;

    /// Show or hide a node's mesh. Unknown nodes are ignored.
    fn set_visible(&mut self, node: NodeId, visible: bool);

    fn is_visible(&self, node: NodeId) -> bool;

    /// Write a node's world transform. Unknown nodes are ignored.
    fn set_node_transform(&mut self, node: NodeId, transform: &Transform);

    fn node_transform(&self, node: NodeId) -> Option<Transform>;

    /// Reparent the camera to `parent` with `mode`, detaching from the old
    /// parent in the same call so no frame renders it unparented.
    fn attach_camera(&mut self, parent: NodeId, mode: CameraMode) -> Result<(), SceneError>;

    fn camera(&self) -> &Camera;

    fn camera_mut(&mut self) -> &mut Camera;
}

/// A node as seen by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct SceneNode {
    pub transform: Transform,
    /// GPU instance data, refreshed whenever the transform changes.
    pub raw: TransformRaw,
    pub visible: bool,
}

/// Headless scene graph: stores what a renderer would draw.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    camera: Camera,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id.0 as usize).ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id.0 as usize).ok_or(SceneError::UnknownNode(id))
    }

    /// Visible nodes, in insertion order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.visible)
            .map(|(i, n)| (NodeId(i as u32), n))
    }
}

impl SceneLayer for SceneGraph {
    fn add_node(&mut self, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            transform,
            raw: TransformRaw::from(&transform),
            visible: true,
        });
        id
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        match self.node_mut(node) {
            Ok(n) => n.visible = visible,
            Err(e) => log::debug!("set_visible: {}", e),
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.node(node).is_ok_and(|n| n.visible)
    }

    fn set_node_transform(&mut self, node: NodeId, transform: &Transform) {
        match self.node_mut(node) {
            Ok(n) => {
                n.transform = *transform;
                n.raw = TransformRaw::from(transform);
            }
            Err(e) => log::debug!("set_node_transform: {}", e),
        }
    }

    fn node_transform(&self, node: NodeId) -> Option<Transform> {
        self.node(node).ok().map(|n| n.transform)
    }

    fn attach_camera(&mut self, parent: NodeId, mode: CameraMode) -> Result<(), SceneError> {
        let parent_transform = self.node(parent)?.transform;
        self.camera.set_parent(None);
        self.camera.mode = mode;
        self.camera.set_parent(Some(parent));
        // Place it right away so the first frame after reparenting is already correct.
        self.camera.follow(&parent_transform, 0.0, None);
        Ok(())
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn attach_moves_camera_to_new_parent() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node(Transform::from_position(Vec3::ZERO));
        let b = scene.add_node(Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));

        scene.attach_camera(a, CameraMode::FirstPerson).unwrap();
        assert_eq!(scene.camera().parent(), Some(a));

        scene.attach_camera(b, CameraMode::ThirdPerson).unwrap();
        assert_eq!(scene.camera().parent(), Some(b));
        assert_eq!(scene.camera().mode, CameraMode::ThirdPerson);
        assert!(scene.camera().position().x > 5.0);
    }

    #[test]
    fn attach_to_unknown_node_keeps_old_parent() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node(Transform::default());
        scene.attach_camera(a, CameraMode::FirstPerson).unwrap();
        let err = scene.attach_camera(NodeId(42), CameraMode::Orbit).unwrap_err();
        assert_eq!(err, SceneError::UnknownNode(NodeId(42)));
        assert_eq!(scene.camera().parent(), Some(a));
        assert_eq!(scene.camera().mode, CameraMode::FirstPerson);
    }

    #[test]
    fn visibility_and_transform_sync() {
        let mut scene = SceneGraph::new();
        let n = scene.add_node(Transform::default());
        scene.set_visible(n, false);
        assert!(!scene.is_visible(n));
        assert_eq!(scene.visible_nodes().count(), 0);

        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        scene.set_node_transform(n, &t);
        let node = scene.node(n).unwrap();
        assert_eq!(node.transform, t);
        assert_eq!(node.raw.model[3][2], 3.0);
    }
}
