use std::collections::BTreeMap;

use crate::geometry::ConvexMesh;
use crate::math::Transform;

/// Never reused, so a stale id can only miss, never alias a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Rebuilds an id handed out through [`NodeId::raw`], e.g. across the
    /// wasm boundary.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub mesh: ConvexMesh,
    pub transform: Transform,
    pub color: [f32; 3],
}

impl SceneNode {
    pub fn new(mesh: ConvexMesh, transform: Transform, color: [f32; 3]) -> Self {
        Self {
            mesh,
            transform,
            color,
        }
    }
}

/// Nodes added and removed since the last [`Scene::take_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneChanges {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

impl SceneChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    changes: SceneChanges,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        self.changes.added.push(id);
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let node = self.nodes.remove(&id)?;
        // a node that never reached the renderer is simply forgotten
        if let Some(pos) = self.changes.added.iter().position(|a| *a == id) {
            self.changes.added.remove(pos);
        } else {
            self.changes.removed.push(id);
        }
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> + '_ {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn take_changes(&mut self) -> SceneChanges {
        std::mem::take(&mut self.changes)
    }

    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            self.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn node() -> SceneNode {
        SceneNode::new(
            ConvexMesh::cuboid(Vec3::ONE),
            Transform::IDENTITY,
            [0.7, 0.2, 0.1],
        )
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut scene = Scene::new();
        let a = scene.add(node());
        scene.remove(a);
        let b = scene.add(node());

        assert_ne!(a, b);
        assert!(scene.get(a).is_none());
        assert!(scene.get(b).is_some());
    }

    #[test]
    fn test_journal_reports_adds_and_removes() {
        let mut scene = Scene::new();
        let a = scene.add(node());
        let b = scene.add(node());

        let changes = scene.take_changes();
        assert_eq!(changes.added, vec![a, b]);
        assert!(changes.removed.is_empty());

        scene.remove(a);
        let changes = scene.take_changes();
        assert_eq!(changes.removed, vec![a]);
        assert!(scene.take_changes().is_empty());
    }

    #[test]
    fn test_unseen_node_removed_silently() {
        let mut scene = Scene::new();
        let a = scene.add(node());
        scene.remove(a);

        assert!(scene.take_changes().is_empty());
        assert!(scene.remove(a).is_none());
    }

    #[test]
    fn test_lookup_by_raw_id() {
        let mut scene = Scene::new();
        scene.add(node());
        let b = scene.add(node());

        let found = scene.get(NodeId::from_raw(b.raw()));
        assert_eq!(found, scene.get(b));
        assert!(found.is_some());
        assert!(scene.get(NodeId::from_raw(99)).is_none());
    }

    #[test]
    fn test_set_transform_on_missing_node() {
        let mut scene = Scene::new();
        let a = scene.add(node());
        let moved = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));

        assert!(scene.set_transform(a, moved));
        assert_eq!(scene.get(a).unwrap().transform, moved);

        scene.remove(a);
        assert!(!scene.set_transform(a, moved));
    }
}
