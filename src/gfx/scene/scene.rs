use log::debug;
use serde::{Deserialize, Serialize};

use super::node::{NodeKind, SceneNode};

/// Handle to a node attached to a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// The container the session attaches nodes to.
///
/// The host's renderer owns the real scene graph; the session only needs to
/// add, remove, find and mutate nodes.
pub trait SceneGraph {
    fn attach(&mut self, node: SceneNode) -> NodeId;

    fn detach(&mut self, id: NodeId) -> Option<SceneNode>;

    fn get(&self, id: NodeId) -> Option<&SceneNode>;

    fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode>;

    /// Ids of all attached nodes in attach order
    fn node_ids(&self) -> Vec<NodeId>;

    fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Detach every node
    fn clear(&mut self) {
        for id in self.node_ids() {
            self.detach(id);
        }
    }
}

/// In-memory scene graph: a flat list of nodes in attach order
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<(NodeId, SceneNode)>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }
}

impl SceneGraph for Scene {
    fn attach(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        debug!("attach {:?} '{}'", id, node.name);
        self.nodes.push((id, node));
        id
    }

    fn detach(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|(node_id, _)| *node_id == id)?;
        let (_, node) = self.nodes.remove(index);
        debug!("detach {:?} '{}'", id, node.name);
        Some(node)
    }

    fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes
            .iter()
            .find(|(node_id, _)| *node_id == id)
            .map(|(_, node)| node)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes
            .iter_mut()
            .find(|(node_id, _)| *node_id == id)
            .map(|(_, node)| node)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|(id, _)| *id).collect()
    }
}
