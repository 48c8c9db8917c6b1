use glam::Mat4;

/// Index of a node in a [`SceneGraph`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    local: Mat4,
    world: Mat4,
    dirty: bool,
}

/// Transform hierarchy with explicit invalidation.
///
/// Nodes are stored in creation order and a parent always precedes its
/// children, so a single forward pass in [`resolve`](Self::resolve) sees every
/// parent's world matrix before its children need it.
///
/// Invariant: a dirty node's whole subtree is dirty.
///
/// Every method taking a [`NodeId`] panics if the id was not issued by this
/// graph.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node below `parent` (or at the root). New nodes start dirty.
    ///
    /// # Panics
    /// Panics if `parent` does not belong to this graph.
    pub fn add_node(&mut self, parent: Option<NodeId>, local: Mat4) -> NodeId {
        if let Some(p) = parent {
            assert!(p.index() < self.nodes.len(), "unknown parent {p:?}");
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent,
            local,
            world: local,
            dirty: true,
        });
        id
    }

    /// Replaces the local transform and invalidates the subtree.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this graph.
    pub fn set_local(&mut self, id: NodeId, local: Mat4) {
        let node = self.node_mut(id);
        node.local = local;
        node.dirty = true;

        // Descendants have higher indices. Any node whose parent is dirty is
        // in the subtree (or already dirty).
        for i in id.index() + 1..self.nodes.len() {
            if let Some(p) = self.nodes[i].parent {
                if self.nodes[p.index()].dirty {
                    self.nodes[i].dirty = true;
                }
            }
        }
    }

    /// Recomputes world transforms of dirty nodes. Returns how many changed.
    pub fn resolve(&mut self) -> usize {
        let mut resolved = 0;
        for i in 0..self.nodes.len() {
            if !self.nodes[i].dirty {
                continue;
            }
            let local = self.nodes[i].local;
            let world = match self.nodes[i].parent {
                Some(p) => self.nodes[p.index()].world * local,
                None => local,
            };
            let node = &mut self.nodes[i];
            node.world = world;
            node.dirty = false;
            resolved += 1;
        }
        resolved
    }

    /// World transform as of the last [`resolve`](Self::resolve).
    ///
    /// # Panics
    /// Panics if `id` does not belong to this graph.
    #[inline]
    pub fn world(&self, id: NodeId) -> Mat4 {
        self.node(id).world
    }

    /// # Panics
    /// Panics if `id` does not belong to this graph.
    #[inline]
    pub fn local(&self, id: NodeId) -> Mat4 {
        self.node(id).local
    }

    /// # Panics
    /// Panics if `id` does not belong to this graph.
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// # Panics
    /// Panics if `id` does not belong to this graph.
    #[inline]
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.node(id).dirty
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()) {
            Some(node) => node,
            None => panic!("unknown node {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()) {
            Some(node) => node,
            None => panic!("unknown node {id:?}"),
        }
    }
}
