//! The single owner of the active scene graph

use crate::light::LightRig;
use crate::node::SceneNode;
use crate::patch::NodePatch;
use vitrine_core::{NodeId, Result, VitrineError};

/// Identifies one requested scene replacement.
///
/// Only the most recently issued ticket can still replace the scene; any
/// replacement issued after it (ticketed or direct) makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplaceTicket(u64);

impl ReplaceTicket {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// The active scene: one optional root plus the light rig.
///
/// Nodes are only reachable mutably through [`SceneSession::mutate`] and
/// the replace operations.
#[derive(Debug, Default)]
pub struct SceneSession {
    root: Option<SceneNode>,
    lights: LightRig,
    latest_ticket: u64,
}

impl SceneSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&SceneNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Replace the whole scene graph, returning the previous root.
    ///
    /// Invalidates every outstanding ticket.
    pub fn replace(&mut self, root: SceneNode) -> Option<SceneNode> {
        self.latest_ticket += 1;
        log::debug!(
            "Scene replaced: '{}' ({} nodes)",
            root.name,
            root.node_count()
        );
        self.root.replace(root)
    }

    /// Drop the scene graph (lights stay)
    pub fn clear(&mut self) -> Option<SceneNode> {
        self.latest_ticket += 1;
        self.root.take()
    }

    /// Reserve the right to replace the scene later
    pub fn begin_replace(&mut self) -> ReplaceTicket {
        self.latest_ticket += 1;
        ReplaceTicket(self.latest_ticket)
    }

    pub fn is_current(&self, ticket: ReplaceTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Replace the scene if `ticket` is still the newest one.
    ///
    /// Returns false (and leaves the scene untouched) for a stale ticket.
    pub fn replace_with(&mut self, ticket: ReplaceTicket, root: SceneNode) -> bool {
        if !self.is_current(ticket) {
            log::warn!(
                "Discarding stale scene replacement (ticket {}, latest {})",
                ticket.0,
                self.latest_ticket
            );
            return false;
        }
        log::debug!(
            "Scene replaced: '{}' ({} nodes)",
            root.name,
            root.node_count()
        );
        self.root = Some(root);
        true
    }

    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        self.root.as_ref()?.find(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SceneNode> {
        self.root.as_ref()?.find_by_name(name)
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.find_by_name(name).map(|n| n.id)
    }

    /// Apply one edit to one node
    pub fn mutate(&mut self, id: NodeId, patch: NodePatch) -> Result<()> {
        let node = self
            .root
            .as_mut()
            .and_then(|root| root.find_mut(id))
            .ok_or_else(|| VitrineError::NodeNotFound(id.to_string()))?;
        patch.apply(node)
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightRig {
        &mut self.lights
    }

    pub fn set_lights(&mut self, lights: LightRig) {
        self.lights = lights;
    }
}
