//! Hover highlight and click selection

use crate::patch::NodePatch;
use crate::session::SceneSession;
use vitrine_core::{Color, NodeId, Result, VitrineError};

/// Factor applied to a hovered node's material color
pub const HOVER_DARKEN: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HoverSnapshot {
    node: NodeId,
    /// Color before darkening; `None` for nodes without a material
    original: Option<Color>,
}

/// Tracks the hovered and selected node.
///
/// Hover and selection are independent: hovering never changes the
/// selection and selecting never clears the hover.
#[derive(Debug, Default)]
pub struct SelectionController {
    hover: Option<HoverSnapshot>,
    selected: Option<NodeId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moved onto `node`: restore the previous hover, then darken.
    pub fn pointer_enter(&mut self, session: &mut SceneSession, node: NodeId) -> Result<()> {
        if self.hover.map(|h| h.node) == Some(node) {
            return Ok(());
        }
        self.restore(session)?;

        let target = session
            .find(node)
            .ok_or_else(|| VitrineError::NodeNotFound(node.to_string()))?;
        let original = target.material.as_ref().map(|m| m.props.color);
        if let Some(color) = original {
            session.mutate(node, NodePatch::Color(color.scaled(HOVER_DARKEN)))?;
        }
        self.hover = Some(HoverSnapshot { node, original });
        Ok(())
    }

    /// Pointer left the hovered node: put its color back exactly
    pub fn pointer_leave(&mut self, session: &mut SceneSession) -> Result<()> {
        self.restore(session)
    }

    /// Apply `patch` to `node`. On the hovered node the edit lands on the
    /// undarkened color and the highlight is put back on top of it, so
    /// leaving the node keeps the edit.
    pub fn edit(
        &mut self,
        session: &mut SceneSession,
        node: NodeId,
        patch: NodePatch,
    ) -> Result<()> {
        if self.hovered() != Some(node) {
            return session.mutate(node, patch);
        }
        self.restore(session)?;
        let result = session.mutate(node, patch);
        self.pointer_enter(session, node)?;
        result
    }

    /// Click released over `node`
    pub fn pointer_up(&mut self, node: NodeId) -> NodeId {
        log::debug!("Selected {}", node);
        self.selected = Some(node);
        node
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.map(|h| h.node)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Color the hovered node had before it was darkened
    pub fn original_color(&self, node: NodeId) -> Option<Color> {
        self.hover
            .filter(|h| h.node == node)
            .and_then(|h| h.original)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Forget hover and selection without touching the scene.
    ///
    /// Used after the scene was replaced, when the old nodes are gone.
    pub fn reset(&mut self) {
        self.hover = None;
        self.selected = None;
    }

    fn restore(&mut self, session: &mut SceneSession) -> Result<()> {
        let Some(snapshot) = self.hover.take() else {
            return Ok(());
        };
        let Some(color) = snapshot.original else {
            return Ok(());
        };
        match session.mutate(snapshot.node, NodePatch::Color(color)) {
            // The node went away with a replaced scene; nothing to restore
            Err(VitrineError::NodeNotFound(_)) => Ok(()),
            other => other,
        }
    }
}
