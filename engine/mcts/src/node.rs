//! MCTS tree node representation.
//!
//! Each node snapshots the game state reached by playing a cell from its
//! parent, plus the visit statistics used by UCB1 selection. Values are
//! always scored from `Me`'s point of view, at every depth.

use games_uttt::GameState;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root). Never owns the parent.
    pub parent: NodeId,

    /// Per-tree creation number, stable across re-rooting. Diagnostics only.
    pub serial: u64,

    /// Game state at this node
    pub state: GameState,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Sum of rollout outcomes backpropagated through this node.
    pub value_sum: f32,

    /// Whether this is a terminal state (game over). Terminal nodes never
    /// get children.
    pub is_terminal: bool,

    /// Children: Vec of (cell, NodeId) pairs in creation order.
    /// Empty until node is expanded.
    pub children: Vec<(u8, NodeId)>,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root(state: GameState, serial: u64) -> Self {
        Self::new_child(NodeId::NONE, state, serial)
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, state: GameState, serial: u64) -> Self {
        Self {
            parent,
            serial,
            is_terminal: state.is_terminal(),
            state,
            visit_count: 0,
            value_sum: 0.0,
            children: Vec::new(),
        }
    }

    /// Mean outcome value_sum / visit_count.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// UCB1 score for child selection:
    /// mean + c * sqrt(ln(N_parent) / N).
    ///
    /// An unvisited node scores +infinity, so every child is tried once
    /// before any sibling is revisited.
    ///
    /// Takes pre-computed ln(parent_visits) to avoid redundant log calls
    /// when comparing multiple children.
    #[inline]
    pub fn ucb1(&self, parent_visits_ln: f32, exploration: f32) -> f32 {
        if self.visit_count == 0 {
            return f32::INFINITY;
        }
        let visits = self.visit_count as f32;
        self.mean_value() + exploration * (parent_visits_ln / visits).sqrt()
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Cell played to reach this node, `None` at the start of the game.
    #[inline]
    pub fn last_move(&self) -> Option<u8> {
        self.state.last_move()
    }
}
