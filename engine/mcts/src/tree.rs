//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices; parent links are plain indices, so
//! dropping the tree is a flat deallocation no matter how deep it grew.

use std::collections::VecDeque;

use games_uttt::{GameError, GameState};

use crate::node::{MctsNode, NodeId};
use crate::search::SearchError;

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after construction or re-rooting)
    root: NodeId,

    /// Next diagnostic serial to hand out
    next_serial: u64,
}

impl MctsTree {
    /// Create a new tree rooted at the given game state.
    pub fn new(root_state: GameState) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state, 0)],
            root: NodeId(0),
            next_serial: 1,
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Get the total number of nodes in the tree.
    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Select the child of a node with the highest UCB1 score.
    /// Ties go to the first child in order. Returns None without children.
    pub fn select_child(&self, node_id: NodeId, exploration: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        // Pre-compute ln once instead of per-child comparison
        let parent_visits_ln = (node.visit_count.max(1) as f32).ln();

        let mut best: Option<(NodeId, f32)> = None;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).ucb1(parent_visits_ln, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Walk down from the root by UCB1 until a node without children.
    pub fn select_leaf(&self, exploration: f32) -> NodeId {
        let mut current = self.root;
        while let Some(child_id) = self.select_child(current, exploration) {
            current = child_id;
        }
        current
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(&mut self, parent_id: NodeId, action: u8, state: GameState) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let serial = self.next_serial;
        self.next_serial += 1;
        self.nodes.push(MctsNode::new_child(parent_id, state, serial));

        // Add to parent's children
        self.get_mut(parent_id).children.push((action, id));

        id
    }

    /// Expand a node and return the child to roll out.
    ///
    /// A terminal node is returned unchanged. If some legal move ends the
    /// game immediately, only the first such move becomes a child; otherwise
    /// every legal move does, in ascending cell order. Returns the first
    /// child created.
    pub fn expand(&mut self, node_id: NodeId) -> Result<NodeId, GameError> {
        let node = self.get(node_id);
        if node.is_terminal {
            return Ok(node_id);
        }
        if let Some(&(_, first)) = node.children.first() {
            return Ok(first);
        }

        let state = node.state;
        let mut successors = Vec::with_capacity(state.legal_move_count() as usize);
        for cell in state.legal_moves_iter() {
            let next = state.after(cell)?;
            if next.is_terminal() {
                return Ok(self.add_child(node_id, cell, next));
            }
            successors.push((cell, next));
        }

        let mut first = node_id;
        for (i, (cell, next)) in successors.into_iter().enumerate() {
            let child_id = self.add_child(node_id, cell, next);
            if i == 0 {
                first = child_id;
            }
        }
        Ok(first)
    }

    /// Backpropagate a rollout outcome from a leaf to the root.
    /// The same value is added at every level.
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f32) {
        let root = self.root;
        self.backpropagate_to(leaf_id, root, value);
    }

    /// Backpropagate a rollout outcome from a leaf up to and including `stop`
    /// (or the root if `stop` is not an ancestor).
    pub fn backpropagate_to(&mut self, leaf_id: NodeId, stop: NodeId, value: f32) {
        let mut current_id = leaf_id;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += value;

            if current_id == stop {
                break;
            }
            current_id = node.parent;
        }
    }

    /// Root child with the best mean value, as (cell, NodeId).
    ///
    /// Unvisited children are never chosen and ties go to the first child.
    /// Returns None if the root has no visited child.
    pub fn best_move(&self) -> Option<(u8, NodeId)> {
        let root = self.get(self.root);
        let mut best: Option<(u8, NodeId, f32)> = None;

        for &(action, id) in &root.children {
            let child = self.get(id);
            if child.visit_count == 0 {
                continue;
            }
            let mean = child.mean_value();
            match best {
                Some((_, _, best_mean)) if mean <= best_mean => {}
                _ => best = Some((action, id, mean)),
            }
        }

        best.map(|(action, id, _)| (action, id))
    }

    /// Find the root child reached by playing `cell`.
    pub fn find_child(&self, cell: u8) -> Option<NodeId> {
        self.get(self.root)
            .children
            .iter()
            .find(|(action, _)| *action == cell)
            .map(|(_, id)| *id)
    }

    /// Move the root to the child reached by `cell`, keeping its statistics.
    ///
    /// A legal cell with no matching child (the root was never expanded, or
    /// expansion kept only a game-ending child) restarts the tree from the
    /// resulting state. An illegal cell is an `OpponentMoveMismatch`.
    pub fn advance(&mut self, cell: u8) -> Result<(), SearchError> {
        if let Some(child_id) = self.find_child(cell) {
            self.reroot(child_id);
            return Ok(());
        }

        let root = self.get(self.root);
        if root.state.is_legal(cell) {
            let next = root.state.after(cell)?;
            let serial = self.next_serial;
            self.nodes = vec![MctsNode::new_root(next, serial)];
            self.root = NodeId(0);
            self.next_serial += 1;
            return Ok(());
        }

        Err(SearchError::OpponentMoveMismatch {
            cell,
            last_move: root.state.last_move(),
            legal_moves: root.state.legal_moves(),
            children: root.children.iter().map(|(action, _)| *action).collect(),
        })
    }

    /// Make `new_root` the root, keeping only its subtree.
    ///
    /// The subtree is copied breadth-first into a fresh arena so the
    /// discarded part of the old tree is released in one deallocation.
    fn reroot(&mut self, new_root: NodeId) {
        let mut old = std::mem::take(&mut self.nodes);
        let mut nodes = Vec::new();
        let mut queue = VecDeque::from([(new_root, NodeId::NONE, 0u8)]);

        while let Some((old_id, new_parent, action)) = queue.pop_front() {
            let new_id = NodeId(nodes.len() as u32);
            let children = std::mem::take(&mut old[old_id.index()].children);
            let src = &old[old_id.index()];

            nodes.push(MctsNode {
                parent: new_parent,
                serial: src.serial,
                state: src.state,
                visit_count: src.visit_count,
                value_sum: src.value_sum,
                is_terminal: src.is_terminal,
                children: Vec::with_capacity(children.len()),
            });
            if new_parent.is_some() {
                nodes[new_parent.index()].children.push((action, new_id));
            }

            for (child_action, child_id) in children {
                queue.push_back((child_id, new_id, child_action));
            }
        }

        self.nodes = nodes;
        self.root = NodeId(0);
    }

    /// Per-child statistics of the root, in child order.
    pub fn root_children_summary(&self) -> Vec<ChildSummary> {
        self.get(self.root)
            .children
            .iter()
            .map(|&(action, id)| {
                let child = self.get(id);
                ChildSummary {
                    action,
                    visits: child.visit_count,
                    value_sum: child.value_sum,
                    mean_value: child.mean_value(),
                }
            })
            .collect()
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(),
        }
    }

    fn compute_max_depth(&self) -> u32 {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0u32)];

        while let Some((node_id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &(_, child_id) in &self.get(node_id).children {
                stack.push((child_id, depth + 1));
            }
        }

        max_depth
    }
}

/// Statistics of one root child.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary {
    pub action: u8,
    pub visits: u32,
    pub value_sum: f32,
    pub mean_value: f32,
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_uttt::{Player, Rules};

    fn cells(list: &[u8]) -> u128 {
        list.iter().fold(0, |board, &cell| board | (1u128 << cell))
    }

    fn opened() -> GameState {
        GameState::from_moves(Player::Opponent, Rules::default(), &[40]).unwrap()
    }

    /// Me to move with sub-boards 0 and 1 won and two cells of sub-board 2's
    /// top row; the opponent's last move (38) sends me to sub-board 2.
    fn one_move_from_winning() -> GameState {
        GameState::from_parts(
            cells(&[0, 1, 2, 9, 10, 11, 18, 19]),
            cells(&[38, 39, 41, 42]),
            Player::Me,
            Some(38),
            Rules::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(GameState::new(Player::Me));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.serial, 0);
        assert!(!root.is_expanded());
    }

    #[test]
    fn test_add_child() {
        let mut tree = MctsTree::new(GameState::new(Player::Me));
        let next = tree.get(tree.root()).state.after(40).unwrap();

        let child_id = tree.add_child(tree.root(), 40, next);

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));

        let root = tree.get(tree.root());
        assert_eq!(root.children, vec![(40, NodeId(1))]);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.last_move(), Some(40));
        assert_eq!(child.serial, 1);
    }

    #[test]
    fn test_expand_creates_one_child_per_legal_move() {
        let mut tree = MctsTree::new(opened());
        let first = tree.expand(tree.root()).unwrap();

        let root = tree.get(tree.root());
        let actions: Vec<u8> = root.children.iter().map(|(a, _)| *a).collect();
        assert_eq!(actions, vec![36, 37, 38, 39, 41, 42, 43, 44]);
        assert_eq!(first, root.children[0].1);
        assert_eq!(tree.get(first).last_move(), Some(36));
    }

    #[test]
    fn test_expand_prunes_to_terminal_child() {
        let mut tree = MctsTree::new(one_move_from_winning());
        assert_eq!(
            tree.get(tree.root()).state.legal_moves(),
            (20..27).collect::<Vec<_>>()
        );

        let first = tree.expand(tree.root()).unwrap();

        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].0, 20);
        let child = tree.get(first);
        assert!(child.is_terminal);
        assert!((child.state.outcome() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_expand_terminal_node_is_noop() {
        let mut tree = MctsTree::new(one_move_from_winning());
        let terminal = tree.expand(tree.root()).unwrap();

        let again = tree.expand(terminal).unwrap();
        assert_eq!(again, terminal);
        assert!(tree.get(terminal).children.is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_backpropagate() {
        let mut tree = MctsTree::new(opened());
        let child_id = tree.expand(tree.root()).unwrap();
        let grandchild_id = tree.expand(child_id).unwrap();

        tree.backpropagate(grandchild_id, 1.0);
        tree.backpropagate(grandchild_id, 0.5);

        for id in [grandchild_id, child_id, tree.root()] {
            // Same value at every level, no sign flip
            assert_eq!(tree.get(id).visit_count, 2);
            assert!((tree.get(id).value_sum - 1.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_backpropagate_to_stops_at_ancestor() {
        let mut tree = MctsTree::new(opened());
        let child_id = tree.expand(tree.root()).unwrap();
        let grandchild_id = tree.expand(child_id).unwrap();

        tree.backpropagate_to(grandchild_id, child_id, 1.0);

        assert_eq!(tree.get(grandchild_id).visit_count, 1);
        assert_eq!(tree.get(child_id).visit_count, 1);
        assert_eq!(tree.get(tree.root()).visit_count, 0);
    }

    #[test]
    fn test_select_prefers_unvisited_child() {
        let mut tree = MctsTree::new(opened());
        tree.expand(tree.root()).unwrap();
        let children: Vec<NodeId> = tree
            .get(tree.root())
            .children
            .iter()
            .map(|(_, id)| *id)
            .collect();

        // Every child but the last has a perfect record
        for &id in &children[..children.len() - 1] {
            for _ in 0..50 {
                tree.backpropagate(id, 1.0);
            }
        }

        let selected = tree.select_child(tree.root(), 2.0).unwrap();
        assert_eq!(selected, *children.last().unwrap());
    }

    #[test]
    fn test_select_ties_go_to_first_child() {
        let mut tree = MctsTree::new(opened());
        tree.expand(tree.root()).unwrap();
        let first = tree.get(tree.root()).children[0].1;

        // All unvisited: every score is +inf
        assert_eq!(tree.select_child(tree.root(), 2.0), Some(first));
    }

    #[test]
    fn test_select_leaf_stops_at_childless_node() {
        let mut tree = MctsTree::new(opened());
        assert_eq!(tree.select_leaf(2.0), tree.root());

        let first = tree.expand(tree.root()).unwrap();
        tree.backpropagate(first, 0.0);
        let leaf = tree.select_leaf(2.0);
        assert_ne!(leaf, tree.root());
        assert_ne!(leaf, first);
        assert!(tree.get(leaf).children.is_empty());
    }

    #[test]
    fn test_best_move_by_mean_value() {
        let mut tree = MctsTree::new(opened());
        tree.expand(tree.root()).unwrap();
        let children: Vec<(u8, NodeId)> = tree.get(tree.root()).children.clone();

        // 36: 1/4, 37: 3/4, 38: 3/4, 39: 2/2; the rest stay unvisited
        let records = [(0, 1.0, 4), (1, 3.0, 4), (2, 3.0, 4), (3, 2.0, 2)];
        for (index, value_sum, visits) in records {
            let node = tree.get_mut(children[index].1);
            node.value_sum = value_sum;
            node.visit_count = visits;
        }
        assert_eq!(tree.best_move(), Some(children[3]));

        tree.get_mut(children[3].1).value_sum = 1.0;
        // 37 and 38 tie on 0.75; the first one wins
        assert_eq!(tree.best_move(), Some(children[1]));
    }

    #[test]
    fn test_best_move_skips_unvisited() {
        let mut tree = MctsTree::new(opened());
        assert_eq!(tree.best_move(), None);

        tree.expand(tree.root()).unwrap();
        assert_eq!(tree.best_move(), None);

        let last = *tree.get(tree.root()).children.last().unwrap();
        tree.backpropagate(last.1, 0.0);
        assert_eq!(tree.best_move(), Some(last));
    }

    #[test]
    fn test_advance_keeps_subtree_statistics() {
        let mut tree = MctsTree::new(opened());
        let first = tree.expand(tree.root()).unwrap();
        let grandchild = tree.expand(first).unwrap();
        tree.backpropagate(grandchild, 1.0);
        tree.backpropagate(first, 0.5);
        let child_count = tree.get(first).children.len();
        let serial = tree.get(first).serial;

        tree.advance(36).unwrap();

        assert_eq!(tree.root(), NodeId(0));
        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.serial, serial);
        assert_eq!(root.visit_count, 2);
        assert!((root.value_sum - 1.5).abs() < 1e-6);
        assert_eq!(root.children.len(), child_count);
        assert_eq!(tree.len(), 1 + child_count);

        let (action, new_grandchild) = root.children[0];
        assert_eq!(tree.get(new_grandchild).last_move(), Some(action));
        assert_eq!(tree.get(new_grandchild).parent, tree.root());
        assert_eq!(tree.get(new_grandchild).visit_count, 1);
    }

    #[test]
    fn test_advance_unexpanded_root_restarts() {
        let mut tree = MctsTree::new(GameState::new(Player::Opponent));
        tree.advance(40).unwrap();

        assert_eq!(tree.len(), 1);
        let root = tree.get(tree.root());
        assert_eq!(root.last_move(), Some(40));
        assert!(root.state.is_my_turn());
        assert_eq!(root.visit_count, 0);
    }

    #[test]
    fn test_advance_past_pruned_root_restarts() {
        // Opponent to move, one cell (20) from winning the game
        let state = GameState::from_parts(
            cells(&[38, 39, 41, 42]),
            cells(&[0, 1, 2, 9, 10, 11, 18, 19]),
            Player::Opponent,
            Some(38),
            Rules::default(),
        )
        .unwrap();
        let mut tree = MctsTree::new(state);
        let only = tree.expand(tree.root()).unwrap();
        tree.backpropagate(only, 0.0);
        assert_eq!(tree.get(tree.root()).children, vec![(20, only)]);
        assert!(tree.get(tree.root()).state.is_legal(21));

        tree.advance(21).unwrap();

        assert_eq!(tree.len(), 1);
        let root = tree.get(tree.root());
        assert_eq!(root.last_move(), Some(21));
        assert!(root.state.is_my_turn());
        assert!(!root.state.is_terminal());
        assert_eq!(root.visit_count, 0);
    }

    #[test]
    fn test_advance_mismatch() {
        let mut tree = MctsTree::new(opened());
        tree.expand(tree.root()).unwrap();

        match tree.advance(0) {
            Err(SearchError::OpponentMoveMismatch {
                cell,
                last_move,
                legal_moves,
                children,
            }) => {
                assert_eq!(cell, 0);
                assert_eq!(last_move, Some(40));
                assert_eq!(legal_moves.len(), 8);
                assert_eq!(children.len(), 8);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }

        // Illegal move on an unexpanded root is a mismatch too
        let mut fresh = MctsTree::new(opened());
        assert!(matches!(
            fresh.advance(0),
            Err(SearchError::OpponentMoveMismatch { .. })
        ));
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MctsTree::new(opened());
        let first = tree.expand(tree.root()).unwrap();
        tree.expand(first).unwrap();

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, tree.len());
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn test_root_children_summary() {
        let mut tree = MctsTree::new(opened());
        let first = tree.expand(tree.root()).unwrap();
        tree.backpropagate(first, 1.0);

        let summary = tree.root_children_summary();
        assert_eq!(summary.len(), 8);
        assert_eq!(summary[0].action, 36);
        assert_eq!(summary[0].visits, 1);
        assert!((summary[0].mean_value - 1.0).abs() < 1e-6);
        assert_eq!(summary[1].visits, 0);
    }
}
