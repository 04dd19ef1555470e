//! Graphviz export of the search tree.
//!
//! Writes a `strict digraph` with one rectangle per node, labelled with the
//! move that reached it, whose turn it is, the accumulated value and the
//! visit count. Only the top `depth` levels are labelled; edges from the
//! deepest labelled level still point at their (unlabelled) children.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use games_uttt::row_col;

use crate::node::MctsNode;
use crate::tree::MctsTree;

fn move_label(node: &MctsNode) -> String {
    match node.last_move() {
        Some(cell) => {
            let (row, col) = row_col(cell);
            format!("{} {}", row, col)
        }
        None => "-1 -1".to_string(),
    }
}

/// Write the top `depth` levels of `tree` as DOT.
pub fn write_dot<W: Write>(tree: &MctsTree, depth: u32, out: &mut W) -> io::Result<()> {
    writeln!(out, "strict digraph {{")?;
    writeln!(out, "\tnode [shape=\"rect\"]")?;

    let mut stack = Vec::new();
    if depth > 0 {
        stack.push((tree.root(), 0u32));
    }

    while let Some((node_id, level)) = stack.pop() {
        let node = tree.get(node_id);
        writeln!(
            out,
            "\t{} [label=\"[{}]\\nP={}W={};V={}\"]",
            node.serial,
            move_label(node),
            node.state.is_my_turn() as u8,
            node.value_sum,
            node.visit_count
        )?;
        for &(_, child_id) in &node.children {
            writeln!(out, "\t{} -> {}", node.serial, tree.get(child_id).serial)?;
        }
        if level + 1 < depth {
            // Reversed so children come out in order
            for &(_, child_id) in node.children.iter().rev() {
                stack.push((child_id, level + 1));
            }
        }
    }

    writeln!(out, "}}")?;
    Ok(())
}

/// Write the top `depth` levels of `tree` to a DOT file at `path`.
pub fn dump_tree(path: impl AsRef<Path>, tree: &MctsTree, depth: u32) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_dot(tree, depth, &mut out)?;
    out.flush()
}
