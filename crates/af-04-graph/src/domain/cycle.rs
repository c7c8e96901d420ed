//! # Cycle Detection
//!
//! Tri-colour depth-first search over the dependency graph. White nodes
//! are unvisited, gray nodes are on the current DFS path, black nodes are
//! fully explored; meeting a gray node is a back edge and the gray stack
//! from that node to the top is the closed cycle path.
//!
//! The search takes dependencies through a closure so a caller can wrap
//! the live graph in a view that virtually adds a proposed edge without
//! mutating anything. Missing ids resolve to no dependencies and are
//! treated as leaves, never as cycles.

use shared_types::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    Gray,
    Black,
}

/// Depth-first search from `start`; returns the closed cycle path
/// (`[n1, n2, …, n1]`) if one is reachable, `None` otherwise.
pub fn find_cycle<F>(start: &NodeId, deps_of: F) -> Option<Vec<NodeId>>
where
    F: Fn(&NodeId) -> Vec<NodeId>,
{
    // Unvisited nodes are white by absence.
    let mut colour: HashMap<NodeId, Colour> = HashMap::new();
    // Stack frames: (node, its dependencies, cursor into them). The gray
    // path is exactly the nodes of the stack, bottom to top.
    let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> = Vec::new();

    colour.insert(start.clone(), Colour::Gray);
    stack.push((start.clone(), deps_of(start), 0));

    while let Some((_, deps, cursor)) = stack.last_mut() {
        if *cursor >= deps.len() {
            let (node, _, _) = stack.pop().expect("frame exists");
            colour.insert(node, Colour::Black);
            continue;
        }
        let next = deps[*cursor].clone();
        *cursor += 1;

        match colour.get(&next) {
            Some(Colour::Gray) => {
                // Back edge: the cycle is the stack from `next` upward.
                let from = stack
                    .iter()
                    .position(|(node, _, _)| node == &next)
                    .expect("gray nodes are on the stack");
                let mut path: Vec<NodeId> =
                    stack[from..].iter().map(|(node, _, _)| node.clone()).collect();
                path.push(next);
                return Some(path);
            }
            Some(Colour::Black) => {}
            None => {
                colour.insert(next.clone(), Colour::Gray);
                let next_deps = deps_of(&next);
                stack.push((next, next_deps, 0));
            }
        }
    }
    None
}

/// Would adding the edge `from -> to` close a cycle?
///
/// Runs [`find_cycle`] from `from` over a view of the graph with the
/// proposed edge virtually added. Self-reference is a cycle by
/// definition. Returns the closed path on detection.
pub fn would_create_cycle<F>(from: &NodeId, to: &NodeId, deps_of: F) -> Option<Vec<NodeId>>
where
    F: Fn(&NodeId) -> Vec<NodeId>,
{
    if from == to {
        return Some(vec![from.clone(), from.clone()]);
    }
    let virtual_deps = |id: &NodeId| -> Vec<NodeId> {
        let mut deps = deps_of(id);
        if id == from {
            deps.push(to.clone());
        }
        deps
    };
    find_cycle(from, virtual_deps)
}
