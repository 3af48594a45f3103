//! Directive tree — the template parsed once into an arena.
//!
//! Each range (the whole template, or one directive body) is scanned exactly
//! once. Only directives that the resolver would actually reach are kept: a
//! directive whose opener falls inside an earlier sibling's block is consumed
//! by that block. Bodies are expanded with an explicit work stack so nesting
//! depth never depends on the call stack while parsing.

use crate::template::directive::{Command, Directive, Span};
use crate::template::scanner::{scan_range, ScanItem};
use crate::template::TemplateError;

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    pub directive: Directive,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// 0 for directives at the template's top level.
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct TemplateTree<'a> {
    src: &'a str,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl<'a> TemplateTree<'a> {
    /// Parses `src`, failing when block nesting reaches `max_depth`.
    pub fn parse(src: &'a str, max_depth: usize) -> Result<Self, TemplateError> {
        let mut nodes = Vec::new();
        let roots = collect_reachable(src, Span::new(0, src.len()), &mut nodes, None, 0);

        let mut pending: Vec<NodeId> = roots.clone();
        while let Some(id) = pending.pop() {
            let node = &nodes[id];
            if !recurses(&node.directive.command) {
                continue;
            }
            let Some(body) = node.directive.body else {
                continue;
            };
            let child_depth = node.depth + 1;

            let children = collect_reachable(src, body, &mut nodes, Some(id), child_depth);
            if !children.is_empty() && child_depth >= max_depth {
                return Err(TemplateError::RecursionLimitExceeded { limit: max_depth });
            }

            pending.extend(children.iter().copied());
            nodes[id].children = children;
        }

        Ok(Self { src, nodes, roots })
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest nesting level present (0 when only top-level directives).
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Only these commands ever render their body.
fn recurses(command: &Command) -> bool {
    matches!(
        command,
        Command::Exists | Command::NotExists | Command::ForEachIn
    )
}

/// Scans `range` and appends the directives reached by a left-to-right walk.
fn collect_reachable(
    src: &str,
    range: Span,
    nodes: &mut Vec<Node>,
    parent: Option<NodeId>,
    depth: usize,
) -> Vec<NodeId> {
    let mut last_end = range.start;
    let mut ids = Vec::new();

    for item in scan_range(src, range) {
        let ScanItem::Directive(directive) = item else {
            continue;
        };
        if directive.start_index < last_end {
            continue;
        }
        last_end = directive.end_index;
        ids.push(nodes.len());
        nodes.push(Node {
            directive,
            parent,
            children: Vec::new(),
            depth,
        });
    }

    ids
}
