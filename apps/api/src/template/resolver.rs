//! Template Resolver — renders a template against a resume's data context.
//!
//! Resolution is best-effort: a directive whose condition fails, whose value
//! is missing, or whose command is unknown contributes nothing, and the rest
//! of the document still renders. The only hard failure is nesting deeper
//! than the configured limit.

use tracing::debug;

use crate::template::context::{is_truthy, stringify, DataContext, ListScope, Lookup};
use crate::template::directive::{Command, Span};
use crate::template::tree::{NodeId, TemplateTree};
use crate::template::{TemplateError, DEFAULT_MAX_DEPTH};

#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    max_depth: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Resolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn resolve(&self, template: &str, data: &DataContext) -> Result<String, TemplateError> {
        self.resolve_at(template, data, None)
    }

    /// Resolves with an optional list index applied to every field whose
    /// parent key names a top-level list.
    pub fn resolve_at(
        &self,
        template: &str,
        data: &DataContext,
        list_index: Option<usize>,
    ) -> Result<String, TemplateError> {
        let tree = TemplateTree::parse(template, self.max_depth)?;
        if tree.is_empty() {
            return Ok(template.to_string());
        }
        debug!(
            directives = tree.len(),
            depth = tree.max_depth(),
            "Resolving template"
        );

        let mut lookup = Lookup::new(data, list_index);
        let mut out = String::with_capacity(template.len());
        render_sequence(
            &tree,
            Span::new(0, template.len()),
            tree.roots(),
            &mut lookup,
            &mut out,
        );
        Ok(out)
    }
}

/// Literal text of `range` interleaved with the output of its directives.
fn render_sequence<'d>(
    tree: &'d TemplateTree<'_>,
    range: Span,
    ids: &[NodeId],
    lookup: &mut Lookup<'d>,
    out: &mut String,
) {
    let src = tree.src();
    let mut last_end = range.start;

    for &id in ids {
        let directive = &tree.node(id).directive;
        out.push_str(&src[last_end..directive.start_index]);
        render_node(tree, id, lookup, out);
        last_end = directive.end_index;
    }

    out.push_str(&src[last_end..range.end]);
}

fn render_node<'d>(
    tree: &'d TemplateTree<'_>,
    id: NodeId,
    lookup: &mut Lookup<'d>,
    out: &mut String,
) {
    let node = tree.node(id);
    let directive = &node.directive;
    let field_value = directive.field_key.as_deref().and_then(|key| lookup.get(key));

    let render_body = |lookup: &mut Lookup<'d>, out: &mut String| {
        if let Some(body) = directive.body {
            render_sequence(tree, body, &node.children, lookup, out);
        }
    };

    match &directive.command {
        Command::Exists => {
            let present = match directive.field_key {
                Some(_) => is_truthy(field_value),
                None => lookup.form_present(&directive.form_key),
            };
            if present {
                render_body(lookup, out);
            }
        }
        Command::NotExists => {
            let present = match directive.field_key {
                Some(_) => is_truthy(field_value),
                None => lookup.form_present(&directive.form_key),
            };
            if !present {
                render_body(lookup, out);
            }
        }
        Command::Value => {
            if let Some(value) = field_value.filter(|v| is_truthy(Some(*v))) {
                out.push_str(&stringify(value));
            }
        }
        Command::ForEachIn => {
            let (Some(list_key), Some(items)) = (
                directive.field_key.as_deref(),
                field_value.and_then(|v| v.as_array()),
            ) else {
                return;
            };
            for element in items {
                lookup.push(ListScope::Element { list_key, element });
                render_body(lookup, out);
                lookup.pop();
            }
        }
        Command::Unsupported(raw) => {
            debug!(
                command = %raw,
                at = directive.start_index,
                nested = node.parent.is_some(),
                "Skipping unsupported directive"
            );
        }
    }
}
