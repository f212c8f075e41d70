//! Hierarchy reconstruction and nested Markdown assembly.
//!
//! The store hands over a flat list of records. Children are found through
//! each record's `content` ids, or through `parent_id` links when a record
//! has no `content` list at all. Output is depth-first pre-order: a block's
//! own lines come before its children's, and each nesting level adds
//! [`INDENT`] in front of every line.

use std::collections::{HashMap, HashSet};

use pagemd_blocks::{BlockRecord, BlockType};

use crate::block::{render_lines, resolve_title};
use crate::metadata::format_metadata;
use crate::options::RenderOptions;

/// Indentation added per nesting level.
pub const INDENT: &str = "  ";

/// How far below the invocation root the assembler descends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traversal {
    /// Render the root's immediate children only.
    DirectChildren,
    /// Expand every descendant.
    Recursive,
}

impl Traversal {
    /// Page roots only show their top-level content; any other root (a
    /// toggle, a database entry, ...) is expanded fully.
    #[must_use]
    pub fn for_root(root: &BlockRecord) -> Self {
        if root.block_type == BlockType::Page {
            Self::DirectChildren
        } else {
            Self::Recursive
        }
    }
}

/// Indexed view over one flat block list.
///
/// Built once per render; lookups by id and by parent are constant time.
pub struct Assembler<'a> {
    blocks: &'a [BlockRecord],
    by_id: HashMap<&'a str, &'a BlockRecord>,
    by_parent: HashMap<&'a str, Vec<&'a BlockRecord>>,
    options: RenderOptions,
}

impl<'a> Assembler<'a> {
    /// Index `blocks`. When ids repeat, the first record wins.
    #[must_use]
    pub fn new(blocks: &'a [BlockRecord], options: RenderOptions) -> Self {
        let mut by_id = HashMap::with_capacity(blocks.len());
        let mut by_parent: HashMap<&str, Vec<&BlockRecord>> = HashMap::new();

        for block in blocks {
            by_id.entry(block.id.as_str()).or_insert(block);
            if let Some(parent_id) = block.parent_id.as_deref() {
                by_parent.entry(parent_id).or_default().push(block);
            }
        }

        Self {
            blocks,
            by_id,
            by_parent,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a BlockRecord> {
        self.by_id.get(id).copied()
    }

    /// Records with no parent inside the list, in list order.
    #[must_use]
    pub fn roots(&self) -> Vec<&'a BlockRecord> {
        self.blocks
            .iter()
            .filter(|block| {
                block
                    .parent_id
                    .as_deref()
                    .is_none_or(|parent_id| !self.by_id.contains_key(parent_id))
            })
            .collect()
    }

    /// Children of `block` in display order.
    ///
    /// `content` ids missing from the list are skipped. A block without a
    /// `content` list falls back to the records naming it as parent.
    #[must_use]
    pub fn children(&self, block: &BlockRecord) -> Vec<&'a BlockRecord> {
        match &block.content {
            Some(ids) => ids
                .iter()
                .filter_map(|id| {
                    let child = self.get(id);
                    if child.is_none() {
                        tracing::trace!(parent = %block.id, child = %id, "Skipping dangling child reference");
                    }
                    child
                })
                .collect(),
            None => self
                .by_parent
                .get(block.id.as_str())
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Render a page: the root's children at depth zero, traversal picked
    /// from the root's type. The root itself is not rendered.
    #[must_use]
    pub fn render_page(&self, root: &BlockRecord) -> String {
        let traversal = Traversal::for_root(root);
        let children = self.children(root);

        let mut visited = HashSet::new();
        visited.insert(root.id.as_str());

        let mut lines = Vec::new();
        for child in children {
            self.visit(child, 0, traversal, &mut visited, &mut lines);
        }
        lines.join("\n")
    }

    /// Render `roots` at depth zero along with their descendants.
    #[must_use]
    pub fn assemble(&self, roots: &[&BlockRecord], traversal: Traversal) -> String {
        let mut visited = HashSet::new();
        let mut lines = Vec::new();
        for root in roots {
            self.visit(root, 0, traversal, &mut visited, &mut lines);
        }
        lines.join("\n")
    }

    fn visit<'b>(
        &'b self,
        block: &'b BlockRecord,
        depth: usize,
        traversal: Traversal,
        visited: &mut HashSet<&'b str>,
        out: &mut Vec<String>,
    ) {
        let title = resolve_title(block);
        if let Some(lines) = render_lines(block, title.as_deref(), &self.options) {
            push_indented(out, depth, &lines);
        }
        if self.options.diagnostics {
            push_indented(out, depth, &format_metadata(block));
        }

        if traversal != Traversal::Recursive || block.block_type.is_boundary() {
            return;
        }
        if !visited.insert(block.id.as_str()) {
            tracing::debug!(id = %block.id, depth, "Block already expanded, not expanding again");
            return;
        }
        for child in self.children(block) {
            self.visit(child, depth + 1, traversal, visited, out);
        }
    }
}

/// Render the page rooted at `root` from `blocks`.
#[must_use]
pub fn render_page(root: &BlockRecord, blocks: &[BlockRecord], options: RenderOptions) -> String {
    Assembler::new(blocks, options).render_page(root)
}

/// Render the page whose root has id `root_id`.
///
/// Returns `None` if the root is not in `blocks`.
#[must_use]
pub fn render_page_by_id(
    root_id: &str,
    blocks: &[BlockRecord],
    options: RenderOptions,
) -> Option<String> {
    let assembler = Assembler::new(blocks, options);
    let root = assembler.get(root_id)?;
    Some(assembler.render_page(root))
}

fn push_indented(out: &mut Vec<String>, depth: usize, lines: &[String]) {
    let indent = INDENT.repeat(depth);
    for line in lines {
        for physical in line.split('\n') {
            if physical.is_empty() {
                out.push(String::new());
            } else {
                out.push(format!("{indent}{physical}"));
            }
        }
    }
}
