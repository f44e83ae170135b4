//! ASCII rendering of spanning trees.
//!
//! Writes the tree rooted at [`MaxSpanningTree::find_root`] with
//! box-drawing connectors, children in score-descending order. Branches
//! whose score falls below a threshold are noted as stubs and not
//! descended into; remaining components and fully isolated nodes are
//! listed after the main tree. Deep trees shorten the indent prefix to a
//! trailing window so lines stay readable.

use std::io::Write;

use physalia_core::Result;

use crate::spanning::{MaxSpanningTree, NodeId};

/// Rendering options for [`write_ascii_tree`].
#[derive(Debug, Clone, Copy)]
pub struct AsciiTreeOptions {
    /// Stop descending into branches scored below this (0 disables).
    pub score_threshold: i32,
    /// Render components other than the main tree, and list nodes with
    /// no links at all.
    pub show_isolated: bool,
}

impl Default for AsciiTreeOptions {
    fn default() -> Self {
        Self {
            score_threshold: 0,
            show_isolated: true,
        }
    }
}

/// Width of the indent window kept when shortening deep prefixes.
const PREFIX_WINDOW: usize = 40;

/// Write an ASCII rendering of the tree.
pub fn write_ascii_tree<W: Write>(
    tree: &MaxSpanningTree,
    out: &mut W,
    options: &AsciiTreeOptions,
) -> Result<()> {
    let root = tree.find_root();
    let children = tree.children_map();

    writeln!(out, "Maximum Spanning Tree (root: node {root})")?;
    writeln!(out, "Total links: {}", tree.links_added())?;
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out)?;

    let mut renderer = Renderer {
        tree,
        written: vec![false; children.len()],
        children,
        options: *options,
    };
    renderer.subtree(out, root, "", true, 0, 1)?;

    if options.show_isolated {
        // Roots of components the main tree did not reach.
        let other_roots: Vec<NodeId> = (0..renderer.children.len())
            .filter(|&id| {
                !renderer.written[id]
                    && (tree.scores()[id] < 0 || tree.parents()[id] == id)
                    && !renderer.children[id].is_empty()
            })
            .collect();

        for (i, &component_root) in other_roots.iter().enumerate() {
            if renderer.written[component_root] {
                continue;
            }
            renderer.subtree(out, component_root, "", true, 0, i + 2)?;
        }

        let isolated: Vec<NodeId> = (0..renderer.children.len())
            .filter(|&id| !renderer.written[id] && tree.scores()[id] < 0)
            .collect();

        if !isolated.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", "=".repeat(80))?;
            writeln!(out, "ISOLATED NODES (no connections): {}", isolated.len())?;
            writeln!(out, "{}", "-".repeat(80))?;
            for id in isolated {
                writeln!(out, "Node {id}")?;
            }
        }
    }

    Ok(())
}

struct Renderer<'a> {
    tree: &'a MaxSpanningTree,
    children: Vec<Vec<NodeId>>,
    written: Vec<bool>,
    options: AsciiTreeOptions,
}

impl Renderer<'_> {
    fn subtree<W: Write>(
        &mut self,
        out: &mut W,
        node: NodeId,
        prefix: &str,
        is_last: bool,
        depth: usize,
        component: usize,
    ) -> Result<()> {
        self.written[node] = true;

        let (connector, branch) = if depth == 0 {
            ("", "")
        } else if is_last {
            ("└─ ", "   ")
        } else {
            ("├─ ", "│  ")
        };

        let short_prefix = shorten_prefix(prefix);
        if depth == 0 {
            writeln!(out, "{short_prefix}{connector}Node {node} [ROOT {component}]")?;
        } else {
            writeln!(
                out,
                "{short_prefix}{connector}Node {node} (s:{})",
                self.tree.scores()[node]
            )?;
        }

        let child_prefix = format!("{prefix}{branch}");
        let list = self.children[node].clone();
        for (i, &child) in list.iter().enumerate() {
            let is_last_child = i == list.len() - 1;

            let score = self.tree.scores()[child];
            if self.options.score_threshold > 0 && score < self.options.score_threshold {
                let stub_connector = if is_last_child { "└── " } else { "├── " };
                writeln!(
                    out,
                    "{child_prefix}{stub_connector}[STUB: Node {child}, score {score} < threshold]"
                )?;
                continue;
            }

            self.subtree(out, child, &child_prefix, is_last_child, depth + 1, component)?;
        }

        Ok(())
    }
}

/// Keep only the trailing window of a deep indent prefix, labelled with
/// the number of columns dropped.
fn shorten_prefix(prefix: &str) -> String {
    let chars: Vec<char> = prefix.chars().collect();
    let adjusted = chars.len().saturating_sub(PREFIX_WINDOW);
    let start = adjusted - adjusted % PREFIX_WINDOW;
    format!("{start}:{}", chars[start..].iter().collect::<String>())
}
