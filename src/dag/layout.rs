//! Balanced DAG layout
//!
//! Arranges a stream of leaves into a tree where every internal node holds
//! at most `max_links` children. One open frame is kept per depth; a frame
//! that fills up is sealed into an internal node whose link is pushed one
//! level up. At end of input the open frames are sealed bottom-up.
//!
//! The result is balanced: every child of the root spans the same depth,
//! and all but the right-most subtree at each depth are full.

use super::node::Link;
use crate::error::{ConfigError, ImportError};
use tracing::debug;

/// Producer of leaves and sealer of internal nodes.
///
/// The layout engine only deals in links; the source owns serialization,
/// hashing, and staging.
pub trait DagSource {
    /// Next leaf in stream order, `None` at end of input.
    fn next_leaf(&mut self) -> Result<Option<Link>, ImportError>;

    /// Seal `links` into an internal node and return its link.
    fn seal_internal(&mut self, links: Vec<Link>) -> Result<Link, ImportError>;

    /// Leaf used as the root of an empty stream.
    fn empty_leaf(&mut self) -> Result<Link, ImportError>;
}

/// Shape of a finished layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOutcome {
    pub root: Link,
    pub leaves: u64,
    pub internal_nodes: u64,
    /// Height of the root; 0 when the root is a leaf.
    pub depth: usize,
}

/// Open frames, one per depth.
struct LevelStack {
    max_links: usize,
    levels: Vec<Vec<Link>>,
    sealed: u64,
}

impl LevelStack {
    fn new(max_links: usize) -> Self {
        Self {
            max_links,
            levels: vec![Vec::with_capacity(max_links)],
            sealed: 0,
        }
    }

    /// Add a link at `depth`, sealing full frames upward.
    fn push<B: DagSource + ?Sized>(
        &mut self,
        source: &mut B,
        mut depth: usize,
        mut link: Link,
    ) -> Result<(), ImportError> {
        loop {
            if self.levels.len() == depth {
                self.levels.push(Vec::with_capacity(self.max_links));
            }
            let frame = &mut self.levels[depth];
            frame.push(link);
            if frame.len() < self.max_links {
                return Ok(());
            }
            let full = std::mem::take(frame);
            link = source.seal_internal(full)?;
            self.sealed += 1;
            depth += 1;
        }
    }

    /// Seal every open frame and return the root link with its height.
    ///
    /// The top frame is left unwrapped when it holds a single link, so a
    /// lone leaf (or a lone full subtree) is its own root.
    fn finish<B: DagSource + ?Sized>(
        mut self,
        source: &mut B,
    ) -> Result<Option<(Link, usize, u64)>, ImportError> {
        let top = self.levels.len() - 1;
        let mut carry: Option<Link> = None;

        for depth in 0..=top {
            let mut frame = std::mem::take(&mut self.levels[depth]);
            if let Some(link) = carry.take() {
                frame.push(link);
            }
            if frame.is_empty() {
                continue;
            }
            if depth == top && frame.len() == 1 {
                return Ok(Some((frame[0], depth, self.sealed)));
            }
            carry = Some(source.seal_internal(frame)?);
            self.sealed += 1;
        }

        Ok(carry.map(|root| (root, top + 1, self.sealed)))
    }
}

/// Lay out every leaf `source` produces into a balanced tree.
///
/// Errors from the source abort the traversal; no root is returned.
/// `max_links` below 2 is rejected before the first leaf is pulled.
pub fn balanced_layout<B: DagSource + ?Sized>(
    source: &mut B,
    max_links: usize,
) -> Result<LayoutOutcome, ImportError> {
    if max_links < 2 {
        return Err(ConfigError::MaxLinks(max_links).into());
    }
    let mut stack = LevelStack::new(max_links);
    let mut leaves = 0u64;

    while let Some(link) = source.next_leaf()? {
        stack.push(source, 0, link)?;
        leaves += 1;
    }

    let outcome = match stack.finish(source)? {
        Some((root, depth, internal_nodes)) => LayoutOutcome {
            root,
            leaves,
            internal_nodes,
            depth,
        },
        None => LayoutOutcome {
            root: source.empty_leaf()?,
            leaves: 1,
            internal_nodes: 0,
            depth: 0,
        },
    };

    debug!(
        root = %outcome.root.cid,
        leaves = outcome.leaves,
        internal_nodes = outcome.internal_nodes,
        depth = outcome.depth,
        "balanced layout complete"
    );
    Ok(outcome)
}
