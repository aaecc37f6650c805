//! DAG reader
//!
//! Walks a committed DAG from its root. Every fetched block is re-hashed
//! against its id before it is decoded. Traversal uses an explicit stack so
//! depth never maps onto call depth.

use super::node::{Link, Node};
use crate::error::ReadError;
use crate::store::ContentStore;
use crate::types::ContentId;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;

/// Shape of a stored DAG.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DagStat {
    /// Logical file size.
    pub size: u64,
    /// Distinct blocks reachable from the root.
    pub blocks: u64,
    /// Leaf positions; a repeated chunk counts once per occurrence.
    pub leaves: u64,
    /// Height of the root; 0 when the root is a leaf.
    pub depth: usize,
    pub max_fanout: usize,
    /// Sum of serialized sizes over distinct blocks.
    pub stored_bytes: u64,
}

pub struct DagReader<'s, S: ContentStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: ContentStore + ?Sized> DagReader<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Fetch, verify, and decode one block.
    pub fn load(&self, cid: &ContentId) -> Result<Node, ReadError> {
        self.fetch(cid).map(|(node, _)| node)
    }

    fn fetch(&self, cid: &ContentId) -> Result<(Node, u64), ReadError> {
        let bytes = self
            .store
            .get(cid)?
            .ok_or(ReadError::MissingBlock(*cid))?;
        if !cid.verify(&bytes) {
            return Err(ReadError::Integrity(*cid));
        }
        let node = Node::decode(cid.codec, &bytes).map_err(|e| ReadError::Malformed {
            id: *cid,
            reason: e.to_string(),
        })?;
        Ok((node, bytes.len() as u64))
    }

    /// Walk every block and report the DAG's shape.
    pub fn stat(&self, root: &ContentId) -> Result<DagStat, ReadError> {
        self.walk(root, false)
    }

    /// Walk every block, also checking that each link's recorded sizes
    /// match the child it points at.
    pub fn verify(&self, root: &ContentId) -> Result<DagStat, ReadError> {
        self.walk(root, true)
    }

    fn walk(&self, root: &ContentId, strict: bool) -> Result<DagStat, ReadError> {
        let mut stat = DagStat::default();
        let mut seen = HashSet::new();
        let mut stack: Vec<(ContentId, Option<Link>, usize)> = vec![(*root, None, 0)];

        while let Some((cid, via, height)) = stack.pop() {
            let (node, stored) = self.fetch(&cid)?;
            if seen.insert(cid) {
                stat.blocks += 1;
                stat.stored_bytes += stored;
            }
            stat.depth = stat.depth.max(height);

            if strict {
                if let Some(link) = via {
                    if link.logical_size != node.logical_size() || link.serialized_size != stored
                    {
                        return Err(ReadError::Malformed {
                            id: cid,
                            reason: format!(
                                "link records {}/{} bytes, block holds {}/{}",
                                link.logical_size,
                                link.serialized_size,
                                node.logical_size(),
                                stored
                            ),
                        });
                    }
                }
                let child_total: u64 = node.links().iter().map(|l| l.logical_size).sum();
                if !node.is_leaf() && child_total != node.logical_size() {
                    return Err(ReadError::Malformed {
                        id: cid,
                        reason: format!(
                            "children sum to {} bytes, node records {}",
                            child_total,
                            node.logical_size()
                        ),
                    });
                }
            }

            if node.is_leaf() {
                stat.leaves += 1;
            } else {
                stat.max_fanout = stat.max_fanout.max(node.links().len());
                for link in node.links().iter().rev() {
                    stack.push((link.cid, Some(*link), height + 1));
                }
            }
            if via.is_none() {
                stat.size = node.logical_size();
            }
        }

        Ok(stat)
    }

    /// Stream the file bytes left-to-right into `out`.
    pub fn write_to<W: Write>(&self, root: &ContentId, out: &mut W) -> Result<u64, ReadError> {
        let mut written = 0u64;
        let mut stack = vec![*root];
        while let Some(cid) = stack.pop() {
            let node = self.load(&cid)?;
            match node.leaf_data() {
                Some(data) => {
                    out.write_all(data)?;
                    written += data.len() as u64;
                }
                None => stack.extend(node.links().iter().rev().map(|l| l.cid)),
            }
        }
        Ok(written)
    }

    pub fn read_all(&self, root: &ContentId) -> Result<Vec<u8>, ReadError> {
        let mut out = Vec::new();
        self.write_to(root, &mut out)?;
        Ok(out)
    }

    /// Read up to `len` bytes starting at `offset`.
    ///
    /// Subtrees outside the range are skipped using the cumulative sizes
    /// recorded in each link, so only the covering leaves are fetched.
    pub fn read_at(&self, root: &ContentId, offset: u64, len: u64) -> Result<Vec<u8>, ReadError> {
        let root_node = self.load(root)?;
        let size = root_node.logical_size();
        if offset > size {
            return Err(ReadError::OutOfRange { offset, size });
        }
        let end = offset.saturating_add(len).min(size);
        let mut out = Vec::with_capacity((end - offset) as usize);

        let mut stack = vec![(root_node, 0u64)];
        while let Some((node, start)) = stack.pop() {
            if let Some(data) = node.leaf_data() {
                let from = offset.max(start) - start;
                let to = end.min(start + data.len() as u64) - start;
                if from < to {
                    out.extend_from_slice(&data[from as usize..to as usize]);
                }
                continue;
            }

            let mut covering = Vec::new();
            let mut child_start = start;
            for link in node.links() {
                let child_end = child_start + link.logical_size;
                if child_end > offset && child_start < end {
                    covering.push((link.cid, child_start));
                }
                if child_start >= end {
                    break;
                }
                child_start = child_end;
            }
            for (cid, child_start) in covering.into_iter().rev() {
                stack.push((self.load(&cid)?, child_start));
            }
        }

        Ok(out)
    }
}
