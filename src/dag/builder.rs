//! Leaf node building and the DAG builder that feeds the layout engine.

use super::buffered::BufferedDag;
use super::layout::DagSource;
use super::node::{seal, Link, Node, SealedNode};
use crate::chunker::{Chunk, SizeSplitter};
use crate::error::ImportError;
use crate::store::ContentStore;
use crate::types::HashFunction;
use std::io::Read;
use tracing::{debug, trace};

/// Wraps chunks as DAG leaves.
#[derive(Debug, Clone, Copy)]
pub struct LeafBuilder {
    /// Store chunk bytes verbatim instead of in a `File` envelope.
    pub raw_leaves: bool,
    pub hash: HashFunction,
}

impl LeafBuilder {
    pub fn new(raw_leaves: bool, hash: HashFunction) -> Self {
        Self { raw_leaves, hash }
    }

    pub fn build(&self, chunk: Chunk) -> Result<SealedNode, ImportError> {
        let node = if self.raw_leaves {
            Node::Raw(chunk.data)
        } else {
            Node::wrapped_leaf(chunk.data)
        };
        Ok(seal(node, self.hash)?)
    }

    /// Canonical leaf for an empty stream.
    ///
    /// Always wrapped, since a raw block cannot carry a zero logical size
    /// distinctly from "no data".
    pub fn empty_leaf(&self) -> Result<SealedNode, ImportError> {
        Ok(seal(Node::wrapped_leaf(Vec::new()), self.hash)?)
    }
}

/// Chunks a stream, builds leaves, and stages every node it creates.
pub struct DagBuilder<'s, R, S: ContentStore + ?Sized> {
    splitter: SizeSplitter<R>,
    leaves: LeafBuilder,
    dag: BufferedDag<'s, S>,
}

impl<'s, R: Read, S: ContentStore + ?Sized> DagBuilder<'s, R, S> {
    pub fn new(splitter: SizeSplitter<R>, leaves: LeafBuilder, store: &'s S) -> Self {
        Self {
            splitter,
            leaves,
            dag: BufferedDag::new(store),
        }
    }

    /// Bytes read from the stream so far.
    pub fn bytes_read(&self) -> u64 {
        self.splitter.offset()
    }

    pub fn buffer(&self) -> &BufferedDag<'s, S> {
        &self.dag
    }

    pub fn into_buffer(self) -> BufferedDag<'s, S> {
        self.dag
    }
}

impl<'s, R: Read, S: ContentStore + ?Sized> DagSource for DagBuilder<'s, R, S> {
    fn next_leaf(&mut self) -> Result<Option<Link>, ImportError> {
        let Some(chunk) = self.splitter.next_chunk()? else {
            return Ok(None);
        };
        let offset = chunk.offset;
        let sealed = self.leaves.build(chunk)?;
        trace!(cid = %sealed.cid, offset, size = sealed.node.logical_size(), "staged leaf");
        self.dag.stage(&sealed);
        Ok(Some(sealed.link()))
    }

    fn seal_internal(&mut self, links: Vec<Link>) -> Result<Link, ImportError> {
        let sealed = seal(Node::internal(links), self.leaves.hash)?;
        debug!(
            cid = %sealed.cid,
            children = sealed.node.links().len(),
            size = sealed.node.logical_size(),
            "sealed internal node"
        );
        self.dag.stage(&sealed);
        Ok(sealed.link())
    }

    fn empty_leaf(&mut self) -> Result<Link, ImportError> {
        let sealed = self.leaves.empty_leaf()?;
        self.dag.stage(&sealed);
        Ok(sealed.link())
    }
}
