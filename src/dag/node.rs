//! DAG node types and their serialized form.

use crate::types::{Codec, ContentId, HashFunction};
use serde::{Deserialize, Serialize};

/// Link from an internal node to a child block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub cid: ContentId,
    /// Logical bytes in the subtree rooted at the child.
    pub logical_size: u64,
    /// Length of the child's serialized block.
    pub serialized_size: u64,
}

/// Payload of a `Codec::DagNode` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeData {
    /// Wrapped leaf: chunk bytes with their logical length recorded.
    File { size: u64, data: Vec<u8> },
    /// Internal node: ordered child links; `size` is their logical total.
    Internal { size: u64, links: Vec<Link> },
}

/// DAG node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Raw(Vec<u8>),
    Dag(NodeData),
}

impl Node {
    pub fn codec(&self) -> Codec {
        match self {
            Node::Raw(_) => Codec::Raw,
            Node::Dag(_) => Codec::DagNode,
        }
    }

    pub fn internal(links: Vec<Link>) -> Self {
        let size = links.iter().map(|l| l.logical_size).sum();
        Node::Dag(NodeData::Internal { size, links })
    }

    pub fn wrapped_leaf(data: Vec<u8>) -> Self {
        Node::Dag(NodeData::File {
            size: data.len() as u64,
            data,
        })
    }

    /// Logical file bytes this node (and its subtree) stands for.
    pub fn logical_size(&self) -> u64 {
        match self {
            Node::Raw(data) => data.len() as u64,
            Node::Dag(NodeData::File { size, .. }) => *size,
            Node::Dag(NodeData::Internal { size, .. }) => *size,
        }
    }

    pub fn links(&self) -> &[Link] {
        match self {
            Node::Dag(NodeData::Internal { links, .. }) => links,
            _ => &[],
        }
    }

    /// Leaf bytes, `None` for internal nodes.
    pub fn leaf_data(&self) -> Option<&[u8]> {
        match self {
            Node::Raw(data) => Some(data),
            Node::Dag(NodeData::File { data, .. }) => Some(data),
            Node::Dag(NodeData::Internal { .. }) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf_data().is_some()
    }

    pub fn serialize(&self) -> Result<Vec<u8>, bincode::Error> {
        match self {
            Node::Raw(data) => Ok(data.clone()),
            Node::Dag(data) => bincode::serialize(data),
        }
    }

    pub fn decode(codec: Codec, bytes: &[u8]) -> Result<Self, bincode::Error> {
        match codec {
            Codec::Raw => Ok(Node::Raw(bytes.to_vec())),
            Codec::DagNode => Ok(Node::Dag(bincode::deserialize(bytes)?)),
        }
    }
}

/// A node together with its serialized bytes and identifier.
#[derive(Debug, Clone)]
pub struct SealedNode {
    pub node: Node,
    pub cid: ContentId,
    pub bytes: Vec<u8>,
}

impl SealedNode {
    /// Link a parent would record for this node.
    pub fn link(&self) -> Link {
        Link {
            cid: self.cid,
            logical_size: self.node.logical_size(),
            serialized_size: self.bytes.len() as u64,
        }
    }
}

/// Serialize `node` and derive its identifier.
pub fn seal(node: Node, hash: HashFunction) -> Result<SealedNode, bincode::Error> {
    let bytes = node.serialize()?;
    let cid = ContentId::compute(node.codec(), hash, &bytes);
    Ok(SealedNode { node, cid, bytes })
}
