//! Merkle DAG construction and traversal
//!
//! Leaves are built from chunks, arranged by the balanced layout, staged in
//! a [`BufferedDag`], and read back with a [`DagReader`].

pub mod buffered;
pub mod builder;
pub mod layout;
pub mod node;
pub mod reader;

pub use buffered::{BufferedDag, CommitStats};
pub use builder::{DagBuilder, LeafBuilder};
pub use layout::{balanced_layout, DagSource, LayoutOutcome};
pub use node::{Link, Node, NodeData, SealedNode};
pub use reader::{DagReader, DagStat};
