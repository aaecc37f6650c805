//! Core types for the chunked Merkle DAG importer.
//!
//! A [`ContentId`] names a block by the digest of its serialized bytes,
//! together with the codec needed to decode it and the hash function that
//! produced the digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Hash: Generic 256-bit digest value
pub type Hash = [u8; 32];

/// Length of a content identifier in its storage key form.
pub const KEY_LEN: usize = 34;

/// Hash function used to derive content identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashFunction {
    #[default]
    #[serde(rename = "blake3")]
    Blake3,
    #[serde(rename = "sha2-256")]
    Sha256,
}

impl HashFunction {
    /// Digest `data` with this hash function.
    pub fn digest(self, data: &[u8]) -> Hash {
        match self {
            HashFunction::Blake3 => *blake3::hash(data).as_bytes(),
            HashFunction::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                hasher.finalize().into()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashFunction::Blake3 => "blake3",
            HashFunction::Sha256 => "sha2-256",
        }
    }

    fn tag(self) -> u8 {
        match self {
            HashFunction::Blake3 => 0x1e,
            HashFunction::Sha256 => 0x12,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x1e => Some(HashFunction::Blake3),
            0x12 => Some(HashFunction::Sha256),
            _ => None,
        }
    }
}

impl FromStr for HashFunction {
    type Err = CidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blake3" => Ok(HashFunction::Blake3),
            "sha2-256" | "sha256" => Ok(HashFunction::Sha256),
            other => Err(CidParseError::UnknownHash(other.to_string())),
        }
    }
}

/// How the bytes behind a content identifier are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Codec {
    /// Leaf bytes stored verbatim.
    Raw,
    /// Bincode-encoded [`crate::dag::node::NodeData`].
    DagNode,
}

impl Codec {
    pub fn name(self) -> &'static str {
        match self {
            Codec::Raw => "raw",
            Codec::DagNode => "dag",
        }
    }

    fn tag(self) -> u8 {
        match self {
            Codec::Raw => 0x55,
            Codec::DagNode => 0x70,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x55 => Some(Codec::Raw),
            0x70 => Some(Codec::DagNode),
            _ => None,
        }
    }
}

/// ContentId: codec + hash function + digest of the serialized block
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId {
    pub codec: Codec,
    pub hash: HashFunction,
    pub digest: Hash,
}

impl ContentId {
    /// Compute the identifier of `bytes` serialized under `codec`.
    pub fn compute(codec: Codec, hash: HashFunction, bytes: &[u8]) -> Self {
        Self {
            codec,
            hash,
            digest: hash.digest(bytes),
        }
    }

    /// Re-hash `bytes` and check they are the content this id names.
    pub fn verify(&self, bytes: &[u8]) -> bool {
        self.hash.digest(bytes) == self.digest
    }

    /// Fixed-width key used by the block stores.
    pub fn to_key_bytes(&self) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        key[0] = self.codec.tag();
        key[1] = self.hash.tag();
        key[2..].copy_from_slice(&self.digest);
        key
    }

    pub fn from_key_bytes(key: &[u8]) -> Result<Self, CidParseError> {
        if key.len() != KEY_LEN {
            return Err(CidParseError::Length(key.len()));
        }
        let codec = Codec::from_tag(key[0]).ok_or(CidParseError::UnknownCodecTag(key[0]))?;
        let hash = HashFunction::from_tag(key[1]).ok_or(CidParseError::UnknownHashTag(key[1]))?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&key[2..]);
        Ok(Self {
            codec,
            hash,
            digest,
        })
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.digest[..6])
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.codec.name(),
            self.hash.name(),
            hex::encode(self.digest)
        )
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self)
    }
}

impl FromStr for ContentId {
    type Err = CidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (codec, rest) = s
            .split_once('-')
            .ok_or_else(|| CidParseError::Format(s.to_string()))?;
        let (hash, digest_hex) = rest
            .rsplit_once('-')
            .ok_or_else(|| CidParseError::Format(s.to_string()))?;

        let codec = match codec {
            "raw" => Codec::Raw,
            "dag" => Codec::DagNode,
            other => return Err(CidParseError::UnknownCodec(other.to_string())),
        };
        let hash = hash.parse::<HashFunction>()?;
        let bytes = hex::decode(digest_hex).map_err(|e| CidParseError::Hex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(CidParseError::Length(bytes.len()));
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes);
        Ok(Self {
            codec,
            hash,
            digest,
        })
    }
}

/// Errors parsing a content identifier from text or key bytes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CidParseError {
    #[error("malformed content id: {0}")]
    Format(String),
    #[error("unknown codec: {0}")]
    UnknownCodec(String),
    #[error("unknown hash function: {0}")]
    UnknownHash(String),
    #[error("unknown codec tag: {0:#04x}")]
    UnknownCodecTag(u8),
    #[error("unknown hash tag: {0:#04x}")]
    UnknownHashTag(u8),
    #[error("invalid hex digest: {0}")]
    Hex(String),
    #[error("unexpected length: {0}")]
    Length(usize),
}
