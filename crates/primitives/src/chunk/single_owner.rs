//! Single-owner chunk implementation
//!
//! A single-owner chunk (SOC) wraps a content chunk with an identifier and the
//! owner's signature over `keccak256(id || payload reference)`. It is stored
//! under `keccak256(id || owner)`, so the same owner can replace the payload
//! at a fixed address by signing again.
//!
//! Wire format:
//!
//! ```text
//! id (32) || v (1) || r (32) || s (32) || span (8, LE) || data
//! ```
//!
//! where `v` is the recovery parity offset by 31.

use alloy_primitives::{Address, B256, Keccak256, Signature, U256, hex};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::PrimitivesError;
use crate::bmt::{MAX_DATA_LENGTH, SPAN_SIZE};
use crate::cache::OnceCache;
use crate::chunk::error::{self, ChunkError};
use crate::error::Result;
use crate::identity::ChunkSigner;

use super::bmt_body::BmtBody;
use super::content::ContentChunk;
use super::traits::{BmtChunk, Chunk, ChunkAddress};

const ID_SIZE: usize = std::mem::size_of::<B256>();
const SCALAR_SIZE: usize = 32;
const SIGNATURE_SIZE: usize = 1 + 2 * SCALAR_SIZE;

/// Offset added to the recovery parity in the serialized `v` byte
const RECOVERY_OFFSET: u8 = 31;

/// Bytes preceding the payload data: id, signature and span
pub const SOC_HEADER_SIZE: usize = ID_SIZE + SIGNATURE_SIZE + SPAN_SIZE;

/// Largest payload that fits in a single-owner chunk
pub const MAX_SOC_PAYLOAD_SIZE: usize = MAX_DATA_LENGTH - SOC_HEADER_SIZE;

/// Network address of the single-owner chunk `id` owned by `owner`.
pub fn soc_address(id: &B256, owner: &Address) -> ChunkAddress {
    let mut hasher = Keccak256::new();
    hasher.update(id);
    hasher.update(owner);
    hasher.finalize().into()
}

/// A content chunk signed by a single owner.
#[derive(Debug, Clone)]
pub struct SingleOwnerChunk {
    id: B256,
    signature: Signature,
    /// Owner recovered from (or signing) the chunk
    owner: Address,
    payload: ContentChunk,
    address_cache: OnceCache<ChunkAddress>,
}

impl SingleOwnerChunk {
    /// Wrap `data` as a leaf chunk and sign it under `id`.
    #[must_use = "this returns a new chunk without modifying the input"]
    pub fn new(id: B256, data: impl Into<Bytes>, signer: &impl ChunkSigner) -> Result<Self> {
        let payload = ContentChunk::new(data)?;
        Self::from_content(id, payload, signer)
    }

    /// Sign an existing content chunk under `id`.
    ///
    /// The serialized chunk must fit in 4096 bytes, so the payload data is
    /// limited to [`MAX_SOC_PAYLOAD_SIZE`].
    #[must_use = "this returns a new chunk without modifying the input"]
    pub fn from_content(id: B256, payload: ContentChunk, signer: &impl ChunkSigner) -> Result<Self> {
        check_payload_size(payload.data().len())?;

        let digest = Self::to_sign(&id, payload.address());
        let signature = signer.sign_digest(&digest)?;

        Ok(Self {
            id,
            signature,
            owner: signer.owner(),
            payload,
            address_cache: OnceCache::new(),
        })
    }

    /// Assemble a chunk from a pre-computed signature, recovering its owner.
    pub fn from_parts(id: B256, signature: Signature, payload: ContentChunk) -> Result<Self> {
        check_payload_size(payload.data().len())?;

        let digest = Self::to_sign(&id, payload.address());
        let owner = signature
            .recover_address_from_prehash(&digest)
            .map_err(ChunkError::from)?;

        Ok(Self {
            id,
            signature,
            owner,
            payload,
            address_cache: OnceCache::new(),
        })
    }

    /// Parse `bytes` and check they were signed by `expected_owner`.
    ///
    /// Malformed input fails with a parse error ([`ChunkError::is_malformed`]),
    /// a valid chunk signed by anyone else with [`ChunkError::OwnerMismatch`].
    pub fn validate(bytes: impl Into<Bytes>, expected_owner: &Address) -> Result<Self> {
        let chunk = Self::try_from(bytes.into())?;
        chunk.verify_owner(expected_owner)?;
        Ok(chunk)
    }

    /// Check that this chunk was signed by `expected`.
    pub fn verify_owner(&self, expected: &Address) -> error::Result<()> {
        if self.owner != *expected {
            return Err(ChunkError::owner_mismatch(*expected, self.owner));
        }
        Ok(())
    }

    /// The digest signed by the owner: `keccak256(id || payload reference)`
    fn to_sign(id: &B256, reference: &ChunkAddress) -> B256 {
        let mut hasher = Keccak256::new();
        hasher.update(id);
        hasher.update(reference);
        hasher.finalize()
    }

    /// Get the ID of this chunk.
    pub const fn id(&self) -> B256 {
        self.id
    }

    /// Get the signature of this chunk.
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Get the owner that signed this chunk.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Get the wrapped content chunk.
    pub const fn payload(&self) -> &ContentChunk {
        &self.payload
    }

    /// Unwrap into the content chunk.
    pub fn into_payload(self) -> ContentChunk {
        self.payload
    }
}

fn check_payload_size(len: usize) -> error::Result<()> {
    if len > MAX_SOC_PAYLOAD_SIZE {
        return Err(ChunkError::invalid_size(
            "payload exceeds single-owner chunk capacity",
            MAX_SOC_PAYLOAD_SIZE,
            len,
        ));
    }
    Ok(())
}

impl Chunk for SingleOwnerChunk {
    fn address(&self) -> &ChunkAddress {
        self.address_cache
            .get_or_compute(|| soc_address(&self.id, &self.owner))
    }

    fn data(&self) -> &Bytes {
        self.payload.data()
    }

    fn size(&self) -> usize {
        ID_SIZE + SIGNATURE_SIZE + self.payload.size()
    }

    fn to_bytes(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(self.size());
        bytes.extend_from_slice(self.id.as_slice());
        bytes.put_u8(self.signature.v() as u8 + RECOVERY_OFFSET);
        bytes.extend_from_slice(&self.signature.r().to_be_bytes::<SCALAR_SIZE>());
        bytes.extend_from_slice(&self.signature.s().to_be_bytes::<SCALAR_SIZE>());
        bytes.extend_from_slice(&self.payload.to_bytes());
        bytes.freeze()
    }
}

impl BmtChunk for SingleOwnerChunk {
    fn span(&self) -> u64 {
        self.payload.span()
    }
}

impl From<SingleOwnerChunk> for Bytes {
    fn from(chunk: SingleOwnerChunk) -> Self {
        chunk.to_bytes()
    }
}

impl TryFrom<Bytes> for SingleOwnerChunk {
    type Error = PrimitivesError;

    fn try_from(bytes: Bytes) -> Result<Self> {
        if bytes.len() < SOC_HEADER_SIZE {
            return Err(ChunkError::invalid_size(
                "insufficient data for single-owner chunk",
                SOC_HEADER_SIZE,
                bytes.len(),
            )
            .into());
        }
        if bytes.len() > MAX_DATA_LENGTH {
            return Err(ChunkError::invalid_size(
                "single-owner chunk exceeds maximum chunk size",
                MAX_DATA_LENGTH,
                bytes.len(),
            )
            .into());
        }

        let id = B256::from_slice(&bytes[..ID_SIZE]);

        let parity = match bytes[ID_SIZE].checked_sub(RECOVERY_OFFSET) {
            Some(0) => false,
            Some(1) => true,
            _ => {
                return Err(ChunkError::invalid_format(format!(
                    "invalid signature recovery byte {}",
                    bytes[ID_SIZE]
                ))
                .into());
            }
        };
        let r_start = ID_SIZE + 1;
        let s_start = r_start + SCALAR_SIZE;
        let signature = Signature::new(
            U256::from_be_slice(&bytes[r_start..s_start]),
            U256::from_be_slice(&bytes[s_start..s_start + SCALAR_SIZE]),
            parity,
        );

        let body = BmtBody::try_from(bytes.slice(ID_SIZE + SIGNATURE_SIZE..))?;

        Self::from_parts(id, signature, ContentChunk::from_body(body))
    }
}

impl TryFrom<&[u8]> for SingleOwnerChunk {
    type Error = PrimitivesError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::try_from(Bytes::copy_from_slice(bytes))
    }
}

impl fmt::Display for SingleOwnerChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SingleOwnerChunk[id={}, owner={}]",
            hex::encode(&self.id[..8]),
            hex::encode(self.owner)
        )
    }
}

impl PartialEq for SingleOwnerChunk {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.owner == other.owner && self.payload == other.payload
    }
}

impl Eq for SingleOwnerChunk {}

#[cfg(any(test, feature = "arbitrary"))]
impl<'a> arbitrary::Arbitrary<'a> for SingleOwnerChunk {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let id = B256::arbitrary(u)?;
        let len = u.int_in_range(0..=MAX_SOC_PAYLOAD_SIZE)?;
        let mut data = vec![0; len];
        u.fill_buffer(&mut data)?;
        let signer = alloy_signer_local::PrivateKeySigner::random();

        Self::new(id, data, &signer).map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}
