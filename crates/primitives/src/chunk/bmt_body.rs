//! BMT body implementation for chunks
//!
//! A BMT body is the span and payload of a chunk. Its BMT hash is the
//! content reference of the chunk, and its wire form is `span (8 bytes LE) || data`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::SwarmAddress;
use crate::bmt::{Hasher, MAX_DATA_LENGTH, SPAN_SIZE};
use crate::cache::OnceCache;
use crate::chunk::error::{self, ChunkError};
use crate::error::{PrimitivesError, Result};

/// A BMT body, which represents the data and metadata for a chunk.
///
/// Invariant: when the span is at most [`MAX_DATA_LENGTH`] the body is a leaf
/// and the data length equals the span. Larger spans belong to intermediate
/// chunks whose data is a list of child references.
#[derive(Debug, Clone)]
pub struct BmtBody {
    span: u64,
    data: Bytes,
    cached_hash: OnceCache<SwarmAddress>,
}

impl BmtBody {
    const fn new_unchecked(span: u64, data: Bytes) -> Self {
        Self {
            span,
            data,
            cached_hash: OnceCache::new(),
        }
    }

    /// Create a new builder for BmtBody (crate-internal)
    pub(crate) fn builder() -> BmtBodyBuilder<Initial> {
        BmtBodyBuilder::default()
    }

    /// Get the span of this body
    pub const fn span(&self) -> u64 {
        self.span
    }

    /// Get the data of this body
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Get the serialized size of this body in bytes
    pub fn size(&self) -> usize {
        SPAN_SIZE + self.data.len()
    }

    /// Whether this body is a leaf (holds payload rather than references)
    pub const fn is_leaf(&self) -> bool {
        self.span <= MAX_DATA_LENGTH as u64
    }

    /// Compute the BMT hash of this body
    pub fn hash(&self) -> SwarmAddress {
        *self.cached_hash.get_or_compute(|| self.calculate_hash())
    }

    /// Serialize to `span || data`
    pub fn to_bytes(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(self.size());
        bytes.put_u64_le(self.span);
        bytes.extend_from_slice(&self.data);
        bytes.freeze()
    }

    fn calculate_hash(&self) -> SwarmAddress {
        let mut hasher = Hasher::with_span(self.span);
        let updated = hasher.update(&self.data);
        debug_assert!(updated.is_ok(), "body data is at most one chunk");
        hasher.finalize().into()
    }
}

impl PartialEq for BmtBody {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span && self.data == other.data
    }
}

impl Eq for BmtBody {}

/// Validates the data size and returns the data as Bytes.
fn validate_data(data: impl Into<Bytes>) -> error::Result<Bytes> {
    let data = data.into();
    if data.len() > MAX_DATA_LENGTH {
        return Err(ChunkError::invalid_size(
            "data exceeds maximum chunk size",
            MAX_DATA_LENGTH,
            data.len(),
        ));
    }
    Ok(data)
}

impl From<BmtBody> for Bytes {
    fn from(body: BmtBody) -> Self {
        body.to_bytes()
    }
}

impl TryFrom<Bytes> for BmtBody {
    type Error = PrimitivesError;

    fn try_from(mut buf: Bytes) -> Result<Self> {
        if buf.len() < SPAN_SIZE {
            return Err(ChunkError::invalid_size(
                "insufficient data for span",
                SPAN_SIZE,
                buf.len(),
            )
            .into());
        }

        let span_bytes = buf.split_to(SPAN_SIZE);
        let span = u64::from_le_bytes(span_bytes.as_ref().try_into()?);

        Self::builder().with_span(span).with_data(buf)?.build()
    }
}

impl TryFrom<&[u8]> for BmtBody {
    type Error = PrimitivesError;

    fn try_from(buf: &[u8]) -> Result<Self> {
        Self::try_from(Bytes::copy_from_slice(buf))
    }
}

/// Builder state marker traits (crate-internal)
pub(crate) trait BuilderState {}

#[derive(Default, Debug)]
pub(crate) struct Initial;
impl BuilderState for Initial {}

#[derive(Debug)]
pub(crate) struct WithSpan(u64);
impl BuilderState for WithSpan {}

#[derive(Debug)]
pub(crate) struct ReadyToBuild {
    span: u64,
    data: Bytes,
}
impl BuilderState for ReadyToBuild {}

/// Builder for BmtBody with type state pattern (crate-internal)
#[derive(Debug)]
pub(crate) struct BmtBodyBuilder<S: BuilderState = Initial> {
    state: S,
}

impl Default for BmtBodyBuilder<Initial> {
    fn default() -> Self {
        Self::with_state(Initial)
    }
}

impl<S: BuilderState> BmtBodyBuilder<S> {
    const fn with_state(state: S) -> Self {
        Self { state }
    }
}

impl BmtBodyBuilder<Initial> {
    /// Set the span for this body and transition to WithSpan state
    pub(crate) const fn with_span(self, span: u64) -> BmtBodyBuilder<WithSpan> {
        BmtBodyBuilder::with_state(WithSpan(span))
    }

    /// Initialize from leaf data, the span being the data length
    pub(crate) fn auto_from_data(
        self,
        data: impl Into<Bytes>,
    ) -> Result<BmtBodyBuilder<ReadyToBuild>> {
        let data = validate_data(data)?;
        let span = data.len() as u64;
        Ok(BmtBodyBuilder::with_state(ReadyToBuild { span, data }))
    }
}

impl BmtBodyBuilder<WithSpan> {
    /// Set the data for this body and transition to ReadyToBuild state
    pub(crate) fn with_data(self, data: impl Into<Bytes>) -> Result<BmtBodyBuilder<ReadyToBuild>> {
        let data = validate_data(data)?;
        let WithSpan(span) = self.state;

        if span <= MAX_DATA_LENGTH as u64 && data.len() as u64 != span {
            return Err(ChunkError::invalid_size(
                "span does not match data size",
                span as usize,
                data.len(),
            )
            .into());
        }

        Ok(BmtBodyBuilder::with_state(ReadyToBuild { span, data }))
    }
}

impl BmtBodyBuilder<ReadyToBuild> {
    /// Build the final BmtBody
    pub(crate) fn build(self) -> Result<BmtBody> {
        let ReadyToBuild { span, data } = self.state;
        Ok(BmtBody::new_unchecked(span, data))
    }
}

#[cfg(any(test, feature = "arbitrary"))]
impl<'a> arbitrary::Arbitrary<'a> for BmtBody {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let data_len: usize = u.int_in_range(0..=MAX_DATA_LENGTH)?;
        let mut buf = vec![0; data_len];
        u.fill_buffer(&mut buf)?;

        // Either a leaf, or an intermediate span covering more than one chunk
        let span = if u.arbitrary()? {
            data_len as u64
        } else {
            u.int_in_range(MAX_DATA_LENGTH as u64 + 1..=u64::MAX)?
        };

        Ok(Self::new_unchecked(span, buf.into()))
    }
}
