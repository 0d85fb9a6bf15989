//! Read-only views over a pipeline state stream.
//!
//! A stream is a flat sequence of `(type tag, payload)` entries, each padded to pointer
//! alignment. Entries are walked by looking up the declared kind in
//! [`SubobjectKind::layout`]; nothing in the stream itself records its size.

use std::ffi::c_void;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::size_of;
use std::{ptr, slice};

use bytemuck::NoUninit;
use tracing::warn;

use crate::ctypes::{CachedPipelineState, PipelineStateStreamDesc, ShaderBytecode};
use crate::{InjectorError, Result, ShaderStage, SubobjectKind, SubobjectRole};

/// Pointer-aligned backing bytes for a stream owned by this crate.
pub(crate) struct StreamStorage {
    words: Box<[u64]>,
    len: usize,
}

impl StreamStorage {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        let mut storage = StreamStorage {
            words: vec![0u64; bytes.len().div_ceil(8)].into_boxed_slice(),
            len: bytes.len(),
        };
        storage.as_bytes_mut().copy_from_slice(bytes);
        storage
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.words)[..self.len]
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut bytemuck::cast_slice_mut(&mut self.words)[..len]
    }

    pub(crate) fn write<T: NoUninit>(&mut self, at: usize, value: &T) {
        self.as_bytes_mut()[at..at + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(value));
    }
}

/// Views `len` bytes at `data`, treating a null pointer or zero length as empty.
///
/// # Safety
/// A non-null `data` must be readable for `len` bytes for `'a`.
unsafe fn view_bytes<'a>(data: *const c_void, len: usize) -> &'a [u8] {
    if data.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(data.cast::<u8>(), len)
    }
}

/// A borrowed pipeline state stream.
#[derive(Debug, Copy, Clone)]
pub struct PipelineStateStream<'a> {
    bytes: &'a [u8],
}

impl<'a> PipelineStateStream<'a> {
    /// Views an already laid out stream.
    ///
    /// # Safety
    /// Every shader bytecode and cached blob view embedded in `bytes` must be readable
    /// for `'a`.
    pub unsafe fn from_bytes(bytes: &'a [u8]) -> Self {
        PipelineStateStream { bytes }
    }

    /// Views the stream described by a host descriptor.
    ///
    /// # Safety
    /// `desc` must describe `SizeInBytes` readable bytes that are neither freed nor
    /// written for `'a`, and the requirements of [`from_bytes`](Self::from_bytes) apply
    /// to their contents.
    pub unsafe fn from_desc(desc: &PipelineStateStreamDesc) -> Self {
        PipelineStateStream {
            bytes: view_bytes(desc.pPipelineStateSubobjectStream, desc.SizeInBytes),
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Walks the sub-objects in stream order.
    pub fn subobjects(&self) -> Subobjects<'a> {
        Subobjects {
            bytes: self.bytes,
            cursor: 0,
        }
    }

    /// Checks that every entry has a known type tag and fits in the stream.
    ///
    /// [`subobjects`](Self::subobjects) stops quietly at the first bad entry, so callers
    /// that must see every sub-object validate first.
    pub fn validate(&self) -> Result<()> {
        let mut offset = 0;
        while offset < self.bytes.len() {
            let subobject = Subobject::parse(self.bytes, offset)
                .ok_or(InjectorError::MalformedStream { offset })?;
            offset += subobject.kind.layout().size;
        }
        Ok(())
    }

    /// Finds the sub-object `at` refers to, if it is still part of this stream.
    pub fn get(&self, at: SubobjectRef) -> Option<Subobject<'a>> {
        self.subobjects()
            .take_while(|s| s.offset <= at.offset)
            .find(|s| s.offset == at.offset && s.kind == at.kind)
    }

    /// A raw descriptor for the host. Only valid while the viewed bytes are.
    pub fn desc(&self) -> PipelineStateStreamDesc {
        PipelineStateStreamDesc {
            SizeInBytes: self.bytes.len(),
            pPipelineStateSubobjectStream: self.bytes.as_ptr().cast_mut().cast(),
        }
    }
}

/// Identifies a sub-object by position, independently of any borrow of the stream.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct SubobjectRef {
    kind: SubobjectKind,
    offset: usize,
}

impl SubobjectRef {
    pub fn kind(&self) -> SubobjectKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// One entry of a [`PipelineStateStream`].
#[derive(Debug, Copy, Clone)]
pub struct Subobject<'a> {
    kind: SubobjectKind,
    offset: usize,
    payload: &'a [u8],
}

impl<'a> Subobject<'a> {
    fn parse(bytes: &'a [u8], offset: usize) -> Option<Self> {
        let tag = bytes.get(offset..offset.checked_add(4)?)?;
        let kind = SubobjectKind::from_raw(bytemuck::pod_read_unaligned(tag))?;
        let layout = kind.layout();

        let start = offset + layout.payload_offset;
        let payload = bytes.get(start..start + layout.payload_size)?;

        Some(Subobject {
            kind,
            offset,
            payload,
        })
    }

    pub fn kind(&self) -> SubobjectKind {
        self.kind
    }

    pub fn role(&self) -> SubobjectRole {
        self.kind.role()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn to_ref(&self) -> SubobjectRef {
        SubobjectRef {
            kind: self.kind,
            offset: self.offset,
        }
    }

    /// The kind-specific payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    fn read<T: Copy>(&self) -> T {
        assert!(self.payload.len() >= size_of::<T>());
        // SAFETY: the payload holds at least size_of::<T>() bytes and every T read here
        // is made only of integers and raw pointers.
        unsafe { ptr::read_unaligned(self.payload.as_ptr().cast::<T>()) }
    }

    /// The raw bytecode view of a shader sub-object.
    pub fn raw_bytecode(&self) -> Option<ShaderBytecode> {
        match self.role() {
            SubobjectRole::Shader(_) => Some(self.read()),
            SubobjectRole::RootSignature | SubobjectRole::CachedPipeline | SubobjectRole::Opaque => {
                None
            }
        }
    }

    pub fn shader_stage(&self) -> Option<ShaderStage> {
        match self.role() {
            SubobjectRole::Shader(stage) => Some(stage),
            SubobjectRole::RootSignature | SubobjectRole::CachedPipeline | SubobjectRole::Opaque => {
                None
            }
        }
    }

    /// The bytecode of a shader sub-object.
    pub fn bytecode(&self) -> Option<&'a [u8]> {
        let raw = self.raw_bytecode()?;
        // SAFETY: the stream constructors require embedded bytecode views to be readable for 'a.
        Some(unsafe { view_bytes(raw.pShaderBytecode, raw.BytecodeLength) })
    }

    /// The `ID3D12RootSignature` pointer of a root signature sub-object.
    pub fn root_signature(&self) -> Option<*mut c_void> {
        match self.role() {
            SubobjectRole::RootSignature => Some(self.read()),
            SubobjectRole::Shader(_) | SubobjectRole::CachedPipeline | SubobjectRole::Opaque => None,
        }
    }

    pub fn raw_cached_blob(&self) -> Option<CachedPipelineState> {
        match self.role() {
            SubobjectRole::CachedPipeline => Some(self.read()),
            SubobjectRole::Shader(_) | SubobjectRole::RootSignature | SubobjectRole::Opaque => None,
        }
    }

    /// The cached pipeline blob of a cached PSO sub-object.
    pub fn cached_blob(&self) -> Option<&'a [u8]> {
        let raw = self.raw_cached_blob()?;
        // SAFETY: the stream constructors require embedded blob views to be readable for 'a.
        Some(unsafe { view_bytes(raw.pCachedBlob, raw.CachedBlobSizeInBytes) })
    }
}

/// Iterator over the sub-objects of a stream.
///
/// Stops early, without reading past the end, at an unknown type tag or an entry that
/// does not fit in the remaining bytes.
pub struct Subobjects<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Iterator for Subobjects<'a> {
    type Item = Subobject<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.bytes.len() {
            return None;
        }

        let offset = self.cursor;
        let Some(subobject) = Subobject::parse(self.bytes, offset) else {
            warn!(
                offset,
                size = self.bytes.len(),
                "Malformed pipeline state stream, stopping iteration."
            );
            self.cursor = self.bytes.len();
            return None;
        };

        self.cursor = (offset + subobject.kind.layout().size).min(self.bytes.len());
        Some(subobject)
    }
}

impl FusedIterator for Subobjects<'_> {}

/// Assembles a well-formed stream from typed payloads.
#[derive(Default)]
pub struct PipelineStateStreamBuilder<'a> {
    bytes: Vec<u8>,
    _payloads: PhantomData<&'a [u8]>,
}

impl<'a> PipelineStateStreamBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push<T: NoUninit>(&mut self, kind: SubobjectKind, payload: &T) -> &mut Self {
        let layout = kind.layout();
        debug_assert_eq!(size_of::<T>(), layout.payload_size);

        let offset = self.bytes.len();
        self.bytes.resize(offset + layout.size, 0);
        self.bytes[offset..offset + 4].copy_from_slice(&kind.as_raw().to_ne_bytes());

        let start = offset + layout.payload_offset;
        self.bytes[start..start + layout.payload_size].copy_from_slice(bytemuck::bytes_of(payload));
        self
    }

    /// Appends a fixed-function sub-object.
    ///
    /// Shader and cached PSO kinds carry borrowed views and must go through
    /// [`shader`](Self::shader) and [`cached_blob`](Self::cached_blob).
    pub fn subobject<T: NoUninit>(&mut self, kind: SubobjectKind, payload: T) -> Result<&mut Self> {
        match kind.role() {
            SubobjectRole::Shader(_) | SubobjectRole::CachedPipeline => {
                return Err(InjectorError::Subobject {
                    offset: self.bytes.len(),
                    expected: "fixed-function",
                })
            }
            SubobjectRole::RootSignature | SubobjectRole::Opaque => {}
        }

        if size_of::<T>() != kind.layout().payload_size {
            return Err(InjectorError::PayloadLayout {
                kind,
                size: size_of::<T>(),
            });
        }

        Ok(self.push(kind, &payload))
    }

    pub fn root_signature(&mut self, root_signature: *mut c_void) -> &mut Self {
        self.push(SubobjectKind::RootSignature, &(root_signature as usize))
    }

    pub fn shader(&mut self, stage: ShaderStage, bytecode: &'a [u8]) -> &mut Self {
        let raw = if bytecode.is_empty() {
            ShaderBytecode::default()
        } else {
            ShaderBytecode {
                pShaderBytecode: bytecode.as_ptr().cast(),
                BytecodeLength: bytecode.len(),
            }
        };
        self.push(stage.kind(), &raw)
    }

    /// Appends a shader sub-object from a raw view.
    ///
    /// # Safety
    /// A non-null view must stay readable for `'a`.
    pub unsafe fn shader_raw(&mut self, stage: ShaderStage, bytecode: ShaderBytecode) -> &mut Self {
        self.push(stage.kind(), &bytecode)
    }

    pub fn cached_blob(&mut self, blob: &'a [u8]) -> &mut Self {
        let raw = if blob.is_empty() {
            CachedPipelineState::default()
        } else {
            CachedPipelineState {
                pCachedBlob: blob.as_ptr().cast(),
                CachedBlobSizeInBytes: blob.len(),
            }
        };
        self.push(SubobjectKind::CachedPso, &raw)
    }

    /// Appends a cached PSO sub-object from a raw view.
    ///
    /// # Safety
    /// A non-null view must stay readable for `'a`.
    pub unsafe fn cached_blob_raw(&mut self, blob: CachedPipelineState) -> &mut Self {
        self.push(SubobjectKind::CachedPso, &blob)
    }

    pub fn build(&self) -> PipelineStateStreamBuf<'a> {
        PipelineStateStreamBuf {
            storage: StreamStorage::from_bytes(&self.bytes),
            _payloads: PhantomData,
        }
    }
}

/// An owned, pointer-aligned stream produced by [`PipelineStateStreamBuilder`].
pub struct PipelineStateStreamBuf<'a> {
    storage: StreamStorage,
    _payloads: PhantomData<&'a [u8]>,
}

impl<'a> PipelineStateStreamBuf<'a> {
    pub fn as_stream(&self) -> PipelineStateStream<'_> {
        // SAFETY: the builder only embeds views borrowed for 'a, which outlives this borrow.
        unsafe { PipelineStateStream::from_bytes(self.storage.as_bytes()) }
    }
}
