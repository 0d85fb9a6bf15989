use std::marker::PhantomData;

use crate::ctypes::{CachedPipelineState, PipelineStateStreamDesc, ShaderBytecode};
use crate::host::RawObject;
use crate::stream::{PipelineStateStream, StreamStorage, SubobjectRef, Subobjects};
use crate::{InjectorError, Result, SubobjectRole};

/// A mutable duplicate of a pipeline state stream.
///
/// Payload views alias the caller's buffers until replaced. Replacement bytecode and
/// root signature objects are owned by the copy, so every view it hands out stays valid
/// for as long as the copy does. Nothing the caller owns is ever freed or written.
pub struct PipelineStateStreamCopy<'a> {
    storage: StreamStorage,
    allocations: Vec<Box<[u8]>>,
    objects: Vec<Box<dyn RawObject>>,
    _source: PhantomData<&'a [u8]>,
}

impl<'a> PipelineStateStreamCopy<'a> {
    pub fn new(stream: &PipelineStateStream<'a>) -> Self {
        PipelineStateStreamCopy {
            storage: StreamStorage::from_bytes(stream.as_bytes()),
            allocations: Vec::new(),
            objects: Vec::new(),
            _source: PhantomData,
        }
    }

    pub fn as_stream(&self) -> PipelineStateStream<'_> {
        // SAFETY: embedded views either alias the source, which outlives 'a, or point
        // into allocations owned by self.
        unsafe { PipelineStateStream::from_bytes(self.storage.as_bytes()) }
    }

    pub fn subobjects(&self) -> Subobjects<'_> {
        self.as_stream().subobjects()
    }

    /// Raw descriptor over the copy. Valid until the copy is mutated or dropped.
    pub fn desc(&self) -> PipelineStateStreamDesc {
        self.as_stream().desc()
    }

    /// The number of replacement buffers and objects the copy keeps alive.
    pub fn owned_payloads(&self) -> usize {
        self.allocations.len() + self.objects.len()
    }

    fn payload_offset(
        &self,
        target: SubobjectRef,
        expected: &'static str,
        accepts: impl Fn(SubobjectRole) -> bool,
    ) -> Result<usize> {
        self.as_stream()
            .get(target)
            .filter(|subobject| accepts(subobject.role()))
            .map(|subobject| subobject.offset() + subobject.kind().layout().payload_offset)
            .ok_or(InjectorError::Subobject {
                offset: target.offset(),
                expected,
            })
    }

    /// Points a shader sub-object at `bytecode`, which the copy takes ownership of.
    pub fn replace_bytecode(&mut self, target: SubobjectRef, bytecode: Box<[u8]>) -> Result<()> {
        let at = self.payload_offset(target, "shader", |role| {
            matches!(role, SubobjectRole::Shader(_))
        })?;

        let view = ShaderBytecode {
            pShaderBytecode: bytecode.as_ptr().cast(),
            BytecodeLength: bytecode.len(),
        };
        // Moving the box does not move its heap allocation.
        self.allocations.push(bytecode);
        self.storage.write(at, &view);
        Ok(())
    }

    /// Points a root signature sub-object at `object`, which the copy keeps alive.
    pub fn replace_root_signature<O: RawObject + 'static>(
        &mut self,
        target: SubobjectRef,
        object: O,
    ) -> Result<()> {
        let at = self.payload_offset(target, "root signature", |role| {
            role == SubobjectRole::RootSignature
        })?;

        let raw = object.as_raw() as usize;
        self.objects.push(Box::new(object));
        self.storage.write(at, &raw);
        Ok(())
    }

    /// Empties a cached PSO sub-object so the host compiles from bytecode.
    pub fn clear_cached_blob(&mut self, target: SubobjectRef) -> Result<()> {
        let at = self.payload_offset(target, "cached pipeline", |role| {
            role == SubobjectRole::CachedPipeline
        })?;

        self.storage.write(at, &CachedPipelineState::default());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::PipelineStateStreamBuilder;
    use crate::testing::MockRootSignature;
    use crate::{ShaderStage, SubobjectKind};
    use std::ffi::c_void;

    const VS: &[u8] = &[1; 16];
    const PS: &[u8] = &[2; 24];
    const BLOB: &[u8] = &[3; 40];

    fn source() -> PipelineStateStreamBuilder<'static> {
        let mut builder = PipelineStateStreamBuilder::new();
        builder
            .root_signature(0x1000 as *mut c_void)
            .shader(ShaderStage::Vertex, VS)
            .subobject(SubobjectKind::SampleMask, 0xFFu32)
            .unwrap()
            .shader(ShaderStage::Pixel, PS)
            .cached_blob(BLOB);
        builder
    }

    #[test]
    fn unmodified_copy_is_byte_identical() {
        let buf = source().build();
        let stream = buf.as_stream();
        let copy = PipelineStateStreamCopy::new(&stream);

        assert_eq!(copy.as_stream().as_bytes(), stream.as_bytes());
        assert_ne!(copy.desc().pPipelineStateSubobjectStream, stream.desc().pPipelineStateSubobjectStream);
        assert_eq!(copy.owned_payloads(), 0);
    }

    #[test]
    fn replacing_bytecode_leaves_the_source_alone() {
        let buf = source().build();
        let stream = buf.as_stream();
        let original = stream.as_bytes().to_vec();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let ps = copy
            .subobjects()
            .find(|s| s.kind() == SubobjectKind::PixelShader)
            .unwrap()
            .to_ref();
        copy.replace_bytecode(ps, vec![9u8; 300].into_boxed_slice()).unwrap();

        assert_eq!(stream.as_bytes(), original.as_slice());
        assert_eq!(PS, &[2; 24]);

        let shaders: Vec<_> = copy.subobjects().filter_map(|s| s.bytecode()).collect();
        assert_eq!(shaders.len(), 2);
        assert_eq!(shaders[0], VS);
        assert_eq!(shaders[1], &[9u8; 300][..]);
        assert_eq!(copy.owned_payloads(), 1);
    }

    #[test]
    fn replacing_root_signature_keeps_the_object_alive() {
        let buf = source().build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let rs = copy.subobjects().next().unwrap().to_ref();
        let object = MockRootSignature::new(vec![7; 8]);
        let raw = object.as_raw();
        copy.replace_root_signature(rs, object).unwrap();

        assert_eq!(copy.subobjects().next().unwrap().root_signature(), Some(raw));
        assert_eq!(stream.subobjects().next().unwrap().root_signature(), Some(0x1000 as *mut c_void));
    }

    #[test]
    fn clearing_the_cached_blob() {
        let buf = source().build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let cached = copy.subobjects().last().unwrap().to_ref();
        copy.clear_cached_blob(cached).unwrap();

        let raw = copy.subobjects().last().unwrap().raw_cached_blob().unwrap();
        assert!(raw.pCachedBlob.is_null());
        assert_eq!(raw.CachedBlobSizeInBytes, 0);
        assert_eq!(stream.subobjects().last().unwrap().cached_blob(), Some(BLOB));
    }

    #[test]
    fn mutations_reject_the_wrong_role() {
        let buf = source().build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);
        let before = copy.as_stream().as_bytes().to_vec();

        let mask = copy.subobjects().nth(2).unwrap().to_ref();
        assert!(matches!(
            copy.replace_bytecode(mask, Box::new([0u8; 4])),
            Err(InjectorError::Subobject { offset: 40, expected: "shader" })
        ));
        assert!(copy.clear_cached_blob(mask).is_err());
        assert!(copy
            .replace_root_signature(mask, MockRootSignature::new(Vec::new()))
            .is_err());

        assert_eq!(copy.as_stream().as_bytes(), before.as_slice());
        assert_eq!(copy.owned_payloads(), 0);
    }
}
