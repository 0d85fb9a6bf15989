//! The surfaces the injector needs from the host's Direct3D runtime.

use std::ffi::c_void;

use crate::{HResult, PipelineStateStream};

/// A COM object that can be embedded in a stream by pointer.
pub trait RawObject {
    fn as_raw(&self) -> *mut c_void;
}

/// An object that accepts a debug name.
pub trait DebugName {
    fn set_debug_name(&self, name: &str) -> Result<(), HResult>;
}

/// A device that compiles pipeline state streams.
pub trait PipelineDevice {
    type Pipeline: DebugName;
    type RootSignature: RawObject + 'static;

    fn create_pipeline_state(
        &self,
        stream: &PipelineStateStream<'_>,
    ) -> Result<Self::Pipeline, HResult>;

    /// Builds a root signature from serialized bytes, such as a `rsg` replacement file.
    fn create_root_signature(&self, blob: &[u8]) -> Result<Self::RootSignature, HResult>;
}

/// A named pipeline cache.
pub trait PipelineLibrary<D: PipelineDevice> {
    fn load_pipeline(
        &self,
        name: &[u16],
        stream: &PipelineStateStream<'_>,
    ) -> Result<D::Pipeline, HResult>;

    fn store_pipeline(&self, name: &[u16], pipeline: &D::Pipeline) -> Result<(), HResult>;
}

impl<D: PipelineDevice, L: PipelineLibrary<D> + ?Sized> PipelineLibrary<D> for &L {
    fn load_pipeline(
        &self,
        name: &[u16],
        stream: &PipelineStateStream<'_>,
    ) -> Result<D::Pipeline, HResult> {
        (**self).load_pipeline(name, stream)
    }

    fn store_pipeline(&self, name: &[u16], pipeline: &D::Pipeline) -> Result<(), HResult> {
        (**self).store_pipeline(name, pipeline)
    }
}

/// Opaque identity of a host technique, usually its address.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct TechniqueKey(pub usize);

/// The host technique a pipeline is being created for.
#[derive(Debug, Copy, Clone)]
pub struct Technique<'a> {
    pub key: TechniqueKey,
    /// Full name, e.g. `Foo-Variant7`.
    pub name: &'a str,
    pub id: u64,
    /// Serialized root signature the technique was authored against.
    pub root_signature: Option<&'a [u8]>,
}

/// A pipeline created on behalf of a technique.
#[derive(Debug, Copy, Clone)]
pub struct CompiledPipeline<'a, P> {
    pub pipeline: &'a P,
    pub technique_name: &'a str,
    pub technique_id: u64,
    /// The stream the pipeline was created from, after patching.
    pub stream: PipelineStateStream<'a>,
    pub patched: bool,
}

/// Receives devices and pipelines as they pass through the injector.
pub trait PipelineTracker<D: PipelineDevice> {
    fn track_device(&self, _device: &D) {}

    fn track_compiled(&self, _compiled: CompiledPipeline<'_, D::Pipeline>) {}
}

/// A tracker that ignores everything.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopTracker;

impl<D: PipelineDevice> PipelineTracker<D> for NoopTracker {}

impl<D: PipelineDevice, T: PipelineTracker<D> + ?Sized> PipelineTracker<D> for Box<T> {
    fn track_device(&self, device: &D) {
        (**self).track_device(device)
    }

    fn track_compiled(&self, compiled: CompiledPipeline<'_, D::Pipeline>) {
        (**self).track_compiled(compiled)
    }
}
