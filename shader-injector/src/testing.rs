//! In-memory stand-ins for the host runtime.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;

use crate::host::{CompiledPipeline, DebugName, PipelineDevice, PipelineLibrary, PipelineTracker, RawObject};
use crate::{HResult, PipelineStateStream};

pub struct MockRootSignature {
    blob: Box<[u8]>,
}

impl MockRootSignature {
    pub fn new(blob: Vec<u8>) -> Self {
        MockRootSignature {
            blob: blob.into_boxed_slice(),
        }
    }
}

impl RawObject for MockRootSignature {
    fn as_raw(&self) -> *mut c_void {
        self.blob.as_ptr().cast_mut().cast()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Compiled,
    Library,
}

#[derive(Debug)]
pub struct MockPipeline {
    pub origin: Origin,
    pub name: RefCell<Option<String>>,
}

impl MockPipeline {
    fn new(origin: Origin) -> Self {
        MockPipeline {
            origin,
            name: RefCell::new(None),
        }
    }
}

impl DebugName for MockPipeline {
    fn set_debug_name(&self, name: &str) -> Result<(), HResult> {
        *self.name.borrow_mut() = Some(name.to_string());
        Ok(())
    }
}

/// What a stream looked like when it reached the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStream {
    pub shaders: Vec<Vec<u8>>,
    pub cached_blobs: Vec<usize>,
    pub root_signatures: Vec<usize>,
}

impl RecordedStream {
    fn record(stream: &PipelineStateStream<'_>) -> Self {
        RecordedStream {
            shaders: stream
                .subobjects()
                .filter_map(|s| s.bytecode())
                .map(<[u8]>::to_vec)
                .collect(),
            cached_blobs: stream
                .subobjects()
                .filter_map(|s| s.cached_blob())
                .map(<[u8]>::len)
                .collect(),
            root_signatures: stream
                .subobjects()
                .filter_map(|s| s.root_signature())
                .map(|ptr| ptr as usize)
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct MockDevice {
    fail_with: Option<HResult>,
    fail_root_signatures: bool,
    compiled: RefCell<Vec<RecordedStream>>,
    root_signatures: RefCell<Vec<Vec<u8>>>,
}

impl MockDevice {
    pub fn failing_with(mut self, code: HResult) -> Self {
        self.fail_with = Some(code);
        self
    }

    pub fn failing_root_signatures(mut self) -> Self {
        self.fail_root_signatures = true;
        self
    }

    pub fn compiled(&self) -> Vec<RecordedStream> {
        self.compiled.borrow().clone()
    }

    pub fn root_signatures(&self) -> Vec<Vec<u8>> {
        self.root_signatures.borrow().clone()
    }
}

impl PipelineDevice for MockDevice {
    type Pipeline = MockPipeline;
    type RootSignature = MockRootSignature;

    fn create_pipeline_state(
        &self,
        stream: &PipelineStateStream<'_>,
    ) -> Result<Self::Pipeline, HResult> {
        self.compiled.borrow_mut().push(RecordedStream::record(stream));
        match self.fail_with {
            Some(code) => Err(code),
            None => Ok(MockPipeline::new(Origin::Compiled)),
        }
    }

    fn create_root_signature(&self, blob: &[u8]) -> Result<Self::RootSignature, HResult> {
        if self.fail_root_signatures {
            return Err(HResult::INVALID_ARG);
        }

        self.root_signatures.borrow_mut().push(blob.to_vec());
        Ok(MockRootSignature::new(blob.to_vec()))
    }
}

#[derive(Default)]
pub struct MockLibrary {
    pub hit: bool,
    pub loads: RefCell<Vec<Vec<u16>>>,
    pub stores: RefCell<Vec<Vec<u16>>>,
}

impl MockLibrary {
    pub fn hitting() -> Self {
        MockLibrary {
            hit: true,
            ..Default::default()
        }
    }
}

impl PipelineLibrary<MockDevice> for MockLibrary {
    fn load_pipeline(
        &self,
        name: &[u16],
        _stream: &PipelineStateStream<'_>,
    ) -> Result<MockPipeline, HResult> {
        self.loads.borrow_mut().push(name.to_vec());
        if self.hit {
            Ok(MockPipeline::new(Origin::Library))
        } else {
            Err(HResult::INVALID_ARG)
        }
    }

    fn store_pipeline(&self, name: &[u16], _pipeline: &MockPipeline) -> Result<(), HResult> {
        self.stores.borrow_mut().push(name.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockTracker {
    pub devices: Cell<usize>,
    pub compiled: RefCell<Vec<(u64, bool)>>,
}

impl PipelineTracker<MockDevice> for MockTracker {
    fn track_device(&self, _device: &MockDevice) {
        self.devices.set(self.devices.get() + 1);
    }

    fn track_compiled(&self, compiled: CompiledPipeline<'_, MockPipeline>) {
        self.compiled
            .borrow_mut()
            .push((compiled.technique_id, compiled.patched));
    }
}

pub fn wide(name: &str) -> Vec<u16> {
    name.encode_utf16().collect()
}
