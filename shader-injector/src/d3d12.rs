//! Direct3D 12 glue.
//!
//! Implements the host traits over `windows` interfaces and provides the bodies of the
//! pipeline creation, library load and library store hooks. Installing the hooks
//! themselves is up to the embedding plugin, which also knows how to read the host's
//! technique records.

use std::ffi::c_void;
use std::iter;
use std::sync::OnceLock;

use tracing::warn;
use windows::core::{Interface, GUID, HRESULT, PCWSTR};
use windows::Win32::Foundation::{E_INVALIDARG, S_OK};
use windows::Win32::Graphics::Direct3D12::{
    ID3D12Device2, ID3D12PipelineLibrary1, ID3D12PipelineState, ID3D12RootSignature,
    D3D12_PIPELINE_STATE_STREAM_DESC,
};

use crate::ctypes::{GraphicsPipelineStateDesc, PipelineStateStreamDesc};
use crate::{
    logger, on_load_pipeline, on_store_pipeline, CorrelationCell, DebugName, HResult,
    InjectorConfig, InjectorError, PipelineDevice, PipelineInjector, PipelineLibrary, PipelineStateStream,
    RawObject, Result, Technique, TechniqueKey,
};

/// Reads the host's technique record behind the pointer the hooks receive.
///
/// The returned borrows must stay valid until the hook that asked for them returns.
pub type TechniqueResolver = unsafe fn(*const c_void) -> Option<Technique<'static>>;

struct Glue {
    injector: PipelineInjector,
    resolve: TechniqueResolver,
}

static GLUE: OnceLock<Glue> = OnceLock::new();

thread_local! {
    static CORRELATION: CorrelationCell<ID3D12PipelineLibrary1> = const { CorrelationCell::new() };
}

/// Sets up logging and the process-wide injector. Later calls are ignored.
pub fn install(config: &InjectorConfig, resolve: TechniqueResolver) -> Result<()> {
    logger::init(&config.log)?;

    let glue = Glue {
        injector: PipelineInjector::new(config),
        resolve,
    };
    if GLUE.set(glue).is_err() {
        warn!("Shader injector is already installed.");
    }

    Ok(())
}

fn host_code(err: windows::core::Error) -> HResult {
    HResult(err.code().0)
}

fn to_hresult(code: HResult) -> HRESULT {
    HRESULT(code.0)
}

/// Drops whatever the library hooks recorded on this thread.
fn clear_correlation() {
    CORRELATION.with(CorrelationCell::clear);
}

fn stream_desc(stream: &PipelineStateStream<'_>) -> D3D12_PIPELINE_STATE_STREAM_DESC {
    let desc = stream.desc();
    D3D12_PIPELINE_STATE_STREAM_DESC {
        SizeInBytes: desc.SizeInBytes,
        pPipelineStateSubobjectStream: desc.pPipelineStateSubobjectStream,
    }
}

fn nul_terminated(name: &[u16]) -> Vec<u16> {
    name.iter().copied().chain(iter::once(0)).collect()
}

impl PipelineDevice for ID3D12Device2 {
    type Pipeline = ID3D12PipelineState;
    type RootSignature = ID3D12RootSignature;

    fn create_pipeline_state(
        &self,
        stream: &PipelineStateStream<'_>,
    ) -> std::result::Result<ID3D12PipelineState, HResult> {
        let desc = stream_desc(stream);
        unsafe { self.CreatePipelineState(&desc) }.map_err(host_code)
    }

    fn create_root_signature(
        &self,
        blob: &[u8],
    ) -> std::result::Result<ID3D12RootSignature, HResult> {
        unsafe { self.CreateRootSignature(0, blob) }.map_err(host_code)
    }
}

impl PipelineLibrary<ID3D12Device2> for ID3D12PipelineLibrary1 {
    fn load_pipeline(
        &self,
        name: &[u16],
        stream: &PipelineStateStream<'_>,
    ) -> std::result::Result<ID3D12PipelineState, HResult> {
        let name = nul_terminated(name);
        let desc = stream_desc(stream);
        unsafe { self.LoadPipeline(PCWSTR(name.as_ptr()), &desc) }.map_err(host_code)
    }

    fn store_pipeline(
        &self,
        name: &[u16],
        pipeline: &ID3D12PipelineState,
    ) -> std::result::Result<(), HResult> {
        let name = nul_terminated(name);
        unsafe { self.StorePipeline(PCWSTR(name.as_ptr()), pipeline) }.map_err(host_code)
    }
}

impl DebugName for ID3D12PipelineState {
    fn set_debug_name(&self, name: &str) -> std::result::Result<(), HResult> {
        let name: Vec<u16> = name.encode_utf16().chain(iter::once(0)).collect();
        unsafe { self.SetName(PCWSTR(name.as_ptr())) }.map_err(host_code)
    }
}

impl RawObject for ID3D12RootSignature {
    fn as_raw(&self) -> *mut c_void {
        Interface::as_raw(self)
    }
}

unsafe fn wide_name<'a>(name: PCWSTR) -> &'a [u16] {
    if name.is_null() {
        &[]
    } else {
        name.as_wide()
    }
}

/// Body of the hooked technique-aware `ID3D12Device2::CreatePipelineState` call.
///
/// # Safety
/// Arguments must be what the host passes to `CreatePipelineState`, plus the address of
/// the technique record the pipeline is created for.
pub unsafe extern "system" fn create_pipeline_state_for_technique(
    device: *mut c_void,
    desc: *const PipelineStateStreamDesc,
    riid: *const GUID,
    pipeline_state: *mut *mut c_void,
    technique: *const c_void,
) -> HRESULT {
    if riid.is_null() || *riid != ID3D12PipelineState::IID {
        clear_correlation();
        return to_hresult(InjectorError::UnsupportedInterface.hresult());
    }
    if pipeline_state.is_null() {
        clear_correlation();
        return E_INVALIDARG;
    }
    *pipeline_state = std::ptr::null_mut();

    let (Some(glue), Some(device), Some(desc)) =
        (GLUE.get(), ID3D12Device2::from_raw_borrowed(&device), desc.as_ref())
    else {
        clear_correlation();
        return E_INVALIDARG;
    };
    let Some(resolved) = (glue.resolve)(technique) else {
        clear_correlation();
        return E_INVALIDARG;
    };
    let technique = Technique {
        key: TechniqueKey(technique as usize),
        ..resolved
    };

    let stream = PipelineStateStream::from_desc(desc);
    let created = CORRELATION.with(|correlation| {
        glue.injector
            .create_pipeline(device, &stream, &technique, correlation)
    });

    match created {
        Ok(pipeline) => {
            *pipeline_state = pipeline.into_raw();
            S_OK
        }
        Err(err) => to_hresult(err.hresult()),
    }
}

/// Body of the hooked `ID3D12PipelineLibrary1::LoadPipeline` call made before a technique's
/// pipeline is created. Always fails so the host creates the pipeline instead.
///
/// # Safety
/// Arguments must be what the host passes to `LoadPipeline`, plus the address of the
/// technique record the pipeline is loaded for.
pub unsafe extern "system" fn load_pipeline_for_technique(
    library: *mut c_void,
    name: PCWSTR,
    _desc: *const PipelineStateStreamDesc,
    _riid: *const GUID,
    _pipeline_state: *mut *mut c_void,
    technique: *const c_void,
) -> HRESULT {
    let Some(library) = ID3D12PipelineLibrary1::from_raw_borrowed(&library) else {
        return E_INVALIDARG;
    };

    let name = wide_name(name);
    let err = CORRELATION.with(|correlation| {
        on_load_pipeline(correlation, library.clone(), name, TechniqueKey(technique as usize))
    });
    to_hresult(err.hresult())
}

/// Body of the hooked `ID3D12PipelineLibrary::StorePipeline` call made after a technique's
/// pipeline is created.
///
/// # Safety
/// Arguments must be what the host passes to `StorePipeline`, plus the address of the
/// technique record the pipeline was created for.
pub unsafe extern "system" fn store_pipeline_for_technique(
    library: *mut c_void,
    name: PCWSTR,
    pipeline: *mut c_void,
    technique: *const c_void,
) -> HRESULT {
    let (Some(library), Some(pipeline)) = (
        ID3D12PipelineLibrary1::from_raw_borrowed(&library),
        ID3D12PipelineState::from_raw_borrowed(&pipeline),
    ) else {
        return E_INVALIDARG;
    };

    let name = wide_name(name);
    let stored = CORRELATION.with(|correlation| {
        on_store_pipeline::<ID3D12Device2, _>(
            correlation,
            library,
            name,
            pipeline,
            TechniqueKey(technique as usize),
        )
    });

    match stored {
        Ok(()) => S_OK,
        Err(code) => to_hresult(code),
    }
}

/// Body of the hooked `ID3D12Device::CreateGraphicsPipelineState` call.
///
/// # Safety
/// Arguments must be what the host passes to `CreateGraphicsPipelineState`.
pub unsafe extern "system" fn create_graphics_pipeline_state(
    device: *mut c_void,
    desc: *const GraphicsPipelineStateDesc,
    riid: *const GUID,
    pipeline_state: *mut *mut c_void,
) -> HRESULT {
    if riid.is_null() || *riid != ID3D12PipelineState::IID {
        return to_hresult(InjectorError::UnsupportedInterface.hresult());
    }
    if pipeline_state.is_null() {
        return E_INVALIDARG;
    }
    *pipeline_state = std::ptr::null_mut();

    let (Some(glue), Some(device), Some(desc)) =
        (GLUE.get(), ID3D12Device2::from_raw_borrowed(&device), desc.as_ref())
    else {
        return E_INVALIDARG;
    };

    match glue.injector.create_graphics_pipeline(device, desc) {
        Ok(pipeline) => {
            *pipeline_state = pipeline.into_raw();
            S_OK
        }
        Err(err) => to_hresult(err.hresult()),
    }
}
