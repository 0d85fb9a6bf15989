use std::ffi::c_void;

pub type D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = u32;

pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_ROOT_SIGNATURE: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 0;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_VS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 1;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_PS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 2;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 3;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_HS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 4;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_GS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 5;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_CS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 6;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_STREAM_OUTPUT: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 7;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_BLEND: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 8;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_SAMPLE_MASK: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 9;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 10;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 11;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_INPUT_LAYOUT: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 12;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_IB_STRIP_CUT_VALUE: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 13;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_PRIMITIVE_TOPOLOGY: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 14;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RENDER_TARGET_FORMATS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 15;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL_FORMAT: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 16;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_SAMPLE_DESC: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 17;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_NODE_MASK: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 18;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_CACHED_PSO: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 19;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_FLAGS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 20;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL1: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 21;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_VIEW_INSTANCING: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 22;
// 23 is unassigned.
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_AS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 24;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_MS: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 25;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL2: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 26;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER1: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 27;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER2: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 28;
pub const D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_MAX_VALID: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE = 29;

pub type DXGI_FORMAT = u32;
pub type D3D12_INDEX_BUFFER_STRIP_CUT_VALUE = u32;
pub type D3D12_PRIMITIVE_TOPOLOGY_TYPE = u32;
pub type D3D12_PIPELINE_STATE_FLAGS = u32;

/// `ID3D12RootSignature *` as it appears inside a stream.
pub type D3D12_ROOT_SIGNATURE_POINTER = *mut c_void;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_PIPELINE_STATE_STREAM_DESC {
    pub SizeInBytes: usize,
    pub pPipelineStateSubobjectStream: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_SHADER_BYTECODE {
    pub pShaderBytecode: *const c_void,
    pub BytecodeLength: usize,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_CACHED_PIPELINE_STATE {
    pub pCachedBlob: *const c_void,
    pub CachedBlobSizeInBytes: usize,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_STREAM_OUTPUT_DESC {
    pub pSODeclaration: *const c_void,
    pub NumEntries: u32,
    pub _padding0: u32,
    pub pBufferStrides: *const u32,
    pub NumStrides: u32,
    pub RasterizedStream: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_RENDER_TARGET_BLEND_DESC {
    pub BlendEnable: i32,
    pub LogicOpEnable: i32,
    pub SrcBlend: u32,
    pub DestBlend: u32,
    pub BlendOp: u32,
    pub SrcBlendAlpha: u32,
    pub DestBlendAlpha: u32,
    pub BlendOpAlpha: u32,
    pub LogicOp: u32,
    pub RenderTargetWriteMask: u8,
    pub _padding0: [u8; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_BLEND_DESC {
    pub AlphaToCoverageEnable: i32,
    pub IndependentBlendEnable: i32,
    pub RenderTarget: [D3D12_RENDER_TARGET_BLEND_DESC; 8],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_RASTERIZER_DESC {
    pub FillMode: u32,
    pub CullMode: u32,
    pub FrontCounterClockwise: i32,
    pub DepthBias: i32,
    pub DepthBiasClamp: f32,
    pub SlopeScaledDepthBias: f32,
    pub DepthClipEnable: i32,
    pub MultisampleEnable: i32,
    pub AntialiasedLineEnable: i32,
    pub ForcedSampleCount: u32,
    pub ConservativeRaster: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_RASTERIZER_DESC1 {
    pub FillMode: u32,
    pub CullMode: u32,
    pub FrontCounterClockwise: i32,
    pub DepthBias: f32,
    pub DepthBiasClamp: f32,
    pub SlopeScaledDepthBias: f32,
    pub DepthClipEnable: i32,
    pub MultisampleEnable: i32,
    pub AntialiasedLineEnable: i32,
    pub ForcedSampleCount: u32,
    pub ConservativeRaster: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_RASTERIZER_DESC2 {
    pub FillMode: u32,
    pub CullMode: u32,
    pub FrontCounterClockwise: i32,
    pub DepthBias: f32,
    pub DepthBiasClamp: f32,
    pub SlopeScaledDepthBias: f32,
    pub DepthClipEnable: i32,
    pub LineRasterizationMode: u32,
    pub ForcedSampleCount: u32,
    pub ConservativeRaster: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_DEPTH_STENCILOP_DESC {
    pub StencilFailOp: u32,
    pub StencilDepthFailOp: u32,
    pub StencilPassOp: u32,
    pub StencilFunc: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_DEPTH_STENCILOP_DESC1 {
    pub StencilFailOp: u32,
    pub StencilDepthFailOp: u32,
    pub StencilPassOp: u32,
    pub StencilFunc: u32,
    pub StencilReadMask: u8,
    pub StencilWriteMask: u8,
    pub _padding0: [u8; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_DEPTH_STENCIL_DESC {
    pub DepthEnable: i32,
    pub DepthWriteMask: u32,
    pub DepthFunc: u32,
    pub StencilEnable: i32,
    pub StencilReadMask: u8,
    pub StencilWriteMask: u8,
    pub _padding0: [u8; 2],
    pub FrontFace: D3D12_DEPTH_STENCILOP_DESC,
    pub BackFace: D3D12_DEPTH_STENCILOP_DESC,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_DEPTH_STENCIL_DESC1 {
    pub DepthEnable: i32,
    pub DepthWriteMask: u32,
    pub DepthFunc: u32,
    pub StencilEnable: i32,
    pub StencilReadMask: u8,
    pub StencilWriteMask: u8,
    pub _padding0: [u8; 2],
    pub FrontFace: D3D12_DEPTH_STENCILOP_DESC,
    pub BackFace: D3D12_DEPTH_STENCILOP_DESC,
    pub DepthBoundsTestEnable: i32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_DEPTH_STENCIL_DESC2 {
    pub DepthEnable: i32,
    pub DepthWriteMask: u32,
    pub DepthFunc: u32,
    pub StencilEnable: i32,
    pub FrontFace: D3D12_DEPTH_STENCILOP_DESC1,
    pub BackFace: D3D12_DEPTH_STENCILOP_DESC1,
    pub DepthBoundsTestEnable: i32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_INPUT_LAYOUT_DESC {
    pub pInputElementDescs: *const c_void,
    pub NumElements: u32,
    pub _padding0: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_RT_FORMAT_ARRAY {
    pub RTFormats: [DXGI_FORMAT; 8],
    pub NumRenderTargets: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct DXGI_SAMPLE_DESC {
    pub Count: u32,
    pub Quality: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_VIEW_INSTANCING_DESC {
    pub ViewInstanceCount: u32,
    pub _padding0: u32,
    pub pViewInstanceLocations: *const c_void,
    pub Flags: u32,
    pub _padding1: u32,
}

/// The legacy, fixed-layout graphics pipeline description accepted by
/// `ID3D12Device::CreateGraphicsPipelineState`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_GRAPHICS_PIPELINE_STATE_DESC {
    pub pRootSignature: D3D12_ROOT_SIGNATURE_POINTER,
    pub VS: D3D12_SHADER_BYTECODE,
    pub PS: D3D12_SHADER_BYTECODE,
    pub DS: D3D12_SHADER_BYTECODE,
    pub HS: D3D12_SHADER_BYTECODE,
    pub GS: D3D12_SHADER_BYTECODE,
    pub StreamOutput: D3D12_STREAM_OUTPUT_DESC,
    pub BlendState: D3D12_BLEND_DESC,
    pub SampleMask: u32,
    pub RasterizerState: D3D12_RASTERIZER_DESC,
    pub DepthStencilState: D3D12_DEPTH_STENCIL_DESC,
    pub InputLayout: D3D12_INPUT_LAYOUT_DESC,
    pub IBStripCutValue: D3D12_INDEX_BUFFER_STRIP_CUT_VALUE,
    pub PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE,
    pub NumRenderTargets: u32,
    pub RTVFormats: [DXGI_FORMAT; 8],
    pub DSVFormat: DXGI_FORMAT,
    pub SampleDesc: DXGI_SAMPLE_DESC,
    pub NodeMask: u32,
    pub CachedPSO: D3D12_CACHED_PIPELINE_STATE,
    pub Flags: D3D12_PIPELINE_STATE_FLAGS,
}

/// One entry of a pipeline state stream: a type tag followed by its payload,
/// the whole entry aligned to pointer size.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct D3D12_PIPELINE_STATE_STREAM_SUBOBJECT<T> {
    pub _Align: [*const c_void; 0],
    pub Type: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE,
    pub Inner: T,
}

// HRESULT codes surfaced to the host.
pub type HRESULT = i32;

pub const S_OK: HRESULT = 0;
pub const E_FAIL: HRESULT = 0x8000_4005_u32 as i32;
pub const E_INVALIDARG: HRESULT = 0x8007_0057_u32 as i32;
pub const E_NOINTERFACE: HRESULT = 0x8000_4002_u32 as i32;
pub const E_OUTOFMEMORY: HRESULT = 0x8007_000E_u32 as i32;
