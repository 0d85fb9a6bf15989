use d3d12_pss_sys::*;

/// Every sub-object type that can appear in a pipeline state stream.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum SubobjectKind {
    RootSignature,
    VertexShader,
    PixelShader,
    DomainShader,
    HullShader,
    GeometryShader,
    ComputeShader,
    StreamOutput,
    Blend,
    SampleMask,
    Rasterizer,
    DepthStencil,
    InputLayout,
    IbStripCutValue,
    PrimitiveTopology,
    RenderTargetFormats,
    DepthStencilFormat,
    SampleDesc,
    NodeMask,
    CachedPso,
    Flags,
    DepthStencil1,
    ViewInstancing,
    AmplificationShader,
    MeshShader,
    DepthStencil2,
    Rasterizer1,
    Rasterizer2,
}

/// A programmable stage whose bytecode is carried by a stream.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Domain,
    Hull,
    Geometry,
    Compute,
    Amplification,
    Mesh,
}

/// What the injector does with a sub-object.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum SubobjectRole {
    Shader(ShaderStage),
    RootSignature,
    CachedPipeline,
    Opaque,
}

/// Where a sub-object's payload lives inside its stream entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubobjectLayout {
    pub payload_offset: usize,
    pub payload_size: usize,
    pub size: usize,
}

impl SubobjectLayout {
    const fn of<T>() -> Self {
        SubobjectLayout {
            payload_offset: subobject_payload_offset::<T>(),
            payload_size: std::mem::size_of::<T>(),
            size: subobject_size::<T>(),
        }
    }
}

impl SubobjectKind {
    pub fn from_raw(raw: D3D12_PIPELINE_STATE_SUBOBJECT_TYPE) -> Option<Self> {
        let kind = match raw {
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_ROOT_SIGNATURE => SubobjectKind::RootSignature,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_VS => SubobjectKind::VertexShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_PS => SubobjectKind::PixelShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DS => SubobjectKind::DomainShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_HS => SubobjectKind::HullShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_GS => SubobjectKind::GeometryShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_CS => SubobjectKind::ComputeShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_STREAM_OUTPUT => SubobjectKind::StreamOutput,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_BLEND => SubobjectKind::Blend,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_SAMPLE_MASK => SubobjectKind::SampleMask,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER => SubobjectKind::Rasterizer,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL => SubobjectKind::DepthStencil,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_INPUT_LAYOUT => SubobjectKind::InputLayout,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_IB_STRIP_CUT_VALUE => SubobjectKind::IbStripCutValue,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_PRIMITIVE_TOPOLOGY => SubobjectKind::PrimitiveTopology,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RENDER_TARGET_FORMATS => {
                SubobjectKind::RenderTargetFormats
            }
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL_FORMAT => {
                SubobjectKind::DepthStencilFormat
            }
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_SAMPLE_DESC => SubobjectKind::SampleDesc,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_NODE_MASK => SubobjectKind::NodeMask,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_CACHED_PSO => SubobjectKind::CachedPso,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_FLAGS => SubobjectKind::Flags,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL1 => SubobjectKind::DepthStencil1,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_VIEW_INSTANCING => SubobjectKind::ViewInstancing,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_AS => SubobjectKind::AmplificationShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_MS => SubobjectKind::MeshShader,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL2 => SubobjectKind::DepthStencil2,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER1 => SubobjectKind::Rasterizer1,
            D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER2 => SubobjectKind::Rasterizer2,
            _ => return None,
        };

        Some(kind)
    }

    pub fn as_raw(self) -> D3D12_PIPELINE_STATE_SUBOBJECT_TYPE {
        match self {
            SubobjectKind::RootSignature => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_ROOT_SIGNATURE,
            SubobjectKind::VertexShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_VS,
            SubobjectKind::PixelShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_PS,
            SubobjectKind::DomainShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DS,
            SubobjectKind::HullShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_HS,
            SubobjectKind::GeometryShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_GS,
            SubobjectKind::ComputeShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_CS,
            SubobjectKind::StreamOutput => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_STREAM_OUTPUT,
            SubobjectKind::Blend => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_BLEND,
            SubobjectKind::SampleMask => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_SAMPLE_MASK,
            SubobjectKind::Rasterizer => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER,
            SubobjectKind::DepthStencil => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL,
            SubobjectKind::InputLayout => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_INPUT_LAYOUT,
            SubobjectKind::IbStripCutValue => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_IB_STRIP_CUT_VALUE,
            SubobjectKind::PrimitiveTopology => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_PRIMITIVE_TOPOLOGY,
            SubobjectKind::RenderTargetFormats => {
                D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RENDER_TARGET_FORMATS
            }
            SubobjectKind::DepthStencilFormat => {
                D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL_FORMAT
            }
            SubobjectKind::SampleDesc => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_SAMPLE_DESC,
            SubobjectKind::NodeMask => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_NODE_MASK,
            SubobjectKind::CachedPso => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_CACHED_PSO,
            SubobjectKind::Flags => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_FLAGS,
            SubobjectKind::DepthStencil1 => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL1,
            SubobjectKind::ViewInstancing => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_VIEW_INSTANCING,
            SubobjectKind::AmplificationShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_AS,
            SubobjectKind::MeshShader => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_MS,
            SubobjectKind::DepthStencil2 => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_DEPTH_STENCIL2,
            SubobjectKind::Rasterizer1 => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER1,
            SubobjectKind::Rasterizer2 => D3D12_PIPELINE_STATE_SUBOBJECT_TYPE_RASTERIZER2,
        }
    }

    /// The per-kind size table. Must be kept in lockstep with `d3d12.h`.
    pub fn layout(self) -> SubobjectLayout {
        match self {
            SubobjectKind::RootSignature => SubobjectLayout::of::<D3D12_ROOT_SIGNATURE_POINTER>(),
            SubobjectKind::VertexShader
            | SubobjectKind::PixelShader
            | SubobjectKind::DomainShader
            | SubobjectKind::HullShader
            | SubobjectKind::GeometryShader
            | SubobjectKind::ComputeShader
            | SubobjectKind::AmplificationShader
            | SubobjectKind::MeshShader => SubobjectLayout::of::<D3D12_SHADER_BYTECODE>(),
            SubobjectKind::StreamOutput => SubobjectLayout::of::<D3D12_STREAM_OUTPUT_DESC>(),
            SubobjectKind::Blend => SubobjectLayout::of::<D3D12_BLEND_DESC>(),
            SubobjectKind::SampleMask => SubobjectLayout::of::<u32>(),
            SubobjectKind::Rasterizer => SubobjectLayout::of::<D3D12_RASTERIZER_DESC>(),
            SubobjectKind::DepthStencil => SubobjectLayout::of::<D3D12_DEPTH_STENCIL_DESC>(),
            SubobjectKind::InputLayout => SubobjectLayout::of::<D3D12_INPUT_LAYOUT_DESC>(),
            SubobjectKind::IbStripCutValue => {
                SubobjectLayout::of::<D3D12_INDEX_BUFFER_STRIP_CUT_VALUE>()
            }
            SubobjectKind::PrimitiveTopology => {
                SubobjectLayout::of::<D3D12_PRIMITIVE_TOPOLOGY_TYPE>()
            }
            SubobjectKind::RenderTargetFormats => SubobjectLayout::of::<D3D12_RT_FORMAT_ARRAY>(),
            SubobjectKind::DepthStencilFormat => SubobjectLayout::of::<DXGI_FORMAT>(),
            SubobjectKind::SampleDesc => SubobjectLayout::of::<DXGI_SAMPLE_DESC>(),
            SubobjectKind::NodeMask => SubobjectLayout::of::<u32>(),
            SubobjectKind::CachedPso => SubobjectLayout::of::<D3D12_CACHED_PIPELINE_STATE>(),
            SubobjectKind::Flags => SubobjectLayout::of::<D3D12_PIPELINE_STATE_FLAGS>(),
            SubobjectKind::DepthStencil1 => SubobjectLayout::of::<D3D12_DEPTH_STENCIL_DESC1>(),
            SubobjectKind::ViewInstancing => SubobjectLayout::of::<D3D12_VIEW_INSTANCING_DESC>(),
            SubobjectKind::DepthStencil2 => SubobjectLayout::of::<D3D12_DEPTH_STENCIL_DESC2>(),
            SubobjectKind::Rasterizer1 => SubobjectLayout::of::<D3D12_RASTERIZER_DESC1>(),
            SubobjectKind::Rasterizer2 => SubobjectLayout::of::<D3D12_RASTERIZER_DESC2>(),
        }
    }

    pub fn role(self) -> SubobjectRole {
        match self {
            SubobjectKind::VertexShader => SubobjectRole::Shader(ShaderStage::Vertex),
            SubobjectKind::PixelShader => SubobjectRole::Shader(ShaderStage::Pixel),
            SubobjectKind::DomainShader => SubobjectRole::Shader(ShaderStage::Domain),
            SubobjectKind::HullShader => SubobjectRole::Shader(ShaderStage::Hull),
            SubobjectKind::GeometryShader => SubobjectRole::Shader(ShaderStage::Geometry),
            SubobjectKind::ComputeShader => SubobjectRole::Shader(ShaderStage::Compute),
            SubobjectKind::AmplificationShader => SubobjectRole::Shader(ShaderStage::Amplification),
            SubobjectKind::MeshShader => SubobjectRole::Shader(ShaderStage::Mesh),
            SubobjectKind::RootSignature => SubobjectRole::RootSignature,
            SubobjectKind::CachedPso => SubobjectRole::CachedPipeline,
            SubobjectKind::StreamOutput
            | SubobjectKind::Blend
            | SubobjectKind::SampleMask
            | SubobjectKind::Rasterizer
            | SubobjectKind::DepthStencil
            | SubobjectKind::InputLayout
            | SubobjectKind::IbStripCutValue
            | SubobjectKind::PrimitiveTopology
            | SubobjectKind::RenderTargetFormats
            | SubobjectKind::DepthStencilFormat
            | SubobjectKind::SampleDesc
            | SubobjectKind::NodeMask
            | SubobjectKind::Flags
            | SubobjectKind::DepthStencil1
            | SubobjectKind::ViewInstancing
            | SubobjectKind::DepthStencil2
            | SubobjectKind::Rasterizer1
            | SubobjectKind::Rasterizer2 => SubobjectRole::Opaque,
        }
    }
}

impl ShaderStage {
    pub fn kind(self) -> SubobjectKind {
        match self {
            ShaderStage::Vertex => SubobjectKind::VertexShader,
            ShaderStage::Pixel => SubobjectKind::PixelShader,
            ShaderStage::Domain => SubobjectKind::DomainShader,
            ShaderStage::Hull => SubobjectKind::HullShader,
            ShaderStage::Geometry => SubobjectKind::GeometryShader,
            ShaderStage::Compute => SubobjectKind::ComputeShader,
            ShaderStage::Amplification => SubobjectKind::AmplificationShader,
            ShaderStage::Mesh => SubobjectKind::MeshShader,
        }
    }
}

/// A blob that can be dumped to or replaced from disk.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ShaderTarget {
    Stage(ShaderStage),
    RootSignature,
}

impl ShaderTarget {
    /// The short prefix used in file names and in the technique ledger.
    pub fn prefix(self) -> &'static str {
        match self {
            ShaderTarget::Stage(ShaderStage::Vertex) => "vs",
            ShaderTarget::Stage(ShaderStage::Pixel) => "ps",
            ShaderTarget::Stage(ShaderStage::Hull) => "hs",
            ShaderTarget::Stage(ShaderStage::Domain) => "ds",
            ShaderTarget::Stage(ShaderStage::Geometry) => "gs",
            ShaderTarget::Stage(ShaderStage::Compute) => "cs",
            ShaderTarget::Stage(ShaderStage::Amplification) => "as",
            ShaderTarget::Stage(ShaderStage::Mesh) => "ms",
            ShaderTarget::RootSignature => "rsg",
        }
    }
}
