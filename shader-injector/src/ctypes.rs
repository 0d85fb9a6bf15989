/// A `(pointer, length)` view of shader bytecode inside a stream.
pub use d3d12_pss_sys::D3D12_SHADER_BYTECODE as ShaderBytecode;

/// A `(pointer, length)` view of a cached pipeline blob inside a stream.
pub use d3d12_pss_sys::D3D12_CACHED_PIPELINE_STATE as CachedPipelineState;

/// The descriptor handed to `ID3D12Device2::CreatePipelineState`.
pub use d3d12_pss_sys::D3D12_PIPELINE_STATE_STREAM_DESC as PipelineStateStreamDesc;

/// The legacy fixed-layout graphics pipeline description.
pub use d3d12_pss_sys::D3D12_GRAPHICS_PIPELINE_STATE_DESC as GraphicsPipelineStateDesc;
