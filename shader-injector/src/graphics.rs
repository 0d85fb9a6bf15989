//! Pipelines created through the legacy graphics pipeline descriptor.
//!
//! Some middleware never goes through technique-aware creation, so its pipelines have no
//! name or id. One is derived from the vertex and pixel shaders instead.

use crate::ctypes::{GraphicsPipelineStateDesc, ShaderBytecode};
use crate::host::{PipelineDevice, PipelineTracker};
use crate::orchestrator::{compile, PipelineInjector};
use crate::stream::{PipelineStateStreamBuf, PipelineStateStreamBuilder};
use crate::{fingerprint, PipelineStateStreamCopy, Result, ShaderStage, SubobjectKind};

const LEGACY_TECHNIQUE_PREFIX: &str = "FidelityFX3FI";

/// Rewrites a legacy descriptor as an equivalent stream.
///
/// # Safety
/// Every bytecode, cached blob and input layout pointer in `desc` must stay valid for `'a`.
pub unsafe fn upgrade_graphics_desc<'a>(
    desc: &GraphicsPipelineStateDesc,
) -> Result<PipelineStateStreamBuf<'a>> {
    let render_targets = d3d12_pss_sys::D3D12_RT_FORMAT_ARRAY {
        RTFormats: desc.RTVFormats,
        NumRenderTargets: desc.NumRenderTargets,
    };

    let mut builder = PipelineStateStreamBuilder::<'a>::new();
    builder
        .root_signature(desc.pRootSignature)
        .shader_raw(ShaderStage::Vertex, desc.VS)
        .shader_raw(ShaderStage::Pixel, desc.PS)
        .shader_raw(ShaderStage::Domain, desc.DS)
        .shader_raw(ShaderStage::Hull, desc.HS)
        .shader_raw(ShaderStage::Geometry, desc.GS)
        .subobject(SubobjectKind::StreamOutput, desc.StreamOutput)?
        .subobject(SubobjectKind::Blend, desc.BlendState)?
        .subobject(SubobjectKind::SampleMask, desc.SampleMask)?
        .subobject(SubobjectKind::Rasterizer, desc.RasterizerState)?
        .subobject(SubobjectKind::DepthStencil, desc.DepthStencilState)?
        .subobject(SubobjectKind::InputLayout, desc.InputLayout)?
        .subobject(SubobjectKind::IbStripCutValue, desc.IBStripCutValue)?
        .subobject(SubobjectKind::PrimitiveTopology, desc.PrimitiveTopologyType)?
        .subobject(SubobjectKind::RenderTargetFormats, render_targets)?
        .subobject(SubobjectKind::DepthStencilFormat, desc.DSVFormat)?
        .subobject(SubobjectKind::SampleDesc, desc.SampleDesc)?
        .subobject(SubobjectKind::NodeMask, desc.NodeMask)?
        .cached_blob_raw(desc.CachedPSO)
        .subobject(SubobjectKind::Flags, desc.Flags)?;

    Ok(builder.build())
}

/// # Safety
/// A non-null view must be readable for its length.
unsafe fn shader_fingerprint(bytecode: &ShaderBytecode) -> u32 {
    if bytecode.pShaderBytecode.is_null() || bytecode.BytecodeLength == 0 {
        return fingerprint(&[]);
    }

    fingerprint(std::slice::from_raw_parts(
        bytecode.pShaderBytecode.cast::<u8>(),
        bytecode.BytecodeLength,
    ))
}

/// The id and name given to a pipeline created from a legacy descriptor.
///
/// # Safety
/// The vertex and pixel shader views in `desc` must be readable.
pub unsafe fn legacy_technique(desc: &GraphicsPipelineStateDesc) -> (u64, String) {
    let id = (u64::from(shader_fingerprint(&desc.VS)) << 32)
        | u64::from(shader_fingerprint(&desc.PS));
    (id, format!("{LEGACY_TECHNIQUE_PREFIX}- ({id:X})"))
}

impl<T> PipelineInjector<T> {
    /// Creates a pipeline from a legacy graphics descriptor, patching its shaders.
    ///
    /// Pipelines created this way never go through a pipeline library.
    ///
    /// # Safety
    /// `desc` must satisfy the requirements of [`upgrade_graphics_desc`] for the duration
    /// of the call.
    pub unsafe fn create_graphics_pipeline<D>(
        &self,
        device: &D,
        desc: &GraphicsPipelineStateDesc,
    ) -> Result<D::Pipeline>
    where
        D: PipelineDevice,
        T: PipelineTracker<D>,
    {
        let (id, name) = legacy_technique(desc);
        let upgraded = upgrade_graphics_desc(desc)?;
        upgraded.as_stream().validate()?;

        self.tracker.track_device(device);

        let mut copy = PipelineStateStreamCopy::new(&upgraded.as_stream());
        self.replacement.patch_stream(&mut copy, device, None, &name, id);

        compile(device, &copy.as_stream(), id)
    }
}
