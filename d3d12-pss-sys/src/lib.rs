#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

//! Raw layout of Direct3D 12 pipeline state streams.
//!
//! Everything here mirrors `d3d12.h` for 64-bit targets. Implicit C padding is spelled out
//! as `_padding` fields so payloads can be written byte-for-byte into a stream.

mod defs;

pub use defs::*;

use bytemuck::{NoUninit, Zeroable};
use std::mem::{align_of, size_of};

#[cfg(not(target_pointer_width = "64"))]
compile_error!("d3d12-pss-sys only describes the 64-bit pipeline state stream layout");

macro_rules! plain_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            unsafe impl Zeroable for $ty {}
            unsafe impl NoUninit for $ty {}

            impl Default for $ty {
                fn default() -> Self {
                    Zeroable::zeroed()
                }
            }
        )*
    };
}

plain_payload!(
    D3D12_SHADER_BYTECODE,
    D3D12_CACHED_PIPELINE_STATE,
    D3D12_STREAM_OUTPUT_DESC,
    D3D12_RENDER_TARGET_BLEND_DESC,
    D3D12_BLEND_DESC,
    D3D12_RASTERIZER_DESC,
    D3D12_RASTERIZER_DESC1,
    D3D12_RASTERIZER_DESC2,
    D3D12_DEPTH_STENCILOP_DESC,
    D3D12_DEPTH_STENCILOP_DESC1,
    D3D12_DEPTH_STENCIL_DESC,
    D3D12_DEPTH_STENCIL_DESC1,
    D3D12_DEPTH_STENCIL_DESC2,
    D3D12_INPUT_LAYOUT_DESC,
    D3D12_RT_FORMAT_ARRAY,
    DXGI_SAMPLE_DESC,
    D3D12_VIEW_INSTANCING_DESC,
);

unsafe impl Zeroable for D3D12_GRAPHICS_PIPELINE_STATE_DESC {}
unsafe impl Zeroable for D3D12_PIPELINE_STATE_STREAM_DESC {}

impl Default for D3D12_GRAPHICS_PIPELINE_STATE_DESC {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}

impl Default for D3D12_PIPELINE_STATE_STREAM_DESC {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}

/// Byte offset of the payload inside a stream entry holding a `T`.
pub const fn subobject_payload_offset<T>() -> usize {
    let align = align_of::<T>();
    (size_of::<D3D12_PIPELINE_STATE_SUBOBJECT_TYPE>() + align - 1) & !(align - 1)
}

/// Total size of a stream entry holding a `T`, trailing padding included.
pub const fn subobject_size<T>() -> usize {
    size_of::<D3D12_PIPELINE_STATE_STREAM_SUBOBJECT<T>>()
}

const _: () = {
    assert!(size_of::<D3D12_SHADER_BYTECODE>() == 16);
    assert!(size_of::<D3D12_STREAM_OUTPUT_DESC>() == 32);
    assert!(size_of::<D3D12_BLEND_DESC>() == 328);
    assert!(size_of::<D3D12_RASTERIZER_DESC>() == 44);
    assert!(size_of::<D3D12_RASTERIZER_DESC2>() == 40);
    assert!(size_of::<D3D12_DEPTH_STENCIL_DESC>() == 52);
    assert!(size_of::<D3D12_DEPTH_STENCIL_DESC1>() == 56);
    assert!(size_of::<D3D12_DEPTH_STENCIL_DESC2>() == 60);
    assert!(size_of::<D3D12_RT_FORMAT_ARRAY>() == 36);
    assert!(size_of::<D3D12_VIEW_INSTANCING_DESC>() == 24);
    assert!(size_of::<D3D12_GRAPHICS_PIPELINE_STATE_DESC>() == 656);
};
