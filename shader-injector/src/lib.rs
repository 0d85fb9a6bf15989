//! Dump and replace the shaders inside Direct3D 12 pipeline state streams.
//!
//! [`PipelineInjector`] sits between a host's technique-aware pipeline creation and the
//! device. It copies each incoming stream, lets [`ShaderReplacement`] dump or substitute
//! its shaders, and keeps the host's pipeline library from persisting patched pipelines.

mod config;
mod correlation;
mod enums;
mod error;
mod fingerprint;
mod graphics;
mod host;
mod object;
mod orchestrator;
mod replacement;
mod stream;

pub mod ctypes;
pub mod logger;
pub mod signature;

#[cfg(all(windows, feature = "d3d12"))]
pub mod d3d12;

#[cfg(test)]
mod testing;

pub use config::*;
pub use correlation::*;
pub use enums::*;
pub use error::*;
pub use fingerprint::fingerprint;
pub use graphics::*;
pub use host::*;
pub use object::*;
pub use orchestrator::{on_load_pipeline, on_store_pipeline, PipelineInjector};
pub use replacement::*;
pub use stream::{
    PipelineStateStream, PipelineStateStreamBuf, PipelineStateStreamBuilder, Subobject,
    SubobjectRef, Subobjects,
};
