use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::SubobjectKind;

/// A raw `HRESULT` as returned by the host's Direct3D runtime.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    pub const OK: HResult = HResult(d3d12_pss_sys::S_OK);
    pub const FAIL: HResult = HResult(d3d12_pss_sys::E_FAIL);
    pub const INVALID_ARG: HResult = HResult(d3d12_pss_sys::E_INVALIDARG);
    pub const NO_INTERFACE: HResult = HResult(d3d12_pss_sys::E_NOINTERFACE);
    pub const OUT_OF_MEMORY: HResult = HResult(d3d12_pss_sys::E_OUTOFMEMORY);

    pub fn is_ok(self) -> bool {
        self.0 >= 0
    }
}

impl Display for HResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:X}", self.0 as u32)
    }
}

#[derive(Debug, Error)]
/// Error type for shader-injector.
pub enum InjectorError {
    /// The caller asked for an interface other than `ID3D12PipelineState`.
    #[error("Requested interface is not ID3D12PipelineState.")]
    UnsupportedInterface,
    /// The cached pipeline lookup is postponed until the pipeline is created.
    #[error("Cached pipeline load deferred to pipeline creation.")]
    LoadDeferred,
    /// The device refused to compile the pipeline state stream.
    #[error("CreatePipelineState failed and returned {code}. Shader technique: {technique_id:X}.")]
    CreatePipeline { code: HResult, technique_id: u64 },
    /// The stream holds an unknown type tag, or an entry that runs past its end.
    #[error("Malformed pipeline state stream at offset {offset}.")]
    MalformedStream { offset: usize },
    /// A sub-object reference does not point at a sub-object of the expected role.
    #[error("No {expected} sub-object at stream offset {offset}.")]
    Subobject { offset: usize, expected: &'static str },
    /// A payload does not have the layout declared for its sub-object kind.
    #[error("A {size} byte payload does not match the layout of {kind:?}.")]
    PayloadLayout { kind: SubobjectKind, size: usize },
    /// The blob does not start with a `DXBC` container header.
    #[error("Blob is not a DXBC container.")]
    NotDxbc,
    /// The configuration file could not be parsed.
    #[error("Invalid configuration: {0}.")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InjectorError {
    /// The code reported to the host for this error.
    pub fn hresult(&self) -> HResult {
        match self {
            InjectorError::UnsupportedInterface => HResult::NO_INTERFACE,
            InjectorError::CreatePipeline { code, .. } => *code,
            InjectorError::LoadDeferred
            | InjectorError::MalformedStream { .. }
            | InjectorError::Subobject { .. }
            | InjectorError::PayloadLayout { .. }
            | InjectorError::NotDxbc
            | InjectorError::Config(_) => HResult::INVALID_ARG,
            InjectorError::Io(_) => HResult::FAIL,
        }
    }
}

pub type Result<T> = std::result::Result<T, InjectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hresult_formats_as_unsigned_hex() {
        assert_eq!(HResult::INVALID_ARG.to_string(), "80070057");
        assert!(!HResult::OUT_OF_MEMORY.is_ok());
        assert!(HResult::OK.is_ok());
    }

    #[test]
    fn compile_failures_keep_the_host_code() {
        let err = InjectorError::CreatePipeline {
            code: HResult::OUT_OF_MEMORY,
            technique_id: 0xABCD,
        };

        assert_eq!(err.hresult(), HResult::OUT_OF_MEMORY);
        assert_eq!(
            err.to_string(),
            "CreatePipelineState failed and returned 8007000E. Shader technique: ABCD."
        );
        assert_eq!(InjectorError::LoadDeferred.hresult(), HResult::INVALID_ARG);
        assert_eq!(InjectorError::UnsupportedInterface.hresult(), HResult::NO_INTERFACE);
        assert_eq!(
            InjectorError::MalformedStream { offset: 24 }.hresult(),
            HResult::INVALID_ARG
        );
    }
}
