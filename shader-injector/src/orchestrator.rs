use tracing::{debug, error, trace};

use crate::config::InjectorConfig;
use crate::correlation::{CorrelationCell, PendingLoad};
use crate::host::{
    CompiledPipeline, DebugName, NoopTracker, PipelineDevice, PipelineLibrary, PipelineTracker,
    Technique, TechniqueKey,
};
use crate::replacement::ShaderReplacement;
use crate::{HResult, InjectorError, PipelineStateStream, PipelineStateStreamCopy, Result};

const INVALID_ARG_HINT: &str = "Please check that all custom shaders have matching input semantics, \
                                root signatures, and are digitally signed by dxc.exe.";

/// Creates pipelines on behalf of host techniques, patching their shaders on the way.
pub struct PipelineInjector<T = NoopTracker> {
    pub(crate) replacement: ShaderReplacement,
    pub(crate) insert_debug_markers: bool,
    pub(crate) tracker: T,
}

impl PipelineInjector<NoopTracker> {
    pub fn new(config: &InjectorConfig) -> Self {
        Self::with_tracker(config, NoopTracker)
    }
}

impl<T> PipelineInjector<T> {
    pub fn with_tracker(config: &InjectorConfig, tracker: T) -> Self {
        Self::from_parts(ShaderReplacement::new(config), config.insert_debug_markers, tracker)
    }

    pub fn from_parts(replacement: ShaderReplacement, insert_debug_markers: bool, tracker: T) -> Self {
        PipelineInjector {
            replacement,
            insert_debug_markers,
            tracker,
        }
    }

    pub fn replacement(&self) -> &ShaderReplacement {
        &self.replacement
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Creates the pipeline for `technique` from `stream`.
    ///
    /// The stream is patched on a copy and never modified. An unpatched stream is first
    /// looked up in the library the host tried to load it from on this thread, if any.
    /// When the pipeline was patched or came from the library, the host's next store of
    /// this technique is skipped.
    ///
    /// A malformed stream is rejected before anything else happens, and leaves no
    /// correlation behind.
    pub fn create_pipeline<D, L>(
        &self,
        device: &D,
        stream: &PipelineStateStream<'_>,
        technique: &Technique<'_>,
        correlation: &CorrelationCell<L>,
    ) -> Result<D::Pipeline>
    where
        D: PipelineDevice,
        L: PipelineLibrary<D>,
        T: PipelineTracker<D>,
    {
        if let Err(err) = stream.validate() {
            correlation.clear();
            error!("{err} Shader technique: {:X}.", technique.id);
            return Err(err);
        }

        self.tracker.track_device(device);

        let mut copy = PipelineStateStreamCopy::new(stream);
        let patched = self.replacement.patch_stream(
            &mut copy,
            device,
            technique.root_signature,
            technique.name,
            technique.id,
        );

        let pending = correlation.take_load();
        let loaded = match pending {
            Some(pending) if !patched && pending.technique == technique.key => {
                match pending.library.load_pipeline(&pending.name, &copy.as_stream()) {
                    Ok(pipeline) => Some(pipeline),
                    Err(code) => {
                        debug!(
                            "Pipeline library miss ({code}). Shader technique: {:X}.",
                            technique.id
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        let skip_store = (patched || loaded.is_some()).then_some(technique.key);
        correlation.set_skip_store(skip_store);

        let pipeline = match loaded {
            Some(pipeline) => pipeline,
            None => match compile(device, &copy.as_stream(), technique.id) {
                Ok(pipeline) => pipeline,
                Err(err) => {
                    correlation.set_skip_store(None);
                    return Err(err);
                }
            },
        };

        self.set_debug_name(&pipeline, technique.name);
        self.tracker.track_compiled(CompiledPipeline {
            pipeline: &pipeline,
            technique_name: technique.name,
            technique_id: technique.id,
            stream: copy.as_stream(),
            patched,
        });

        Ok(pipeline)
    }

    pub(crate) fn set_debug_name(&self, object: &impl DebugName, name: &str) {
        if !self.insert_debug_markers || name.is_empty() {
            return;
        }

        if let Err(code) = object.set_debug_name(name) {
            trace!("Failed to set debug name {name:?}: {code}");
        }
    }
}

/// Compiles `stream`, logging failures with the technique they belong to.
pub(crate) fn compile<D: PipelineDevice>(
    device: &D,
    stream: &PipelineStateStream<'_>,
    technique_id: u64,
) -> Result<D::Pipeline> {
    device.create_pipeline_state(stream).map_err(|code| {
        let err = InjectorError::CreatePipeline { code, technique_id };
        error!("{err}");
        if code == HResult::INVALID_ARG {
            error!("{INVALID_ARG_HINT}");
        }
        err
    })
}

/// Body of the library load hook.
///
/// Remembers the lookup for the pipeline creation that follows on this thread and
/// returns the error reported to the host, which makes it create the pipeline instead.
pub fn on_load_pipeline<L>(
    correlation: &CorrelationCell<L>,
    library: L,
    name: &[u16],
    technique: TechniqueKey,
) -> InjectorError {
    correlation.arm_load(PendingLoad {
        library,
        name: name.to_vec(),
        technique,
    });

    InjectorError::LoadDeferred
}

/// Body of the library store hook.
///
/// Skips the store, reporting success, when the last pipeline created on this thread
/// for `technique` was patched or loaded. Otherwise forwards to the library.
pub fn on_store_pipeline<D, L>(
    correlation: &CorrelationCell<L>,
    library: &L,
    name: &[u16],
    pipeline: &D::Pipeline,
    technique: TechniqueKey,
) -> std::result::Result<(), HResult>
where
    D: PipelineDevice,
    L: PipelineLibrary<D>,
{
    if correlation.take_skip_store() == Some(technique) {
        return Ok(());
    }

    library.store_pipeline(name, pipeline)
}
