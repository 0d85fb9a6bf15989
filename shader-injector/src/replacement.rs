//! Dumping shaders to disk and substituting them back.
//!
//! Files live at `<root>/<short>/<short>_<ID>_<prefix>.bin`, where `short` is the technique
//! name up to its first `-` and `ID` is the technique id in upper case hex. In dump mode
//! every dumped file also gets a line in `<root>/ShaderTechniqueMap.csv`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use parking_lot::Mutex;
use tracing::{error, info, trace, warn};

use crate::config::{InjectorConfig, ShaderMode};
use crate::signature;
use crate::stream::SubobjectRef;
use crate::{fingerprint, PipelineDevice, PipelineStateStreamCopy, ShaderTarget, SubobjectRole};

/// File name of the technique ledger written in dump mode.
pub const LEDGER_FILE_NAME: &str = "ShaderTechniqueMap.csv";

const MAX_SHORT_NAME_LEN: usize = 511;

/// Where a technique's shader of a given kind lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderIdentity {
    short_name: String,
    technique_id: u64,
    target: ShaderTarget,
}

impl ShaderIdentity {
    pub fn new(technique_name: &str, technique_id: u64, target: ShaderTarget) -> Self {
        let short_name = technique_name
            .chars()
            .take_while(|&c| c != '-')
            .take(MAX_SHORT_NAME_LEN)
            .map(|c| match c {
                '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        ShaderIdentity {
            short_name,
            technique_id,
            target,
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn target(&self) -> ShaderTarget {
        self.target
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{:X}_{}.bin",
            self.short_name,
            self.technique_id,
            self.target.prefix()
        )
    }

    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(&self.short_name).join(self.file_name())
    }

    /// `short,prefix,fingerprint,ID,"full name"`, newline terminated.
    ///
    /// Quotes in the full name are doubled and control characters become `_`, so every
    /// line stays a single CSV record.
    pub fn ledger_line(&self, fingerprint: u32, technique_name: &str) -> String {
        let mut quoted = String::with_capacity(technique_name.len());
        for c in technique_name.chars() {
            match c {
                '"' => quoted.push_str("\"\""),
                c if c.is_control() => quoted.push('_'),
                c => quoted.push(c),
            }
        }

        format!(
            "{},{},{},{:X},\"{}\"\n",
            self.short_name,
            self.target.prefix(),
            fingerprint,
            self.technique_id,
            quoted
        )
    }
}

/// Decides, per sub-object, whether to dump its shader or substitute one from disk.
pub struct ShaderReplacement {
    mode: ShaderMode,
    root: PathBuf,
    dump_lock: Mutex<()>,
    first_replacement: Once,
}

impl ShaderReplacement {
    pub fn new(config: &InjectorConfig) -> Self {
        Self::with_root(config.mode(), config.shader_bin_directory())
    }

    pub fn with_root(mode: ShaderMode, root: impl Into<PathBuf>) -> Self {
        ShaderReplacement {
            mode,
            root: root.into(),
            dump_lock: Mutex::new(()),
            first_replacement: Once::new(),
        }
    }

    pub fn mode(&self) -> ShaderMode {
        self.mode
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE_NAME)
    }

    /// Dumps or replaces every shader in `copy`, and the root signature when the
    /// technique's serialized root signature is known.
    ///
    /// Returns whether anything was replaced. Cached PSO blobs are cleared when it was,
    /// since they were compiled from the original bytecode.
    pub fn patch_stream<D: PipelineDevice>(
        &self,
        copy: &mut PipelineStateStreamCopy<'_>,
        device: &D,
        root_signature: Option<&[u8]>,
        technique_name: &str,
        technique_id: u64,
    ) -> bool {
        let subobjects: Vec<SubobjectRef> = copy.subobjects().map(|s| s.to_ref()).collect();
        let mut modified = false;

        for &subobject in &subobjects {
            match subobject.kind().role() {
                SubobjectRole::Shader(stage) => {
                    let identity =
                        ShaderIdentity::new(technique_name, technique_id, ShaderTarget::Stage(stage));
                    modified |= self.patch_shader(copy, subobject, &identity, technique_name);
                }
                SubobjectRole::RootSignature => {
                    if let Some(blob) = root_signature {
                        let identity =
                            ShaderIdentity::new(technique_name, technique_id, ShaderTarget::RootSignature);
                        modified |= self.patch_root_signature(
                            copy,
                            device,
                            subobject,
                            &identity,
                            blob,
                            technique_name,
                        );
                    }
                }
                SubobjectRole::CachedPipeline | SubobjectRole::Opaque => {}
            }
        }

        if modified {
            for &subobject in &subobjects {
                match subobject.kind().role() {
                    SubobjectRole::CachedPipeline => {
                        if let Err(err) = copy.clear_cached_blob(subobject) {
                            warn!("{err}");
                        }
                    }
                    SubobjectRole::Shader(_) | SubobjectRole::RootSignature | SubobjectRole::Opaque => {}
                }
            }
        }

        modified
    }

    fn patch_shader(
        &self,
        copy: &mut PipelineStateStreamCopy<'_>,
        subobject: SubobjectRef,
        identity: &ShaderIdentity,
        technique_name: &str,
    ) -> bool {
        let replacement = {
            let Some(current) = copy.as_stream().get(subobject).and_then(|s| s.bytecode()) else {
                return false;
            };

            match self.extract_or_replace(identity, current, technique_name) {
                Some(replacement) => replacement,
                None => return false,
            }
        };

        match copy.replace_bytecode(subobject, replacement) {
            Ok(()) => true,
            Err(err) => {
                warn!("{err}");
                false
            }
        }
    }

    fn patch_root_signature<D: PipelineDevice>(
        &self,
        copy: &mut PipelineStateStreamCopy<'_>,
        device: &D,
        subobject: SubobjectRef,
        identity: &ShaderIdentity,
        blob: &[u8],
        technique_name: &str,
    ) -> bool {
        let Some(replacement) = self.extract_or_replace(identity, blob, technique_name) else {
            return false;
        };

        let root_signature = match device.create_root_signature(&replacement) {
            Ok(root_signature) => root_signature,
            Err(code) => {
                error!(
                    "Failed to create root signature: {code}. Shader technique: {:X}.",
                    identity.technique_id
                );
                return false;
            }
        };

        match copy.replace_root_signature(subobject, root_signature) {
            Ok(()) => true,
            Err(err) => {
                warn!("{err}");
                false
            }
        }
    }

    /// Dumps `current`, or returns the on-disk override for it.
    fn extract_or_replace(
        &self,
        identity: &ShaderIdentity,
        current: &[u8],
        technique_name: &str,
    ) -> Option<Box<[u8]>> {
        let path = identity.path(&self.root);

        match self.mode {
            ShaderMode::Dump => {
                if !current.is_empty() {
                    self.dump(identity, &path, current, technique_name);
                }
                None
            }
            ShaderMode::Replace => self.read_override(&path, current),
        }
    }

    fn dump(&self, identity: &ShaderIdentity, path: &Path, bytecode: &[u8], technique_name: &str) {
        let hash = fingerprint(bytecode);
        let _guard = self.dump_lock.lock();

        if fs::read(path).is_ok_and(|existing| existing == bytecode) {
            trace!("Shader already dumped to {}", path.display());
            return;
        }

        info!("Dumping shader with hash {hash} to {}", path.display());
        let dumped = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(path, bytecode))
            .and_then(|()| {
                let mut ledger = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.ledger_path())?;
                ledger.write_all(identity.ledger_line(hash, technique_name).as_bytes())
            });

        if let Err(err) = dumped {
            warn!("Failed to dump shader to {}: {err}", path.display());
        }
    }

    fn read_override(&self, path: &Path, current: &[u8]) -> Option<Box<[u8]>> {
        let replacement = match fs::read(path) {
            Ok(replacement) => replacement,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("Failed to read shader replacement {}: {err}", path.display());
                return None;
            }
        };

        self.first_replacement.call_once(|| {
            info!("Trying to replace at least one shader: {}", path.display());
        });

        if replacement == current {
            return None;
        }

        if signature::is_signed(&replacement).is_ok_and(|signed| !signed) {
            warn!(
                "Shader replacement {} has an invalid DXBC checksum and will likely be rejected.",
                path.display()
            );
        }

        trace!("Used file replacement: {}", path.display());
        Some(replacement.into_boxed_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::PipelineStateStreamBuilder;
    use crate::testing::MockDevice;
    use crate::{ShaderStage, SubobjectKind};
    use std::ffi::c_void;
    use std::sync::Arc;
    use std::thread;

    const NAME: &str = "Foo-Variant7";
    const ID: u64 = 0xABCD;

    fn vs_path(root: &Path) -> PathBuf {
        root.join("Foo").join("Foo_ABCD_vs.bin")
    }

    #[test]
    fn identity_uses_the_short_name() {
        let identity = ShaderIdentity::new(NAME, ID, ShaderTarget::Stage(ShaderStage::Vertex));
        assert_eq!(identity.short_name(), "Foo");
        assert_eq!(identity.file_name(), "Foo_ABCD_vs.bin");
        assert_eq!(identity.path(Path::new("/root")), PathBuf::from("/root/Foo/Foo_ABCD_vs.bin"));
        assert_eq!(
            identity.ledger_line(42, NAME),
            "Foo,vs,42,ABCD,\"Foo-Variant7\"\n"
        );

        let rsg = ShaderIdentity::new("NoDelimiter", 0x1F, ShaderTarget::RootSignature);
        assert_eq!(rsg.target(), ShaderTarget::RootSignature);
        assert_eq!(rsg.file_name(), "NoDelimiter_1F_rsg.bin");
    }

    #[test]
    fn ledger_lines_stay_one_record() {
        let name = "Foo-\"quoted\"\nnext";
        let identity = ShaderIdentity::new(name, ID, ShaderTarget::Stage(ShaderStage::Pixel));
        let line = identity.ledger_line(7, name);

        assert_eq!(line, "Foo,ps,7,ABCD,\"Foo-\"\"quoted\"\"_next\"\n");
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn identity_sanitizes_and_truncates() {
        let identity = ShaderIdentity::new("a/b:c-d", 1, ShaderTarget::Stage(ShaderStage::Pixel));
        assert_eq!(identity.short_name(), "a_b_c");

        let long = "x".repeat(600);
        let identity = ShaderIdentity::new(&long, 1, ShaderTarget::Stage(ShaderStage::Pixel));
        assert_eq!(identity.short_name().len(), 511);
    }

    #[test]
    fn replaces_from_disk_and_clears_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let original = vec![0xB0u8; 256];
        let replacement = vec![0xB1u8; 300];
        fs::create_dir_all(dir.path().join("Foo")).unwrap();
        fs::write(vs_path(dir.path()), &replacement).unwrap();

        let mut builder = PipelineStateStreamBuilder::new();
        builder
            .shader(ShaderStage::Vertex, &original)
            .cached_blob(&[7u8; 64]);
        let buf = builder.build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let policy = ShaderReplacement::with_root(ShaderMode::Replace, dir.path());
        assert_eq!(policy.mode(), ShaderMode::Replace);
        assert_eq!(policy.root(), dir.path());
        assert!(policy.patch_stream(&mut copy, &MockDevice::default(), None, NAME, ID));

        let mut subobjects = copy.subobjects();
        let vs = subobjects.next().unwrap();
        assert_eq!(vs.raw_bytecode().unwrap().BytecodeLength, 300);
        assert_eq!(vs.bytecode(), Some(replacement.as_slice()));
        let cached = subobjects.next().unwrap().raw_cached_blob().unwrap();
        assert!(cached.pCachedBlob.is_null());
        assert_eq!(cached.CachedBlobSizeInBytes, 0);

        let source_vs = stream.subobjects().next().unwrap().raw_bytecode().unwrap();
        assert_eq!(source_vs.pShaderBytecode, original.as_ptr().cast());
        assert_eq!(source_vs.BytecodeLength, 256);
    }

    #[test]
    fn unsigned_containers_are_still_substituted() {
        let dir = tempfile::tempdir().unwrap();
        let replacement = signature::unsigned_container(200, 0x5C);
        assert!(!signature::is_signed(&replacement).unwrap());
        fs::create_dir_all(dir.path().join("Foo")).unwrap();
        fs::write(vs_path(dir.path()), &replacement).unwrap();

        let original = vec![0xB0u8; 256];
        let mut builder = PipelineStateStreamBuilder::new();
        builder.shader(ShaderStage::Vertex, &original);
        let buf = builder.build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let policy = ShaderReplacement::with_root(ShaderMode::Replace, dir.path());
        assert!(policy.patch_stream(&mut copy, &MockDevice::default(), None, NAME, ID));
        assert_eq!(
            copy.subobjects().next().unwrap().bytecode(),
            Some(replacement.as_slice())
        );
    }

    #[test]
    fn missing_file_leaves_the_stream_alone() {
        let dir = tempfile::tempdir().unwrap();
        let original = vec![0xB0u8; 256];

        let mut builder = PipelineStateStreamBuilder::new();
        builder.shader(ShaderStage::Vertex, &original).cached_blob(&[7u8; 64]);
        let buf = builder.build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let policy = ShaderReplacement::with_root(ShaderMode::Replace, dir.path());
        assert!(!policy.patch_stream(&mut copy, &MockDevice::default(), None, NAME, ID));

        let vs = copy.subobjects().next().unwrap().raw_bytecode().unwrap();
        assert_eq!(vs.pShaderBytecode, original.as_ptr().cast());
        assert_eq!(vs.BytecodeLength, 256);
        assert_eq!(copy.as_stream().as_bytes(), stream.as_bytes());
    }

    #[test]
    fn identical_file_is_not_an_override() {
        let dir = tempfile::tempdir().unwrap();
        let original = vec![0xB0u8; 256];
        fs::create_dir_all(dir.path().join("Foo")).unwrap();
        fs::write(vs_path(dir.path()), &original).unwrap();

        let mut builder = PipelineStateStreamBuilder::new();
        builder.shader(ShaderStage::Vertex, &original);
        let buf = builder.build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let policy = ShaderReplacement::with_root(ShaderMode::Replace, dir.path());
        assert!(!policy.patch_stream(&mut copy, &MockDevice::default(), None, NAME, ID));
        assert_eq!(copy.owned_payloads(), 0);
    }

    #[test]
    fn root_signature_is_rebuilt_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Foo")).unwrap();
        fs::write(dir.path().join("Foo").join("Foo_ABCD_rsg.bin"), [5u8; 48]).unwrap();

        let mut builder = PipelineStateStreamBuilder::new();
        builder.root_signature(0x1000 as *mut c_void);
        let buf = builder.build();
        let stream = buf.as_stream();
        let device = MockDevice::default();
        let policy = ShaderReplacement::with_root(ShaderMode::Replace, dir.path());

        // Without the technique's root signature there is nothing to compare against.
        let mut copy = PipelineStateStreamCopy::new(&stream);
        assert!(!policy.patch_stream(&mut copy, &device, None, NAME, ID));

        let mut copy = PipelineStateStreamCopy::new(&stream);
        assert!(policy.patch_stream(&mut copy, &device, Some(&[4u8; 48]), NAME, ID));
        assert_eq!(device.root_signatures(), vec![vec![5u8; 48]]);
        assert_ne!(
            copy.subobjects().next().unwrap().root_signature(),
            Some(0x1000 as *mut c_void)
        );
    }

    #[test]
    fn failed_root_signature_leaves_the_subobject() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Foo")).unwrap();
        fs::write(dir.path().join("Foo").join("Foo_ABCD_rsg.bin"), [5u8; 48]).unwrap();

        let mut builder = PipelineStateStreamBuilder::new();
        builder.root_signature(0x1000 as *mut c_void).cached_blob(&[1u8; 8]);
        let buf = builder.build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let device = MockDevice::default().failing_root_signatures();
        let policy = ShaderReplacement::with_root(ShaderMode::Replace, dir.path());
        assert!(!policy.patch_stream(&mut copy, &device, Some(&[4u8; 48]), NAME, ID));
        assert_eq!(copy.as_stream().as_bytes(), stream.as_bytes());
    }

    #[test]
    fn dump_writes_once_per_content() {
        let dir = tempfile::tempdir().unwrap();
        let vs = vec![0x11u8; 64];
        let ps = vec![0x22u8; 32];

        let mut builder = PipelineStateStreamBuilder::new();
        builder
            .root_signature(0x1000 as *mut c_void)
            .shader(ShaderStage::Vertex, &vs)
            .shader(ShaderStage::Pixel, &ps)
            .shader(ShaderStage::Geometry, &[]);
        let buf = builder.build();
        let stream = buf.as_stream();
        let policy = ShaderReplacement::with_root(ShaderMode::Dump, dir.path());

        for _ in 0..2 {
            let mut copy = PipelineStateStreamCopy::new(&stream);
            assert!(!policy.patch_stream(&mut copy, &MockDevice::default(), Some(&[3u8; 16]), NAME, ID));
            assert_eq!(copy.as_stream().as_bytes(), stream.as_bytes());
        }

        assert_eq!(fs::read(vs_path(dir.path())).unwrap(), vs);
        assert_eq!(fs::read(dir.path().join("Foo/Foo_ABCD_ps.bin")).unwrap(), ps);
        assert_eq!(fs::read(dir.path().join("Foo/Foo_ABCD_rsg.bin")).unwrap(), vec![3u8; 16]);
        assert!(!dir.path().join("Foo/Foo_ABCD_gs.bin").exists());

        let ledger = fs::read_to_string(policy.ledger_path()).unwrap();
        let lines: Vec<_> = ledger.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("Foo,rsg,{},ABCD,\"Foo-Variant7\"", fingerprint(&[3u8; 16])));
        assert_eq!(lines[1], format!("Foo,vs,{},ABCD,\"Foo-Variant7\"", fingerprint(&vs)));
        assert!(lines[2].starts_with("Foo,ps,"));
    }

    #[test]
    fn concurrent_dumps_keep_the_ledger_intact() {
        let dir = tempfile::tempdir().unwrap();
        let policy = Arc::new(ShaderReplacement::with_root(ShaderMode::Dump, dir.path()));

        let workers: Vec<_> = [("Alpha-One", 0x1u64, 0xA1u8, 700usize), ("Beta-Two", 0x2, 0xB2, 900)]
            .into_iter()
            .map(|(name, id, fill, len)| {
                let policy = Arc::clone(&policy);
                thread::spawn(move || {
                    let bytecode = vec![fill; len];
                    let mut builder = PipelineStateStreamBuilder::new();
                    builder.shader(ShaderStage::Pixel, &bytecode);
                    let buf = builder.build();
                    let stream = buf.as_stream();
                    let mut copy = PipelineStateStreamCopy::new(&stream);
                    policy.patch_stream(&mut copy, &MockDevice::default(), None, name, id)
                })
            })
            .collect();

        for worker in workers {
            assert!(!worker.join().unwrap());
        }

        assert_eq!(fs::read(dir.path().join("Alpha/Alpha_1_ps.bin")).unwrap().len(), 700);
        assert_eq!(fs::read(dir.path().join("Beta/Beta_2_ps.bin")).unwrap().len(), 900);

        let ledger = fs::read_to_string(policy.ledger_path()).unwrap();
        let mut lines: Vec<_> = ledger.lines().collect();
        lines.sort_unstable();
        assert_eq!(
            lines,
            vec![
                format!("Alpha,ps,{},1,\"Alpha-One\"", fingerprint(&[0xA1; 700])),
                format!("Beta,ps,{},2,\"Beta-Two\"", fingerprint(&[0xB2; 900])),
            ]
        );
    }

    #[test]
    fn compute_and_mesh_stages_are_patched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Foo")).unwrap();
        fs::write(dir.path().join("Foo/Foo_ABCD_ms.bin"), [9u8; 12]).unwrap();

        let mut builder = PipelineStateStreamBuilder::new();
        builder
            .shader(ShaderStage::Compute, &[1u8; 12])
            .subobject(SubobjectKind::NodeMask, 0u32)
            .unwrap()
            .shader(ShaderStage::Mesh, &[2u8; 12]);
        let buf = builder.build();
        let stream = buf.as_stream();
        let mut copy = PipelineStateStreamCopy::new(&stream);

        let policy = ShaderReplacement::with_root(ShaderMode::Replace, dir.path());
        assert!(policy.patch_stream(&mut copy, &MockDevice::default(), None, NAME, ID));

        let shaders: Vec<_> = copy.subobjects().filter_map(|s| s.bytecode()).collect();
        assert_eq!(shaders, vec![&[1u8; 12][..], &[9u8; 12][..]]);
    }
}
