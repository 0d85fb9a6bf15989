const FNV1A32_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV1A32_PRIME: u32 = 0x0100_0193;

/// FNV-1a 32-bit hash of `data`.
///
/// Used as a content fingerprint in the technique ledger and to derive technique ids for
/// pipelines created without one. The value is stable across runs and platforms.
pub fn fingerprint(data: &[u8]) -> u32 {
    data.iter().fold(FNV1A32_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV1A32_PRIME)
    })
}
