//! DXBC container checksums.
//!
//! The device refuses containers whose embedded checksum does not match their contents,
//! so hand-edited replacement shaders must be re-signed before use.

use crate::{InjectorError, Result};

const DXBC_MAGIC: &[u8; 4] = b"DXBC";
const CHECKSUM: std::ops::Range<usize> = 4..20;
const HEADER_LEN: usize = 32;

/// Whether `blob` starts with a complete `DXBC` container header.
pub fn is_dxbc(blob: &[u8]) -> bool {
    blob.len() >= HEADER_LEN && blob.starts_with(DXBC_MAGIC)
}

fn checksum(blob: &[u8]) -> [u32; 4] {
    let mut signature = [0u32; 4];
    mach_siegbert_vogt_dxcsa::sign(blob, &mut signature);
    signature
}

/// Whether the checksum embedded in a `DXBC` container matches its contents.
pub fn is_signed(blob: &[u8]) -> Result<bool> {
    if !is_dxbc(blob) {
        return Err(InjectorError::NotDxbc);
    }

    Ok(&blob[CHECKSUM] == bytemuck::cast_slice::<u32, u8>(&checksum(blob)))
}

/// Recomputes and stores the checksum of a `DXBC` container.
pub fn sign_in_place(blob: &mut [u8]) -> Result<()> {
    if !is_dxbc(blob) {
        return Err(InjectorError::NotDxbc);
    }

    mach_siegbert_vogt_dxcsa::sign_in_place(blob);
    Ok(())
}

#[cfg(test)]
pub(crate) fn unsigned_container(len: usize, fill: u8) -> Vec<u8> {
    let mut blob = vec![fill; len.max(HEADER_LEN)];
    blob[..4].copy_from_slice(DXBC_MAGIC);
    blob[CHECKSUM].fill(0);
    blob
}
