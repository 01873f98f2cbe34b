// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Redundant digests over the stack header and the payload block.
//!
//! Canaries only see writes that cross a region boundary. The checksums catch
//! what lands inside: bit flips, writes through stale pointers, logic errors.
//! This is a corruption detector, not a MAC.

use crate::element::PlainElement;
use crate::stack::GuardedStack;

/// Seed of every checksum computed by the stack.
pub const CHECKSUM_SEED: u32 = 0x5EED_57AC;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline(always)]
fn scramble(mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = k.rotate_left(15);
    k.wrapping_mul(C2)
}

#[inline(always)]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// MurmurHash3 (x86, 32-bit) of `bytes`.
///
/// Consumes the input four little-endian bytes at a time, folds the 1-3 byte
/// tail, then runs the `fmix32` avalanche.
///
/// # Example
///
/// ```rust
/// use rampart_stack::murmur3_32;
///
/// assert_eq!(murmur3_32(b"", 0), 0);
/// assert_eq!(murmur3_32(b"hello", 0), 0x248b_fa47);
/// ```
pub fn murmur3_32(bytes: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut chunks = bytes.chunks_exact(4);

    for chunk in &mut chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h ^= scramble(k);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, byte) in tail.iter().enumerate() {
            k |= (*byte as u32) << (8 * i);
        }
        h ^= scramble(k);
    }

    h ^= bytes.len() as u32;
    fmix32(h)
}

const HEADER_IMAGE_LEN: usize =
    2 * size_of::<u64>() + 11 * size_of::<usize>() + 4 * size_of::<u32>();

/// Little-endian image of the checksummed header fields.
struct HeaderImage {
    buf: [u8; HEADER_IMAGE_LEN],
    len: usize,
}

impl HeaderImage {
    fn new() -> Self {
        Self {
            buf: [0u8; HEADER_IMAGE_LEN],
            len: 0,
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }

    /// Address and length, never the contents.
    fn push_str(&mut self, value: &str) {
        self.push(&value.as_ptr().addr().to_le_bytes());
        self.push(&value.len().to_le_bytes());
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Digest of the stack header with its own checksum slot read as zero.
///
/// Covers every field, including the provenance strings (as address and
/// length) and the formatter address, so a damaged callback is caught before
/// a dump calls it. The image is built locally, so the live header is never
/// touched.
pub(crate) fn struct_checksum<T: PlainElement>(stack: &GuardedStack<T>) -> u32 {
    let mut image = HeaderImage::new();

    image.push(&stack.left_canary.to_le_bytes());
    image.push(&stack.data.addr().to_le_bytes());
    image.push(&stack.origin.addr().to_le_bytes());
    image.push(&stack.size.to_le_bytes());
    image.push(&stack.capacity.to_le_bytes());
    image.push(&stack.data_hash.to_le_bytes());
    image.push(&0u32.to_le_bytes());
    image.push(&stack.config.bits().to_le_bytes());
    image.push_str(stack.provenance.name);
    image.push_str(stack.provenance.file);
    image.push(&stack.provenance.line.to_le_bytes());
    image.push_str(stack.provenance.function);
    image.push(&stack.formatter.map_or(0, |formatter| formatter as usize).to_le_bytes());
    image.push(&stack.right_canary.to_le_bytes());

    murmur3_32(image.as_bytes(), CHECKSUM_SEED)
}

/// Digest of all `capacity` slots, dead ones included.
///
/// A null `data` hashes as the empty payload.
///
/// # Safety
///
/// A non-null `data` must point to `capacity` initialized slots of `T`.
pub(crate) unsafe fn payload_checksum<T: PlainElement>(data: *const T, capacity: usize) -> u32 {
    if data.is_null() {
        return murmur3_32(&[], CHECKSUM_SEED);
    }

    // SAFETY (PRECONDITIONS ARE MET): caller guarantees capacity slots; PlainElement has no padding.
    let bytes = unsafe { core::slice::from_raw_parts(data as *const u8, capacity * size_of::<T>()) };

    murmur3_32(bytes, CHECKSUM_SEED)
}
