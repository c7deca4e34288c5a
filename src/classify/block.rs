//! Bitmask classification over 64-byte blocks.
//!
//! This is a scalar simulation of the word-parallel technique used by
//! SIMD-accelerated JSON scanners: every predicate over a 64-byte block is a
//! `u64` with one bit per byte, and string/escape resolution is carry
//! arithmetic over those masks rather than a per-byte state machine.
//!
//! # Per-block pipeline
//!
//! 1. Accumulate class masks (backslash, quote, whitespace, structural
//!    symbol, control byte) from a precomputed 256-entry table.
//! 2. Resolve which bytes are escaped from backslash run parity, carrying
//!    odd-run state across the block boundary.
//! 3. Prefix-XOR the unescaped quote mask into the in-string region mask,
//!    seeded with the carried in-string state.
//! 4. Flag raw control bytes that land inside a string (sticky error).
//! 5. Structural = symbols outside strings, plus every unescaped quote.
//! 6. Pseudo-structural = non-whitespace bytes outside strings whose
//!    predecessor was whitespace or structural.
//!
//! The classifier is total: it never fails, it only flags the carried error
//! state and leaves the pass/fail decision to the driver.

use super::state::ScanState;

/// Bytes covered by one classification block, one bit per byte in a `u64`.
pub const BLOCK_SIZE: usize = 64;

const CLASS_BACKSLASH: u8 = 1 << 0;
const CLASS_QUOTE: u8 = 1 << 1;
const CLASS_WHITESPACE: u8 = 1 << 2;
const CLASS_STRUCTURAL: u8 = 1 << 3;
const CLASS_CONTROL: u8 = 1 << 4;

/// Compile-time byte class table.
const fn byte_classes() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut b = 0usize;
    while b < 256 {
        let mut class = 0u8;
        if b == b'\\' as usize {
            class |= CLASS_BACKSLASH;
        }
        if b == b'"' as usize {
            class |= CLASS_QUOTE;
        }
        if b == b' ' as usize || b == b'\t' as usize || b == b'\n' as usize || b == b'\r' as usize {
            class |= CLASS_WHITESPACE;
        }
        if b == b'{' as usize
            || b == b'}' as usize
            || b == b'[' as usize
            || b == b']' as usize
            || b == b':' as usize
            || b == b',' as usize
        {
            class |= CLASS_STRUCTURAL;
        }
        if b < 0x20 {
            class |= CLASS_CONTROL;
        }
        table[b] = class;
        b += 1;
    }
    table
}

static CLASSES: [u8; 256] = byte_classes();

const EVEN_BITS: u64 = 0x5555_5555_5555_5555;
const ODD_BITS: u64 = !EVEN_BITS;

/// Class masks for one block, one bit per byte.
#[derive(Debug, Default, Clone, Copy)]
struct BlockMasks {
    backslash: u64,
    quote: u64,
    whitespace: u64,
    structural: u64,
    control: u64,
}

fn block_masks(block: &[u8; BLOCK_SIZE]) -> BlockMasks {
    let mut m = BlockMasks::default();
    for (i, &byte) in block.iter().enumerate() {
        let class = CLASSES[byte as usize];
        let bit = 1u64 << i;
        m.backslash |= bit * u64::from(class & CLASS_BACKSLASH != 0);
        m.quote |= bit * u64::from(class & CLASS_QUOTE != 0);
        m.whitespace |= bit * u64::from(class & CLASS_WHITESPACE != 0);
        m.structural |= bit * u64::from(class & CLASS_STRUCTURAL != 0);
        m.control |= bit * u64::from(class & CLASS_CONTROL != 0);
    }
    m
}

/// Positions terminated by an odd-length backslash run, i.e. escaped bytes.
///
/// Backslash runs are classified by whether they start on an even or odd bit;
/// adding the run's start bit into the run propagates a carry to the byte
/// just past it, and the parity of that end position tells us whether the
/// run length was odd. `ends_odd` carries a run that is still open at bit 63
/// into the next block, where it flips the classification of bit 0.
fn odd_backslash_ends(backslash: u64, ends_odd: &mut bool) -> u64 {
    let carried = u64::from(*ends_odd);

    let start_edges = backslash & !(backslash << 1);
    let even_start_mask = EVEN_BITS ^ carried;
    let even_starts = start_edges & even_start_mask;
    let odd_starts = start_edges & !even_start_mask;

    let even_carries = backslash.wrapping_add(even_starts);
    let (mut odd_carries, ends_odd_now) = backslash.overflowing_add(odd_starts);
    odd_carries |= carried;
    *ends_odd = ends_odd_now;

    let even_carry_ends = even_carries & !backslash;
    let odd_carry_ends = odd_carries & !backslash;
    (even_carry_ends & ODD_BITS) | (odd_carry_ends & EVEN_BITS)
}

/// Inclusive running XOR: bit i of the result is the XOR of bits 0..=i.
///
/// Equivalent to a carry-less multiply by all-ones; turns the quote toggle
/// mask into the in-string region mask (opening quote inclusive, closing
/// quote exclusive).
fn prefix_xor(mut bits: u64) -> u64 {
    bits ^= bits << 1;
    bits ^= bits << 2;
    bits ^= bits << 4;
    bits ^= bits << 8;
    bits ^= bits << 16;
    bits ^= bits << 32;
    bits
}

/// Classifies one 64-byte block, returning the structural bitmask.
fn classify_block(block: &[u8; BLOCK_SIZE], state: &mut ScanState) -> u64 {
    let masks = block_masks(block);

    let escaped = odd_backslash_ends(masks.backslash, &mut state.ends_odd_backslash);
    let quote_bits = masks.quote & !escaped;

    let mut in_string = prefix_xor(quote_bits);
    if state.inside_quote {
        in_string = !in_string;
    }
    state.inside_quote = in_string >> 63 != 0;

    if masks.control & in_string != 0 {
        state.error = true;
    }

    let mut structurals = masks.structural & !in_string;
    structurals |= quote_bits;

    let pseudo_pred = structurals | masks.whitespace;
    let shifted_pred = (pseudo_pred << 1) | u64::from(state.ends_pseudo_pred);
    state.ends_pseudo_pred = pseudo_pred >> 63 != 0;
    let pseudo = shifted_pred & !masks.whitespace & !in_string;

    structurals | pseudo
}

/// Appends set bit positions, lowest first, as absolute offsets.
fn flatten_bits(mut bits: u64, base: u64, out: &mut Vec<u64>) {
    while bits != 0 {
        out.push(base + u64::from(bits.trailing_zeros()));
        bits &= bits - 1;
    }
}

/// Classifies a window of input, appending absolute structural offsets.
///
/// `base` is the window's position in the whole input; offsets pushed into
/// `out` are absolute and strictly increasing. The window is walked in
/// [`BLOCK_SIZE`] blocks; a trailing partial block is padded with spaces,
/// which add no structural bits and leave the carried state meaningful, so
/// the driver must only ever pass a partial window at the very end of the
/// input.
pub fn classify_window(window: &[u8], base: u64, state: &mut ScanState, out: &mut Vec<u64>) {
    let mut blocks = window.chunks_exact(BLOCK_SIZE);
    let mut offset = base;

    for block in blocks.by_ref() {
        let block: &[u8; BLOCK_SIZE] = block.try_into().expect("chunks_exact yields full blocks");
        let structurals = classify_block(block, state);
        flatten_bits(structurals, offset, out);
        offset += BLOCK_SIZE as u64;
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut padded = [b' '; BLOCK_SIZE];
        padded[..tail.len()].copy_from_slice(tail);
        let structurals = classify_block(&padded, state);
        debug_assert_eq!(
            structurals >> tail.len(),
            0,
            "space padding must not produce structural bits"
        );
        flatten_bits(structurals, offset, out);
    }
}
