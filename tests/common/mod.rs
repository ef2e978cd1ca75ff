#![allow(dead_code)]

use sixview::{Cube, EdgeOps, N_CORIENT, N_CPERM, N_EORIENT, N_EPERM};

pub fn seed_rng() {
    fastrand::seed(0x5eed_cafe);
}

pub fn rand(max: u32) -> u32 {
    fastrand::u32(0..max)
}

/// Swaps edge slots 0 and 1 when composed on the right.
pub const EDGE_SWAP_01: Cube =
    Cube::from_literal(0x0706_0504_0302_0100, 0x0b0a_0908, 0x0706_0504_0302_0001);

/// A transposition of two edge slots, as a cube to compose on the right.
pub fn edge_transposition(x: usize, y: usize) -> Cube {
    let mut e: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
    e.swap(x, y);
    let lo = u64::from_le_bytes(e[..8].try_into().unwrap());
    let hi = u64::from_le_bytes([e[8], e[9], e[10], e[11], 0, 0, 0, 0]);
    Cube::from_literal(0x0706_0504_0302_0100, hi, lo)
}

/// A transposition of two corner slots, as a cube to compose on the right.
pub fn corner_transposition(x: usize, y: usize) -> Cube {
    let mut c: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
    c.swap(x, y);
    let corners = u64::from_le_bytes(c);
    Cube::from_literal(corners, 0x0b0a_0908, 0x0706_0504_0302_0100)
}

/// A uniformly random legal cube.
pub fn random_cube() -> Cube {
    let mut c = Cube::IDENTITY;
    c.set_edge_perm(rand(N_EPERM));
    c.set_edge_orient(rand(N_EORIENT) as u16);
    c.set_corner_perm(rand(N_CPERM));
    c.set_corner_orient(rand(N_CORIENT));
    if c.parity() { c * EDGE_SWAP_01 } else { c }
}

/// Assert the structural invariants of a legal cube state.
pub fn check_invariants(c: &Cube) {
    let b = c.to_bytes();

    let mut edge_bits = 0u8;
    for &slot in &b[..12] {
        edge_bits |= slot;
    }
    assert_eq!(edge_bits & 0xe0, 0, "stray edge bits");

    let mut corner_bits = 0u8;
    for &slot in &b[16..24] {
        corner_bits |= slot;
    }
    assert_eq!(corner_bits & 0xc8, 0, "stray corner bits");

    for i in 12..16 {
        assert_eq!(b[i], i as u8, "edge padding disturbed");
    }
    for i in 24..32 {
        assert_eq!(b[i], (i - 16) as u8, "corner padding disturbed");
    }

    let mut eo_sum = 0u32;
    let mut e_mask = 0u32;
    for &slot in &b[..12] {
        eo_sum += (slot >> 4) as u32;
        e_mask |= 1 << (slot & 0xf);
    }
    assert_eq!(eo_sum % 2, 0, "odd edge orientation sum");
    assert_eq!(e_mask, 0xfff, "edge permutation incomplete");

    let mut co_sum = 0u32;
    let mut c_mask = 0u32;
    for &slot in &b[16..24] {
        let o = slot >> 4;
        assert!(o < 3, "corner twist out of range");
        co_sum += o as u32;
        c_mask |= 1 << (slot & 7);
    }
    assert_eq!(co_sum % 3, 0, "corner twist sum not divisible by 3");
    assert_eq!(c_mask, 0xff, "corner permutation incomplete");
}
