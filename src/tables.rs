//! Constant move and symmetry tables.
//!
//! Everything derives from four literal cubes: the three fundamental
//! symmetries and the clockwise U turn. The full tables are produced once at
//! process start; `tables()` hands out the shared instance.

use crate::cube::Cube;
use std::sync::LazyLock;

/// 120-degree clockwise rotation about the URF-DBL corner axis.
pub const S_URF3: Cube = Cube::from_literal(0x1226_1723_2115_2410, 0x1216_1410, 0x0a17_0b13_0915_0811);
/// 90-degree clockwise rotation about the U-D axis.
pub const S_U4: Cube = Cube::from_literal(0x0605_0407_0201_0003, 0x1a19_181b, 0x0605_0407_0201_0003);
/// Left-right reflection.
pub const S_LR2: Cube = Cube::from_literal(0x0607_0405_0203_0001, 0x0a0b_0809, 0x0704_0506_0300_0102);
/// 90-degree clockwise twist of the U face.
pub const M_U: Cube = Cube::from_literal(0x0706_0504_0201_0003, 0x0b0a_0908, 0x0706_0504_0201_0003);

/// Moves whose previous move allows them in a canonical sequence, per face
/// of the previous move; index 6 is "no previous move".
pub const NO_FACE: u8 = 6;

pub struct Tables {
    /// The 18 face turns, `moves[3 * face + power]`.
    pub moves: [Cube; 18],
    /// The 48-element symmetry group. Index 0 is the identity; the low bit
    /// selects the S_LR2 reflection; S_URF3 advances the index by 16.
    pub sym: [Cube; 48],
    /// Index of each symmetry's inverse.
    pub sym_inv: [u8; 48],
    /// For a move on view 0 of a six-view, the equivalent move on each of
    /// the six views (views 3..=5 apply theirs as premoves).
    pub move_sym6: [[u8; 6]; 18],
}

/// Edge slots touched by a turn of each face, in U R F D L B order.
const FACE_SLOTS: [u16; 6] = [0x000f, 0x0911, 0x0322, 0x00f0, 0x0644, 0x0c88];

fn face_of(m: Cube) -> usize {
    let b = m.to_bytes();
    let mut mask = 0u16;
    for (i, &slot) in b[..12].iter().enumerate() {
        if slot & 0x0f != i as u8 {
            mask |= 1 << i;
        }
    }
    FACE_SLOTS
        .iter()
        .position(|&f| f == mask)
        .expect("conjugate of U is not a face turn")
}

fn find_move(moves: &[Cube; 18], target: Cube) -> u8 {
    moves
        .iter()
        .position(|&m| m == target)
        .expect("conjugated move not in the move table") as u8
}

/// The 180-degree rotation that swaps the U and D faces, as a word over the
/// two fundamental rotations. Any of the four horizontal-axis involutions
/// works as the coset representative; the smallest by cube ordering is the
/// deterministic pick.
fn find_ud_flip() -> Cube {
    let mut rotations = vec![Cube::IDENTITY];
    loop {
        let mut grew = false;
        for i in 0..rotations.len() {
            for g in [S_URF3, S_U4] {
                let r = rotations[i] * g;
                if !rotations.contains(&r) {
                    rotations.push(r);
                    grew = true;
                }
            }
        }
        if !grew {
            break;
        }
    }
    debug_assert_eq!(rotations.len(), 24);
    rotations
        .into_iter()
        .filter(|r| {
            let b = r.to_bytes();
            r.compose(*r, false) == Cube::IDENTITY && b[16..20].iter().all(|&c| c & 7 >= 4)
        })
        .min()
        .expect("no U/D flip among the rotations")
}

impl Tables {
    fn build() -> Tables {
        // sym[i] = URF3^(i/16) * U4^b * F2^c * LR2^d with the low four bits
        // of i packed d | b << 1 | c << 3. Indices 0..16 enumerate exactly
        // the subgroup that fixes the U/D axis set, with the reflection in
        // the low bit.
        let ud_flip = find_ud_flip();
        let mut sym = [Cube::IDENTITY; 48];
        for (i, s) in sym.iter_mut().enumerate() {
            let mut c = Cube::IDENTITY;
            for _ in 0..i / 16 {
                c = c * S_URF3;
            }
            for _ in 0..((i >> 1) & 3) {
                c = c * S_U4;
            }
            if i & 8 != 0 {
                c = c * ud_flip;
            }
            if i & 1 != 0 {
                c = c * S_LR2;
            }
            *s = c;
        }

        let mut sym_inv = [0u8; 48];
        for i in 0..48 {
            sym_inv[i] = sym
                .iter()
                .position(|&j| sym[i].compose(j, i & 1 != 0) == Cube::IDENTITY)
                .expect("symmetry has no inverse") as u8;
        }

        // Conjugating the U turn by the 24 rotations reaches a clockwise
        // quarter turn of every face; squares and cubes fill in the rest.
        let mut moves = [Cube::IDENTITY; 18];
        let mut seen = [false; 6];
        for s in (0..48).step_by(2) {
            let conj = sym[sym_inv[s] as usize] * M_U * sym[s];
            let f = face_of(conj);
            if !seen[f] {
                seen[f] = true;
                moves[3 * f] = conj;
                moves[3 * f + 1] = conj * conj;
                moves[3 * f + 2] = moves[3 * f + 1] * conj;
            }
        }
        debug_assert!(seen.iter().all(|&s| s));

        let urf3_inv = S_URF3.inverse();
        let mut move_sym6 = [[0u8; 6]; 18];
        for (m0, entry) in move_sym6.iter_mut().enumerate() {
            let m = moves[m0];
            let minv_idx = (m0 / 3) * 3 + (2 - m0 % 3);
            let minv = moves[minv_idx];
            *entry = [
                m0 as u8,
                find_move(&moves, S_URF3 * m * urf3_inv),
                find_move(&moves, urf3_inv * m * S_URF3),
                minv_idx as u8,
                find_move(&moves, S_URF3 * minv * urf3_inv),
                find_move(&moves, urf3_inv * minv * S_URF3),
            ];
        }

        Tables {
            moves,
            sym,
            sym_inv,
            move_sym6,
        }
    }
}

static TABLES: LazyLock<Tables> = LazyLock::new(Tables::build);

/// The process-wide constant tables.
pub fn tables() -> &'static Tables {
    &TABLES
}
