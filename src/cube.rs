//! Cube value types and their group operations.
//!
//! A [`Cube`] is 32 bytes in two 16-byte lanes. The edge lane holds 12 edge
//! slots (`---OEEEE`: low nibble cubie index, bit 4 flip) followed by padding
//! bytes 12..=15 that keep their own index; the corner lane holds 8 corner
//! slots (`--OO-CCC`: low 3 bits cubie index, bits 4..=5 twist) followed by
//! padding bytes 8..=15. With that layout composition is one byte shuffle
//! plus an orientation fix-up per lane.
//!
//! [`EdgeCube`] is the edge lane alone; the pruning table generator runs on
//! millions of edge states per second and never needs the corner half.

use crate::error::{IllegalCube, ParseError};
use crate::lanes;
use crate::moveseq::MoveSeq;
use crate::tables;
use crate::util::{
    nibble_parity, pdep_u32, pdep_u64, perm_parity, pext_u32, rank_4perm_oddeven, rank_8c4,
    rank_12c4, set_eorient_parity, unrank_8c4, unrank_12c4,
};
use std::fmt;
use std::simd::u8x16;

/// A full cube state. Copyable value; all group operations are infallible.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cube {
    e: u8x16,
    c: u8x16,
}

/// The edge lane of a cube, for coordinate work that ignores corners.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EdgeCube(pub(crate) u8x16);

/// Shared edge-coordinate surface of [`Cube`] and [`EdgeCube`].
///
/// Implementors provide the two lane primitives; every edge coordinate getter
/// and setter is derived from those.
pub trait EdgeOps {
    /// Bit `bit` of every edge slot, as a 16-bit slot mask (padding included).
    fn edge_bitmask(&self, bit: u8) -> u16;

    /// Flip the orientation of the edge slots selected by `mask`.
    fn xor_edge_orient(&mut self, mask: u16);

    /// Edge orientation without parity reduction, 12 bits.
    fn edge_orient_raw(&self) -> u16 {
        self.edge_bitmask(4)
    }

    /// Edge orientation coordinate 0..2048 (twelfth edge implied).
    fn edge_orient(&self) -> u16 {
        self.edge_orient_raw() & 0x7ff
    }

    /// U/D-slice edge orientation coordinate 0..256.
    fn edge8_orient(&self) -> u16 {
        let e_layer = self.edge_bitmask(3) as u32;
        (pext_u32(self.edge_orient_raw() as u32, !e_layer) & 0xff) as u16
    }

    /// Equatorial-slice edge orientation coordinate 0..16.
    fn edge4_orient(&self) -> u16 {
        let e_layer = self.edge_bitmask(3) as u32;
        pext_u32(self.edge_orient_raw() as u32, e_layer) as u16
    }

    /// Set the edge orientation coordinate 0..2048.
    fn set_edge_orient(&mut self, eorient: u16) {
        self.xor_edge_orient(set_eorient_parity(eorient ^ self.edge_orient_raw()));
    }

    /// Set the U/D-slice orientation 0..256; the flip parity lands on the
    /// first equatorial slot so the total stays even.
    fn set_edge8_orient(&mut self, e8orient: u16) {
        let parity = nibble_parity((e8orient ^ (e8orient >> 4)) as u32);
        let e_layer = self.edge_bitmask(3) as u32;
        let ori = pdep_u32(e8orient as u32, !e_layer) | pdep_u32(parity, e_layer);
        self.xor_edge_orient((ori as u16) ^ self.edge_orient_raw());
    }

    /// Set the equatorial-slice orientation 0..16.
    fn set_edge4_orient(&mut self, e4orient: u16) {
        let parity = nibble_parity(e4orient as u32);
        let e_layer = self.edge_bitmask(3) as u32;
        let ori = pdep_u32(e4orient as u32, e_layer) | pdep_u32(parity, !e_layer);
        self.xor_edge_orient((ori as u16) ^ self.edge_orient_raw());
    }

    /// The 12C4 equatorial / non-equatorial combination 0..495.
    fn edge4_comb(&self) -> u32 {
        rank_12c4(self.edge_bitmask(3) & 0xfff)
    }

    /// The 4! permutation of the equatorial edges 0..24.
    fn edge4_perm(&self) -> u32 {
        let e_layer = (self.edge_bitmask(3) & 0xfff) as u32;
        // The 0xa000 xor cancels the low bits of the pseudo-edges 12..=15.
        let e4 = (self.edge_bitmask(0) as u32 ^ 0xa000) | ((self.edge_bitmask(1) as u32) << 12);
        rank_4perm_oddeven(pext_u32(e4, e_layer | (e_layer << 12)) as u8)
    }

    /// The 8C4 U/D-face edge combination 0..70.
    fn edge_ud4_comb(&self) -> u32 {
        let e_layer = (self.edge_bitmask(3) & 0xfff) as u32;
        let d_layer = self.edge_bitmask(2) as u32;
        rank_8c4((pext_u32(d_layer, e_layer ^ 0xfff) & 0xff) as u8)
    }
}

impl Cube {
    pub const IDENTITY: Cube = Cube {
        e: lanes::EDGE_IDENTITY,
        c: lanes::CORNER_IDENTITY,
    };

    /// Build a cube from the packed 64-bit literal form: corner slots 0..=7,
    /// edge slots 8..=11 (with padding high bytes implied), edge slots 0..=7.
    pub const fn from_literal(corners: u64, edges_high: u64, edges_low: u64) -> Cube {
        let el = edges_low.to_le_bytes();
        let eh = (0x0f0e_0d0c_0000_0000_u64 | edges_high).to_le_bytes();
        let cl = corners.to_le_bytes();
        let ch = 0x0f0e_0d0c_0b0a_0908_u64.to_le_bytes();
        let mut e = [0u8; 16];
        let mut c = [0u8; 16];
        let mut i = 0;
        while i < 8 {
            e[i] = el[i];
            e[i + 8] = eh[i];
            c[i] = cl[i];
            c[i + 8] = ch[i];
            i += 1;
        }
        Cube {
            e: u8x16::from_array(e),
            c: u8x16::from_array(c),
        }
    }

    /// Composition "self then o". With `mirror`, corner twist subtracts
    /// instead of adds; use it when the left operand is an odd symmetry.
    #[inline]
    pub fn compose(self, o: Cube, mirror: bool) -> Cube {
        Cube {
            e: lanes::edge_compose(self.e, o.e),
            c: lanes::corner_compose(self.c, o.c, mirror),
        }
    }

    /// Group inverse.
    #[inline]
    pub fn inverse(self) -> Cube {
        Cube {
            e: lanes::edge_invert(self.e),
            c: lanes::corner_invert(self.c),
        }
    }

    /// Apply face turn `m` (0..18).
    #[inline]
    pub fn moved(self, m: u8) -> Cube {
        self.compose(tables::tables().moves[m as usize], false)
    }

    /// Apply face turn `m` from the left.
    #[inline]
    pub fn premoved(self, m: u8) -> Cube {
        tables::tables().moves[m as usize].compose(self, false)
    }

    /// Conjugate by symmetry `s` (0..48): `sym[s]^-1 * self * sym[s]`,
    /// with mirror composition when `s` is a reflection (low bit set).
    #[inline]
    pub fn sym_conjugate(self, s: u8) -> Cube {
        let t = tables::tables();
        let mirror = s & 1 != 0;
        t.sym[t.sym_inv[s as usize] as usize]
            .compose(self, mirror)
            .compose(t.sym[s as usize], mirror)
    }

    /// Parity of the combined edge and corner permutation.
    pub fn parity(&self) -> bool {
        let e = self.e.to_array();
        let c = self.c.to_array();
        let mut ep = [0u8; 12];
        let mut cp = [0u8; 8];
        for i in 0..12 {
            ep[i] = e[i] & 0x0f;
        }
        for i in 0..8 {
            cp[i] = c[i] & 0x07;
        }
        perm_parity(&ep) ^ perm_parity(&cp)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&self.e.to_array());
        out[16..].copy_from_slice(&self.c.to_array());
        out
    }

    fn edges_low(&self) -> u64 {
        u64::from_le_bytes(self.e.to_array()[..8].try_into().unwrap())
    }

    fn edges_high(&self) -> u64 {
        u64::from_le_bytes(self.e.to_array()[8..].try_into().unwrap())
    }

    fn corners(&self) -> u64 {
        u64::from_le_bytes(self.c.to_array()[..8].try_into().unwrap())
    }

    /// Corner orientation without parity reduction: a 16-bit integer with a
    /// 2-bit twist field per corner slot.
    pub fn corner_orient_raw(&self) -> u16 {
        lanes::corner_orient_raw(self.c)
    }

    /// Corner orientation coordinate 0..2187 (first corner implied).
    pub fn corner_orient(&self) -> u32 {
        lanes::corner_orient(self.c)
    }

    /// Set the corner orientation coordinate 0..2187.
    pub fn set_corner_orient(&mut self, corient: u32) -> &mut Self {
        let mut arr = self.c.to_array();
        let mut rem = corient;
        let mut sum = 0;
        for slot in arr.iter_mut().take(8).skip(1) {
            let d = rem % 3;
            rem /= 3;
            sum += d;
            *slot = (*slot & 0x0f) | ((d as u8) << 4);
        }
        arr[0] = (arr[0] & 0x0f) | ((((3 - sum % 3) % 3) as u8) << 4);
        self.c = u8x16::from_array(arr);
        self
    }

    /// Full 8! corner permutation coordinate 0..40320.
    pub fn corner_perm(&self) -> u32 {
        let mut table: u32 = 0x7654_3210;
        let mut cperm: u32 = 0;
        let mut c = self.corners() << 2;
        for i in 0..7 {
            let shift = (c & 0x3c) as u32;
            cperm = cperm * (8 - i) + ((table >> shift) & 0xf);
            table = table.wrapping_sub(0x1111_1110_u32.wrapping_shl(shift));
            c >>= 8;
        }
        cperm
    }

    /// Set the corner permutation 0..40320 and reset corner orientation.
    pub fn set_corner_perm(&mut self, cperm: u32) -> &mut Self {
        const FC: [u32; 7] = [5040, 720, 120, 24, 6, 2, 1];
        let mut table: u32 = 0x7654_3210;
        let mut c = [0u8; 16];
        for i in 0..7 {
            let shift = cperm / FC[i] % (8 - i as u32) * 4;
            c[i as usize] = ((table >> shift) & 0xf) as u8;
            table ^= (table ^ (table >> 4)) & (u32::MAX << shift);
        }
        c[7] = (table & 0xf) as u8;
        for i in 8..16 {
            c[i] = i as u8;
        }
        self.c = u8x16::from_array(c);
        self
    }

    /// Full 12! edge permutation coordinate 0..479001600.
    pub fn edge_perm(&self) -> u32 {
        let mut table: u64 = 0xba98_7654_3210;
        let mut eperm: u64 = 0;
        let mut e = self.edges_low() << 2;
        for i in 0..8 {
            let shift = (e & 0x3c) as u32;
            eperm = eperm * (12 - i) + ((table >> shift) & 0xf);
            table = table.wrapping_sub(0x1111_1111_1110_u64.wrapping_shl(shift));
            e >>= 8;
        }
        e = self.edges_high() << 2;
        for i in 8..11 {
            let shift = (e & 0x3c) as u32;
            eperm = eperm * (12 - i) + ((table >> shift) & 0xf);
            table = table.wrapping_sub(0x1111_1111_1110_u64.wrapping_shl(shift));
            e >>= 8;
        }
        eperm as u32
    }

    /// Set the edge permutation 0..479001600 and reset edge orientation.
    pub fn set_edge_perm(&mut self, eperm: u32) -> &mut Self {
        const FC: [u32; 11] = [
            39_916_800, 3_628_800, 362_880, 40_320, 5040, 720, 120, 24, 6, 2, 1,
        ];
        let mut table: u64 = 0xba98_7654_3210;
        let mut e = [0u8; 16];
        // First digit needs no modulus.
        let mut shift = eperm / FC[0] * 4;
        e[0] = ((table >> shift) & 0xf) as u8;
        table ^= (table ^ (table >> 4)) & (u64::MAX << shift);
        for i in 1..11u32 {
            shift = eperm / FC[i as usize] % (12 - i) * 4;
            e[i as usize] = ((table >> shift) & 0xf) as u8;
            table ^= (table ^ (table >> 4)) & (u64::MAX << shift);
        }
        e[11] = (table & 0xf) as u8;
        for i in 12..16 {
            e[i] = i as u8;
        }
        self.e = u8x16::from_array(e);
        self
    }

    /// The 8C4 U/D-face corner combination 0..70.
    pub fn corner4_comb(&self) -> u32 {
        rank_8c4((lanes::bitmask(self.c, 2) & 0xff) as u8)
    }

    /// Set a representative corner combination 0..70: the selected slots get
    /// the D-face corners in order, the rest the U-face corners in order,
    /// all twists zero.
    pub fn set_corner4_comb(&mut self, c4comb: u32) -> &mut Self {
        let mask = unrank_8c4(c4comb) as u64;
        let corners = pdep_u64(mask, 0x0404_0404_0404_0404);
        let fill_mask = (corners >> 1) | (corners >> 2);
        let fill =
            pdep_u64(0xe4, fill_mask) | pdep_u64(0xe4, fill_mask ^ 0x0303_0303_0303_0303);
        self.c = Self::corner_lane(corners | fill);
        self
    }

    /// Set a representative U/D edge combination 0..70; the equatorial slice
    /// is reset to identity.
    pub fn set_edge_ud4_comb(&mut self, eud4comb: u32) -> &mut Self {
        let mask = unrank_8c4(eud4comb) as u64;
        let edges = pdep_u64(mask, 0x0404_0404_0404_0404);
        let fill_mask = (edges >> 1) | (edges >> 2);
        let fill =
            pdep_u64(0xe4, fill_mask) | pdep_u64(0xe4, fill_mask ^ 0x0303_0303_0303_0303);
        self.e = Self::edge_lane(edges | fill, 0x0b0a_0908);
        self
    }

    /// Set a representative equatorial combination 0..495.
    pub fn set_edge4_comb(&mut self, e4comb: u32) -> &mut Self {
        let mask = unrank_12c4(e4comb) as u64;
        // Work in nibbles first: the selected slots get bit 3 (E-slice
        // cubies are 8..=11), then both classes are filled in ascending
        // order before widening nibbles to bytes.
        let edges = pdep_u64(mask, 0x8888_8888_8888);
        let fill_mask = (edges >> 1) | (edges >> 2) | (edges >> 3);
        let fill = pdep_u64(0o7654_3210, fill_mask)
            | pdep_u64(0o7654_3210, fill_mask ^ 0x7777_7777_7777);
        let edges = edges | fill;
        let lo = pdep_u64(edges, 0x0f0f_0f0f_0f0f_0f0f);
        let hi = pdep_u64(edges >> 32, 0x0f0f_0f0f_0f0f_0f0f);
        self.e = Self::edge_lane(lo, hi);
        self
    }

    /// Set a representative equatorial permutation 0..24.
    pub fn set_edge4_perm(&mut self, e4perm: u32) -> &mut Self {
        self.set_edge_perm(e4perm)
    }

    fn edge_lane(low: u64, high: u64) -> u8x16 {
        let mut arr = [0u8; 16];
        arr[..8].copy_from_slice(&low.to_le_bytes());
        arr[8..].copy_from_slice(&(high | 0x0f0e_0d0c_0000_0000).to_le_bytes());
        u8x16::from_array(arr)
    }

    fn corner_lane(low: u64) -> u8x16 {
        let mut arr = [0u8; 16];
        arr[..8].copy_from_slice(&low.to_le_bytes());
        arr[8..].copy_from_slice(&0x0f0e_0d0c_0b0a_0908_u64.to_le_bytes());
        u8x16::from_array(arr)
    }
}

impl Default for Cube {
    fn default() -> Self {
        Cube::IDENTITY
    }
}

impl EdgeOps for Cube {
    fn edge_bitmask(&self, bit: u8) -> u16 {
        lanes::bitmask(self.e, bit)
    }

    fn xor_edge_orient(&mut self, mask: u16) {
        self.e = lanes::xor_edge_orient(self.e, mask);
    }
}

impl std::ops::Mul for Cube {
    type Output = Cube;
    fn mul(self, o: Cube) -> Cube {
        self.compose(o, false)
    }
}

/// Mirror composition: corner twist subtracts. Used when the left operand
/// has passed through an odd symmetry.
impl std::ops::Rem for Cube {
    type Output = Cube;
    fn rem(self, o: Cube) -> Cube {
        self.compose(o, true)
    }
}

impl std::ops::Not for Cube {
    type Output = Cube;
    fn not(self) -> Cube {
        self.inverse()
    }
}

impl PartialOrd for Cube {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic order over the 32-byte representation.
impl Ord for Cube {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl fmt::Debug for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.e.to_array();
        let c = self.c.to_array();
        let mut ep = [0u8; 12];
        let mut eo = [0u8; 12];
        let mut cp = [0u8; 8];
        let mut co = [0u8; 8];
        for i in 0..12 {
            ep[i] = e[i] & 0x0f;
            eo[i] = e[i] >> 4;
        }
        for i in 0..8 {
            cp[i] = c[i] & 0x07;
            co[i] = c[i] >> 4;
        }
        f.debug_struct("Cube")
            .field("ep", &ep)
            .field("eo", &eo)
            .field("cp", &cp)
            .field("co", &co)
            .finish()
    }
}

impl EdgeCube {
    pub const IDENTITY: EdgeCube = EdgeCube(lanes::EDGE_IDENTITY);

    #[inline]
    pub fn compose(self, o: EdgeCube) -> EdgeCube {
        EdgeCube(lanes::edge_compose(self.0, o.0))
    }

    #[inline]
    pub fn moved(self, m: u8) -> EdgeCube {
        self.compose(EdgeCube::from(tables::tables().moves[m as usize]))
    }

    #[inline]
    pub fn premoved(self, m: u8) -> EdgeCube {
        EdgeCube::from(tables::tables().moves[m as usize]).compose(self)
    }

    /// Conjugate by symmetry `s`. Edge flips are involutions, so the mirror
    /// distinction of the full-cube version does not arise.
    #[inline]
    pub fn sym_conjugate(self, s: u8) -> EdgeCube {
        let t = tables::tables();
        EdgeCube::from(t.sym[t.sym_inv[s as usize] as usize])
            .compose(self)
            .compose(EdgeCube::from(t.sym[s as usize]))
    }
}

impl Default for EdgeCube {
    fn default() -> Self {
        EdgeCube::IDENTITY
    }
}

impl From<Cube> for EdgeCube {
    fn from(c: Cube) -> Self {
        EdgeCube(c.e)
    }
}

impl From<&Cube> for EdgeCube {
    fn from(c: &Cube) -> Self {
        EdgeCube(c.e)
    }
}

impl EdgeOps for EdgeCube {
    fn edge_bitmask(&self, bit: u8) -> u16 {
        lanes::bitmask(self.0, bit)
    }

    fn xor_edge_orient(&mut self, mask: u16) {
        self.0 = lanes::xor_edge_orient(self.0, mask);
    }
}

impl std::ops::Mul for EdgeCube {
    type Output = EdgeCube;
    fn mul(self, o: EdgeCube) -> EdgeCube {
        self.compose(o)
    }
}

impl fmt::Debug for EdgeCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0.to_array();
        let mut ep = [0u8; 12];
        let mut eo = [0u8; 12];
        for i in 0..12 {
            ep[i] = e[i] & 0x0f;
            eo[i] = e[i] >> 4;
        }
        f.debug_struct("EdgeCube")
            .field("ep", &ep)
            .field("eo", &eo)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Position parsers.

/// Slot order of the Singmaster identity string
/// `UF UR UB UL DF DR DB DL FR FL BR BL UFR URB UBL ULF DRF DFL DLB DBR`.
const SM_EDGE_SLOT: [usize; 12] = [1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10];
const SM_CORNER_SLOT: [usize; 8] = [0, 3, 2, 1, 4, 5, 6, 7];

/// Every rotation of every edge/corner name, positioned so that the match
/// offset encodes both the cubie index and its orientation.
const SM_EDGE_LOOKUP: &str = "URU UFU ULU UBU DRD DFD DLD DBD FRF FLF BLB BRB";
const SM_CORNER_LOOKUP: &str =
    "UFRUF   ULFUL   UBLUB   URBUR   DRFDR   DFLDF   DLBDL   DBRDB";

/// Speffz sticker letter -> cubie index / orientation contribution.
const SPEFFZ_C_MAP: [u8; 24] = [
    2, 3, 0, 1, 2, 1, 5, 6, 1, 0, 4, 5, 0, 3, 7, 4, 3, 2, 6, 7, 5, 4, 7, 6,
];
const SPEFFZ_E_MAP: [u8; 24] = [
    3, 0, 1, 2, 2, 9, 6, 10, 1, 8, 5, 9, 0, 11, 4, 8, 3, 10, 7, 11, 5, 4, 7, 6,
];
const SPEFFZ_C_ORI: [u8; 24] = [
    0, 0, 0, 0, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 0, 0, 0, 0,
];
const SPEFFZ_E_ORI: [u8; 24] = [
    0, 0, 0, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 0, 0, 0, 0,
];

impl Cube {
    /// Parse a move sequence loosely; see [`MoveSeq::parse`] for the accepted
    /// forms.
    pub fn from_moves(s: &str) -> Cube {
        Cube::from_movev(&MoveSeq::parse(s))
    }

    /// Apply a list of numeric moves to the identity.
    pub fn from_movev(moves: &[u8]) -> Cube {
        moves.iter().fold(Cube::IDENTITY, |c, &m| c.moved(m))
    }

    /// Parse a position in Singmaster's notation, whose identity is
    /// `UF UR UB UL DF DR DB DL FR FL BR BL UFR URB UBL ULF DRF DFL DLB DBR`.
    pub fn from_singmaster(s: &str) -> Result<Cube, ParseError> {
        let mut e = lanes::EDGE_IDENTITY.to_array();
        let mut c = lanes::CORNER_IDENTITY.to_array();
        let mut edges_todo: u32 = 0xfff;
        let mut corners_todo: u32 = 0xff;
        let (mut e_i, mut c_i) = (0usize, 0usize);
        let (mut eorient_sum, mut corient_sum) = (0u32, 0u32);

        for tok in s.split_whitespace() {
            let tok = tok.to_ascii_uppercase();
            match tok.len() {
                2 => {
                    let offset = SM_EDGE_LOOKUP.find(&tok).ok_or_else(|| {
                        ParseError::UnknownToken {
                            what: "edge",
                            token: tok.clone(),
                        }
                    })?;
                    if e_i >= 12 {
                        return Err(IllegalCube::BadPermutation.into());
                    }
                    let idx = offset >> 2;
                    e[SM_EDGE_SLOT[e_i]] = (idx as u8) | (((offset as u8) & 1) << 4);
                    e_i += 1;
                    edges_todo ^= 1 << idx;
                    eorient_sum += (offset & 1) as u32;
                }
                3 => {
                    let offset = SM_CORNER_LOOKUP.find(&tok).ok_or_else(|| {
                        ParseError::UnknownToken {
                            what: "corner",
                            token: tok.clone(),
                        }
                    })?;
                    if c_i >= 8 {
                        return Err(IllegalCube::BadPermutation.into());
                    }
                    let idx = offset >> 3;
                    c[SM_CORNER_SLOT[c_i]] = (idx as u8) | (((offset as u8) & 3) << 4);
                    c_i += 1;
                    corners_todo ^= 1 << idx;
                    corient_sum += (offset & 3) as u32;
                }
                _ => {
                    return Err(ParseError::UnknownToken {
                        what: "cubie",
                        token: tok,
                    });
                }
            }
        }

        if e_i != 12 || c_i != 8 || edges_todo != 0 || corners_todo != 0 {
            return Err(IllegalCube::BadPermutation.into());
        }
        if eorient_sum % 2 != 0 {
            return Err(IllegalCube::BadEdgeOrient.into());
        }
        if corient_sum % 3 != 0 {
            return Err(IllegalCube::BadCornerOrient.into());
        }

        let cube = Cube {
            e: u8x16::from_array(e),
            c: u8x16::from_array(c),
        };
        if cube.parity() {
            return Err(IllegalCube::BadParity.into());
        }
        Ok(cube)
    }

    /// Parse Speffz blind-solving letter cycles with `A`/`A` buffers,
    /// corners first, a `.` between corners and edges.
    pub fn from_speffz(s: &str) -> Result<Cube, ParseError> {
        Cube::from_speffz_buffers(s, 'A', 'A')
    }

    /// [`Cube::from_speffz`] with explicit corner and edge buffer stickers.
    ///
    /// Lowercase letters swap the named sticker with the buffer; uppercase
    /// letters reorient in place (edges flip, corners twist their U/D
    /// sticker into the named position), adjusting the buffer oppositely.
    /// The description is of the *solution*, so the inverse is returned.
    pub fn from_speffz_buffers(
        s: &str,
        corner_buffer: char,
        edge_buffer: char,
    ) -> Result<Cube, ParseError> {
        let buffer_index = |ch: char| {
            let i = (ch.to_ascii_uppercase() as i32) - ('A' as i32);
            if (0..24).contains(&i) { i as usize } else { 0 }
        };
        let cb = buffer_index(corner_buffer);
        let cb_ori = SPEFFZ_C_ORI[cb];
        let cb = SPEFFZ_C_MAP[cb] as usize;
        let eb = buffer_index(edge_buffer);
        let eb_ori = SPEFFZ_E_ORI[eb];
        let eb = SPEFFZ_E_MAP[eb] as usize;

        let mut e = lanes::EDGE_IDENTITY.to_array();
        let mut c = lanes::CORNER_IDENTITY.to_array();
        let mut parity_ok = true;
        let mut parse_edges = false;

        for ch in s.chars() {
            if ch == '.' {
                parse_edges = true;
            } else if ch.is_ascii_uppercase() && ch <= 'X' {
                let k = (ch as u8 - b'A') as usize;
                if parse_edges {
                    let idx = SPEFFZ_E_MAP[k] as usize;
                    e[eb] ^= 0x10;
                    e[idx] ^= 0x10;
                } else {
                    let idx = SPEFFZ_C_MAP[k] as usize;
                    let ori = (SPEFFZ_C_ORI[k] as u16) << 4;
                    c[cb] = ((c[cb] as u16 + ori) % 0x30) as u8;
                    c[idx] = ((0x30 + c[idx] as u16 - ori) % 0x30) as u8;
                }
            } else if ch.is_ascii_lowercase() && ch <= 'x' {
                let k = (ch as u8 - b'a') as usize;
                if parse_edges {
                    let idx = SPEFFZ_E_MAP[k] as usize;
                    let ori = (SPEFFZ_E_ORI[k] ^ eb_ori) << 4;
                    e.swap(eb, idx);
                    e[eb] ^= ori;
                    e[idx] ^= ori;
                    parity_ok ^= idx != eb;
                } else {
                    let idx = SPEFFZ_C_MAP[k] as usize;
                    let ori = ((SPEFFZ_C_ORI[k] as i16) - (cb_ori as i16)) << 4;
                    c.swap(cb, idx);
                    c[idx] = ((0x30 + c[idx] as i16 + ori) % 0x30) as u8;
                    c[cb] = ((0x30 + c[cb] as i16 - ori) % 0x30) as u8;
                    parity_ok ^= idx != cb;
                }
            }
        }

        if !parity_ok {
            return Err(IllegalCube::BadParity.into());
        }
        let cube = Cube {
            e: u8x16::from_array(e),
            c: u8x16::from_array(c),
        };
        Ok(cube.inverse())
    }
}
