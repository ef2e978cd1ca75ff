//! The nxopt pruning table.
//!
//! Indexed first by corner sym-coordinate (9,930 classes under the
//! 16-element U/D-axis subgroup), then by edge coordinate. Entries are two
//! bits: 0 means "depth is at most BASE, consult the stripe minimum"; 1 and
//! 2 mean BASE+1 and BASE+2. Each 16-byte stripe covers 64 entries and
//! donates its first two entry slots to a 4-bit minimum-depth nibble.

use crate::coord::{CornerCoord, EdgeCoord};
use crate::cube::{Cube, EdgeCube};
use crate::cube6::Cube6;
use crate::error::TableError;
use crate::generator;
use crate::{N_C4COMB, N_CORIENT, N_CORNER_SYM};
use log::{debug, info};
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::Write;
use std::marker::PhantomData;
use std::path::Path;
use std::time::Instant;

/// Offset of a raw corner coordinate within its sym-class row block, and the
/// symmetry that maps the cube onto the class representative.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct OffsetSym {
    pub offset: u8,
    pub sym: u8,
}

#[derive(Copy, Clone, Default)]
struct IndexEntry {
    /// Lowest sym-coordinate for this corner orientation.
    base: u16,
    /// Which deduplicated offset-sym array this orientation uses.
    os: u16,
}

/// Maps raw corner coordinates to sym-coordinates. Built once at startup in
/// O(N_CORIENT * N_C4COMB) representative searches.
pub(crate) struct SymIndex {
    /// The per-c4comb offset/symmetry arrays deduplicate to 139 patterns.
    os_unique: Vec<[OffsetSym; N_C4COMB as usize]>,
    index: Vec<IndexEntry>,
}

impl SymIndex {
    pub fn new() -> SymIndex {
        let start = Instant::now();
        let mut os_unique: Vec<[OffsetSym; N_C4COMB as usize]> = Vec::new();
        let mut index = vec![IndexEntry::default(); N_CORIENT as usize];
        let mut next_symcoord: u16 = 0;

        for corient in 0..N_CORIENT {
            let mut c = Cube::IDENTITY;
            c.set_corner_orient(corient);
            let corient_s = CornerCoord::rep(&c).0.corner_orient();

            // A new representative orientation claims fresh sym-coordinates;
            // the rest alias their representative's block.
            let base = if corient == corient_s {
                next_symcoord
            } else {
                index[corient_s as usize].base
            };

            let mut os_tmp = [OffsetSym::default(); N_C4COMB as usize];
            let mut offset: u8 = 0;
            for c4comb in 0..N_C4COMB {
                c.set_corner4_comb(c4comb);
                c.set_corner_orient(corient);

                let (rep, sym) = CornerCoord::rep(&c);
                let c4comb_s = rep.corner4_comb() as usize;
                os_tmp[c4comb as usize].sym = sym;
                os_tmp[c4comb as usize].offset = if corient != corient_s {
                    os_unique[index[corient_s as usize].os as usize][c4comb_s].offset
                } else if c4comb as usize != c4comb_s {
                    os_tmp[c4comb_s].offset
                } else {
                    let o = offset;
                    offset += 1;
                    o
                };
            }
            next_symcoord += offset as u16;

            let os = os_unique
                .iter()
                .position(|u| *u == os_tmp)
                .unwrap_or_else(|| {
                    os_unique.push(os_tmp);
                    os_unique.len() - 1
                });
            index[corient as usize] = IndexEntry {
                base,
                os: os as u16,
            };
        }

        debug_assert_eq!(next_symcoord as u32, N_CORNER_SYM);
        debug!(
            "corner sym-index: {} classes, {} offset-sym patterns ({:.3}s)",
            next_symcoord,
            os_unique.len(),
            start.elapsed().as_secs_f64()
        );
        SymIndex { os_unique, index }
    }

    #[inline]
    pub fn lookup(&self, c: &Cube) -> (u16, OffsetSym) {
        let entry = &self.index[c.corner_orient() as usize];
        let os = self.os_unique[entry.os as usize][c.corner4_comb() as usize];
        (entry.base + os.offset as u16, os)
    }

    pub fn sym_coord(&self, c: &Cube) -> u16 {
        self.lookup(c).0
    }

    pub fn unique_os_count(&self) -> usize {
        self.os_unique.len()
    }

    /// One cube per sym-class, ordered by sym-coordinate.
    pub fn corner_representatives(&self) -> Vec<Cube> {
        let mut cv = Vec::with_capacity(N_CORNER_SYM as usize);
        for corient in 0..N_CORIENT {
            let entry = &self.index[corient as usize];
            for c4comb in 0..N_C4COMB {
                if self.os_unique[entry.os as usize][c4comb as usize].sym == 0 {
                    let mut c = Cube::IDENTITY;
                    c.set_corner4_comb(c4comb);
                    c.set_corner_orient(corient);
                    cv.push(c);
                }
            }
        }
        cv
    }
}

/// Backing storage for the table: generated in-process or mapped read-only
/// from a file.
pub(crate) enum TableMemory {
    Owned(Box<[u8]>),
    Mapped(Mmap),
}

impl std::ops::Deref for TableMemory {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            TableMemory::Owned(b) => b,
            TableMemory::Mapped(m) => m,
        }
    }
}

struct Prefetch<'a> {
    edge: u32,
    stripe: &'a [u8],
}

impl Prefetch<'_> {
    #[inline]
    fn fetch<const BASE: u8>(&self) -> u8 {
        let octet = self.stripe[(self.edge as usize / 4) % 16];
        let shift = (self.edge % 4) * 2;
        let val = (octet >> shift) & 3;
        if val != 0 {
            BASE + val
        } else {
            self.stripe[0] & 0xf
        }
    }
}

#[inline]
fn prefetch_hint(p: *const u8) {
    #[cfg(target_arch = "x86_64")]
    // SAFETY: prefetch is a hint; any address is allowed.
    unsafe {
        use std::arch::x86_64::{_MM_HINT_T0, _mm_prefetch};
        _mm_prefetch::<_MM_HINT_T0>(p.cast::<i8>());
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = p;
}

/// A pruning table for one edge-coordinate variant and base depth.
pub struct Prune<E: EdgeCoord, const BASE: u8> {
    index: SymIndex,
    mem: TableMemory,
    _marker: PhantomData<E>,
}

impl<E: EdgeCoord, const BASE: u8> Prune<E, BASE> {
    /// Bytes per sym-class row.
    pub const STRIDE: usize = 16 * E::N_EDGE_STRIPE as usize;

    /// Total table size in bytes.
    #[must_use]
    pub fn size() -> u64 {
        Self::STRIDE as u64 * N_CORNER_SYM as u64
    }

    /// Generate the table in memory with `workers` threads.
    pub fn generate(workers: usize) -> Self {
        let index = SymIndex::new();
        let mem = generator::generate::<E, BASE>(&index, workers);
        Prune {
            index,
            mem: TableMemory::Owned(mem),
            _marker: PhantomData,
        }
    }

    /// Map an existing table file read-only. Fails if the file is missing or
    /// has the wrong size.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.into(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| TableError::Io {
                path: path.into(),
                source,
            })?
            .len();
        if len != Self::size() {
            return Err(TableError::WrongSize {
                path: path.into(),
                actual: len,
                expected: Self::size(),
            });
        }
        // SAFETY: the mapping is read-only and the file is never truncated
        // by this process while mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| TableError::Alloc {
            path: path.into(),
            size: Self::size(),
            source,
        })?;
        info!(
            "loaded pruning table {} ({} bytes)",
            path.display(),
            Self::size()
        );
        Ok(Prune {
            index: SymIndex::new(),
            mem: TableMemory::Mapped(mmap),
            _marker: PhantomData,
        })
    }

    /// Write the table atomically: temp file in the same directory, then
    /// rename over the target.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let io_err = |source| TableError::Io {
            path: path.into(),
            source,
        };
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(io_err)?;
            }
        }
        let tmp = path.with_extension("tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(&self.mem).map_err(io_err)?;
        f.sync_all().map_err(io_err)?;
        drop(f);
        fs::rename(&tmp, path).map_err(io_err)?;
        info!(
            "saved pruning table {} ({} bytes)",
            path.display(),
            Self::size()
        );
        Ok(())
    }

    fn prefetch(&self, c: &Cube) -> Prefetch<'_> {
        let (sym_coord, os) = self.index.lookup(c);
        let edge = E::encode(&EdgeCube::from(c), os.sym);
        let offset = sym_coord as usize * Self::STRIDE + 16 * (edge as usize / 64);
        let stripe = &self.mem[offset..offset + 16];
        prefetch_hint(stripe.as_ptr());
        Prefetch { edge, stripe }
    }

    /// Look up all six views. Returns `(prune, prune_vals, axis_mask)`:
    /// the overall lower bound, the six 4-bit values packed low-to-high, and
    /// one bit per view whose value equals `limit`. Exits early (with
    /// partial `prune_vals` and a zero `axis_mask`) as soon as any bound
    /// exceeds `limit`. `skip` carries a view index whose value the caller
    /// already knows.
    pub fn lookup(&self, c6: &Cube6, limit: u8, skip: Option<(usize, u8)>) -> (u8, u32, u8) {
        let skip_idx = skip.map_or(usize::MAX, |(i, _)| i);
        let pre: [Option<Prefetch>; 6] =
            std::array::from_fn(|i| (i != skip_idx).then(|| self.prefetch(&c6[i])));

        let mut prune = [0u8; 6];
        if let Some((i, val)) = skip {
            prune[i] = val;
        }

        for i in 0..3 {
            if i != skip_idx {
                prune[i] = pre[i].as_ref().unwrap().fetch::<BASE>();
                if prune[i] > limit {
                    return (prune[i], 0, 0);
                }
            }
        }

        let mut prune_vals =
            (prune[0] as u32) | ((prune[1] as u32) << 4) | ((prune[2] as u32) << 8);
        if prune_vals == 0 {
            // All three conjugate views sit on the identity entry; the
            // heuristic has nothing to say.
            return (0, 0, 0);
        }

        // If the three views agree on a single value v, the bound improves
        // to v + 1: set the bit above the lowest set bit and take the
        // highest.
        let mut cmp0: u32 = (1 << prune[0]) | (1 << prune[1]) | (1 << prune[2]);
        cmp0 |= (cmp0 & cmp0.wrapping_neg()) << 1;
        let prune0 = (31 - cmp0.leading_zeros()) as u8;
        if prune0 > limit {
            return (prune0, prune_vals, 0);
        }

        for i in 3..6 {
            if i != skip_idx {
                prune[i] = pre[i].as_ref().unwrap().fetch::<BASE>();
                if prune[i] > limit {
                    return (prune[i], prune_vals, 0);
                }
            }
        }

        prune_vals |= ((prune[3] as u32) << 12) | ((prune[4] as u32) << 16)
            | ((prune[5] as u32) << 20);

        let mut cmp1: u32 = (1 << prune[3]) | (1 << prune[4]) | (1 << prune[5]);
        cmp1 |= (cmp1 & cmp1.wrapping_neg()) << 1;
        let prune1 = (31 - cmp1.leading_zeros()) as u8;
        if prune1 > limit {
            return (prune1, prune_vals, 0);
        }

        let mut axis_mask = 0u8;
        for (i, &p) in prune.iter().enumerate() {
            axis_mask |= u8::from(p == limit) << i;
        }

        (prune0.max(prune1), prune_vals, axis_mask)
    }

    /// The heuristic for the root: the largest of the six bounds.
    pub fn initial_depth(&self, c6: &Cube6) -> u8 {
        self.lookup(c6, u8::MAX, None).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sym_index_cardinalities() {
        let index = SymIndex::new();
        assert_eq!(index.corner_representatives().len(), N_CORNER_SYM as usize);
        assert_eq!(index.unique_os_count(), 139);
    }

    #[test]
    fn sym_coord_of_identity_is_zero() {
        let index = SymIndex::new();
        assert_eq!(index.sym_coord(&Cube::IDENTITY), 0);
    }
}
