//! IDA* over the six-view with bidirectional pathmax.
//!
//! The search expands either forward moves or premoves at every node,
//! whichever side branches less (the inverse views make premoves exactly as
//! cheap to prune as moves). Deep positions fall back to a queue over the
//! 43,239 depth-4 seeds, re-ordered between iterations so the densest
//! subtrees are searched first.

use crate::coord::EdgeCoord;
use crate::cube::Cube;
use crate::cube6::Cube6;
use crate::error::SolveNotFound;
use crate::moveseq::MoveSeq;
use crate::prune::Prune;
use crate::tables::NO_FACE;
use crate::N_MOVES;
use log::debug;
use std::collections::HashSet;

/// Moves allowed after pruning axes: indexed by a 3-bit mask of axes whose
/// bound already equals the limit.
const AXIS_MASK_EXPAND: [u32; 8] = [
    0o777777, 0o770770, 0o707707, 0o700700, 0o077077, 0o070070, 0o007007, 0o000000,
];

/// Canonical successors of a move on the given face; index 6 is "none".
const LAST_FACE_MASK: [u32; 7] = [
    0o777770, 0o777707, 0o777077, 0o770770, 0o707707, 0o077077, 0o777777,
];

struct Seed {
    c6: Cube6,
    /// The four prefix moves, packed one per byte, first move in the high
    /// byte.
    moves: u32,
    last_face: u8,
}

/// All cubes exactly four moves from the identity. Built once at startup
/// and shared read-only between solvers.
pub struct Depth4 {
    seeds: Vec<Seed>,
}

impl Depth4 {
    pub fn new() -> Depth4 {
        let mut seen: HashSet<Cube> = HashSet::new();
        seen.insert(Cube::IDENTITY);
        let mut prev = vec![Seed {
            c6: Cube6::new(Cube::IDENTITY),
            moves: 0,
            last_face: NO_FACE,
        }];
        for _ in 0..4 {
            let mut next = Vec::new();
            for q in &prev {
                for m in 0..N_MOVES {
                    let c6 = q.c6.moved(m);
                    if seen.insert(c6[0]) {
                        next.push(Seed {
                            c6,
                            moves: (q.moves << 8) | m as u32,
                            last_face: m / 3,
                        });
                    }
                }
            }
            prev = next;
        }
        debug_assert_eq!(prev.len(), 43239);
        Depth4 { seeds: prev }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

impl Default for Depth4 {
    fn default() -> Self {
        Depth4::new()
    }
}

#[derive(Copy, Clone, Default)]
struct Order {
    idx: u16,
    density: u16,
}

pub struct Solver<'a, E: EdgeCoord, const BASE: u8> {
    prune: &'a Prune<E, BASE>,
    seeds: &'a Depth4,
    moves: Vec<u8>,
    n_expands: u64,
}

impl<'a, E: EdgeCoord, const BASE: u8> Solver<'a, E, BASE> {
    pub fn new(prune: &'a Prune<E, BASE>, seeds: &'a Depth4) -> Self {
        Solver {
            prune,
            seeds,
            moves: Vec::with_capacity(24),
            n_expands: 0,
        }
    }

    /// Node expansions of the previous solve.
    #[must_use]
    pub fn cost(&self) -> u64 {
        self.n_expands
    }

    /// Find an optimal solution of at most `limit` moves.
    pub fn solve(&mut self, c6: &Cube6, limit: u8) -> Result<MoveSeq, SolveNotFound> {
        self.moves.clear();
        self.n_expands = 0;

        let mut len = None;
        let limit1 = limit.min(BASE + 4);
        let mut d = self.prune.initial_depth(c6);
        while d <= limit1 {
            debug!("searching depth {d}");
            if self.search(c6, d, NO_FACE, NO_FACE, None) == 0 {
                len = Some(d);
                break;
            }
            d += 1;
        }

        let len = match len {
            Some(len) => len,
            None => self
                .queue_search(c6, BASE + 5, limit)
                .ok_or(SolveNotFound { limit })?,
        };

        debug_assert_eq!(self.moves.len(), len as usize);
        Ok(self.collect_moves(len))
    }

    /// Returns 0 when solved (recording the move trail), otherwise an
    /// improved lower bound for this node.
    fn search(
        &mut self,
        c6: &Cube6,
        mut max_depth: u8,
        last_face: u8,
        last_face_r: u8,
        skip: Option<(usize, u8)>,
    ) -> u8 {
        if max_depth == 0 {
            return u8::from(*c6 != Cube::IDENTITY);
        }

        let (prune, prune_vals, axis_mask) = self.prune.lookup(c6, max_depth, skip);
        if prune > max_depth {
            return prune;
        }
        max_depth -= 1;
        self.n_expands += 1;

        let mut mask_f =
            AXIS_MASK_EXPAND[(axis_mask >> 3) as usize] & LAST_FACE_MASK[last_face as usize];
        let mut mask_r =
            AXIS_MASK_EXPAND[(axis_mask & 7) as usize] & LAST_FACE_MASK[last_face_r as usize];

        // Expand the direction with the smaller branching factor; tiebreak
        // toward the side with the larger summed bounds.
        let mut dir = mask_r.count_ones() as i32 - mask_f.count_ones() as i32;
        if dir == 0 {
            let sum = ((prune_vals >> 8) & 0xf00f)
                + ((prune_vals >> 4) & 0xf00f)
                + (prune_vals & 0xf00f);
            dir = (sum & 0xfff) as i32 - (sum >> 12) as i32;
        }

        if dir > 0 {
            while mask_f != 0 {
                let m = mask_f.trailing_zeros() as u8;
                mask_f &= mask_f - 1;

                let face = m / 3;
                let axis = (face + u8::from(face > 2)) & 3;
                // A forward move on this axis leaves the matching inverse
                // view's bound unchanged; hand it down instead of refetching.
                let skip_idx = (axis + 3) as usize;
                let val = ((prune_vals >> (4 * skip_idx)) & 0xf) as u8;

                let sol = self.search(&c6.moved(m), max_depth, face, last_face_r, Some((skip_idx, val)));
                if sol > max_depth + 2 {
                    // Pathmax: the child's bound already rules out the
                    // grandparent.
                    return sol - 1;
                } else if sol == max_depth + 2 {
                    mask_f &= !(0o7u32 << (3 * face));
                } else if sol == 0 {
                    self.moves.push(m);
                    return 0;
                }
            }
        } else {
            while mask_r != 0 {
                let m = mask_r.trailing_zeros() as u8;
                mask_r &= mask_r - 1;

                let face = m / 3;
                let axis = (face + u8::from(face > 2)) & 3;
                let skip_idx = axis as usize;
                let val = ((prune_vals >> (4 * skip_idx)) & 0xf) as u8;

                let sol =
                    self.search(&c6.premoved(m), max_depth, last_face, face, Some((skip_idx, val)));
                if sol > max_depth + 2 {
                    return sol - 1;
                } else if sol == max_depth + 2 {
                    mask_r &= !(0o7u32 << (3 * face));
                } else if sol == 0 {
                    self.moves.push(0x80 | m);
                    return 0;
                }
            }
        }

        prune + u8::from(prune == 0)
    }

    /// Deep-threshold search seeded with every depth-4 prefix. Between
    /// iterations the seeds are radix-sorted by a density estimate so the
    /// most promising subtrees go first.
    fn queue_search(&mut self, c6: &Cube6, depth: u8, limit: u8) -> Option<u8> {
        struct Entry {
            c6: Cube6,
            moves: u32,
            last_face: u8,
        }
        let queue: Vec<Entry> = self
            .seeds
            .seeds
            .iter()
            .map(|q| Entry {
                c6: *c6 * q.c6,
                moves: q.moves,
                last_face: q.last_face,
            })
            .collect();

        let mut order: Vec<Order> = (0..queue.len())
            .map(|i| Order {
                idx: i as u16,
                density: 0,
            })
            .collect();
        let mut order_new = vec![Order::default(); order.len()];
        let mut hist0 = [0u32; 256];
        let mut hist1 = [0u32; 256];

        for d in depth..=limit {
            debug!("queue search depth {d}");
            hist0.fill(0);
            hist1.fill(0);
            for o in &mut order {
                let q = &queue[o.idx as usize];
                let old_cost = self.n_expands;
                let prune = self.search(&q.c6, d - 4, q.last_face, NO_FACE, None);
                if prune == 0 {
                    let mut prefix = q.moves;
                    for _ in 0..4 {
                        self.moves.push((prefix & 0xff) as u8);
                        prefix >>= 8;
                    }
                    return Some(d);
                }

                // 58206:47525 approximates sqrt(3):sqrt(2), the ratio of
                // canonical sequences starting with U/R/F versus D/L/B.
                const RATIO: [u64; 2] = [58206, 47525];
                let density =
                    ((self.n_expands - old_cost) * RATIO[usize::from(q.last_face < 3)]) as f32;
                o.density = !((density.to_bits() >> 15) as u16);
                hist0[(o.density & 0xff) as usize] += 1;
                hist1[(o.density >> 8) as usize] += 1;
            }

            // Two-pass LSB radix sort into ascending key order (keys are
            // inverted densities).
            let (mut sum0, mut sum1) = (0u32, 0u32);
            for i in 0..256 {
                std::mem::swap(&mut sum0, &mut hist0[i]);
                sum0 += hist0[i];
                std::mem::swap(&mut sum1, &mut hist1[i]);
                sum1 += hist1[i];
            }
            for &o in &order {
                let k = (o.density & 0xff) as usize;
                order_new[hist0[k] as usize] = o;
                hist0[k] += 1;
            }
            for &o in &order_new {
                let k = (o.density >> 8) as usize;
                order[hist1[k] as usize] = o;
                hist1[k] += 1;
            }
        }

        None
    }

    /// Unwind the recorded trail: forward moves fill from the front,
    /// premoves from the back.
    fn collect_moves(&self, len: u8) -> MoveSeq {
        let mut m = vec![0u8; len as usize];
        let mut fi = 0;
        let mut ri = len as usize;
        for &mv in self.moves[..len as usize].iter().rev() {
            if mv & 0x80 != 0 {
                ri -= 1;
                m[ri] = mv ^ 0x80;
            } else {
                m[fi] = mv;
                fi += 1;
            }
        }
        MoveSeq(m)
    }
}
