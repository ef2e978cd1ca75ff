//! Parallel pruning-table generation.
//!
//! The table is filled by breadth-first frontier passes, one per depth, with
//! entries stored modulo 3. Work items are edges of the corner sym-class
//! neighbor graph; a worker owns both endpoint classes of its edge while it
//! expands, so no two threads ever touch the same class row. That scheduling
//! invariant is the entire concurrency story: table writes need no atomics.

use crate::coord::{CornerCoord, EcoordRep, EdgeCoord};
use crate::cube::Cube;
use crate::prune::SymIndex;
use crate::util::even_bits;
use crate::{N_CORNER_SYM, N_MOVES};
use log::info;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

struct Neighbor {
    first: u16,
    second: u16,
    /// Moves taking a `first`-class cube into the `second` class.
    moves: u32,
    /// Moves taking a `second`-class cube into the `first` class.
    moves_inv: u32,
}

#[derive(Copy, Clone)]
struct PassParams {
    /// Per-byte mask that turns 2-bit fields equal to the current frontier
    /// value into 0b11 under xor.
    mod3_mask: u8,
    /// Xor that moves an unvisited field (3) to the next frontier value.
    next_xor: u8,
    /// Xor that moves an untouched stripe-min nibble (0xf) to `depth + 1`.
    depth_xor: u8,
}

struct Sched {
    busy: Vec<bool>,
    done: Vec<bool>,
    found: u64,
}

/// Raw base pointer of the table shared across workers.
///
/// SAFETY: workers only dereference row ranges of sym-classes they have
/// marked busy in the scheduler, so all access is exclusive per class.
struct TablePtr(*mut u8);
unsafe impl Send for TablePtr {}
unsafe impl Sync for TablePtr {}

struct Ctx<'a> {
    table: TablePtr,
    stride: usize,
    index: &'a SymIndex,
    corner_rep: &'a [Cube],
    edge_rep: &'a EcoordRep,
    neighbors: &'a [Neighbor],
    sched: Mutex<Sched>,
    pass: PassParams,
}

pub(crate) fn generate<E: EdgeCoord, const BASE: u8>(
    index: &SymIndex,
    workers: usize,
) -> Box<[u8]> {
    let workers = workers.max(1);
    let stride = 16 * E::N_EDGE_STRIPE as usize;
    let size = stride * N_CORNER_SYM as usize;
    let mut mem = vec![0xffu8; size].into_boxed_slice();

    let edge_rep = EcoordRep::new::<E>();
    let corner_rep = index.corner_representatives();
    let neighbors = build_neighbors(index, &corner_rep);
    info!(
        "generating pruning table: {size} bytes, {} neighbor pairs, {workers} workers",
        neighbors.len()
    );

    // The identity cube: sym-class 0, edge coordinate 2, depth 0. Entry
    // value 0 and stripe-min 0 in one byte.
    mem[0] = 0xc0;
    let mut found: u64 = 1;

    for depth in 0..=(BASE as u32 + 1) {
        // Once the base depth is reached, collapse every visited entry to 0.
        // The last two passes then write the 1 and 2 values on top.
        if depth == BASE as u32 {
            zero_visited(&mut mem);
        }
        let prev_found = found;

        let mod3 = if depth < BASE as u32 {
            (depth % 3) as u8
        } else {
            (depth - BASE as u32) as u8
        };
        let next_xor = ((mod3 + 1) % 3) ^ 3;
        let depth_xor = ((depth + 1) as u8) ^ 0xf;
        let mut spread = mod3;
        spread |= spread << 2;
        spread |= spread << 4;

        let t0 = Instant::now();
        let ctx = Ctx {
            table: TablePtr(mem.as_mut_ptr()),
            stride,
            index,
            corner_rep: &corner_rep,
            edge_rep: &edge_rep,
            neighbors: &neighbors,
            sched: Mutex::new(Sched {
                busy: vec![false; N_CORNER_SYM as usize],
                done: vec![false; neighbors.len()],
                found,
            }),
            pass: PassParams {
                mod3_mask: !spread,
                next_xor,
                depth_xor,
            },
        };

        std::thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| worker::<E>(&ctx));
            }
        });

        found = ctx.sched.into_inner().unwrap().found;
        info!(
            "depth={} found={} ({:.3}s)",
            depth + 1,
            found - prev_found,
            t0.elapsed().as_secs_f64()
        );
    }

    mem
}

fn build_neighbors(index: &SymIndex, corner_rep: &[Cube]) -> Vec<Neighbor> {
    let mut map: BTreeMap<(u16, u16), (u32, u32)> = BTreeMap::new();
    for (idx0, c) in corner_rep.iter().enumerate() {
        let idx0 = idx0 as u16;
        for m in 0..N_MOVES {
            let idx1 = index.sym_coord(&c.moved(m));
            let entry = if idx0 <= idx1 {
                &mut map.entry((idx0, idx1)).or_default().0
            } else {
                &mut map.entry((idx1, idx0)).or_default().1
            };
            *entry |= 1 << m;
        }
    }
    map.into_iter()
        .map(|((first, second), (moves, moves_inv))| Neighbor {
            first,
            second,
            moves,
            moves_inv,
        })
        .collect()
}

/// Collapse every visited 2-bit field to 0, preserving only the unvisited
/// value 3 and each stripe-min nibble.
fn zero_visited(mem: &mut [u8]) {
    for chunk in mem.chunks_exact_mut(16) {
        let min = chunk[0] & 0x0f;
        for half in 0..2 {
            let mut v = u64::from_le_bytes(chunk[half * 8..half * 8 + 8].try_into().unwrap());
            v &= v >> 1;
            v &= 0x5555_5555_5555_5555;
            v |= v << 1;
            chunk[half * 8..half * 8 + 8].copy_from_slice(&v.to_le_bytes());
        }
        chunk[0] |= min;
    }
}

fn worker<E: EdgeCoord>(ctx: &Ctx<'_>) {
    let mut guard = ctx.sched.lock().unwrap();
    loop {
        // Claim the first unfinished pair whose endpoints are idle. A clean
        // scan means every remaining pair is either done or held by another
        // worker, which will pick up the leftovers when it rescans.
        let mut claimed = None;
        for (i, n) in ctx.neighbors.iter().enumerate() {
            if guard.done[i] || guard.busy[n.first as usize] || guard.busy[n.second as usize] {
                continue;
            }
            guard.done[i] = true;
            guard.busy[n.first as usize] = true;
            guard.busy[n.second as usize] = true;
            claimed = Some(n);
            break;
        }
        let Some(n) = claimed else { break };
        drop(guard);

        let this_found = process_pair::<E>(ctx, n);

        guard = ctx.sched.lock().unwrap();
        guard.found += this_found;
        guard.busy[n.first as usize] = false;
        guard.busy[n.second as usize] = false;
    }
}

fn process_pair<E: EdgeCoord>(ctx: &Ctx<'_>, n: &Neighbor) -> u64 {
    let mut found = 0;
    let (mut src, mut dst) = (n.first as usize, n.second as usize);
    let mut c = ctx.corner_rep[src];
    let mut moves = n.moves;
    loop {
        let mut mv = moves;
        while mv != 0 {
            let m = mv.trailing_zeros() as u8;
            mv &= mv - 1;

            // Every symmetry that lands on the goal class representative
            // writes its own image of the frontier.
            let c_m = c.moved(m);
            let (_, os) = ctx.index.lookup(&c_m);
            let goal = CornerCoord::from(&c_m.sym_conjugate(os.sym));
            for sym in 0..16u8 {
                if CornerCoord::from(&c_m.sym_conjugate(sym)) == goal {
                    // SAFETY: this worker holds both classes busy.
                    found += unsafe { generate_corner_pair::<E>(ctx, src, dst, m, sym) };
                }
            }
        }
        if src < dst {
            c = ctx.corner_rep[n.second as usize];
            std::mem::swap(&mut src, &mut dst);
            moves = n.moves_inv;
        } else {
            break;
        }
    }
    found
}

/// Expand the current frontier of class `src` through move `m` and symmetry
/// `sym` into class `dst`.
///
/// SAFETY: the caller must hold exclusive access to both class rows; `src`
/// and `dst` may be the same class.
unsafe fn generate_corner_pair<E: EdgeCoord>(
    ctx: &Ctx<'_>,
    src: usize,
    dst: usize,
    m: u8,
    sym: u8,
) -> u64 {
    let src_row = unsafe { ctx.table.0.add(src * ctx.stride) }.cast_const();
    let dst_row = unsafe { ctx.table.0.add(dst * ctx.stride) };
    let mask = u64::from_le_bytes([ctx.pass.mod3_mask; 8]);
    let mut found = 0;

    for stripe_idx in 0..E::N_EDGE_STRIPE {
        let sp = unsafe { src_row.add(16 * stripe_idx as usize) };
        // Untouched stripes hold no frontier.
        if unsafe { sp.read() } & 0xf == 0xf {
            continue;
        }

        let (high, low, eo) = E::decode(stripe_idx << 6);

        let mut stripe = [0u8; 16];
        unsafe { std::ptr::copy_nonoverlapping(sp, stripe.as_mut_ptr(), 16) };
        let lo = u64::from_le_bytes(stripe[..8].try_into().unwrap());
        let hi = u64::from_le_bytes(stripe[8..].try_into().unwrap());
        // Fields equal to the frontier value become 0b11 under the xor;
        // collapse each pair and gather one bit per entry.
        let cmp_lo = (lo ^ mask) & ((lo ^ mask) >> 1);
        let cmp_hi = (hi ^ mask) & ((hi ^ mask) >> 1);
        let mut bits = (even_bits(cmp_hi) << 32) | even_bits(cmp_lo);
        // Entries 0 and 1 are the stripe-min nibble; entry 63 of the last
        // stripe in each 512-block is past the 12C4 range.
        bits &= if low == 448 {
            0x7fff_ffff_ffff_fffc
        } else {
            0xffff_ffff_ffff_fffc
        };

        while bits != 0 {
            let b = bits.trailing_zeros();
            bits &= bits - 1;

            let rep = ctx.edge_rep.get::<E>(high, low + b, eo);
            let coord = E::encode(&rep.moved(m), sym);

            let sd = unsafe { dst_row.add(16 * (coord as usize / 64)) };
            let octet = unsafe { sd.add((coord as usize / 4) % 16) };
            let shift = (coord % 4) * 2;
            if (unsafe { octet.read() } >> shift) & 3 == 3 {
                unsafe { octet.write(octet.read() ^ (ctx.pass.next_xor << shift)) };
                if unsafe { sd.read() } & 0xf == 0xf {
                    unsafe { sd.write(sd.read() ^ ctx.pass.depth_xor) };
                }
                found += 1;
            }
        }
    }

    found
}
