mod common;

use common::{
    check_invariants, corner_transposition, edge_transposition, rand, random_cube, seed_rng,
};
use sixview::tables::{M_U, S_LR2, S_URF3, tables};
use sixview::{
    Cube, EdgeOps, N_C4COMB, N_CORIENT, N_CPERM, N_E4COMB, N_E4ORIENT, N_E4PERM, N_E8ORIENT,
    N_EORIENT, N_EPERM, N_EUD4COMB,
};
use std::collections::HashSet;

const SUPERFLIP: &str = "U R2 F B R B2 R U2 L B2 R U' D' R2 F R' L B2 U2 F2";
const SUPERTWIST: &str = "B2 L R2 B2 F2 D2 U2 R' F2 D U2 B2 F2 L2 R2 U'";

#[test]
fn default_constructor() {
    assert_eq!(std::mem::size_of::<Cube>(), 32);

    let c = Cube::IDENTITY;
    let b = c.to_bytes();
    for (i, &slot) in b.iter().enumerate() {
        assert_eq!(slot, (i % 16) as u8);
    }
    check_invariants(&c);
    assert_eq!(Cube::default(), c);
}

#[test]
fn edge_orient() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.edge_orient(), 0);

    for i in 0..N_EORIENT as u16 {
        let mut c = random_cube();
        c.set_edge_orient(i);
        assert_eq!(c.edge_orient(), i);
        check_invariants(&c);
    }

    // set_edge_orient only affects edge orientation
    for _ in 0..1000 {
        let old = random_cube();
        let mut c = old;
        c.set_edge_orient(c.edge_orient());
        assert_eq!(c, old);
    }
}

#[test]
fn edge4_orient() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.edge4_orient(), 0);

    for i in 0..N_E4ORIENT as u16 {
        let mut c = random_cube();
        c.set_edge4_orient(i);
        assert_eq!(c.edge4_orient(), i);
        check_invariants(&c);
    }

    // Flipping the other eight edges does not affect the coordinate.
    for _ in 0..1000 {
        let c = random_cube();
        let mut e8flip = rand(256) as u16;
        e8flip ^= (e8flip.count_ones() & 1) as u16;
        let mut c_e8flip = Cube::IDENTITY;
        c_e8flip.set_edge_orient(e8flip);
        assert_eq!(c.edge4_orient(), (c_e8flip * c).edge4_orient());
    }

    // set_edge4_orient leaves the orthogonal coordinates alone.
    for _ in 0..1000 {
        let old = random_cube();
        let mut c = old;
        c.set_edge4_orient(c.edge4_orient());
        assert_eq!(c.edge4_orient(), old.edge4_orient());
        assert_eq!(c.edge_perm(), old.edge_perm());
        assert_eq!(c.corner_perm(), old.corner_perm());
        assert_eq!(c.corner_orient(), old.corner_orient());
    }
}

#[test]
fn edge8_orient() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.edge8_orient(), 0);

    for i in 0..N_E8ORIENT as u16 {
        let mut c = random_cube();
        c.set_edge8_orient(i);
        assert_eq!(c.edge8_orient(), i);
        check_invariants(&c);
    }

    // Flipping the equatorial edges does not affect the coordinate.
    for _ in 0..1000 {
        let c = random_cube();
        let mut c_e4flip = Cube::IDENTITY;
        c_e4flip.set_edge_orient((rand(8) << 8) as u16);
        assert_eq!(c.edge8_orient(), (c_e4flip * c).edge8_orient());
    }

    for _ in 0..1000 {
        let old = random_cube();
        let mut c = old;
        c.set_edge8_orient(c.edge8_orient());
        assert_eq!(c.edge8_orient(), old.edge8_orient());
        assert_eq!(c.edge_perm(), old.edge_perm());
        assert_eq!(c.corner_perm(), old.corner_perm());
        assert_eq!(c.corner_orient(), old.corner_orient());
    }
}

#[test]
fn corner_orient() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.corner_orient(), 0);

    for i in 0..N_CORIENT {
        let mut c = random_cube();
        c.set_corner_orient(i);
        assert_eq!(c.corner_orient(), i);
        check_invariants(&c);
    }

    for _ in 0..1000 {
        let old = random_cube();
        let mut c = old;
        c.set_corner_orient(c.corner_orient());
        assert_eq!(c, old);
    }

    // The raw packed form is ordered like the coordinate.
    let mut prev: i32 = -1;
    let mut c = Cube::IDENTITY;
    for i in 0..N_CORIENT {
        c.set_corner_orient(i);
        let cur = c.corner_orient_raw() as i32;
        assert!(prev < cur);
        prev = cur;
    }
}

#[test]
fn edge_perm() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.edge_perm(), 0);

    let mut c = Cube::IDENTITY;
    c.set_edge_perm(N_EPERM - 1);
    assert_eq!(c.edge_perm(), N_EPERM - 1);

    for _ in 0..1000 {
        let eperm = rand(N_EPERM);
        c.set_edge_orient(rand(N_EORIENT) as u16);
        c.set_edge_perm(eperm);
        assert_eq!(c.edge_perm(), eperm);
        assert_eq!(c.edge_orient(), 0);
    }

    // set_edge_perm affects only the edge lane.
    for _ in 0..1000 {
        let old = random_cube();
        let mut c = old;
        let eorient = c.edge_orient();
        c.set_edge_perm(c.edge_perm());
        c.set_edge_orient(eorient);
        assert_eq!(c, old);
    }
}

#[test]
fn corner_perm() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.corner_perm(), 0);

    let mut c = Cube::IDENTITY;
    c.set_corner_perm(N_CPERM - 1);
    assert_eq!(c.corner_perm(), N_CPERM - 1);

    for _ in 0..1000 {
        let cperm = rand(N_CPERM);
        c.set_corner_orient(rand(N_CORIENT));
        c.set_corner_perm(cperm);
        assert_eq!(c.corner_perm(), cperm);
        assert_eq!(c.corner_orient(), 0);
    }

    for _ in 0..1000 {
        let old = random_cube();
        let mut c = old;
        let corient = c.corner_orient();
        c.set_corner_perm(c.corner_perm());
        c.set_corner_orient(corient);
        assert_eq!(c, old);
    }
}

#[test]
fn parity() {
    seed_rng();
    let mut c = Cube::IDENTITY;
    assert!(!c.parity());

    let mut expected = false;
    for _ in 0..1000 {
        let (x, y) = (rand(12) as usize, rand(12) as usize);
        c = c * edge_transposition(x, y);
        expected ^= x != y;
        assert_eq!(c.parity(), expected);

        let (x, y) = (rand(8) as usize, rand(8) as usize);
        c = c * corner_transposition(x, y);
        expected ^= x != y;
        assert_eq!(c.parity(), expected);
    }

    // Orientation does not affect parity.
    for _ in 0..1000 {
        let mut c = random_cube();
        let parity = c.parity();
        c.set_corner_orient(rand(N_CORIENT));
        assert_eq!(c.parity(), parity);
        c.set_edge_orient(rand(N_EORIENT) as u16);
        assert_eq!(c.parity(), parity);
    }

    // Cross-check against a cycle-decomposition reference.
    for _ in 0..1000 {
        let c = random_cube();
        assert_eq!(c.parity(), cycle_parity(&c));
    }
}

/// Reference parity: a permutation's parity is its element count minus its
/// cycle count, mod 2.
fn cycle_parity(c: &Cube) -> bool {
    let b = c.to_bytes();
    let mut parity = 0;
    for (start, len) in [(0usize, 12usize), (16, 8)] {
        let mut seen = [false; 16];
        for i in 0..len {
            if seen[i] {
                continue;
            }
            let mut j = i;
            let mut cycle = 0;
            while !seen[j] {
                seen[j] = true;
                j = (b[start + j] & 0x0f) as usize;
                cycle += 1;
            }
            parity ^= (cycle - 1) & 1;
        }
    }
    parity != 0
}

#[test]
fn parity_swap() {
    seed_rng();
    let mut c = Cube::IDENTITY;
    for _ in 0..1000 {
        // Edge parity flips via "eperm ^= 1".
        let eperm = rand(N_EPERM);
        c.set_edge_perm(eperm);
        let c2 = c * edge_transposition(10, 11);
        assert_eq!(c2.edge_perm(), eperm ^ 1);

        // Corner parity flips via "cperm ^= 1".
        let cperm = rand(N_CPERM);
        c.set_corner_perm(cperm);
        let c2 = c * corner_transposition(6, 7);
        assert_eq!(c2.corner_perm(), cperm ^ 1);
    }
}

#[test]
fn cube_equality_and_order() {
    seed_rng();
    let mut d = random_cube();
    for _ in 0..1000 {
        let c = d;
        assert!(c == c);
        assert!(!(c < c) && !(c > c));
        d = random_cube();
        assert_ne!(c, d, "rolled the same cube twice in a row?");
        assert!((c < d) ^ (d < c));
    }

    let setters: [fn(&mut Cube); 4] = [
        |c| c.set_edge_orient(1),
        |c| {
            c.set_edge_perm(1);
        },
        |c| {
            c.set_corner_orient(1);
        },
        |c| {
            c.set_corner_perm(1);
        },
    ];
    for setter in setters {
        let mut c = Cube::IDENTITY;
        setter(&mut c);
        assert_ne!(c, Cube::IDENTITY);
    }
}

#[test]
fn invert() {
    seed_rng();
    assert_eq!(Cube::IDENTITY, Cube::IDENTITY.inverse());

    for _ in 0..1000 {
        let c = random_cube();
        let ci = c.inverse();
        assert_eq!(c * ci, Cube::IDENTITY);
        assert_eq!(ci * c, Cube::IDENTITY);
        check_invariants(&ci);
    }
}

#[test]
fn symmetry_group() {
    let t = tables();

    let unique: HashSet<Cube> = t.sym.iter().copied().collect();
    assert_eq!(unique.len(), 48, "symmetries are not all unique");

    for i in 0..48 {
        assert_eq!(
            t.sym[i].compose(t.sym[t.sym_inv[i] as usize], i & 1 != 0),
            Cube::IDENTITY
        );
    }

    assert_eq!(t.sym[0], Cube::IDENTITY);

    // S_LR2 is the least significant bit, S_URF3 the most significant.
    for i in 0..48 {
        assert_eq!(t.sym[i] * S_LR2, t.sym[i ^ 1]);
        assert_eq!(S_URF3 * t.sym[i], t.sym[(i + 16) % 48]);
    }

    // Closure.
    for i in 0..48 {
        for j in 0..48 {
            assert!(unique.contains(&t.sym[i].compose(t.sym[j], i & 1 != 0)));
        }
    }

    // Mirroring swaps each face's clockwise and counterclockwise turns.
    let m = &t.moves;
    assert_eq!(m[0], S_LR2 % m[2] % S_LR2);
    assert_eq!(m[3], S_LR2 % m[14] % S_LR2);
    assert_eq!(m[6], S_LR2 % m[8] % S_LR2);
    assert_eq!(m[9], S_LR2 % m[11] % S_LR2);
    assert_eq!(m[12], S_LR2 % m[5] % S_LR2);
    assert_eq!(m[15], S_LR2 % m[17] % S_LR2);
}

#[test]
fn sym_conjugate() {
    seed_rng();
    let t = tables();
    for s in 0..48u8 {
        let c = random_cube();
        let inv = t.sym_inv[s as usize] as usize;
        if s & 1 == 0 {
            assert_eq!(c.sym_conjugate(s), t.sym[inv] * c * t.sym[s as usize]);
        } else {
            assert_eq!(c.sym_conjugate(s), t.sym[inv] % c % t.sym[s as usize]);
        }
    }
}

#[test]
fn moves_table() {
    let t = tables();
    let unique: HashSet<Cube> = t.moves.iter().copied().collect();
    assert_eq!(unique.len(), 18, "moves are not all unique");

    for f in 0..6 {
        assert_eq!(t.moves[3 * f] * t.moves[3 * f], t.moves[3 * f + 1]);
        assert_eq!(t.moves[3 * f + 1] * t.moves[3 * f], t.moves[3 * f + 2]);
    }
    assert_eq!(t.moves[0], M_U);
}

#[test]
fn compose_preserves_invariants() {
    seed_rng();
    for _ in 0..1000 {
        let c = random_cube();
        let d = random_cube();
        check_invariants(&(c * d));
        check_invariants(&(c % d));
    }
}

#[test]
fn move_parse() {
    assert_eq!(Cube::from_moves(""), Cube::IDENTITY);

    let mut superflip = Cube::IDENTITY;
    superflip.set_edge_orient((N_EORIENT - 1) as u16);

    assert_eq!(Cube::from_moves(&format!("{SUPERFLIP}\n")), superflip);
    assert_eq!(
        Cube::from_moves("U1R2F1B1R1B2R1U2L1B2R1U3D3R2F1R3L1B2U2F2"),
        superflip
    );
    assert_eq!(
        Cube::from_moves("URRFBRBBRUULBBRUUUDDDRRFRRRLBBUUFF"),
        superflip
    );
}

#[test]
fn numeric_moves() {
    assert_eq!(Cube::from_movev(&[]), Cube::IDENTITY);
    assert_eq!(
        Cube::from_movev(&[0, 3, 6, 9, 12, 15, 1, 4, 7, 10, 13, 16, 2, 5, 8, 11, 14, 17]),
        Cube::from_moves("URFDLBU2R2F2D2L2B2U'R'F'D'L'B'")
    );
}

#[test]
fn singmaster_parse() {
    assert_eq!(
        Cube::from_singmaster(
            "uf ur ub ul df dr db dl fr fl br bl ufr urb ubl ulf drf dfl dlb dbr"
        )
        .unwrap(),
        Cube::IDENTITY
    );

    // Cube within a cube.
    let c = Cube::from_moves("F L F U' R U F2 L2 U' L' B D' B' L2 U");
    let d = Cube::from_singmaster(
        "UF UR FL FD BR BU DB DL FR RD LU BL UFR FUL FLD FDR BUR BRD DLB BLU\n",
    )
    .unwrap();
    assert_eq!(c, d);

    assert!(Cube::from_singmaster("UF UR").is_err());
    assert!(
        Cube::from_singmaster(
            "uf uf ub ul df dr db dl fr fl br bl ufr urb ubl ulf drf dfl dlb dbr"
        )
        .is_err()
    );
}

#[test]
fn speffz_parse() {
    assert_eq!(Cube::from_speffz("").unwrap(), Cube::IDENTITY);

    // Cube within a cube.
    let c = Cube::from_moves("F L F U' R U F2 L2 U' L' B D' B' L2 U");
    assert_eq!(Cube::from_speffz("lopbip.loteut\n").unwrap(), c);

    // Superflip.
    let c = Cube::from_moves(SUPERFLIP);
    assert_eq!(Cube::from_speffz(".qbmcidejpntrhflkuovgxsw").unwrap(), c);
    assert_eq!(Cube::from_speffz(".BCDKOSGJTFH").unwrap(), c);

    // Supertwist.
    let c = Cube::from_moves(SUPERTWIST);
    assert_eq!(Cube::from_speffz("bqcjdikplgtosh.").unwrap(), c);
    assert_eq!(Cube::from_speffz("MNFPOGH.").unwrap(), c);

    let f = Cube::from_moves("F");

    // Alternate edge buffer.
    assert_eq!(Cube::from_speffz_buffers("pcfup.pcf", 'A', 'U').unwrap(), f);
    // Alternate edge buffer, flipped.
    assert_eq!(Cube::from_speffz_buffers("pcfup.jil", 'A', 'K').unwrap(), f);
    // Alternate edge buffer, in-place flip.
    assert_eq!(
        Cube::from_speffz_buffers(".B", 'A', 'U').unwrap(),
        Cube::from_speffz(".BU").unwrap()
    );
    // Alternate corner buffer.
    assert_eq!(Cube::from_speffz_buffers("mdg.jilkj", 'V', 'A').unwrap(), f);
    // Alternate corner buffer, twisted.
    assert_eq!(Cube::from_speffz_buffers("cfu.jilkj", 'P', 'A').unwrap(), f);
    // Alternate corner buffer, in-place twist.
    assert_eq!(
        Cube::from_speffz_buffers("M", 'V', 'A').unwrap(),
        Cube::from_speffz("MP.").unwrap()
    );
}

#[test]
fn superflip_coordinates() {
    let c = Cube::from_moves(SUPERFLIP);
    assert_eq!(c.edge_perm(), 0, "bad edge perm");
    assert_eq!(c.corner_perm(), 0, "bad corner perm");
    assert_eq!(c.edge_orient(), 0x7ff, "bad edge orient");
    assert_eq!(c.corner_orient(), 0, "bad corner orient");
    assert_eq!(c, c.inverse());
}

#[test]
fn supertwist_coordinates() {
    let c = Cube::from_moves(SUPERTWIST);
    assert_eq!(c.edge_perm(), 0, "bad edge perm");
    assert_eq!(c.corner_perm(), 0, "bad corner perm");
    assert_eq!(c.edge_orient(), 0, "bad edge orient");
    assert_eq!(c.corner_orient_raw(), 0x6699, "bad corner orient");
    assert_eq!(c * c, c.inverse());
}

#[test]
fn corner4_comb() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.corner4_comb(), 0);

    for i in 0..N_C4COMB {
        let mut c = random_cube();
        c.set_corner4_comb(i);
        assert_eq!(c.corner4_comb(), i);
        assert_eq!(c.corner_orient(), 0);
        check_invariants(&c);
    }

    // Cycling the U or D face does not affect the combination.
    for _ in 0..1000 {
        let c = random_cube();
        assert_eq!(c.corner4_comb(), c.premoved(0).corner4_comb());
        assert_eq!(c.corner4_comb(), c.premoved(9).corner4_comb());
    }

    // set_corner4_comb leaves the edge lane alone.
    for _ in 0..1000 {
        let mut c = random_cube();
        let eperm = c.edge_perm();
        let eorient = c.edge_orient();
        c.set_corner4_comb(c.corner4_comb());
        assert_eq!(c.edge_perm(), eperm);
        assert_eq!(c.edge_orient(), eorient);
    }
}

#[test]
fn edge4_comb() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.edge4_comb(), 0);

    for i in 0..N_E4COMB {
        let mut c = random_cube();
        c.set_edge4_comb(i);
        assert_eq!(c.edge4_comb(), i);
        assert_eq!(c.edge_orient(), 0);
        assert_eq!(c.edge_ud4_comb(), 0);
        check_invariants(&c);
    }

    // U and D turns do not affect the combination.
    for _ in 0..1000 {
        let c = random_cube();
        assert_eq!(c.edge4_comb(), c.premoved(0).edge4_comb());
        assert_eq!(c.edge4_comb(), c.premoved(9).edge4_comb());
    }

    // Half turns swap equatorial edges in place.
    for _ in 0..1000 {
        let c = random_cube();
        for m in [4, 7, 13, 16] {
            assert_eq!(c.edge4_comb(), c.premoved(m).edge4_comb());
        }
    }

    // set_edge4_comb leaves the corner lane alone.
    for _ in 0..1000 {
        let mut c = random_cube();
        let cperm = c.corner_perm();
        let corient = c.corner_orient();
        c.set_edge4_comb(c.edge4_comb());
        assert_eq!(c.corner_perm(), cperm);
        assert_eq!(c.corner_orient(), corient);
    }
}

#[test]
fn edge4_perm() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.edge4_perm(), 0);

    for i in 0..N_E4PERM {
        let mut c = random_cube();
        c.set_edge4_perm(i);
        assert_eq!(c.edge4_perm(), i);
        assert_eq!(c.edge4_comb(), 0);
        assert_eq!(c.edge_orient(), 0);
        check_invariants(&c);
    }

    // The permutation part survives any combination placement.
    for _ in 0..1000 {
        let e4comb = rand(N_E4COMB);
        for i in 0..N_E4PERM {
            let mut a = Cube::IDENTITY;
            a.set_edge4_perm(i);
            let mut b = Cube::IDENTITY;
            b.set_edge4_comb(e4comb);
            assert_eq!((a * b).edge4_perm(), i);
        }
    }
}

#[test]
fn edge_ud4_comb() {
    seed_rng();
    assert_eq!(Cube::IDENTITY.edge_ud4_comb(), 0);

    for i in 0..N_EUD4COMB {
        let mut c = random_cube();
        c.set_edge_ud4_comb(i);
        assert_eq!(c.edge_ud4_comb(), i);
        assert_eq!(c.edge_orient(), 0);
        check_invariants(&c);
    }

    for _ in 0..1000 {
        let c = random_cube();
        assert_eq!(c.edge_ud4_comb(), c.premoved(0).edge_ud4_comb());
        assert_eq!(c.edge_ud4_comb(), c.premoved(9).edge_ud4_comb());
    }

    // Interleaving with any equatorial combination preserves the value.
    for i in 0..N_EUD4COMB {
        let mut c_e = Cube::IDENTITY;
        c_e.set_edge4_comb(rand(N_E4COMB));
        let mut c = Cube::IDENTITY;
        c.set_edge_ud4_comb(i);
        assert_eq!((c * c_e).edge_ud4_comb(), i);
    }
}
