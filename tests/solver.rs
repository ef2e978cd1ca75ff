mod common;

use common::{random_cube, seed_rng};
use sixview::coord::{Ecoord, Eo4, Ep1};
use sixview::prune::Prune;
use sixview::solver::{Depth4, Solver};
use sixview::{Cube, Cube6, MoveSeq};

// The smallest table variant keeps these tests self-contained: EP1 x EO4 at
// base 7 is ~20 MiB and generates in a few minutes of debug-build time,
// which is why the whole suite is opt-in via --ignored.
type SmallCoord = Ecoord<Ep1, Eo4>;
const SMALL_BASE: u8 = 7;

fn workers() -> usize {
    std::thread::available_parallelism().map_or(1, usize::from)
}

fn assert_solves(c: Cube, solution: &MoveSeq) {
    let solved = solution.iter().fold(c, |acc, &m| acc.moved(m));
    assert_eq!(solved, Cube::IDENTITY, "solution does not solve the cube");
}

#[test]
#[ignore = "generates a 20 MiB pruning table"]
fn solver_end_to_end() {
    seed_rng();
    let prune = Prune::<SmallCoord, SMALL_BASE>::generate(workers());
    let seeds = Depth4::new();
    let mut solver = Solver::new(&prune, &seeds);

    // The identity solves to the empty sequence.
    let empty = solver.solve(&Cube6::new(Cube::IDENTITY), 20).unwrap();
    assert_eq!(empty.len(), 0);

    // The table entry for the identity is exact.
    assert_eq!(prune.initial_depth(&Cube6::new(Cube::IDENTITY)), 0);

    // A single move solves in one move.
    for m in ["U", "R'", "F2", "D", "L", "B'"] {
        let c = Cube::from_moves(m);
        let solution = solver.solve(&Cube6::new(c), 20).unwrap();
        assert_eq!(solution.len(), 1, "wrong length for {m}");
        assert_solves(c, &solution);
    }

    // Short scrambles solve optimally and verifiably.
    for (scramble, optimal) in [
        ("U R", 2),
        ("U R F", 3),
        ("U R2 F' D", 4),
        ("U R2 F' D L2", 5),
        ("U R2 F' D L2 B", 6),
    ] {
        let c = Cube::from_moves(scramble);
        let solution = solver.solve(&Cube6::new(c), 20).unwrap();
        assert!(
            solution.len() <= optimal,
            "suboptimal solution for {scramble}"
        );
        assert_solves(c, &solution);
    }

    // The heuristic is admissible: a k-move scramble never gets a bound
    // above k. (It is deliberately not consistent; the search compensates
    // with pathmax.)
    for _ in 0..200 {
        let k = 1 + fastrand::u8(0..10);
        let mut c = Cube::IDENTITY;
        for _ in 0..k {
            c = c.moved(fastrand::u8(0..18));
        }
        assert!(
            prune.initial_depth(&Cube6::new(c)) <= k,
            "bound overestimates a {k}-move scramble"
        );
    }
}

#[test]
#[ignore = "generates a 20 MiB pruning table and saves/loads it"]
fn table_save_load_round_trip() {
    let prune = Prune::<SmallCoord, SMALL_BASE>::generate(workers());
    let path = std::env::temp_dir().join("sixview_test_tables/nxprune_1_04.dat");
    prune.save(&path).unwrap();

    let loaded = Prune::<SmallCoord, SMALL_BASE>::load(&path).unwrap();
    seed_rng();
    for _ in 0..1000 {
        let c6 = Cube6::new(random_cube());
        assert_eq!(prune.initial_depth(&c6), loaded.initial_depth(&c6));
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
#[ignore = "deep search against the smallest table; very slow"]
fn superflip_solves_in_twenty() {
    let prune = Prune::<SmallCoord, SMALL_BASE>::generate(workers());
    let seeds = Depth4::new();
    let mut solver = Solver::new(&prune, &seeds);

    let c = Cube::from_moves("U R2 F B R B2 R U2 L B2 R U' D' R2 F R' L B2 U2 F2");
    let solution = solver.solve(&Cube6::new(c), 20).unwrap();
    assert_eq!(solution.len(), 20);
    assert_solves(c, &solution);
}
