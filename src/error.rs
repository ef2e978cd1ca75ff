//! Failure kinds exposed by the crate.
//!
//! Group operations on a valid cube are infallible; errors only arise at the
//! edges: parsing positions, persisting pruning tables, and a solver asked
//! for a solution shorter than the optimum.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The parsed position is not a legal cube.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalCube {
    #[error("every edge and corner cubie must appear exactly once")]
    BadPermutation,
    #[error("edge orientation sum is odd")]
    BadEdgeOrient,
    #[error("corner orientation sum is not divisible by 3")]
    BadCornerOrient,
    #[error("edge and corner permutation parities disagree")]
    BadParity,
}

/// The input text cannot be interpreted as a cube position.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unrecognized {what} token `{token}`")]
    UnknownToken { what: &'static str, token: String },
    #[error(transparent)]
    Illegal(#[from] IllegalCube),
}

/// Pruning table persistence and allocation failures.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("pruning table `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pruning table `{path}` is {actual} bytes, expected {expected}")]
    WrongSize {
        path: PathBuf,
        actual: u64,
        expected: u64,
    },
    #[error("cannot map {size} bytes of pruning table `{path}`: {source}")]
    Alloc {
        path: PathBuf,
        size: u64,
        #[source]
        source: io::Error,
    },
}

/// The solver exhausted its depth limit without finding a solution.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no solution within {limit} moves")]
pub struct SolveNotFound {
    pub limit: u8,
}
