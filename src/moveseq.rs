//! Move sequences: loose parsing, canonicalization, formatting.

use itertools::Itertools;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Rendering style for a move sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Style {
    /// `U  R2 F'`
    #[default]
    Singmaster,
    /// `U1R2F3`
    Fixed,
}

/// A sequence of numbered face turns (`3 * face + power`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveSeq(pub Vec<u8>);

impl MoveSeq {
    /// Parse a move sequence loosely; `"U R2 F'"`, `"U1R2F3"` and `"URRFFF"`
    /// are all accepted. Input is not validated; anything unexpected acts as
    /// a delimiter.
    pub fn parse(s: &str) -> MoveSeq {
        let mut moves = Vec::new();
        let mut face: i32 = -1;

        for ch in s.chars() {
            let mut f: i32 = -1;
            let mut power: i32 = -1;
            match ch {
                'u' | 'U' => f = 0,
                'r' | 'R' => f = 3,
                'f' | 'F' => f = 6,
                'd' | 'D' => f = 9,
                'l' | 'L' => f = 12,
                'b' | 'B' => f = 15,
                '3' | '\'' => power = 2,
                '2' => power = 1,
                '1' => power = 0,
                _ => power = 0,
            }

            if f != -1 {
                // Two faces in a row ("UR") flush the previous as a quarter
                // turn.
                if face != -1 {
                    moves.push(face as u8);
                }
                face = f;
            } else if power != -1 && face != -1 {
                moves.push((face + power) as u8);
                face = -1;
            }
        }

        if face != -1 {
            moves.push(face as u8);
        }

        MoveSeq(moves)
    }

    /// Fold adjacent moves on the same axis: per axis, powers sum modulo 4
    /// for each pole, re-emitting at most one move per pole.
    pub fn canonical(&self) -> MoveSeq {
        if self.0.is_empty() {
            return MoveSeq::default();
        }

        let mut canon = self.0.clone();
        // A trailing dummy on a different axis flushes the final run.
        canon.push(canon[canon.len() - 1] + 3);

        let mut out = Vec::with_capacity(self.0.len());
        let mut last_axis = 0u8;
        let mut power = [0u8; 2];
        for m in canon {
            let axis = (m / 3) % 3;
            if axis != last_axis {
                for pole in 0..2u8 {
                    power[pole as usize] %= 4;
                    if power[pole as usize] != 0 {
                        out.push(last_axis * 3 + pole * 9 + power[pole as usize] - 1);
                    }
                    power[pole as usize] = 0;
                }
                last_axis = axis;
            }
            power[usize::from(m >= 9)] += m % 3 + 1;
        }

        MoveSeq(out)
    }

    pub fn to_string_style(&self, style: Style) -> String {
        const FACE: [char; 6] = ['U', 'R', 'F', 'D', 'L', 'B'];
        match style {
            Style::Singmaster => self
                .0
                .iter()
                .map(|&m| {
                    let f = FACE[(m / 3) as usize];
                    match m % 3 {
                        0 => f.to_string(),
                        1 => format!("{f}2"),
                        _ => format!("{f}'"),
                    }
                })
                .join(" "),
            Style::Fixed => self
                .0
                .iter()
                .map(|&m| format!("{}{}", FACE[(m / 3) as usize], m % 3 + 1))
                .join(""),
        }
    }
}

impl fmt::Display for MoveSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_style(Style::Singmaster))
    }
}

impl Deref for MoveSeq {
    type Target = Vec<u8>;
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for MoveSeq {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl From<Vec<u8>> for MoveSeq {
    fn from(v: Vec<u8>) -> Self {
        MoveSeq(v)
    }
}
