//! Cartesian join of per-expression candidates
//!
//! Each expression resolves to a list of candidate value nodes; a query is
//! satisfied by picking one candidate per expression. The join enumerates
//! every such pick, first expression outermost, into one flat buffer of
//! `width` cells per combination (odometer style, no recursion).
//!
//! The number of combinations is the product of the list lengths. Wide `!=`
//! filters over high-cardinality tags grow it multiplicatively.

/// Flat buffer of fixed-width combinations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combinations<T> {
    width: usize,
    cells: Vec<T>,
}

impl<T> Combinations<T> {
    /// Number of elements per combination
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate combinations as slices
    pub fn iter(&self) -> impl Iterator<Item = &[T]> {
        // chunks_exact panics on 0
        self.cells.chunks_exact(self.width.max(1))
    }

    /// Iterate combinations as mutable slices
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut [T]> {
        self.cells.chunks_exact_mut(self.width.max(1))
    }
}

/// Number of combinations `join` would produce, saturating on overflow
pub fn combination_count<T>(candidates: &[Vec<T>]) -> usize {
    if candidates.is_empty() {
        return 0;
    }
    candidates
        .iter()
        .fold(1usize, |acc, list| acc.saturating_mul(list.len()))
}

/// Enumerate every pick of one element per candidate list
///
/// No lists, or any empty list, yields no combinations.
pub fn join<T: Clone>(candidates: &[Vec<T>]) -> Combinations<T> {
    let width = candidates.len();
    let total = combination_count(candidates);

    let mut cells = Vec::with_capacity(total.saturating_mul(width));
    if total == 0 {
        return Combinations { width, cells };
    }

    let mut odometer = vec![0usize; width];
    'outer: loop {
        for (list, &pick) in candidates.iter().zip(&odometer) {
            cells.push(list[pick].clone());
        }

        // Advance, last position fastest
        let mut pos = width;
        loop {
            if pos == 0 {
                break 'outer;
            }
            pos -= 1;
            odometer[pos] += 1;
            if odometer[pos] < candidates[pos].len() {
                break;
            }
            odometer[pos] = 0;
        }
    }

    Combinations { width, cells }
}
