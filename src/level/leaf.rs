//! BSP leaves and their precomputed mutual-visibility bits.

use crate::math::Aabb;

/// Fixed-length bit vector, one bit per leaf.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeafBits {
    words: Vec<u64>,
    len: usize,
}

impl LeafBits {
    /// All-clear bit vector of `len` bits
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Bit vector with exactly the given indices set. Indices `>= len` are dropped.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut bits = Self::new(len);
        for i in indices {
            bits.set(i);
        }
        bits
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set bit `i`; out-of-range indices are ignored
    pub fn set(&mut self, i: usize) {
        if i < self.len {
            self.words[i >> 6] |= 1 << (i & 63);
        }
    }

    pub fn get(&self, i: usize) -> bool {
        i < self.len && self.words[i >> 6] & (1 << (i & 63)) != 0
    }

    /// Indices of set bits in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut word = word;
            std::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let bit = word.trailing_zeros() as usize;
                word &= word - 1;
                Some(w * 64 + bit)
            })
        })
    }

    /// True if any leaf index in `leaves` is set
    pub fn any_of(&self, leaves: &[usize]) -> bool {
        leaves.iter().any(|&l| self.get(l))
    }
}

/// A convex cell of the level.
#[derive(Clone, Debug)]
pub struct Leaf {
    pub bounds: Aabb,
    /// Leaves potentially visible from anywhere inside this one
    pub visible_leaves: LeafBits,
    /// Face indices owned by this leaf
    pub faces: Vec<usize>,
}

/// The level's leaves. Immutable after load.
#[derive(Clone, Debug, Default)]
pub struct LeafGraph {
    leaves: Vec<Leaf>,
}

impl LeafGraph {
    pub fn new(leaves: Vec<Leaf>) -> Self {
        Self { leaves }
    }

    /// Graph with no compiled visibility
    pub fn empty() -> Self {
        Self::default()
    }

    /// False when the source level was never vis-compiled
    pub fn is_compiled(&self) -> bool {
        !self.leaves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn leaf(&self, index: usize) -> Option<&Leaf> {
        self.leaves.get(index)
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Indices of leaves whose bounds overlap `bounds`, ascending
    pub fn overlapping(&self, bounds: &Aabb) -> Vec<usize> {
        self.leaves
            .iter()
            .enumerate()
            .filter(|(_, leaf)| leaf.bounds.intersects(bounds))
            .map(|(i, _)| i)
            .collect()
    }

    /// Union of every leaf's bounds
    pub fn bounds(&self) -> Option<Aabb> {
        self.leaves
            .iter()
            .map(|l| l.bounds)
            .reduce(|a, b| a.merged(&b))
    }
}
