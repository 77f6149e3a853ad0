use num_traits::PrimInt;

// TODO: The bulk of these parameters can be deleted and automatically derived when
// generic_const_exprs lands in stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitset<
    StorageType,
    const BIT_WIDTH: usize,
    const SHIFT: usize,
    const STORAGE_WIDTH: usize,
> where
    StorageType: PrimInt,
{
    bitset: [StorageType; STORAGE_WIDTH],
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize>
    Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    pub fn new() -> Self {
        Self {
            bitset: [StorageType::zero(); STORAGE_WIDTH],
        }
    }

    pub fn first_empty(&self) -> Option<usize> {
        for (i, b) in self.bitset.iter().enumerate() {
            if b.is_zero() {
                return Some(i << SHIFT);
            }
            if *b != StorageType::max_value() {
                return Some((i << SHIFT) + b.trailing_ones() as usize);
            }
        }
        None
    }

    #[inline]
    pub fn set(&mut self, pos: usize) {
        assert!(pos < self.capacity());
        let shift: StorageType = StorageType::one() << (pos % BIT_WIDTH);
        self.bitset[pos >> SHIFT] = self.bitset[pos >> SHIFT] | shift;
    }

    #[inline]
    pub fn unset(&mut self, pos: usize) {
        assert!(pos < self.capacity());
        let shift: StorageType = StorageType::one() << (pos % BIT_WIDTH);
        self.bitset[pos >> SHIFT] = self.bitset[pos >> SHIFT] & !shift;
    }

    #[inline]
    pub fn check(&self, pos: usize) -> bool {
        assert!(pos < self.capacity());
        let shift: StorageType = StorageType::one() << (pos % BIT_WIDTH);
        !(self.bitset[pos >> SHIFT] & shift).is_zero()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bitset.fill(StorageType::zero());
    }

    /// Position of the lowest set bit at or above `from`.
    pub fn next_set(&self, from: usize) -> Option<usize> {
        let mut word_idx = from >> SHIFT;
        if word_idx >= STORAGE_WIDTH {
            return None;
        }
        let mut word = self.bitset[word_idx] & (StorageType::max_value() << (from % BIT_WIDTH));
        loop {
            if !word.is_zero() {
                return Some((word_idx << SHIFT) + word.trailing_zeros() as usize);
            }
            word_idx += 1;
            if word_idx >= STORAGE_WIDTH {
                return None;
            }
            word = self.bitset[word_idx];
        }
    }

    /// Position of the highest set bit strictly below `before`.
    pub fn prev_set(&self, before: usize) -> Option<usize> {
        let before = before.min(self.capacity());
        if before == 0 {
            return None;
        }
        let last = before - 1;
        let mut word_idx = last >> SHIFT;
        let bit = last % BIT_WIDTH;
        let mask = if bit == BIT_WIDTH - 1 {
            StorageType::max_value()
        } else {
            (StorageType::one() << (bit + 1)) - StorageType::one()
        };
        let mut word = self.bitset[word_idx] & mask;
        loop {
            if !word.is_zero() {
                return Some((word_idx << SHIFT) + (BIT_WIDTH - 1) - word.leading_zeros() as usize);
            }
            if word_idx == 0 {
                return None;
            }
            word_idx -= 1;
            word = self.bitset[word_idx];
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        STORAGE_WIDTH * BIT_WIDTH
    }
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize> Default
    for Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    fn default() -> Self {
        Self::new()
    }
}

pub type Bitset64<const STORAGE_WIDTH_U64: usize> = Bitset<u64, 64, 6, STORAGE_WIDTH_U64>;
