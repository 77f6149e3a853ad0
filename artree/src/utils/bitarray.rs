use std::mem::MaybeUninit;
use std::ops::Index;

use crate::utils::bitset::Bitset64;

// BITSET_WIDTH must be RANGE_WIDTH / 64, rounded up.
// Once generic_const_exprs is stabilized, we can use that to calculate this from a RANGE_WIDTH.
// Until then, don't mess up.
pub struct BitArray<X, const RANGE_WIDTH: usize, const BITSET_WIDTH: usize> {
    bitset: Bitset64<BITSET_WIDTH>,
    storage: [MaybeUninit<X>; RANGE_WIDTH],
}

impl<X, const RANGE_WIDTH: usize, const BITSET_WIDTH: usize>
    BitArray<X, RANGE_WIDTH, BITSET_WIDTH>
{
    pub fn new() -> Self {
        assert!(BITSET_WIDTH * 64 >= RANGE_WIDTH);

        Self {
            bitset: Bitset64::new(),
            storage: [const { MaybeUninit::uninit() }; RANGE_WIDTH],
        }
    }

    #[inline]
    pub fn first_free_pos(&self) -> Option<usize> {
        self.bitset.first_empty().filter(|pos| *pos < RANGE_WIDTH)
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&X> {
        assert!(pos < RANGE_WIDTH);
        if self.bitset.check(pos) {
            Some(unsafe { self.storage[pos].assume_init_ref() })
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, pos: usize) -> Option<&mut X> {
        assert!(pos < RANGE_WIDTH);
        if self.bitset.check(pos) {
            Some(unsafe { self.storage[pos].assume_init_mut() })
        } else {
            None
        }
    }

    /// Stores `x` at `pos`, returning whatever occupied the slot before.
    #[inline]
    pub fn set(&mut self, pos: usize, x: X) -> Option<X> {
        let old = self.erase(pos);
        self.storage[pos].write(x);
        self.bitset.set(pos);
        old
    }

    #[inline]
    pub fn erase(&mut self, pos: usize) -> Option<X> {
        assert!(pos < RANGE_WIDTH);
        if !self.bitset.check(pos) {
            return None;
        }
        self.bitset.unset(pos);
        let old = std::mem::replace(&mut self.storage[pos], MaybeUninit::uninit());
        Some(unsafe { old.assume_init() })
    }

    /// Lowest occupied position at or above `from`.
    #[inline]
    pub fn next_occupied(&self, from: usize) -> Option<usize> {
        self.bitset.next_set(from).filter(|pos| *pos < RANGE_WIDTH)
    }

    /// Highest occupied position strictly below `before`.
    #[inline]
    pub fn prev_occupied(&self, before: usize) -> Option<usize> {
        self.bitset.prev_set(before.min(RANGE_WIDTH))
    }

    pub fn clear(&mut self) {
        for i in 0..RANGE_WIDTH {
            if self.bitset.check(i) {
                unsafe { self.storage[i].assume_init_drop() }
            }
        }
        self.bitset.clear();
    }
}

impl<X, const RANGE_WIDTH: usize, const BITSET_WIDTH: usize> Default
    for BitArray<X, RANGE_WIDTH, BITSET_WIDTH>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<X, const RANGE_WIDTH: usize, const BITSET_WIDTH: usize> Index<usize>
    for BitArray<X, RANGE_WIDTH, BITSET_WIDTH>
{
    type Output = X;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(x) => x,
            None => panic!("BitArray: no element at position {index}"),
        }
    }
}

impl<X, const RANGE_WIDTH: usize, const BITSET_WIDTH: usize> Drop
    for BitArray<X, RANGE_WIDTH, BITSET_WIDTH>
{
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod test {
    use crate::utils::bitarray::BitArray;

    #[test]
    fn u8_vector() {
        let mut vec: BitArray<u8, 48, 1> = BitArray::new();
        assert_eq!(vec.first_free_pos(), Some(0));
        assert_eq!(vec.set(0, 123), None);
        assert_eq!(vec.first_free_pos(), Some(1));
        assert_eq!(vec.get(0), Some(&123));
        vec.set(1, 124);
        vec.set(2, 55);
        vec.set(3, 126);
        assert_eq!(vec.erase(3), Some(126));
        assert_eq!(vec.first_free_pos(), Some(3));
        vec.erase(0);
        assert_eq!(vec.first_free_pos(), Some(0));
        assert_eq!(vec.next_occupied(0), Some(1));
        assert_eq!(vec.prev_occupied(48), Some(2));
        assert_eq!(vec.set(1, 1), Some(124));
        assert_eq!(vec[2], 55);
    }

    #[test]
    fn full_array_has_no_free_pos() {
        let mut vec: BitArray<usize, 48, 1> = BitArray::new();
        for i in 0..48 {
            vec.set(i, i);
        }
        // The bitset has 64 bits but only 48 of them are usable.
        assert_eq!(vec.first_free_pos(), None);
        assert_eq!(vec.next_occupied(47), Some(47));
        assert_eq!(vec.next_occupied(48), None);
        assert_eq!(vec.prev_occupied(64), Some(47));
    }

    #[test]
    fn ordered_scans() {
        let mut vec: BitArray<Box<u32>, 256, 4> = BitArray::new();
        for i in [3usize, 70, 128, 255] {
            vec.set(i, Box::new(i as u32));
        }
        assert_eq!(vec.next_occupied(0), Some(3));
        assert_eq!(vec.next_occupied(4), Some(70));
        assert_eq!(vec.next_occupied(129), Some(255));
        assert_eq!(vec.prev_occupied(255), Some(128));
        assert_eq!(vec.prev_occupied(3), None);
        let keys: Vec<usize> =
            std::iter::successors(vec.prev_occupied(256), |pos| vec.prev_occupied(*pos)).collect();
        assert_eq!(keys, vec![255, 128, 70, 3]);
        // Boxed contents are dropped by `clear` and `Drop`.
        vec.clear();
        assert_eq!(vec.next_occupied(0), None);
        assert_eq!(vec.first_free_pos(), Some(0));
    }
}
