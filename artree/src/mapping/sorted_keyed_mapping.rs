use std::mem::MaybeUninit;

use crate::mapping::NodeMapping;
use crate::utils::u8_keys::{
    u8_keys_find_insert_position_sorted, u8_keys_find_key_position_sorted,
    u8_keys_position_after, u8_keys_position_before,
};

/// Maps a key to a node, using a sorted array of keys and a corresponding array of nodes.
/// Presence of a key at a position means there is a node at the same position in children.
/// Only the first `num_children` positions are occupied; the rest hold 255 and uninitialised
/// children.
/// By keeping nodes in a sorted array, lookups are a linear scan for width 4 and a binary (or
/// SIMD) search for width 16, and in-order iteration is just a walk of the array.
/// When an item is inserted or deleted the items to the right of it are shifted, in order to
/// keep the array sorted and dense.
pub struct SortedKeyedMapping<N, const WIDTH: usize> {
    pub(crate) keys: [u8; WIDTH],
    pub(crate) children: [MaybeUninit<N>; WIDTH],
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for SortedKeyedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> SortedKeyedMapping<N, WIDTH> {
    #[inline]
    pub fn new() -> Self {
        Self {
            keys: [255; WIDTH],
            children: [const { MaybeUninit::uninit() }; WIDTH],
            num_children: 0,
        }
    }

    #[inline]
    fn child_at(&self, idx: usize) -> (u8, &N) {
        debug_assert!(idx < self.num_children as usize);
        (self.keys[idx], unsafe { self.children[idx].assume_init_ref() })
    }
}

impl<N, const WIDTH: usize> NodeMapping<N, WIDTH> for SortedKeyedMapping<N, WIDTH> {
    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        let num_children = self.num_children as usize;
        assert!(num_children < WIDTH, "add_child: no space left");
        debug_assert!(self.seek_child(key).is_none(), "add_child: duplicate key {key}");

        let idx = u8_keys_find_insert_position_sorted(key, &self.keys, num_children);
        for i in (idx..num_children).rev() {
            self.keys[i + 1] = self.keys[i];
            self.children[i + 1] = std::mem::replace(&mut self.children[i], MaybeUninit::uninit());
        }
        self.keys[idx] = key;
        self.children[idx].write(node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(unsafe { self.children[idx].assume_init_ref() })
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(unsafe { self.children[idx].assume_init_mut() })
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let num_children = self.num_children as usize;
        let idx = u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, num_children)?;

        // Remove the value.
        let node = std::mem::replace(&mut self.children[idx], MaybeUninit::uninit());

        // Shift keys and children to the left.
        for i in idx..num_children - 1 {
            self.keys[i] = self.keys[i + 1];
            self.children[i] = std::mem::replace(&mut self.children[i + 1], MaybeUninit::uninit());
        }
        self.keys[num_children - 1] = 255;
        self.num_children -= 1;

        // Return what we deleted.
        Some(unsafe { node.assume_init() })
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    fn next_child(&self, key: Option<u8>) -> Option<(u8, &N)> {
        let num_children = self.num_children as usize;
        let idx = u8_keys_position_after(key, &self.keys, num_children);
        (idx < num_children).then(|| self.child_at(idx))
    }

    fn prev_child(&self, key: Option<u8>) -> Option<(u8, &N)> {
        let idx = u8_keys_position_before(key, &self.keys, self.num_children as usize);
        (idx > 0).then(|| self.child_at(idx - 1))
    }

    fn move_into<const DEST_WIDTH: usize, M: NodeMapping<N, DEST_WIDTH>>(&mut self, dest: &mut M) {
        let num_children = self.num_children as usize;
        // Zero the count first, so a panic in `dest` leaks rather than double-drops.
        self.num_children = 0;
        for i in 0..num_children {
            let child = std::mem::replace(&mut self.children[i], MaybeUninit::uninit());
            dest.add_child(self.keys[i], unsafe { child.assume_init() });
            self.keys[i] = 255;
        }
    }
}

impl<N, const WIDTH: usize> Drop for SortedKeyedMapping<N, WIDTH> {
    fn drop(&mut self) {
        for value in &mut self.children[..self.num_children as usize] {
            unsafe { value.assume_init_drop() }
        }
        self.num_children = 0;
    }
}
