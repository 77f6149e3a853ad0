use crate::mapping::NodeMapping;
use crate::utils::bitarray::BitArray;

/// A mapping from keys to separate child pointers.
///
/// `child_ptr_indexes` is indexed by key byte and holds the slot in `children` where that key's
/// node lives; its bitset doubles as the presence map, so ordered scans walk it rather than the
/// children.
pub struct IndexedMapping<N, const WIDTH: usize, const BITWIDTH: usize> {
    child_ptr_indexes: BitArray<u8, 256, 4>,
    children: BitArray<N, WIDTH, BITWIDTH>,
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize, const BITWIDTH: usize> Default for IndexedMapping<N, WIDTH, BITWIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize, const BITWIDTH: usize> IndexedMapping<N, WIDTH, BITWIDTH> {
    pub fn new() -> Self {
        Self {
            child_ptr_indexes: BitArray::new(),
            children: BitArray::new(),
            num_children: 0,
        }
    }

    #[inline]
    fn child_for(&self, key: usize) -> (u8, &N) {
        let pos = self.child_ptr_indexes[key];
        (key as u8, &self.children[pos as usize])
    }
}

impl<N, const WIDTH: usize, const BITWIDTH: usize> NodeMapping<N, WIDTH>
    for IndexedMapping<N, WIDTH, BITWIDTH>
{
    fn add_child(&mut self, key: u8, node: N) {
        let Some(pos) = self.children.first_free_pos() else {
            panic!("add_child: no space left");
        };
        debug_assert!(self.child_ptr_indexes.get(key as usize).is_none());
        self.child_ptr_indexes.set(key as usize, pos as u8);
        self.children.set(pos, node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let pos = self.child_ptr_indexes.get(key as usize)?;
        self.children.get(*pos as usize)
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let pos = self.child_ptr_indexes.get(key as usize)?;
        self.children.get_mut(*pos as usize)
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let pos = self.child_ptr_indexes.erase(key as usize)?;

        let old = self.children.erase(pos as usize);
        self.num_children -= 1;

        // Return what we deleted.
        old
    }

    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    fn next_child(&self, key: Option<u8>) -> Option<(u8, &N)> {
        let from = key.map_or(0, |k| k as usize + 1);
        let key = self.child_ptr_indexes.next_occupied(from)?;
        Some(self.child_for(key))
    }

    fn prev_child(&self, key: Option<u8>) -> Option<(u8, &N)> {
        let before = key.map_or(256, |k| k as usize);
        let key = self.child_ptr_indexes.prev_occupied(before)?;
        Some(self.child_for(key))
    }

    fn move_into<const DEST_WIDTH: usize, M: NodeMapping<N, DEST_WIDTH>>(&mut self, dest: &mut M) {
        let mut next = self.child_ptr_indexes.next_occupied(0);
        while let Some(key) = next {
            if let Some(pos) = self.child_ptr_indexes.erase(key) {
                if let Some(node) = self.children.erase(pos as usize) {
                    dest.add_child(key as u8, node);
                }
            }
            next = self.child_ptr_indexes.next_occupied(key + 1);
        }
        self.num_children = 0;
    }
}
