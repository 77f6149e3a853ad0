use crate::mapping::NodeMapping;
use crate::utils::bitarray::BitArray;

/// One slot per possible key byte.
pub struct DirectMapping<N> {
    pub(crate) children: BitArray<N, 256, 4>,
    num_children: usize,
}

impl<N> Default for DirectMapping<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectMapping<N> {
    pub fn new() -> Self {
        Self {
            children: BitArray::new(),
            num_children: 0,
        }
    }
}

impl<N> NodeMapping<N, 256> for DirectMapping<N> {
    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        if self.children.set(key as usize, node).is_none() {
            self.num_children += 1;
        }
    }

    #[inline]
    fn seek_child(&self, key: u8) -> Option<&N> {
        self.children.get(key as usize)
    }

    #[inline]
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        self.children.get_mut(key as usize)
    }

    #[inline]
    fn delete_child(&mut self, key: u8) -> Option<N> {
        let n = self.children.erase(key as usize);
        if n.is_some() {
            self.num_children -= 1;
        }
        n
    }

    #[inline]
    fn num_children(&self) -> usize {
        self.num_children
    }

    fn next_child(&self, key: Option<u8>) -> Option<(u8, &N)> {
        let from = key.map_or(0, |k| k as usize + 1);
        let key = self.children.next_occupied(from)?;
        Some((key as u8, &self.children[key]))
    }

    fn prev_child(&self, key: Option<u8>) -> Option<(u8, &N)> {
        let before = key.map_or(256, |k| k as usize);
        let key = self.children.prev_occupied(before)?;
        Some((key as u8, &self.children[key]))
    }

    fn move_into<const DEST_WIDTH: usize, M: NodeMapping<N, DEST_WIDTH>>(&mut self, dest: &mut M) {
        let mut next = self.children.next_occupied(0);
        while let Some(key) = next {
            if let Some(node) = self.children.erase(key) {
                dest.add_child(key as u8, node);
            }
            next = self.children.next_occupied(key + 1);
        }
        self.num_children = 0;
    }
}
