pub mod direct_mapping;
pub mod indexed_mapping;
pub mod sorted_keyed_mapping;

/// Byte-keyed child storage for one inner node layout.
///
/// Callers are responsible for never adding a key that is already present, and for never adding
/// to a mapping that is already at `width()`; nodes grow before that happens.
pub trait NodeMapping<N, const NUM_CHILDREN: usize> {
    fn add_child(&mut self, key: u8, node: N);
    fn seek_child(&self, key: u8) -> Option<&N>;
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N>;
    fn delete_child(&mut self, key: u8) -> Option<N>;
    fn num_children(&self) -> usize;

    /// The child with the smallest key strictly greater than `key`; the smallest key overall
    /// when `key` is `None`.
    fn next_child(&self, key: Option<u8>) -> Option<(u8, &N)>;

    /// The child with the largest key strictly smaller than `key`; the largest key overall when
    /// `key` is `None`.
    fn prev_child(&self, key: Option<u8>) -> Option<(u8, &N)>;

    /// Moves every child into `dest` in ascending key order, leaving `self` empty.
    fn move_into<const DEST_WIDTH: usize, M: NodeMapping<N, DEST_WIDTH>>(&mut self, dest: &mut M);

    fn width(&self) -> usize {
        NUM_CHILDREN
    }

    fn is_full(&self) -> bool {
        self.num_children() >= self.width()
    }

    fn first_child(&self) -> Option<(u8, &N)> {
        self.next_child(None)
    }

    fn last_child(&self) -> Option<(u8, &N)> {
        self.prev_child(None)
    }
}
