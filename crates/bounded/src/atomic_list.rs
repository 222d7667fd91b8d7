use super::{
    AtomicArray,
    Index,
};
use core::{
    marker::PhantomData,
    sync::atomic::Ordering,
};

/// Raw link value denoting the end of a list.
pub const NIL: u32 = u32::MAX;

/// Converts a node into its raw link representation.
#[inline]
fn into_link<Node>(node: Node) -> u32
where
    Node: Index,
{
    let index = node.into_index();
    debug_assert!(index < NIL as usize, "node index {} collides with NIL", index);
    index as u32
}

/// Converts a raw link back into a node if it is not `NIL`.
#[inline]
fn from_link<Node>(link: u32) -> Option<Node>
where
    Node: Index,
{
    match link {
        NIL => None,
        link => Some(Node::from_index(link as usize)),
    }
}

/// A family of singly linked lists over a shared node arena.
///
/// Every key owns the head of one list. The next pointers of all lists are
/// stored in a single array indexed by node so that a node can be a member
/// of at most one list at a time.
///
/// [`AtomicLists::push_front`] may be called concurrently from any number of
/// threads. All other mutating operations assume that the lists they touch
/// are not mutated by another thread at the same time.
#[derive(Debug)]
pub struct AtomicLists<Key, Node> {
    heads: AtomicArray<Key>,
    links: AtomicArray<Node>,
    marker: PhantomData<fn() -> (Key, Node)>,
}

impl<Key, Node> Default for AtomicLists<Key, Node> {
    fn default() -> Self {
        Self {
            heads: Default::default(),
            links: Default::default(),
            marker: Default::default(),
        }
    }
}

impl<Key, Node> AtomicLists<Key, Node>
where
    Key: Index,
    Node: Index,
{
    /// Creates `len_keys` empty lists over an arena of `len_nodes` nodes.
    pub fn new(len_keys: usize, len_nodes: usize) -> Self {
        Self {
            heads: AtomicArray::with_len(len_keys, |_| NIL),
            links: AtomicArray::with_len(len_nodes, |_| NIL),
            marker: Default::default(),
        }
    }

    /// Returns the number of lists.
    #[inline]
    pub fn len_keys(&self) -> usize {
        self.heads.len()
    }

    /// Returns the number of nodes in the arena.
    #[inline]
    pub fn len_nodes(&self) -> usize {
        self.links.len()
    }

    /// Pushes `node` to the front of the list owned by `key`.
    ///
    /// This is the classic lock-free stack push: the link of the node is
    /// pointed at the observed head which is then swapped for the node as
    /// long as no other thread changed the head in between.
    ///
    /// # Panics
    ///
    /// If `key` or `node` is out of bounds.
    pub fn push_front(&self, key: Key, node: Node) {
        let head = self.heads.cell(key);
        let link = self.links.cell(node);
        let new_head = into_link(node);
        let mut current = head.load(Ordering::Relaxed);
        loop {
            link.store(current, Ordering::Relaxed);
            match head.compare_exchange_weak(
                current,
                new_head,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns the first node of the list owned by `key` if any.
    #[inline]
    pub fn first(&self, key: Key) -> Option<Node> {
        from_link(self.heads.cell(key).load(Ordering::Acquire))
    }

    /// Returns the node following `node` in its list if any.
    #[inline]
    pub fn next(&self, node: Node) -> Option<Node> {
        from_link(self.links.load(node))
    }

    /// Returns `true` if the list owned by `key` is empty.
    #[inline]
    pub fn is_empty(&self, key: Key) -> bool {
        self.first(key).is_none()
    }

    /// Returns an iterator over the nodes of the list owned by `key`.
    pub fn iter(&self, key: Key) -> ListIter<Key, Node> {
        ListIter {
            lists: self,
            current: self.first(key),
        }
    }

    /// Detaches the whole list owned by `key` and returns an iterator over it.
    ///
    /// The list of `key` is empty afterwards. The iterator reads the link of
    /// a node before yielding it so yielded nodes may be pushed onto other
    /// lists right away.
    pub fn take(&self, key: Key) -> ListIter<Key, Node> {
        let first = self.heads.cell(key).swap(NIL, Ordering::AcqRel);
        ListIter {
            lists: self,
            current: from_link(first),
        }
    }

    /// Replaces the list owned by `key` with the given nodes in order.
    ///
    /// # Note
    ///
    /// The nodes must not be members of any other list.
    pub fn relink<I>(&self, key: Key, nodes: I)
    where
        I: IntoIterator<Item = Node>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut head = NIL;
        for node in nodes.into_iter().rev() {
            self.links.store(node, head);
            head = into_link(node);
        }
        self.heads.cell(key).store(head, Ordering::Release);
    }
}

/// Iterator over the nodes of a single list.
#[derive(Debug)]
pub struct ListIter<'a, Key, Node> {
    lists: &'a AtomicLists<Key, Node>,
    current: Option<Node>,
}

impl<'a, Key, Node> Iterator for ListIter<'a, Key, Node>
where
    Key: Index,
    Node: Index,
{
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = self.lists.next(node);
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::Arc,
        thread,
    };

    #[test]
    fn push_front_prepends() {
        let lists = AtomicLists::<usize, usize>::new(2, 4);
        assert!(lists.is_empty(0));
        lists.push_front(0, 1);
        lists.push_front(0, 3);
        lists.push_front(1, 2);
        assert_eq!(lists.iter(0).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(lists.iter(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(lists.first(0), Some(3));
        assert_eq!(lists.next(3), Some(1));
        assert_eq!(lists.next(1), None);
    }

    #[test]
    fn take_allows_moving_nodes_while_iterating() {
        let lists = AtomicLists::<usize, usize>::new(2, 3);
        for node in 0..3 {
            lists.push_front(0, node);
        }
        for node in lists.take(0) {
            lists.push_front(1, node);
        }
        assert!(lists.is_empty(0));
        assert_eq!(lists.iter(1).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn relink_sets_order() {
        let lists = AtomicLists::<usize, usize>::new(1, 5);
        lists.push_front(0, 4);
        lists.push_front(0, 0);
        lists.push_front(0, 2);
        let mut nodes = lists.iter(0).collect::<Vec<_>>();
        nodes.sort_unstable();
        lists.relink(0, nodes);
        assert_eq!(lists.iter(0).collect::<Vec<_>>(), vec![0, 2, 4]);
        lists.relink(0, Vec::new());
        assert!(lists.is_empty(0));
    }

    #[test]
    fn concurrent_push_front_loses_no_node() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 500;
        let lists = Arc::new(AtomicLists::<usize, usize>::new(
            1,
            THREADS * PER_THREAD,
        ));
        let handles = (0..THREADS)
            .map(|thread| {
                let lists = Arc::clone(&lists);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        lists.push_front(0, thread * PER_THREAD + i);
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        let mut nodes = lists.iter(0).collect::<Vec<_>>();
        nodes.sort_unstable();
        assert_eq!(nodes, (0..THREADS * PER_THREAD).collect::<Vec<_>>());
    }
}
