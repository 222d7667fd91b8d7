use crate::Variable;
use bounded::AtomicArray;

/// The active ring of a single component.
///
/// A circular singly linked list of the unassigned variables of the
/// component that have at least one watched literal. The links live in a
/// `next` array shared by all components; the ring itself is identified by
/// its tail, the head being `next(tail)`.
#[derive(Debug)]
pub struct ActiveRing<'a> {
    next: &'a AtomicArray<Variable>,
    tail: Option<Variable>,
}

impl<'a> ActiveRing<'a> {
    /// Links the given variables into a ring in iteration order.
    pub fn new<I>(next: &'a AtomicArray<Variable>, variables: I) -> Self
    where
        I: IntoIterator<Item = Variable>,
    {
        let mut variables = variables.into_iter();
        let head = match variables.next() {
            Some(head) => head,
            None => return Self { next, tail: None },
        };
        let mut tail = head;
        for variable in variables {
            next.store(tail, variable.into_index() as u32);
            tail = variable;
        }
        next.store(tail, head.into_index() as u32);
        Self {
            next,
            tail: Some(tail),
        }
    }

    /// Returns the tail of the ring or `None` if the ring is empty.
    #[inline]
    pub fn tail(&self) -> Option<Variable> {
        self.tail
    }

    /// Makes `variable` the tail of the ring.
    ///
    /// The variable must be a member of the ring.
    #[inline]
    pub fn set_tail(&mut self, variable: Variable) {
        self.tail = Some(variable);
    }

    /// Returns the successor of the variable in the ring.
    #[inline]
    pub fn next(&self, variable: Variable) -> Variable {
        Variable::from_valid_index(self.next.load(variable) as usize)
    }

    /// Removes the successor of `predecessor` from the ring and returns it.
    ///
    /// `predecessor` becomes the new tail unless the ring is empty afterwards.
    pub fn remove_after(&mut self, predecessor: Variable) -> Variable {
        let removed = self.next(predecessor);
        if removed == predecessor {
            self.tail = None;
        } else {
            self.next.store(predecessor, self.next.load(removed));
            self.tail = Some(predecessor);
        }
        removed
    }

    /// Inserts the variable at the head of the ring.
    pub fn push_front(&mut self, variable: Variable) {
        let link = variable.into_index() as u32;
        match self.tail {
            None => {
                self.next.store(variable, link);
                self.tail = Some(variable);
            }
            Some(tail) => {
                self.next.store(variable, self.next.load(tail));
                self.next.store(tail, link);
            }
        }
    }

    /// Returns an iterator over the ring starting at its head.
    #[cfg(test)]
    pub fn iter(&self) -> RingIter<'_, 'a> {
        RingIter {
            ring: self,
            current: self.tail.map(|tail| self.next(tail)),
        }
    }

    /// Returns the number of variables in the ring.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns `true` if the ring is empty.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tail.is_none()
    }
}

/// Iterator over the variables of an active ring, head first.
#[cfg(test)]
#[derive(Debug)]
pub struct RingIter<'r, 'a> {
    ring: &'r ActiveRing<'a>,
    current: Option<Variable>,
}

#[cfg(test)]
impl<'r, 'a> Iterator for RingIter<'r, 'a> {
    type Item = Variable;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = match Some(current) == self.ring.tail {
            true => None,
            false => Some(self.ring.next(current)),
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(index: usize) -> Variable {
        Variable::from_index(index).unwrap()
    }

    fn next_array(len: usize) -> AtomicArray<Variable> {
        AtomicArray::with_len(len, |_| u32::MAX)
    }

    #[test]
    fn ring_links_in_order() {
        let next = next_array(5);
        let ring = ActiveRing::new(&next, vec![x(1), x(3), x(4)]);
        assert_eq!(ring.tail(), Some(x(4)));
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![x(1), x(3), x(4)]);
        assert_eq!(ring.next(x(4)), x(1));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn remove_after_rotates_tail() {
        let next = next_array(4);
        let mut ring = ActiveRing::new(&next, (0..4).map(x));
        assert_eq!(ring.remove_after(x(1)), x(2));
        assert_eq!(ring.tail(), Some(x(1)));
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![x(3), x(0), x(1)]);
        assert_eq!(ring.remove_after(x(1)), x(3));
        assert_eq!(ring.remove_after(x(1)), x(0));
        assert_eq!(ring.remove_after(x(1)), x(1));
        assert!(ring.is_empty());
        assert_eq!(ring.iter().count(), 0);
    }

    #[test]
    fn push_front_inserts_at_head() {
        let next = next_array(4);
        let mut ring = ActiveRing::new(&next, None);
        assert!(ring.is_empty());
        ring.push_front(x(2));
        assert_eq!(ring.tail(), Some(x(2)));
        ring.push_front(x(0));
        ring.push_front(x(3));
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![x(3), x(0), x(2)]);
        assert_eq!(ring.tail(), Some(x(2)));
    }
}
