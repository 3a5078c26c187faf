/// Recency ordering of active macroblocks, stored as an index-linked list.
///
/// Links live in a flat vector parallel to the macroblock arena, so resizing the arena
/// only requires resizing the link table; no link ever refers to freed memory.
#[derive(Debug, Default)]
pub(super) struct AgeList {
    links: Vec<Link>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

impl AgeList {
    /// Drop every entry and resize the link table.
    pub(super) fn reset(&mut self, slots: usize) {
        self.links.clear();
        self.links.resize(slots, Link::default());
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }

    pub(super) fn contains(&self, slot: usize) -> bool {
        self.links.get(slot).is_some_and(|link| link.linked)
    }

    pub(super) fn is_most_recent(&self, slot: usize) -> bool {
        self.head == Some(slot)
    }

    /// Insert or move `slot` to the most-recently-used end.
    pub(super) fn touch(&mut self, slot: usize) {
        if self.is_most_recent(slot) {
            return;
        }
        if self.contains(slot) {
            self.unlink(slot);
        }
        self.push_front(slot);
    }

    /// Remove and return the least-recently-used slot.
    pub(super) fn pop_oldest(&mut self) -> Option<usize> {
        let slot = self.tail?;
        self.unlink(slot);
        Some(slot)
    }

    /// Iterate from most to least recently used.
    pub(super) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, |&slot| self.links[slot].next)
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        self.links[slot] = Link {
            prev: None,
            next: old_head,
            linked: true,
        };
        match old_head {
            Some(head) => self.links[head].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        self.len += 1;
    }

    fn unlink(&mut self, slot: usize) {
        let Link { prev, next, linked } = self.links[slot];
        if !linked {
            return;
        }
        match prev {
            Some(prev) => self.links[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.links[next].prev = prev,
            None => self.tail = prev,
        }
        self.links[slot] = Link::default();
        self.len -= 1;
    }
}
