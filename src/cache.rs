//! Size-bounded cache of lazily produced data blocks.
//!
//! Blocks are grouped into macroblocks of `2^exponent` consecutive indices. A macroblock is
//! the unit of LRU bookkeeping: touching any block moves its whole macroblock to the front of
//! the age list, and aging evicts whole macroblocks from the back. Horizontal scrolling reads
//! long runs of neighbouring indices, so list maintenance is amortized over many blocks while
//! individual blocks are still produced only when first requested.

mod age_list;

use age_list::AgeList;
use tracing::{debug, trace};

/// Produces the blocks stored in a [`DataBlockCache`].
pub trait BlockFactory {
    /// Cached block type.
    type Block;

    /// Produce the block for `index`.
    fn produce_block(&mut self, index: usize) -> Self::Block;

    /// Approximate byte size of a single produced block.
    fn block_size(&self) -> usize;
}

struct Macroblock<B> {
    /// `None` while the macroblock is empty and not present in the age list.
    blocks: Option<Box<[Option<B>]>>,
    /// Bytes accounted for the populated slots.
    bytes: usize,
}

impl<B> Macroblock<B> {
    fn empty() -> Self {
        Self {
            blocks: None,
            bytes: 0,
        }
    }

    /// Free every slot, returning the bytes that were accounted for them.
    fn clear(&mut self) -> usize {
        self.blocks = None;
        std::mem::take(&mut self.bytes)
    }
}

/// Macroblock-grouped LRU cache with a soft byte budget.
pub struct DataBlockCache<F: BlockFactory> {
    macroblocks: Vec<Macroblock<F::Block>>,
    age: AgeList,
    exponent: u32,
    block_count: usize,
    size: usize,
    factory: F,
}

impl<F: BlockFactory> DataBlockCache<F> {
    /// Create an empty cache covering `block_count` blocks in macroblocks of `2^exponent`.
    pub fn new(block_count: usize, exponent: u32, factory: F) -> Self {
        let mut cache = Self {
            macroblocks: Vec::new(),
            age: AgeList::default(),
            exponent,
            block_count: 0,
            size: 0,
            factory,
        };
        cache.allocate(block_count);
        cache
    }

    /// Number of addressable blocks.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Number of blocks in one macroblock.
    pub fn macroblock_size(&self) -> usize {
        1 << self.exponent
    }

    /// Accounted byte size of all populated blocks.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of macroblocks currently holding slots.
    pub fn active_macroblocks(&self) -> usize {
        self.age.len()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Mutable access to the factory.
    ///
    /// Blocks produced before a factory change stay cached until aged or flushed.
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// Whether block `index` is populated, without touching its age.
    pub fn is_cached(&self, index: usize) -> bool {
        self.macroblocks
            .get(index >> self.exponent)
            .and_then(|mb| mb.blocks.as_ref())
            .and_then(|blocks| blocks.get(index & (self.macroblock_size() - 1)))
            .is_some_and(Option::is_some)
    }

    /// Resize the cache to `block_count` blocks, discarding all cached data.
    pub fn set_block_count(&mut self, block_count: usize) {
        if self.size > 0 || self.age.len() > 0 {
            self.age(0);
        }
        debug!(
            from = self.block_count,
            to = block_count,
            "Resizing block cache"
        );
        self.allocate(block_count);
    }

    /// Evict least-recently-used macroblocks until the accounted size is at most `max_size`.
    ///
    /// `max_size == 0` drops everything at once.
    pub fn age(&mut self, max_size: usize) {
        if max_size == 0 {
            self.flush();
            return;
        }
        while self.size > max_size {
            let Some(slot) = self.age.pop_oldest() else {
                break;
            };
            let freed = self.macroblocks[slot].clear();
            self.size = self.size.saturating_sub(freed);
            trace!(
                macroblock = slot,
                freed,
                remaining = self.size,
                "Evicted macroblock"
            );
        }
    }

    /// Fetch block `index`, producing it on first request.
    ///
    /// Returns the block and whether it was produced by this call.
    ///
    /// # Panics
    ///
    /// Panics when `index` is outside `0..block_count()`.
    pub fn get(&mut self, index: usize) -> (&mut F::Block, bool) {
        assert!(
            index < self.block_count,
            "block index {index} out of range for cache of {} blocks",
            self.block_count
        );
        let slot = index >> self.exponent;
        let macroblock_size = self.macroblock_size();
        self.age.touch(slot);

        let macroblock = &mut self.macroblocks[slot];
        let blocks = macroblock
            .blocks
            .get_or_insert_with(|| (0..macroblock_size).map(|_| None).collect());

        let factory = &mut self.factory;
        let mut created = false;
        let block = blocks[index & (macroblock_size - 1)].get_or_insert_with(|| {
            created = true;
            factory.produce_block(index)
        });
        if created {
            let bytes = factory.block_size();
            macroblock.bytes += bytes;
            self.size += bytes;
        }
        (block, created)
    }

    fn flush(&mut self) {
        for slot in self.age.iter() {
            self.macroblocks[slot].clear();
        }
        self.age.reset(self.macroblocks.len());
        self.size = 0;
    }

    fn allocate(&mut self, block_count: usize) {
        let slots = block_count.div_ceil(self.macroblock_size());
        self.macroblocks.clear();
        self.macroblocks.resize_with(slots, Macroblock::empty);
        self.age.reset(slots);
        self.block_count = block_count;
        self.size = 0;
    }
}
