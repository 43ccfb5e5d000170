use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use crate::config::ReplacementPolicyConfig;
use crate::error::{CacheError, Result};
use crate::lines::LineStore;

/// A generic trait for replacement policies used by fully associative caches
///
/// The order of the line store and the usage counts it carries are the only state most policies
/// need, so they work directly on it rather than keeping their own copy which could drift
pub trait ReplacementPolicy {
    /// Updates the policy when a resident line is hit
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `lines`: The resident lines
    /// * `position`: The position in `lines` of the line which was hit
    ///
    /// returns: ()
    fn update_on_hit(&mut self, _lines: &mut LineStore, _position: usize) {}

    /// Used by the cache to pick a line to evict when it is full and a miss needs a slot.
    ///
    /// Implementations must not modify anything, the cache removes the victim itself once the
    /// whole access is known to succeed
    ///
    /// # Arguments
    ///
    /// * `lines`: The resident lines, oldest first
    ///
    /// returns: Result<usize>, the position of the victim in `lines`
    fn select_victim(&mut self, lines: &LineStore) -> Result<usize>;
}

fn ensure_not_empty(lines: &LineStore) -> Result<()> {
    if lines.is_empty() {
        Err(CacheError::EmptyCacheEviction)
    } else {
        Ok(())
    }
}

/// Least recently used. Hits move a line to the recent end, so the victim is always the oldest
#[derive(Debug, Default)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn update_on_hit(&mut self, lines: &mut LineStore, position: usize) {
        lines.touch(position);
    }

    fn select_victim(&mut self, lines: &LineStore) -> Result<usize> {
        ensure_not_empty(lines)?;
        Ok(0)
    }
}

/// Most recently used, the mirror image of LRU
#[derive(Debug, Default)]
pub struct MostRecentlyUsed;

impl ReplacementPolicy for MostRecentlyUsed {
    fn update_on_hit(&mut self, lines: &mut LineStore, position: usize) {
        lines.touch(position);
    }

    fn select_victim(&mut self, lines: &LineStore) -> Result<usize> {
        ensure_not_empty(lines)?;
        Ok(lines.len() - 1)
    }
}

/// First in first out. Ignores hits, so the store stays in insertion order
#[derive(Debug, Default)]
pub struct FirstInFirstOut;

impl ReplacementPolicy for FirstInFirstOut {
    fn select_victim(&mut self, lines: &LineStore) -> Result<usize> {
        ensure_not_empty(lines)?;
        Ok(0)
    }
}

/// Least frequently used replacement policy
///
/// Ties go to the first minimum in store order, which is the earliest inserted
#[derive(Debug, Default)]
pub struct LeastFrequentlyUsed;

impl ReplacementPolicy for LeastFrequentlyUsed {
    fn update_on_hit(&mut self, lines: &mut LineStore, position: usize) {
        lines.record_use(position);
    }

    fn select_victim(&mut self, lines: &LineStore) -> Result<usize> {
        lines.lines()
            .iter()
            .enumerate()
            .min_by_key(|(_, line)| line.uses)
            .map(|(position, _)| position)
            .ok_or(CacheError::EmptyCacheEviction)
    }
}

/// Uniformly random replacement, driven by a seeded generator so runs can be reproduced
#[derive(Debug)]
pub struct Random {
    rng: ChaCha8Rng,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ReplacementPolicy for Random {
    fn select_victim(&mut self, lines: &LineStore) -> Result<usize> {
        ensure_not_empty(lines)?;
        Ok(self.rng.gen_range(0..lines.len()))
    }
}

/// Enum for all 5 policies provided by the library
///
/// Explicitly branching on each implementation rather than using a trait object lets the
/// compiler see the concrete types, and keeps the set of policies closed
#[derive(Debug)]
pub enum GenericPolicy {
    LeastRecentlyUsed(LeastRecentlyUsed),
    FirstInFirstOut(FirstInFirstOut),
    Random(Random),
    LeastFrequentlyUsed(LeastFrequentlyUsed),
    MostRecentlyUsed(MostRecentlyUsed),
}

impl GenericPolicy {
    /// Creates a policy from its configuration, failing on names which aren't recognised
    ///
    /// # Arguments
    ///
    /// * `config`: The configured policy
    /// * `seed`: Seed for the random policy, ignored by the others
    ///
    /// returns: Result<GenericPolicy>
    pub fn from_config(config: &ReplacementPolicyConfig, seed: u64) -> Result<Self> {
        Ok(match config {
            ReplacementPolicyConfig::LeastRecentlyUsed => LeastRecentlyUsed.into(),
            ReplacementPolicyConfig::FirstInFirstOut => FirstInFirstOut.into(),
            ReplacementPolicyConfig::Random => Random::new(seed).into(),
            ReplacementPolicyConfig::LeastFrequentlyUsed => LeastFrequentlyUsed.into(),
            ReplacementPolicyConfig::MostRecentlyUsed => MostRecentlyUsed.into(),
            ReplacementPolicyConfig::Unrecognised(name) => return Err(CacheError::UnknownPolicy(name.clone())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            GenericPolicy::LeastRecentlyUsed(_) => "LRU",
            GenericPolicy::FirstInFirstOut(_) => "FIFO",
            GenericPolicy::Random(_) => "RANDOM",
            GenericPolicy::LeastFrequentlyUsed(_) => "LFU",
            GenericPolicy::MostRecentlyUsed(_) => "MRU",
        }
    }
}

impl From<LeastRecentlyUsed> for GenericPolicy {
    fn from(value: LeastRecentlyUsed) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<FirstInFirstOut> for GenericPolicy {
    fn from(value: FirstInFirstOut) -> Self {
        Self::FirstInFirstOut(value)
    }
}

impl From<Random> for GenericPolicy {
    fn from(value: Random) -> Self {
        Self::Random(value)
    }
}

impl From<LeastFrequentlyUsed> for GenericPolicy {
    fn from(value: LeastFrequentlyUsed) -> Self {
        Self::LeastFrequentlyUsed(value)
    }
}

impl From<MostRecentlyUsed> for GenericPolicy {
    fn from(value: MostRecentlyUsed) -> Self {
        Self::MostRecentlyUsed(value)
    }
}

impl ReplacementPolicy for GenericPolicy {
    fn update_on_hit(&mut self, lines: &mut LineStore, position: usize) {
        match self {
            GenericPolicy::LeastRecentlyUsed(p) => p.update_on_hit(lines, position),
            GenericPolicy::FirstInFirstOut(p) => p.update_on_hit(lines, position),
            GenericPolicy::Random(p) => p.update_on_hit(lines, position),
            GenericPolicy::LeastFrequentlyUsed(p) => p.update_on_hit(lines, position),
            GenericPolicy::MostRecentlyUsed(p) => p.update_on_hit(lines, position)
        }
    }

    fn select_victim(&mut self, lines: &LineStore) -> Result<usize> {
        match self {
            GenericPolicy::LeastRecentlyUsed(p) => p.select_victim(lines),
            GenericPolicy::FirstInFirstOut(p) => p.select_victim(lines),
            GenericPolicy::Random(p) => p.select_victim(lines),
            GenericPolicy::LeastFrequentlyUsed(p) => p.select_victim(lines),
            GenericPolicy::MostRecentlyUsed(p) => p.select_victim(lines)
        }
    }
}
