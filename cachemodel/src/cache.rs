use std::fmt::{Display, Formatter};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::address::{AddressLayout, BitWidths, ADDRESS_BITS};
use crate::config::{CacheConfig, MappingConfig};
use crate::error::{CacheError, Result};
use crate::lines::{Line, LineStore};
use crate::replacement_policies::{GenericPolicy, ReplacementPolicy};

/// Whether an access found its block in the cache
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Hit,
    Miss,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Hit => f.write_str("Hit"),
            Outcome::Miss => f.write_str("Miss"),
        }
    }
}

/// How a single address was resolved
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub address: u64,
    pub tag: u64,
    pub index: usize,
    pub offset: u64,
    pub outcome: Outcome,
    /// The line pushed out to make room, if the cache was full
    pub evicted: Option<Line>,
}

/// One row of the cache table, covering empty lines as well as resident ones
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineView {
    pub index: usize,
    pub valid: bool,
    pub tag: Option<u64>,
    /// The memory block number held by the line
    pub block: Option<u64>,
}

enum Placement {
    DirectMapped,
    FullyAssociative(GenericPolicy),
}

/// A single level cache, resolving one address at a time into a hit or a miss
///
/// Direct mapped caches decode the line from the address, and a miss simply overwrites whatever
/// is stored there. Fully associative caches look a block up by tag in every line, and fill the
/// lowest free line, evicting according to the replacement policy once all lines are in use.
///
/// The model is built once per run. A failing call to [`CacheModel::process`] leaves it exactly
/// as it was
pub struct CacheModel {
    memory_size: u64,
    cache_size: u64,
    block_size: u64,
    num_lines: usize,
    mapping: MappingConfig,
    layout: AddressLayout,
    placement: Placement,
    lines: LineStore,
    hits: u64,
    misses: u64,
    evictions: u64,
    hit_log: Vec<u64>,
    miss_log: Vec<u64>,
    last_access: Option<Access>,
}

fn positive(name: &str, value: i64) -> Result<u64> {
    if value <= 0 {
        return Err(CacheError::InvalidConfiguration(format!("{name} must be positive, got {value}")));
    }
    Ok(value as u64)
}

impl CacheModel {
    /// Validates a configuration and builds an empty cache from it
    ///
    /// The cache size is clamped to the memory size. The policy is only checked for fully
    /// associative caches, a direct mapped cache has no use for one
    ///
    /// # Arguments
    ///
    /// * `config`: The cache configuration
    ///
    /// returns: Result<CacheModel>
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let memory_size = positive("memory size", config.memory_size)?;
        let requested_cache_size = positive("cache size", config.cache_size)?;
        let block_size = positive("block size", config.block_size)?;
        if memory_size > 1 << ADDRESS_BITS {
            return Err(CacheError::InvalidConfiguration(format!(
                "memory of {memory_size} bytes doesn't fit in a {ADDRESS_BITS} bit address space"
            )));
        }
        if !block_size.is_power_of_two() {
            return Err(CacheError::InvalidConfiguration(format!("block size {block_size} is not a power of two")));
        }
        let cache_size = memory_size.min(requested_cache_size);
        if cache_size < block_size {
            return Err(CacheError::InvalidConfiguration(format!(
                "a cache of {cache_size} bytes can't hold a block of {block_size} bytes"
            )));
        }
        if cache_size % block_size != 0 {
            return Err(CacheError::InvalidConfiguration(format!(
                "cache size {cache_size} is not a multiple of the block size {block_size}"
            )));
        }
        let num_lines = cache_size / block_size;
        // Every decodable index has to name a real line
        if config.mapping == MappingConfig::DirectMapped && !num_lines.is_power_of_two() {
            return Err(CacheError::InvalidConfiguration(format!(
                "a direct mapped cache needs a power of two number of lines, got {num_lines}"
            )));
        }
        let layout = AddressLayout::new(block_size, num_lines, config.mapping)?;
        let placement = match config.mapping {
            MappingConfig::DirectMapped => Placement::DirectMapped,
            MappingConfig::FullyAssociative => {
                Placement::FullyAssociative(GenericPolicy::from_config(&config.replacement_policy, config.seed)?)
            }
        };
        Ok(Self {
            memory_size,
            cache_size,
            block_size,
            num_lines: num_lines as usize,
            mapping: config.mapping,
            layout,
            placement,
            lines: LineStore::default(),
            hits: 0,
            misses: 0,
            evictions: 0,
            hit_log: Vec::new(),
            miss_log: Vec::new(),
            last_access: None,
        })
    }

    /// Resolves an address, updating the cache contents, counters and logs
    ///
    /// # Arguments
    ///
    /// * `address`: The byte address, which must be within the memory
    ///
    /// returns: Result<Outcome>
    pub fn process(&mut self, address: i64) -> Result<Outcome> {
        if address < 0 || address as u64 >= self.memory_size {
            return Err(CacheError::OutOfRangeAddress { address, memory_size: self.memory_size });
        }
        let address = address as u64;
        let access = match &mut self.placement {
            Placement::DirectMapped => Self::access_direct(&self.layout, &mut self.lines, self.num_lines, address),
            Placement::FullyAssociative(policy) => {
                Self::access_associative(&self.layout, &mut self.lines, self.num_lines, policy, address)?
            }
        };
        match access.outcome {
            Outcome::Hit => {
                self.hits += 1;
                self.hit_log.push(address);
            }
            Outcome::Miss => {
                self.misses += 1;
                self.miss_log.push(address);
            }
        }
        if let Some(victim) = access.evicted {
            self.evictions += 1;
            debug!("{address:#x} evicted line {} holding tag {:#x}", victim.index, victim.tag);
        }
        debug!("{address:#x}: tag {:#x}, index {}, offset {}, {}", access.tag, access.index, access.offset, access.outcome);
        self.last_access = Some(access);
        Ok(access.outcome)
    }

    fn access_direct(layout: &AddressLayout, lines: &mut LineStore, num_lines: usize, address: u64) -> Access {
        let (tag, index) = layout.direct_mapped(address);
        let offset = layout.offset(address);
        let resident = lines.position_of_index(index);
        if resident.and_then(|position| lines.get(position)).map_or(false, |line| line.tag == tag) {
            return Access { address, tag, index, offset, outcome: Outcome::Hit, evicted: None };
        }
        // When full every index is resident, so the line at this index is the one replaced
        let evicted = match resident {
            Some(position) if lines.len() >= num_lines => lines.get(position).copied(),
            _ => None,
        };
        lines.insert(index, tag);
        Access { address, tag, index, offset, outcome: Outcome::Miss, evicted }
    }

    fn access_associative(layout: &AddressLayout, lines: &mut LineStore, num_lines: usize, policy: &mut GenericPolicy, address: u64) -> Result<Access> {
        let tag = layout.fully_associative(address);
        let offset = layout.offset(address);
        if let Some(position) = lines.position_of_tag(tag) {
            let index = lines.lines()[position].index;
            policy.update_on_hit(lines, position);
            return Ok(Access { address, tag, index, offset, outcome: Outcome::Hit, evicted: None });
        }
        let evicted = if lines.len() >= num_lines {
            let victim = policy.select_victim(lines)?;
            Some(lines.remove(victim))
        } else {
            None
        };
        // Lines only leave on eviction, so a non-full cache occupies exactly 0..len
        let index = evicted.map_or(lines.len(), |line| line.index);
        lines.insert(index, tag);
        Ok(Access { address, tag, index, offset, outcome: Outcome::Miss, evicted })
    }

    pub fn memory_size(&self) -> u64 {
        self.memory_size
    }

    /// The cache size after clamping to the memory size
    pub fn cache_size(&self) -> u64 {
        self.cache_size
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    pub fn mapping(&self) -> MappingConfig {
        self.mapping
    }

    /// The replacement policy in use, if the cache has one
    pub fn replacement_policy(&self) -> Option<&'static str> {
        match &self.placement {
            Placement::DirectMapped => None,
            Placement::FullyAssociative(policy) => Some(policy.name()),
        }
    }

    pub fn bit_widths(&self) -> BitWidths {
        self.layout.widths()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses which hit, 0 before any access
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.accesses())
    }

    /// Fraction of accesses which missed, 0 before any access
    pub fn miss_ratio(&self) -> f64 {
        ratio(self.misses, self.accesses())
    }

    pub fn hit_log(&self) -> &[u64] {
        &self.hit_log
    }

    pub fn miss_log(&self) -> &[u64] {
        &self.miss_log
    }

    pub fn last_access(&self) -> Option<&Access> {
        self.last_access.as_ref()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_access.map(|access| access.index)
    }

    pub fn last_tag(&self) -> Option<u64> {
        self.last_access.map(|access| access.tag)
    }

    /// Resident (index, tag) pairs sorted by index
    pub fn resident_lines(&self) -> Vec<(usize, u64)> {
        self.lines.by_index().iter().map(|line| (line.index, line.tag)).collect()
    }

    /// Every line of the cache in index order, whether filled or not
    pub fn line_views(&self) -> Vec<LineView> {
        let index_bits = self.layout.widths().index_bits;
        let mut views: Vec<LineView> = (0..self.num_lines)
            .map(|index| LineView { index, valid: false, tag: None, block: None })
            .collect();
        for line in self.lines.lines() {
            let block = match self.mapping {
                MappingConfig::DirectMapped => (line.tag << index_bits) | line.index as u64,
                MappingConfig::FullyAssociative => line.tag,
            };
            views[line.index] = LineView { index: line.index, valid: true, tag: Some(line.tag), block: Some(block) };
        }
        views
    }
}

fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
