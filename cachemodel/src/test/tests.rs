use std::error::Error;
use crate::address::BitWidths;
use crate::cache::{CacheModel, Outcome};
use crate::config::{CacheConfig, MappingConfig, ReplacementPolicyConfig, SimulationConfig};
use crate::error::CacheError;
use crate::lines::Line;
use crate::simulator::Simulator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use crate::util::generate_addresses;

const GOLDEN_SEQUENCE: [i64; 8] = [29, 15, 67, 53, 23, 11, 17, 18];

fn direct(memory_size: i64, cache_size: i64, block_size: i64) -> CacheConfig {
    CacheConfig::new(memory_size, cache_size, block_size, MappingConfig::DirectMapped, ReplacementPolicyConfig::default())
}

fn is_invalid(config: &CacheConfig) -> bool {
    matches!(CacheModel::new(config), Err(CacheError::InvalidConfiguration(_)))
}

#[test]
fn golden_direct_mapped_sequence() -> Result<(), Box<dyn Error>> {
    let mut model = CacheModel::new(&direct(256, 32, 4))?;
    assert_eq!(model.bit_widths(), BitWidths { tag_bits: 27, index_bits: 3, offset_bits: 2 });
    let outcomes = GOLDEN_SEQUENCE
        .iter()
        .map(|address| model.process(*address))
        .collect::<Result<Vec<_>, _>>()?;
    use Outcome::*;
    assert_eq!(outcomes, vec![Miss, Miss, Miss, Miss, Miss, Miss, Miss, Hit]);
    assert_eq!(model.hits(), 1);
    assert_eq!(model.misses(), 7);
    assert_eq!(model.evictions(), 0);
    assert_eq!(model.hit_log(), &[18]);
    assert_eq!(model.miss_log(), &[29, 15, 67, 53, 23, 11, 17]);
    // 23 replaced 53 at index 5
    assert_eq!(model.resident_lines(), vec![(0, 2), (2, 0), (3, 0), (4, 0), (5, 0), (7, 0)]);
    let last = model.last_access().ok_or("no last access")?;
    assert_eq!((last.address, last.tag, last.index, last.offset), (18, 0, 4, 2));
    assert_eq!(model.hit_ratio(), 0.125);
    assert_eq!(model.miss_ratio(), 0.875);
    Ok(())
}

#[test]
fn golden_sequence_from_json() -> Result<(), Box<dyn Error>> {
    let config: SimulationConfig = serde_json::from_str(r#"{
        "cache": { "memory_size": 256, "cache_size": 32, "block_size": 4, "mapping": "Direct Mapping" },
        "addresses": [29, 15, 67, 53, 23, 11, 17, 18]
    }"#)?;
    let mut simulator = Simulator::from_config(&config)?;
    let result = simulator.run()?;
    let outcomes: Vec<Outcome> = result.steps.iter().map(|step| step.outcome).collect();
    assert_eq!(outcomes.iter().filter(|o| **o == Outcome::Hit).count(), 1);
    assert_eq!(outcomes.last(), Some(&Outcome::Hit));
    assert_eq!((result.hits, result.misses, result.evictions), (1, 7, 0));
    assert_eq!(result.steps[4].index, 5);
    assert_eq!(result.steps[4].tag, 0);
    Ok(())
}

#[test]
fn same_address_twice_misses_then_hits() -> Result<(), Box<dyn Error>> {
    let mut model = CacheModel::new(&direct(256, 32, 4))?;
    assert_eq!(model.process(100)?, Outcome::Miss);
    assert_eq!(model.process(100)?, Outcome::Hit);
    // Same block, different offset
    assert_eq!(model.process(101)?, Outcome::Hit);
    Ok(())
}

#[test]
fn out_of_range_addresses_leave_the_model_untouched() -> Result<(), Box<dyn Error>> {
    let mut model = CacheModel::new(&direct(256, 32, 4))?;
    model.process(29)?;
    for address in [-1, 256, 1000] {
        match model.process(address) {
            Err(CacheError::OutOfRangeAddress { address: rejected, memory_size }) => {
                assert_eq!(rejected, address);
                assert_eq!(memory_size, 256);
            }
            other => panic!("expected an out of range error, got {other:?}"),
        }
    }
    assert_eq!((model.hits(), model.misses(), model.evictions()), (0, 1, 0));
    assert_eq!(model.miss_log(), &[29]);
    assert_eq!(model.last_access().map(|a| a.address), Some(29));
    assert_eq!(model.resident_lines().len(), 1);
    Ok(())
}

#[test]
fn every_access_is_counted_exactly_once() -> Result<(), Box<dyn Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let addresses = generate_addresses(1024, 300, &mut rng);
    let mut configs = vec![direct(1024, 64, 8)];
    for policy in ["LRU", "FIFO", "RANDOM", "LFU", "MRU"] {
        configs.push(CacheConfig::new(1024, 64, 8, MappingConfig::FullyAssociative, policy.into()).with_seed(3));
    }
    for config in configs {
        let mut model = CacheModel::new(&config)?;
        for (i, address) in addresses.iter().enumerate() {
            let before = (model.hits(), model.misses());
            match model.process(*address)? {
                Outcome::Hit => assert_eq!((model.hits(), model.misses()), (before.0 + 1, before.1)),
                Outcome::Miss => assert_eq!((model.hits(), model.misses()), (before.0, before.1 + 1)),
            }
            assert_eq!(model.accesses(), i as u64 + 1);
            assert!(model.resident_lines().len() <= model.num_lines());
        }
        assert_eq!(model.hit_log().len() + model.miss_log().len(), addresses.len());
        assert!(model.evictions() <= model.misses());
    }
    Ok(())
}

#[test]
fn invalid_configurations_are_rejected() {
    assert!(is_invalid(&direct(0, 32, 4)));
    assert!(is_invalid(&direct(256, -1, 4)));
    assert!(is_invalid(&direct(256, 32, 0)));
    assert!(is_invalid(&direct(256, 32, 3)));
    // Smaller than a single block
    assert!(is_invalid(&direct(256, 2, 4)));
    // Not a whole number of blocks
    assert!(is_invalid(&direct(256, 34, 4)));
    // Three lines can't be indexed directly
    assert!(is_invalid(&direct(256, 12, 4)));
    assert!(is_invalid(&direct(1 << 33, 32, 4)));
    // but three lines are fine when associative
    let config = CacheConfig::new(256, 12, 4, MappingConfig::FullyAssociative, ReplacementPolicyConfig::FirstInFirstOut);
    assert!(CacheModel::new(&config).is_ok());
}

#[test]
fn the_largest_caches_are_built_without_allocating_every_line() -> Result<(), Box<dyn Error>> {
    let whole_memory = 1 << 32;
    for mapping in [MappingConfig::FullyAssociative, MappingConfig::DirectMapped] {
        let config = CacheConfig::new(whole_memory, whole_memory, 1, mapping, ReplacementPolicyConfig::LeastRecentlyUsed);
        let mut model = CacheModel::new(&config)?;
        assert_eq!(model.num_lines(), 1 << 32);
        assert_eq!(model.process(whole_memory - 1)?, Outcome::Miss);
        assert_eq!(model.process(whole_memory - 1)?, Outcome::Hit);
        assert_eq!(model.resident_lines().len(), 1);
    }
    Ok(())
}

#[test]
fn cache_size_is_clamped_to_memory_size() -> Result<(), Box<dyn Error>> {
    let model = CacheModel::new(&direct(16, 64, 4))?;
    assert_eq!(model.cache_size(), 16);
    assert_eq!(model.num_lines(), 4);
    assert_eq!(model.bit_widths(), BitWidths { tag_bits: 28, index_bits: 2, offset_bits: 2 });
    Ok(())
}

#[test]
fn fully_associative_decodes_no_index() -> Result<(), Box<dyn Error>> {
    let config = CacheConfig::new(256, 32, 4, MappingConfig::FullyAssociative, ReplacementPolicyConfig::LeastRecentlyUsed);
    let model = CacheModel::new(&config)?;
    assert_eq!(model.bit_widths(), BitWidths { tag_bits: 30, index_bits: 0, offset_bits: 2 });
    assert_eq!(model.replacement_policy(), Some("LRU"));
    let single_byte_blocks = CacheModel::new(&direct(256, 32, 1))?;
    assert_eq!(single_byte_blocks.bit_widths(), BitWidths { tag_bits: 27, index_bits: 5, offset_bits: 0 });
    Ok(())
}

#[test]
fn direct_mapped_counts_evictions_once_full() -> Result<(), Box<dyn Error>> {
    // Two lines of four bytes
    let mut model = CacheModel::new(&direct(16, 8, 4))?;
    model.process(0)?;
    model.process(4)?;
    assert_eq!(model.evictions(), 0);
    assert_eq!(model.process(8)?, Outcome::Miss);
    assert_eq!(model.evictions(), 1);
    let access = model.last_access().ok_or("no last access")?;
    assert_eq!(access.evicted, Some(Line { index: 0, tag: 0, uses: 1 }));
    assert_eq!(model.resident_lines(), vec![(0, 1), (1, 0)]);
    Ok(())
}

#[test]
fn direct_mapped_conflict_before_full_is_not_an_eviction() -> Result<(), Box<dyn Error>> {
    let mut model = CacheModel::new(&direct(256, 32, 4))?;
    model.process(53)?;
    assert_eq!(model.process(23)?, Outcome::Miss);
    assert_eq!(model.evictions(), 0);
    assert_eq!(model.last_access().and_then(|a| a.evicted), None);
    assert_eq!(model.process(53)?, Outcome::Miss);
    Ok(())
}

#[test]
fn unknown_policy_only_matters_when_associative() -> Result<(), Box<dyn Error>> {
    let policy = ReplacementPolicyConfig::from("PLRU");
    let associative = CacheConfig::new(256, 32, 4, MappingConfig::FullyAssociative, policy.clone());
    match CacheModel::new(&associative) {
        Err(CacheError::UnknownPolicy(name)) => assert_eq!(name, "PLRU"),
        Err(e) => panic!("expected an unknown policy error, got {e}"),
        Ok(_) => panic!("expected an unknown policy error"),
    }
    let direct_mapped = CacheConfig::new(256, 32, 4, MappingConfig::DirectMapped, policy);
    let model = CacheModel::new(&direct_mapped)?;
    assert_eq!(model.replacement_policy(), None);
    Ok(())
}

#[test]
fn line_views_cover_every_line() -> Result<(), Box<dyn Error>> {
    let mut model = CacheModel::new(&direct(256, 32, 4))?;
    for address in GOLDEN_SEQUENCE {
        model.process(address)?;
    }
    let views = model.line_views();
    assert_eq!(views.len(), 8);
    assert!(views[0].valid);
    assert_eq!(views[0].tag, Some(2));
    // Block 16 holds bytes 64..68, where 67 lives
    assert_eq!(views[0].block, Some(16));
    assert!(!views[1].valid);
    assert_eq!(views[1].tag, None);
    assert_eq!(views[7].block, Some(7));
    Ok(())
}

#[test]
fn ratios_are_zero_before_any_access() -> Result<(), Box<dyn Error>> {
    let model = CacheModel::new(&direct(256, 32, 4))?;
    assert_eq!(model.hit_ratio(), 0.0);
    assert_eq!(model.miss_ratio(), 0.0);
    assert_eq!(model.last_index(), None);
    assert_eq!(model.last_tag(), None);
    Ok(())
}
