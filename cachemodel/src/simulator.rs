use std::time::{Duration, Instant};
use log::info;
use serde::{Deserialize, Serialize};
use crate::address::BitWidths;
use crate::cache::{Access, CacheModel};
use crate::config::{CacheConfig, SimulationConfig};
use crate::error::Result;

/// The simulator walks a cache model through a sequence of addresses, one step at a time or all
/// at once, and collects the results.
///
/// Stepping and running can be mixed freely, the time spent inside the model accumulates either
/// way
pub struct Simulator {
    model: CacheModel,
    addresses: Vec<i64>,
    position: usize,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The result of a simulation so far. Can be serialised for output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub bit_widths: BitWidths,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
    pub miss_ratio: f64,
    pub steps: Vec<Access>,
    pub resident_lines: Vec<(usize, u64)>,
}

impl Simulator {

    /// Creates a new simulator for a cache configuration and an address sequence
    ///
    /// # Arguments
    ///
    /// * `config`: The cache configuration
    /// * `addresses`: The addresses to feed the cache, in order
    ///
    /// returns: Result<Simulator>
    pub fn new(config: &CacheConfig, addresses: Vec<i64>) -> Result<Self> {
        let model = CacheModel::new(config)?;
        let result = SimulationResult {
            bit_widths: model.bit_widths(),
            hits: 0,
            misses: 0,
            evictions: 0,
            hit_ratio: 0.0,
            miss_ratio: 0.0,
            steps: Vec::with_capacity(addresses.len()),
            resident_lines: Vec::new(),
        };
        Ok(Self {
            model,
            addresses,
            position: 0,
            result,
            simulation_time: Duration::new(0, 0),
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Self::new(&config.cache, config.addresses.clone())
    }

    /// Processes the next address in the sequence
    ///
    /// An address the model rejects is not consumed, so the error will be reported again by the
    /// next call
    ///
    /// returns: None once every address has been processed
    pub fn step(&mut self) -> Option<Result<&Access>> {
        let address = *self.addresses.get(self.position)?;
        let start = Instant::now();
        let processed = self.model.process(address);
        self.simulation_time += start.elapsed();
        if let Err(e) = processed {
            return Some(Err(e));
        }
        self.position += 1;
        if let Some(access) = self.model.last_access() {
            self.result.steps.push(*access);
        }
        self.refresh_result();
        self.result.steps.last().map(Ok)
    }

    /// Processes every remaining address, stopping at the first error
    pub fn run(&mut self) -> Result<&SimulationResult> {
        while let Some(step) = self.step() {
            step?;
        }
        info!(
            "simulated {} addresses: {} hits, {} misses, {} evictions",
            self.addresses.len(),
            self.result.hits,
            self.result.misses,
            self.result.evictions
        );
        Ok(&self.result)
    }

    fn refresh_result(&mut self) {
        self.result.hits = self.model.hits();
        self.result.misses = self.model.misses();
        self.result.evictions = self.model.evictions();
        self.result.hit_ratio = self.model.hit_ratio();
        self.result.miss_ratio = self.model.miss_ratio();
        self.result.resident_lines = self.model.resident_lines();
    }

    pub fn is_complete(&self) -> bool {
        self.position >= self.addresses.len()
    }

    /// Number of addresses processed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn addresses(&self) -> &[i64] {
        &self.addresses
    }

    pub fn model(&self) -> &CacheModel {
        &self.model
    }

    pub fn result(&self) -> &SimulationResult {
        &self.result
    }

    /// Gets the wall-clock time spent inside the cache model
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }
}
