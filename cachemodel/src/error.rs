use thiserror::Error;

/// Everything that can go wrong while building or driving a cache model
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("invalid cache configuration: {0}")]
    InvalidConfiguration(String),
    #[error("address {address} ({address:#x}) out of range for a memory of {memory_size} bytes")]
    OutOfRangeAddress { address: i64, memory_size: u64 },
    #[error("unknown replacement policy `{0}`, expected one of LRU, FIFO, RANDOM, LFU, MRU")]
    UnknownPolicy(String),
    #[error("cache is empty, cannot evict")]
    EmptyCacheEviction,
    #[error("couldn't parse the address list: {0}")]
    InvalidAddressList(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
