use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use crate::error::{CacheError, Result};

/// Number of bits needed to tell `n` things apart, i.e. ceil(log2(n))
///
/// # Examples
///
/// ```
/// use cachemodel::util::ceil_log2;
/// assert_eq!(ceil_log2(1), 0);
/// assert_eq!(ceil_log2(8), 3);
/// assert_eq!(ceil_log2(5), 3);
/// ```
pub fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        u64::BITS - (n - 1).leading_zeros()
    }
}

/// Formats the low `width` bits of a value as a zero padded binary string
///
/// # Examples
///
/// ```
/// use cachemodel::util::format_bits;
/// assert_eq!(format_bits(5, 4), "0101");
/// assert_eq!(format_bits(0b1101, 2), "01");
/// assert_eq!(format_bits(7, 0), "");
/// ```
pub fn format_bits(value: u64, width: u32) -> String {
    if width == 0 {
        return String::new();
    }
    let masked = if width >= u64::BITS { value } else { value & ((1 << width) - 1) };
    format!("{masked:0width$b}", width = width as usize)
}

lazy_static! {
    static ref SEPARATOR: Regex = Regex::new(r"[,\s]+").unwrap();
}

/// Parses a list of addresses separated by commas and/or whitespace
///
/// Decimal and `0x` prefixed hexadecimal are accepted. Negative values are let through, so that
/// range checking is left to the cache
///
/// # Examples
///
/// ```
/// use cachemodel::util::parse_address_list;
/// assert_eq!(parse_address_list("29, 15 0x43").unwrap(), vec![29, 15, 67]);
/// ```
pub fn parse_address_list(input: &str) -> Result<Vec<i64>> {
    let addresses = SEPARATOR
        .split(input)
        .filter(|token| !token.is_empty())
        .map(parse_address)
        .collect::<Result<Vec<_>>>()?;
    if addresses.is_empty() {
        return Err(CacheError::InvalidAddressList("no addresses given".to_string()));
    }
    Ok(addresses)
}

fn parse_address(token: &str) -> Result<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let invalid = |reason: String| CacheError::InvalidAddressList(format!("`{token}` is not an address: {reason}"));
    let (radix, body) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    // A single leading minus is the only sign accepted
    if body.starts_with(['+', '-']) {
        return Err(invalid("unexpected sign".to_string()));
    }
    let magnitude = u64::from_str_radix(body, radix).map_err(|e| invalid(e.to_string()))?;
    let value = i64::try_from(magnitude).map_err(|e| invalid(e.to_string()))?;
    Ok(if negative { -value } else { value })
}

/// Generates `count` addresses uniformly distributed over the memory
pub fn generate_addresses<R: Rng>(memory_size: u64, count: usize, rng: &mut R) -> Vec<i64> {
    if memory_size == 0 {
        return Vec::new();
    }
    (0..count).map(|_| rng.gen_range(0..memory_size) as i64).collect()
}
