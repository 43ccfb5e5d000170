use std::fmt::Write;
use cachemodel::cache::{Access, CacheModel};
use cachemodel::util::format_bits;

const TAG_COLUMN: usize = 34;

/// The configuration and the address layout, printed once before the first step
pub fn header(model: &CacheModel) -> String {
    let widths = model.bit_widths();
    let policy = model.replacement_policy().map(|p| format!(", {p} replacement")).unwrap_or_default();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} bytes of memory, {} byte cache of {} lines x {} bytes, {}{policy}",
        model.memory_size(),
        model.cache_size(),
        model.num_lines(),
        model.block_size(),
        model.mapping()
    );
    let _ = writeln!(out, "{:<TAG_COLUMN$} {:<12} {:<12}", "Tag", "Index", "Offset");
    let _ = write!(
        out,
        "{:<TAG_COLUMN$} {:<12} {:<12}",
        format!("{} bits", widths.tag_bits),
        format!("{} bits", widths.index_bits),
        format!("{} bits", widths.offset_bits)
    );
    out
}

/// One line per access, with the address broken down into its fields
pub fn access(model: &CacheModel, access: &Access) -> String {
    let widths = model.bit_widths();
    let mut out = format!(
        "{} = {:#x}: {:<4}  tag {} index {} offset {} -> line {}",
        access.address,
        access.address,
        access.outcome.to_string(),
        format_bits(access.tag, widths.tag_bits),
        if widths.index_bits == 0 { "-".to_string() } else { format_bits(access.index as u64, widths.index_bits) },
        if widths.offset_bits == 0 { "-".to_string() } else { format_bits(access.offset, widths.offset_bits) },
        access.index
    );
    if let Some(victim) = access.evicted {
        let _ = write!(out, " (evicted tag {:#x} from line {})", victim.tag, victim.index);
    }
    out
}

/// The whole cache, one row per line
pub fn cache_table(model: &CacheModel) -> String {
    let tag_bits = model.bit_widths().tag_bits;
    let last_word = model.block_size() - 1;
    let mut out = String::new();
    let _ = write!(out, "{:<6} {:<6} {:<TAG_COLUMN$} Data", "Index", "Valid", "Tag");
    for view in model.line_views() {
        let (tag, data) = match (view.tag, view.block) {
            (Some(tag), Some(block)) => (format_bits(tag, tag_bits), format!("BLOCK {block:x} WORD 0 - {last_word}")),
            _ => ("-".to_string(), "-".to_string()),
        };
        let _ = write!(out, "\n{:<6} {:<6} {tag:<TAG_COLUMN$} {data}", view.index, u8::from(view.valid));
    }
    out
}

/// Running totals, with percentages of all accesses
pub fn summary(model: &CacheModel) -> String {
    let mut out = format!(
        "Hits: {} ({:.2}%)\nMisses: {} ({:.2}%)\nEvictions: {}",
        model.hits(),
        model.hit_ratio() * 100.0,
        model.misses(),
        model.miss_ratio() * 100.0,
        model.evictions()
    );
    let _ = write!(out, "\nResident lines: {}/{}", model.resident_lines().len(), model.num_lines());
    out
}
