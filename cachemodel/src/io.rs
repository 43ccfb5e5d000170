use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use crate::error::{CacheError, Result};
use crate::util::parse_address_list;

pub fn get_reader(file: File) -> Result<impl Read + Seek> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        Ok(BufReader::new(file))
    }
    // Memory map the file on unix systems, traces are read front to back exactly once
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        unsafe {
            let m = Mmap::map(&file)?;
            m.advise(Advice::Sequential)?;
            Ok(Cursor::new(m))
        }
    }
}

/// Reads an address trace, a text file holding addresses separated by commas or whitespace
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<i64>> {
    let file = File::open(path.as_ref())?;
    let mut contents = String::new();
    get_reader(file)?
        .read_to_string(&mut contents)
        .map_err(|e| CacheError::InvalidAddressList(format!("couldn't read {}: {e}", path.as_ref().display())))?;
    parse_address_list(&contents)
}
