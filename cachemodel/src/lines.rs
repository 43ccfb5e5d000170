use serde::{Deserialize, Serialize};

/// A resident cache line
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub index: usize,
    pub tag: u64,
    /// Number of accesses since the line was filled, only consulted by LFU
    pub uses: u64,
}

/// The resident lines of a cache, in order of insertion or last access, oldest first
///
/// Each line carries its own usage count, so removing a line also drops its bookkeeping. Lookups
/// are linear, which is fine for the line counts this is meant to show
#[derive(Debug, Clone, Default)]
pub struct LineStore {
    lines: Vec<Line>,
}

impl LineStore {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in order, oldest first
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn get(&self, position: usize) -> Option<&Line> {
        self.lines.get(position)
    }

    /// The position of the line stored at a given cache index
    pub fn position_of_index(&self, index: usize) -> Option<usize> {
        self.lines.iter().position(|line| line.index == index)
    }

    /// The position of the line holding a given tag
    pub fn position_of_tag(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|line| line.tag == tag)
    }

    /// Moves a line to the most recently used end
    pub fn touch(&mut self, position: usize) {
        let line = self.lines.remove(position);
        self.lines.push(line);
    }

    pub fn record_use(&mut self, position: usize) {
        self.lines[position].uses += 1;
    }

    /// Stores a tag at an index with a fresh usage count
    ///
    /// An index which is already resident keeps its place in the order and has its tag
    /// overwritten, otherwise the line goes on the most recent end
    pub fn insert(&mut self, index: usize, tag: u64) {
        match self.position_of_index(index) {
            Some(position) => {
                let line = &mut self.lines[position];
                line.tag = tag;
                line.uses = 1;
            }
            None => self.lines.push(Line { index, tag, uses: 1 }),
        }
    }

    pub fn remove(&mut self, position: usize) -> Line {
        self.lines.remove(position)
    }

    /// Resident lines sorted by cache index
    pub fn by_index(&self) -> Vec<Line> {
        let mut lines = self.lines.clone();
        lines.sort_by_key(|line| line.index);
        lines
    }
}
