//! Label table filled by the assembler's first pass

use std::collections::HashMap;

use super::Word;

/// Maps label names to byte addresses. Rebuilt from scratch for every
/// assembly and never consulted at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, Word>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `address`. Returns the previous address if the label
    /// was already defined; the new definition replaces it.
    pub fn define<S: Into<String>>(&mut self, name: S, address: Word) -> Option<Word> {
        self.labels.insert(name.into(), address)
    }

    pub fn resolve(&self, name: &str) -> Option<Word> {
        self.labels.get(name).copied()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels sorted by address, then name
    pub fn sorted(&self) -> Vec<(&str, Word)> {
        let mut labels: Vec<_> = self
            .labels
            .iter()
            .map(|(name, address)| (name.as_str(), *address))
            .collect();
        labels.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_resolve() {
        let mut table = LabelTable::new();

        assert_eq!(table.define("start", 0x00), None);
        assert_eq!(table.define("loop", 0x06), None);

        assert_eq!(table.resolve("start"), Some(0x00));
        assert_eq!(table.resolve("loop"), Some(0x06));
        assert_eq!(table.resolve("missing"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn redefinition_replaces() {
        let mut table = LabelTable::new();

        table.define("loop", 0x02);
        assert_eq!(table.define("loop", 0x08), Some(0x02));
        assert_eq!(table.resolve("loop"), Some(0x08));
    }

    #[test]
    fn sorted_by_address() {
        let mut table = LabelTable::new();
        table.define("end", 0x10);
        table.define("b", 0x04);
        table.define("a", 0x04);

        assert_eq!(table.sorted(), vec![("a", 0x04), ("b", 0x04), ("end", 0x10)]);

        table.clear();
        assert!(table.is_empty());
    }
}
