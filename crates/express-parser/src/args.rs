use indexmap::IndexSet;

/// Argument store: an ordered name → slot map plus a dense value array.
///
/// Slots are assigned in first-occurrence order while parsing and never
/// change afterwards. `values()` is the slice handed to evaluators, indexed
/// by slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentTable {
    names: IndexSet<String>,
    values: Vec<f64>,
}

impl ArgumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `name`, appending it with value `0.0` if unseen.
    pub fn get_or_insert(&mut self, name: &str) -> usize {
        if let Some(slot) = self.names.get_index_of(name) {
            return slot;
        }
        let (slot, _) = self.names.insert_full(name.to_string());
        self.values.push(0.0);
        slot
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn get(&self, slot: usize) -> Option<f64> {
        self.values.get(slot).copied()
    }

    /// Overwrites the value at `slot`. Returns false if the slot does not exist.
    pub fn set(&mut self, slot: usize, value: f64) -> bool {
        match self.values.get_mut(slot) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    /// Names in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(name, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.keys().zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
