//! Table of resolved unit handles

use std::collections::HashMap;

#[derive(Debug)]
pub struct UnitCache<U> {
    entries: HashMap<String, U>,
    generation: u64,
}

impl<U> Default for UnitCache<U> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
        }
    }
}

impl<U: Clone> UnitCache<U> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<U> {
        self.entries.get(name).cloned()
    }

    pub fn insert(&mut self, name: &str, unit: U) -> U {
        self.entries.insert(name.to_string(), unit.clone());
        unit
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
