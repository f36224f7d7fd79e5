use std::collections::HashSet;

/// Model ids already present in storage.
///
/// Rebuilt from storage at the start of every ingestion run and consulted
/// instead of the database while a batch is scanned.
#[derive(Debug, Clone, Default)]
pub struct ModelIdSet {
    ids: HashSet<String>,
}

impl ModelIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, model_id: impl Into<String>) {
        self.ids.insert(model_id.into());
    }

    pub fn remove(&mut self, model_id: &str) {
        self.ids.remove(model_id);
    }

    pub fn has(&self, model_id: &str) -> bool {
        self.ids.contains(model_id)
    }

    pub fn missing(&self, model_id: &str) -> bool {
        !self.has(model_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<String> for ModelIdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
