use std::collections::HashMap;

use super::fields::NormalizedAction;

/// Accumulates normalized rows for one service, keyed by action name.
///
/// Iteration follows the order in which each action name was first merged.
/// The first row for a name fixes its scalar fields; later rows only extend
/// the list fields, without deduplication.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    index: HashMap<String, usize>,
    actions: Vec<NormalizedAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, row: NormalizedAction) -> &mut Self {
        match self.index.get(&row.action_name) {
            Some(&position) => {
                let existing = &mut self.actions[position];
                existing.resources.extend(row.resources);
                existing.condition_keys.extend(row.condition_keys);
                existing.dependent_actions.extend(row.dependent_actions);
            }
            None => {
                self.index
                    .insert(row.action_name.clone(), self.actions.len());
                self.actions.push(row);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn finish(self) -> Vec<NormalizedAction> {
        self.actions
    }
}
