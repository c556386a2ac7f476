use parking_lot::RwLock;

use super::task::TrackedTask;

/// Process-local task records, in insertion order.
///
/// Every mutation takes the write lock, so concurrent progress callbacks
/// for one task are applied one at a time.
pub struct TaskStore<T> {
    tasks: RwLock<Vec<T>>,
}

impl<T: TrackedTask> Default for TaskStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TrackedTask> TaskStore<T> {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, task: T) {
        self.tasks.write().push(task);
    }

    /// Applies `apply` to the task if it still exists. A task removed by
    /// the user mid-transfer is not recreated.
    pub fn update(&self, id: &str, apply: impl FnOnce(&mut T)) -> bool {
        let mut tasks = self.tasks.write();
        match tasks.iter_mut().find(|t| t.id() == id) {
            Some(task) => {
                apply(task);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.tasks.read().iter().find(|t| t.id() == id).cloned()
    }

    pub fn list(&self, owner: &str) -> Vec<T> {
        self.tasks
            .read()
            .iter()
            .filter(|t| t.owner() == owner)
            .cloned()
            .collect()
    }

    pub fn remove(&self, owner: &str, id: &str) -> bool {
        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|t| !(t.owner() == owner && t.id() == id));
        tasks.len() != before
    }

    /// Removes the owner's clearable tasks; returns how many went
    pub fn clear_completed(&self, owner: &str) -> usize {
        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|t| !(t.owner() == owner && t.clearable()));
        before - tasks.len()
    }
}
