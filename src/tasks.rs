//! Ordered task list and its sort views.

use crate::models::Task;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How the task list is presented. Only `Order` reflects the stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    #[default]
    Order,
    Alpha,
    Status,
}

impl TaskSort {
    pub const ALL: [TaskSort; 3] = [Self::Order, Self::Alpha, Self::Status];

    pub fn id(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Alpha => "alpha",
            Self::Status => "status",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Order => "Manual Order",
            Self::Alpha => "Alphabetical",
            Self::Status => "Incomplete First",
        }
    }

    /// Manual reordering only makes sense in the stored order.
    pub fn allows_reorder(self) -> bool {
        self == Self::Order
    }
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.id() == s)
            .ok_or_else(|| format!("unknown sort '{s}', expected order, alpha or status"))
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The user's tasks in their stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Appends a new incomplete task. Returns `None` for a blank title.
    ///
    /// `now_millis` seeds the id; it is bumped until unique within the list.
    pub fn add(&mut self, title: &str, now_millis: i64) -> Option<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let mut stamp = now_millis;
        while self.get(&stamp.to_string()).is_some() {
            stamp += 1;
        }

        self.tasks.push(Task {
            id: stamp.to_string(),
            title: title.to_string(),
            completed: false,
        });
        self.tasks.last()
    }

    /// Flips the completed flag, returning the new value.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    /// Renames a task, trimming the new title. Blank titles are rejected.
    pub fn rename(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Moves the task at `from` to `to`, shifting the tasks in between.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tasks.len() || to >= self.tasks.len() {
            return false;
        }
        if from != to {
            let task = self.tasks.remove(from);
            self.tasks.insert(to, task);
        }
        true
    }

    /// Ids of every completed task, in stored order.
    pub fn completed_ids(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Returns the tasks as presented in `sort`, leaving the list untouched.
    pub fn sorted(&self, sort: TaskSort) -> Vec<&Task> {
        let mut view: Vec<&Task> = self.tasks.iter().collect();
        match sort {
            TaskSort::Order => {}
            TaskSort::Alpha => view.sort_by(|a, b| compare_titles(&a.title, &b.title)),
            TaskSort::Status => view.sort_by_key(|t| t.completed),
        }
        view
    }
}

// Case-insensitive first so "apple" sits next to "Apple", then raw order.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(titles: &[&str]) -> TaskList {
        let mut list = TaskList::default();
        for title in titles {
            list.add(title, 1_000).unwrap();
        }
        list
    }

    fn titles(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_add_appends_trimmed_incomplete_task() {
        let mut list = TaskList::default();
        let task = list.add("  Write report  ", 1_700_000_000_000).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.id, "1700000000000");
        assert!(!task.completed);
    }

    #[test]
    fn test_add_rejects_blank_titles() {
        let mut list = TaskList::default();
        assert!(list.add("", 1).is_none());
        assert!(list.add("   \t", 1).is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_ids_are_unique_for_same_timestamp() {
        let list = list_of(&["a", "b", "c"]);
        let ids: Vec<_> = list.as_slice().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1000", "1001", "1002"]);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut list = list_of(&["a"]);
        let id = list.as_slice()[0].id.clone();
        assert_eq!(list.toggle(&id), Some(true));
        assert_eq!(list.toggle(&id), Some(false));
        assert!(!list.get(&id).unwrap().completed);
    }

    #[test]
    fn test_toggle_missing_is_noop() {
        let mut list = list_of(&["a"]);
        let before = list.clone();
        assert_eq!(list.toggle("nope"), None);
        assert_eq!(list, before);
    }

    #[test]
    fn test_rename() {
        let mut list = list_of(&["a"]);
        let id = list.as_slice()[0].id.clone();
        assert!(list.rename(&id, "  Better title "));
        assert_eq!(list.get(&id).unwrap().title, "Better title");
        assert!(!list.rename(&id, "   "));
        assert_eq!(list.get(&id).unwrap().title, "Better title");
        assert!(!list.rename("nope", "x"));
    }

    #[test]
    fn test_delete() {
        let mut list = list_of(&["a", "b"]);
        let id = list.as_slice()[0].id.clone();
        assert_eq!(list.delete(&id).unwrap().title, "a");
        assert_eq!(list.len(), 1);
        assert!(list.delete(&id).is_none());
    }

    #[test]
    fn test_reorder_moves_and_shifts() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        assert!(list.reorder(0, 2));
        assert_eq!(titles(&list.sorted(TaskSort::Order)), vec!["b", "c", "a", "d"]);
        assert!(list.reorder(3, 0));
        assert_eq!(titles(&list.sorted(TaskSort::Order)), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        let mut list = list_of(&["a", "b", "c", "d", "e"]);
        let mut before: Vec<_> = list.as_slice().iter().map(|t| t.id.clone()).collect();
        list.reorder(1, 4);
        list.reorder(4, 0);
        list.reorder(2, 2);
        let mut after: Vec<_> = list.as_slice().iter().map(|t| t.id.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let mut list = list_of(&["a", "b"]);
        let before = list.clone();
        assert!(!list.reorder(0, 2));
        assert!(!list.reorder(5, 0));
        assert_eq!(list, before);
    }

    #[test]
    fn test_alpha_sort_is_a_view() {
        let list = list_of(&["pear", "Apple", "banana", "apple"]);
        let sorted = list.sorted(TaskSort::Alpha);
        assert_eq!(titles(&sorted), vec!["Apple", "apple", "banana", "pear"]);
        assert_eq!(
            titles(&list.sorted(TaskSort::Order)),
            vec!["pear", "Apple", "banana", "apple"]
        );
    }

    #[test]
    fn test_status_sort_is_stable_and_a_view() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        let ids: Vec<_> = list.as_slice().iter().map(|t| t.id.clone()).collect();
        list.toggle(&ids[0]);
        list.toggle(&ids[2]);

        assert_eq!(titles(&list.sorted(TaskSort::Status)), vec!["b", "d", "a", "c"]);
        assert_eq!(titles(&list.sorted(TaskSort::Order)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_completed_ids() {
        let mut list = list_of(&["a", "b", "c"]);
        let id = list.as_slice()[1].id.clone();
        list.toggle(&id);
        assert_eq!(list.completed_ids(), vec![id]);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("alpha".parse::<TaskSort>().unwrap(), TaskSort::Alpha);
        assert!("random".parse::<TaskSort>().is_err());
        assert!(TaskSort::Order.allows_reorder());
        assert!(!TaskSort::Status.allows_reorder());
    }
}
