use crate::item::{Item, ItemState};

/// An ordered, append-only (after scan completion) collection of items
/// produced by a single scan. Insertion order is preserved for
/// deterministic output. Items' states mutate in place; nothing is ever
/// removed or reordered.
#[derive(Default)]
pub struct Queue {
    items: Vec<Item>,
}

impl Queue {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.iter_mut()
    }

    /// Items whose state is any of `states`.
    pub fn count(&self, states: &[ItemState]) -> usize {
        self.items.iter().filter(|i| states.contains(&i.state)).count()
    }

    pub fn count_total(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{BoxFuture, ResourceInstance};
    use crate::error::ReaperError;

    struct FakeResource(&'static str);
    impl ResourceInstance for FakeResource {
        fn remove(&self) -> BoxFuture<'_, Result<(), ReaperError>> {
            Box::pin(async { Ok(()) })
        }
        fn identity(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn count_total_matches_sum_of_all_states() {
        let mut q = Queue::new();
        q.push(Item::new("Kind", "r1", Box::new(FakeResource("a"))));
        q.push(Item::new_filtered("Kind", "r1", Box::new(FakeResource("b")), "keep"));

        let all_states = [
            ItemState::New,
            ItemState::Pending,
            ItemState::Waiting,
            ItemState::Failed,
            ItemState::Filtered,
            ItemState::Finished,
        ];
        let sum: usize = all_states.iter().map(|s| q.count(&[*s])).sum();
        assert_eq!(sum, q.count_total());
        assert_eq!(q.count(&[ItemState::New]) + q.count(&[ItemState::Filtered]), q.count_total());
    }
}
