use super::view_model::{ViewListener, ViewState};

/// Generational handle to an attached view. A handle whose view was
/// detached never resolves again, even when its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    view: Option<ViewState>,
}

#[derive(Debug, Default)]
pub struct ViewRegistry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, listener: Box<dyn ViewListener>) -> ViewId {
        let view = ViewState::new(listener);
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation += 1;
                slot.view = Some(view);
                ViewId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    view: Some(view),
                });
                ViewId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub fn detach(&mut self, id: ViewId) -> bool {
        match self.slots.get_mut(id.index) {
            Some(slot) if slot.generation == id.generation && slot.view.is_some() => {
                slot.view = None;
                self.free.push(id.index);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: ViewId) -> Option<&ViewState> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.view.as_ref())
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut ViewState> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.view.as_mut())
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.view.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<ViewId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.view.is_some())
            .map(|(index, slot)| ViewId {
                index,
                generation: slot.generation,
            })
            .collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ViewState> {
        self.slots.iter_mut().filter_map(|slot| slot.view.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewState> {
        self.slots.iter().filter_map(|slot| slot.view.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::NullView;

    #[test]
    fn test_detached_handle_goes_stale() {
        let mut views = ViewRegistry::new();
        let a = views.attach(Box::new(NullView));
        let b = views.attach(Box::new(NullView));
        assert_eq!(views.len(), 2);

        assert!(views.detach(a));
        assert!(!views.detach(a));
        assert!(views.get(a).is_none());

        let c = views.attach(Box::new(NullView));
        assert_ne!(a, c);
        assert!(views.get(a).is_none());
        assert!(views.contains(c));
        assert!(views.contains(b));
        assert_eq!(views.ids().len(), 2);
    }

    #[test]
    fn test_iteration_skips_empty_slots() {
        let mut views = ViewRegistry::new();
        let a = views.attach(Box::new(NullView));
        views.attach(Box::new(NullView));
        views.detach(a);
        assert_eq!(views.iter_mut().count(), 1);
        assert!(!views.is_empty());
    }
}
