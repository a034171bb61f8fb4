use std::path::Path;

use super::assets::{AssetError, TextureStore};
use super::input::{ActionStates, InputAction};
use super::sprite::RenderSink;

/// Key state sampled once per simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates) -> Self {
        Self {
            quit_requested,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

/// Issues strictly increasing ids; an id handed out once is never reused.
#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Terminal result a scene reports when it asks the host to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Exit(Outcome),
}

pub trait Scene {
    /// Load named assets and build the initial population. A missing asset
    /// aborts startup.
    fn load(&mut self, assets_dir: &Path, textures: &mut TextureStore) -> Result<(), AssetError>;

    /// Advance one tick. `elapsed_ms` is the tick duration in milliseconds.
    fn update(&mut self, elapsed_ms: f32, input: &InputSnapshot) -> SceneCommand;

    fn render(&mut self, sink: &mut dyn RenderSink);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        let first = allocator.allocate();
        let second = allocator.allocate();
        let third = allocator.allocate();

        assert_eq!(first.0, 0);
        assert_eq!(second.0, 1);
        assert_eq!(third.0, 2);
    }

    #[test]
    fn snapshot_reports_action_state() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::Fire, true);

        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Fire));
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(!snapshot.quit_requested());
    }

    #[test]
    fn with_action_down_can_clear_state() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveRight, true)
            .with_action_down(InputAction::MoveRight, false);

        assert!(!snapshot.is_down(InputAction::MoveRight));
    }
}
