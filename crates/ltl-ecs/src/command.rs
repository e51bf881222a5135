//! Deferred structural mutations.
//!
//! Systems never change the entity table while the sweep is running. They
//! record a [`Command`] instead, and [`Scene::apply_deferred`] replays the
//! queue in FIFO order once per tick after every system has run. Conflicting
//! commands are not reconciled: the last one recorded wins.
//!
//! [`Scene::apply_deferred`]: crate::scene::Scene::apply_deferred

use crate::arena::ArenaHandle;
use crate::builder::EntityBuilder;
use crate::component::{Component, Tags};
use crate::deque::Deque;
use crate::entity::Entity;
use crate::scene::Scene;

/// A callback run at apply time with an arena-backed builder payload.
pub type DeferredFn = fn(&mut Scene, Entity, &EntityBuilder);

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A single deferred mutation.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// Overwrite the entity's whole tag word.
    SetTags { entity: Entity, tags: Tags },
    /// Write a component value. Does not touch the tag word.
    SetComponent { entity: Entity, component: Component },
    /// Clear the tag word and recycle the slot.
    Deallocate { entity: Entity },
    /// `tags |= mask`.
    EnableTags { entity: Entity, tags: Tags },
    /// `tags &= !mask`.
    DisableTags { entity: Entity, tags: Tags },
    /// Run `func` with the builder stored at `payload`.
    Callback {
        entity: Entity,
        func: DeferredFn,
        payload: ArenaHandle,
    },
}

impl Command {
    /// The entity this command targets.
    pub fn entity(&self) -> Entity {
        match *self {
            Command::SetTags { entity, .. }
            | Command::SetComponent { entity, .. }
            | Command::Deallocate { entity }
            | Command::EnableTags { entity, .. }
            | Command::DisableTags { entity, .. }
            | Command::Callback { entity, .. } => entity,
        }
    }
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// FIFO queue of pending commands.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Deque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Pop the oldest command.
    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Pending commands, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands.iter()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

// ---------------------------------------------------------------------------
// ApplyReport
// ---------------------------------------------------------------------------

/// Outcome of one [`Scene::apply_deferred`](crate::scene::Scene::apply_deferred).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    pub applied: usize,
    pub failed: usize,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.applied + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut queue = CommandQueue::new();
        for index in 0..20 {
            queue.push(Command::Deallocate {
                entity: Entity::new(index),
            });
        }
        assert_eq!(queue.len(), 20);

        let order: Vec<u32> = std::iter::from_fn(|| queue.pop())
            .map(|command| command.entity().to_raw())
            .collect();
        assert_eq!(order, (0..20).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn report_totals() {
        let report = ApplyReport {
            applied: 3,
            failed: 1,
        };
        assert_eq!(report.total(), 4);
    }
}
