//! Deferred command queue
//!
//! Work that must not run inside the current dispatch is queued here and
//! picked up by a later editor turn. Time is logical: the queue only moves
//! forward when [`CommandQueue::advance`] is called, which keeps every
//! deferred step deterministic under test.

use crate::canvas::EdgeId;
use std::time::Duration;
use topolab_core::NodeId;

/// When a deferred command becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// On the next editor turn
    NextTurn,
    /// Once the clock has advanced by at least this much
    After(Duration),
}

/// Deferred editor work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Remove an edge that was refused by the edge validator
    RetractEdge(EdgeId),
    /// Remove a node requested from its context menu
    RemoveNode(NodeId),
    /// Run the link phase of a rebuild
    CreateRebuildLinks {
        /// Rebuild the links belong to; older generations are stale
        generation: u64,
    },
    /// Mark a launched attack as finished
    EndAttack {
        /// Attack sequence number; a newer attack makes this one stale
        attack: u64,
    },
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Duration,
    seq: u64,
    command: EditorCommand,
}

/// FIFO of deferred commands ordered by due time.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    now: Duration,
    next_seq: u64,
    entries: Vec<Scheduled>,
}

impl CommandQueue {
    /// Create an empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command.
    pub fn schedule(&mut self, when: Deferred, command: EditorCommand) {
        let due = match when {
            Deferred::NextTurn => self.now,
            Deferred::After(delay) => self.now + delay,
        };
        self.entries.push(Scheduled {
            due,
            seq: self.next_seq,
            command,
        });
        self.next_seq += 1;
    }

    /// Move the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Remove and return every due command, earliest first; ties keep
    /// scheduling order.
    pub fn take_due(&mut self) -> Vec<EditorCommand> {
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|s| s.due <= now);
        self.entries = pending;
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| s.command).collect()
    }

    /// Due time of the earliest pending command.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|s| s.due).min()
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending command matching `predicate`.
    pub fn cancel_where(&mut self, predicate: impl Fn(&EditorCommand) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|s| !predicate(&s.command));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_turn_is_due_immediately() {
        let mut queue = CommandQueue::new();
        queue.schedule(Deferred::NextTurn, EditorCommand::RetractEdge(EdgeId(1)));
        assert_eq!(queue.take_due(), vec![EditorCommand::RetractEdge(EdgeId(1))]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_delayed_commands_wait_for_the_clock() {
        let mut queue = CommandQueue::new();
        queue.schedule(
            Deferred::After(Duration::from_millis(50)),
            EditorCommand::CreateRebuildLinks { generation: 1 },
        );
        queue.schedule(Deferred::NextTurn, EditorCommand::RetractEdge(EdgeId(7)));

        assert_eq!(queue.take_due(), vec![EditorCommand::RetractEdge(EdgeId(7))]);
        assert_eq!(queue.next_due(), Some(Duration::from_millis(50)));

        queue.advance(Duration::from_millis(49));
        assert!(queue.take_due().is_empty());
        queue.advance(Duration::from_millis(1));
        assert_eq!(
            queue.take_due(),
            vec![EditorCommand::CreateRebuildLinks { generation: 1 }]
        );
    }

    #[test]
    fn test_due_order_is_time_then_fifo() {
        let mut queue = CommandQueue::new();
        queue.schedule(
            Deferred::After(Duration::from_millis(5)),
            EditorCommand::RetractEdge(EdgeId(3)),
        );
        queue.schedule(Deferred::NextTurn, EditorCommand::RetractEdge(EdgeId(1)));
        queue.schedule(Deferred::NextTurn, EditorCommand::RetractEdge(EdgeId(2)));
        queue.advance(Duration::from_millis(10));
        assert_eq!(
            queue.take_due(),
            vec![
                EditorCommand::RetractEdge(EdgeId(1)),
                EditorCommand::RetractEdge(EdgeId(2)),
                EditorCommand::RetractEdge(EdgeId(3)),
            ]
        );
    }

    #[test]
    fn test_cancel_where() {
        let mut queue = CommandQueue::new();
        queue.schedule(Deferred::NextTurn, EditorCommand::CreateRebuildLinks { generation: 1 });
        queue.schedule(Deferred::NextTurn, EditorCommand::RetractEdge(EdgeId(1)));
        let dropped =
            queue.cancel_where(|c| matches!(c, EditorCommand::CreateRebuildLinks { .. }));
        assert_eq!(dropped, 1);
        assert_eq!(queue.len(), 1);
    }
}
