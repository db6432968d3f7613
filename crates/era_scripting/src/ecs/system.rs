//! System trait and priorities

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::World;

/// Execution priority of a system
///
/// Ordering follows execution: `High` sorts first and runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SystemPriority {
    /// Runs before everything else (input, script state sync)
    High = 0,
    /// Regular game logic
    Normal = 1,
    /// Runs after everything else (cleanup, diagnostics)
    Low = 2,
}

impl SystemPriority {
    /// All priorities in execution order
    pub const ALL: [Self; 3] = [Self::High, Self::Normal, Self::Low];

    pub(crate) const fn bucket(self) -> usize {
        self as usize
    }
}

/// Error returned by a system's update
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SystemFault(String);

impl SystemFault {
    /// Fault with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Fault message
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Unit of per-frame logic
///
/// The priority is read once at registration and never again; to move a
/// system to another priority, unregister it and register it again.
pub trait System: Send {
    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Execution priority
    fn priority(&self) -> SystemPriority {
        SystemPriority::Normal
    }

    /// Advance by `delta_time` seconds
    ///
    /// Must not block and must not wait on asynchronous work; queue follow-up
    /// work with [`World::defer`] instead.
    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemFault>;
}

/// System built from a closure
pub struct FnSystem<F> {
    name: String,
    priority: SystemPriority,
    update: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&mut World, f32) -> Result<(), SystemFault> + Send,
{
    /// Wrap `update` as a named system
    pub fn new(name: impl Into<String>, priority: SystemPriority, update: F) -> Self {
        Self {
            name: name.into(),
            priority,
            update,
        }
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut World, f32) -> Result<(), SystemFault> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> SystemPriority {
        self.priority
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemFault> {
        (self.update)(world, delta_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_matches_execution() {
        assert!(SystemPriority::High < SystemPriority::Normal);
        assert!(SystemPriority::Normal < SystemPriority::Low);
        let mut sorted = [SystemPriority::Low, SystemPriority::High, SystemPriority::Normal];
        sorted.sort();
        assert_eq!(sorted, SystemPriority::ALL);
    }

    #[test]
    fn test_fault_message() {
        let fault = SystemFault::new("lost target");
        assert_eq!(fault.message(), "lost target");
        assert_eq!(fault.to_string(), "lost target");
    }
}
