//! System scheduling with fault isolation
//!
//! Provides deterministic execution order: systems are grouped into one
//! bucket per [`SystemPriority`] and run bucket by bucket, in registration
//! order inside a bucket. Priorities never change after registration, so the
//! order never needs re-sorting.
//!
//! A system that returns an error or panics is logged and skipped for the rest
//! of that frame; the other systems still run. A system that faults in
//! `fault_escalation_threshold` consecutive frames is deregistered.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;

use super::system::{System, SystemFault, SystemPriority};
use super::World;
use crate::config::SchedulerConfig;

/// Unique identifier for systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(pub u64);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// Why a system's update did not complete
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerSystemFault {
    /// Update returned an error
    #[error("update failed: {0}")]
    Failed(#[from] SystemFault),

    /// Update panicked
    #[error("update panicked: {0}")]
    Panicked(String),
}

/// One fault observed during a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    /// Faulting system
    pub system: SystemId,
    /// Its name at registration
    pub name: String,
    /// What happened
    pub fault: SchedulerSystemFault,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based frame index
    pub frame: u64,
    /// Systems invoked, in invocation order
    pub invoked: Vec<SystemId>,
    /// Faults, in invocation order
    pub faults: Vec<FaultRecord>,
    /// Systems deregistered at the end of this frame
    pub escalated: Vec<SystemId>,
    /// Deferred commands that panicked at the end of this frame
    pub deferred_failures: usize,
}

impl FrameReport {
    /// Whether every system and every deferred command completed
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty() && self.deferred_failures == 0
    }
}

struct Entry {
    id: SystemId,
    name: String,
    system: Box<dyn System>,
    consecutive_faults: u32,
}

/// Priority-ordered system scheduler
pub struct SystemScheduler {
    buckets: [Vec<Entry>; 3],
    next_id: u64,
    fault_threshold: u32,
    frame_count: u64,
}

impl Default for SystemScheduler {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl SystemScheduler {
    /// Create an empty scheduler
    ///
    /// A threshold of zero is treated as one.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            buckets: [Vec::new(), Vec::new(), Vec::new()],
            next_id: 0,
            fault_threshold: config.fault_escalation_threshold.max(1),
            frame_count: 0,
        }
    }

    /// Register a system
    pub fn register<S: System + 'static>(&mut self, system: S) -> SystemId {
        self.register_boxed(Box::new(system))
    }

    /// Register an already boxed system
    pub fn register_boxed(&mut self, system: Box<dyn System>) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;
        let priority = system.priority();
        let name = system.name().to_string();
        log::debug!("Registered system '{}' ({}) at {:?} priority", name, id, priority);

        self.buckets[priority.bucket()].push(Entry {
            id,
            name,
            system,
            consecutive_faults: 0,
        });
        id
    }

    /// Remove a system and hand it back
    pub fn unregister(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        for bucket in &mut self.buckets {
            if let Some(pos) = bucket.iter().position(|e| e.id == id) {
                let entry = bucket.remove(pos);
                log::debug!("Unregistered system '{}' ({})", entry.name, id);
                return Some(entry.system);
            }
        }
        None
    }

    fn entry(&self, id: SystemId) -> Option<(SystemPriority, &Entry)> {
        SystemPriority::ALL.iter().find_map(|priority| {
            self.buckets[priority.bucket()]
                .iter()
                .find(|e| e.id == id)
                .map(|e| (*priority, e))
        })
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: SystemId) -> bool {
        self.entry(id).is_some()
    }

    /// Name a system was registered with
    pub fn system_name(&self, id: SystemId) -> Option<&str> {
        self.entry(id).map(|(_, e)| e.name.as_str())
    }

    /// Priority a system was registered with
    pub fn priority_of(&self, id: SystemId) -> Option<SystemPriority> {
        self.entry(id).map(|(priority, _)| priority)
    }

    /// Consecutive faulting frames for a system
    pub fn consecutive_faults(&self, id: SystemId) -> Option<u32> {
        self.entry(id).map(|(_, e)| e.consecutive_faults)
    }

    /// Ids in the order the next frame will invoke them
    pub fn execution_order(&self) -> Vec<SystemId> {
        self.buckets.iter().flatten().map(|e| e.id).collect()
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Whether no system is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Consecutive faulting frames that trigger deregistration
    pub fn fault_threshold(&self) -> u32 {
        self.fault_threshold
    }

    /// Run every registered system once
    ///
    /// `delta_time` is forwarded unchanged unless it is negative or not
    /// finite, in which case systems receive `0.0` and a warning is logged.
    /// Deferred world commands run after the last system.
    pub fn run_frame(&mut self, world: &mut World, delta_time: f32) -> FrameReport {
        let delta_time = if delta_time.is_finite() && delta_time >= 0.0 {
            delta_time
        } else {
            world
                .logger()
                .warning(format!("Invalid frame delta {} replaced with 0", delta_time));
            0.0
        };

        let mut report = FrameReport {
            frame: self.frame_count,
            ..FrameReport::default()
        };
        let threshold = self.fault_threshold;

        world.begin_frame();
        for bucket in &mut self.buckets {
            for entry in bucket.iter_mut() {
                report.invoked.push(entry.id);

                let outcome = catch_unwind(AssertUnwindSafe(|| entry.system.update(world, delta_time)));
                let fault = match outcome {
                    Ok(Ok(())) => {
                        entry.consecutive_faults = 0;
                        continue;
                    }
                    Ok(Err(err)) => SchedulerSystemFault::Failed(err),
                    Err(payload) => SchedulerSystemFault::Panicked(panic_message(payload.as_ref())),
                };

                entry.consecutive_faults += 1;
                world.logger().error(format!(
                    "System '{}' ({}) faulted: {}",
                    entry.name, entry.id, fault
                ));
                if entry.consecutive_faults >= threshold {
                    report.escalated.push(entry.id);
                }
                report.faults.push(FaultRecord {
                    system: entry.id,
                    name: entry.name.clone(),
                    fault,
                });
            }

            if !report.escalated.is_empty() {
                bucket.retain(|entry| {
                    let escalate = report.escalated.contains(&entry.id);
                    if escalate {
                        world.logger().error(format!(
                            "System '{}' ({}) deregistered after {} consecutive faulting frames",
                            entry.name, entry.id, entry.consecutive_faults
                        ));
                    }
                    !escalate
                });
            }
        }
        report.deferred_failures = world.end_frame();

        self.frame_count += 1;
        report
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
