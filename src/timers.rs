//! Timer and tween scheduling.
//!
//! Everything that takes time in the simulation is a normalized progress value
//! `t` in `[0, 1]` derived from accumulated milliseconds. Two owners exist:
//!
//! - [`Timers`]: the world-wide registry for fire-and-forget effects
//!   (projectile flights). Advanced once per frame by `timer_system`.
//! - [`Motion`]: a unit's own goal, stored on the unit and advanced by the
//!   unit update pass.

use crate::geometry::{lerp, Point};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Peak height of a movement hop.
pub const HOP_HEIGHT: f32 = 2.0;

/// Hops per whole second of travel.
pub const HOPS_PER_SECOND: f32 = 3.0;

/// Easing curve applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => -(t * (t - 2.0)),
            Easing::InOutQuad => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t * t
                } else {
                    let t = t - 1.0;
                    -0.5 * (t * (t - 2.0) - 1.0)
                }
            }
        }
    }
}

/// Handle to a scheduled timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Per-step callback receiving normalized progress.
pub type StepFn = Box<dyn FnMut(f32) + Send + Sync>;

struct TimerTask {
    id: TimerId,
    duration: f32,
    elapsed: f32,
    progress: f32,
    step: Option<StepFn>,
}

/// Progress report for one task from a single `advance` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerProgress {
    pub id: TimerId,
    pub t: f32,
    /// Set exactly once, on the call that retires the task.
    pub done: bool,
}

/// Registry of active timer tasks.
#[derive(Resource, Default)]
pub struct Timers {
    next_id: u64,
    tasks: Vec<TimerTask>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task lasting `duration_ms`. A non-positive duration
    /// completes on the next `advance`.
    pub fn schedule(&mut self, duration_ms: f32, step: Option<StepFn>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.tasks.push(TimerTask {
            id,
            duration: duration_ms,
            elapsed: 0.0,
            progress: 0.0,
            step,
        });
        id
    }

    /// Advance every task by `dt_ms`, in insertion order.
    ///
    /// Finished tasks are retired after reporting `done`. The task list is
    /// detached while iterating, so the call only ever touches tasks that
    /// existed when it started.
    pub fn advance(&mut self, dt_ms: f32) -> Vec<TimerProgress> {
        let dt = dt_ms.max(0.0);
        let mut active = std::mem::take(&mut self.tasks);
        let mut reports = Vec::with_capacity(active.len());

        active.retain_mut(|task| {
            task.elapsed += dt;
            let t = if task.duration <= 0.0 {
                1.0
            } else {
                (task.elapsed / task.duration).min(1.0)
            };
            task.progress = t;
            if let Some(step) = task.step.as_mut() {
                step(t);
            }
            let done = t >= 1.0;
            reports.push(TimerProgress { id: task.id, t, done });
            !done
        });

        // Anything scheduled meanwhile goes after the survivors.
        active.append(&mut self.tasks);
        self.tasks = active;
        reports
    }

    /// Last reported progress of a live task.
    pub fn progress(&self, id: TimerId) -> Option<f32> {
        self.tasks.iter().find(|task| task.id == id).map(|task| task.progress)
    }

    /// Drop a task without completing it.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Timer reports produced during the current frame.
#[derive(Resource, Default, Debug)]
pub struct TimerFrame(pub Vec<TimerProgress>);

/// Straight-line hop from `origin` to `target` driven by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub origin: Point,
    pub target: Point,
    /// Total travel time in milliseconds.
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
    pub hops: f32,
}

/// Transform produced by one motion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub position: Point,
    pub z: f32,
    pub t: f32,
    pub done: bool,
}

impl Motion {
    pub fn new(origin: Point, target: Point, duration: f32, easing: Easing) -> Self {
        let duration = duration.max(0.0);
        Self {
            origin,
            target,
            duration,
            elapsed: 0.0,
            easing,
            hops: (duration / 1000.0).floor() * HOPS_PER_SECOND,
        }
    }

    pub fn advance(&mut self, dt_ms: f32) -> MotionSample {
        self.elapsed += dt_ms.max(0.0);
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        };

        if t >= 1.0 {
            return MotionSample {
                position: self.target,
                z: 0.0,
                t,
                done: true,
            };
        }

        let k = self.easing.apply(t);
        MotionSample {
            position: Point::new(
                lerp(self.origin.x, self.target.x, k),
                lerp(self.origin.y, self.target.y, k),
            ),
            z: (t * PI * self.hops).sin().abs() * HOP_HEIGHT,
            t,
            done: false,
        }
    }
}
