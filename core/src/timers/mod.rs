//! Timer system
//!
//! This module provides:
//! - **Kind rules**: one behavior table shared by defaults, ticks and UI guards
//! - **Records**: creation, normalization of stored data, immutable updates
//! - **Engine**: the per-tick state machine for all four timer kinds
//! - **Scheduler**: pending resets for cyclic timers
//! - **Manager**: the ordered collection and its persistence
//!
//! # Timer Kinds
//!
//! - Stopwatch: counts up forever
//! - Countdown: counts down and stops at zero
//! - Target date: remaining time until an absolute instant
//! - Cyclic: counts down, rests at zero for a grace window, then restarts

mod color;
mod engine;
mod error;
mod kind;
mod manager;
mod record;
mod scheduler;
mod target;


pub use color::{PALETTE, normalize_color, parse_rgb, random_background};
pub use engine::{Milestone, TickReport, TimerEvent, advance, apply_cycle_reset, tick};
pub use error::TimerError;
pub use kind::{Advance, InitialTime, KindRules, decrement_guards, effective_cycle, rules};
pub use manager::TimerCollection;
pub use record::{RecordExt, TimerOverrides, build, create, from_stored, initial_time};
pub use scheduler::Scheduler;
pub use target::{format_target, parse_target, seconds_until};
