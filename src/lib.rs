//! # Duskhollow - a data-driven horror text adventure interpreter
//!
//! Duskhollow accepts free-text player commands against a fictional world
//! described in JSON documents, mutates per-player session state, and returns
//! narrative text together with a small set of structured state deltas.
//!
//! ## Features
//!
//! - **Command Parser**: verb/synonym tables, phrasal verbs, direction shortcuts
//!   and object/target/instrument splitting.
//! - **World Model**: rooms, objects with typed capability components, and
//!   ordered data-driven interactions, all validated at load time.
//! - **Action Engine**: movement, item handling, paired inverse verbs
//!   (lock/unlock, tie/untie, fill/pour, board/disembark, enter/exit,
//!   inflate/deflate) and combat.
//! - **Sanity Subsystem**: clamped sanity tracking with threshold bands and
//!   room-entry effects.
//! - **Sessions**: sled-backed persistence with TTL expiry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use duskhollow::game::{GameProcessor, WorldSource};
//!
//! fn main() -> anyhow::Result<()> {
//!     let world = WorldSource::Directory("data/world".into()).load()?;
//!     let processor = GameProcessor::new(Arc::new(world));
//!     let mut state = processor.new_game();
//!     let result = processor.process(&mut state, "look");
//!     println!("{}", result.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - parser, world model, engine, sanity, sessions
//! - [`config`] - TOML configuration
//! - [`validation`] - raw input sanitation
//! - [`logutil`] - log-safe rendering of player text
//! - [`metrics`] - process-wide command counters

pub mod config;
pub mod game;
pub mod logutil;
pub mod metrics;
pub mod validation;
