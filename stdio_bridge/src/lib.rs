// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words stdin stdout stderr

//! # Cooked-mode terminal bridge for hosted processes
//!
//! This crate lets an interactive, line-oriented terminal display stand in for the
//! `stdin`, `stdout`, and `stderr` file descriptors of a process that runs inside a
//! host (a byte code virtual machine, an embedded interpreter, a sandbox) with no
//! native console. The host offers no real blocking system calls, so canonical-mode
//! ("cooked") line discipline is emulated entirely with async, callback driven
//! primitives:
//!
//! - Character echo, backspace / erase, and <kbd>Ctrl+C</kbd> interrupts are handled
//!   by the [`LineEditor`].
//! - Reads on descriptor `0` park in a [`PendingReadSlot`] until a line is submitted.
//! - Writes on descriptors `1` and `2` render synchronously to an [`OutputSink`].
//! - Every other descriptor falls through to a previously registered [`FdHandler`].
//!
//! # Control flow
//!
//! ```text
//! host read(0) ──▶ StdioBridge::read ──▶ PendingReadSlot::Awaiting
//!                                                 ▲
//! display input ──▶ InputEvent ──▶ LineEditor ────┘ line completed / interrupted
//!                                                 │
//!                                                 ▼
//!                              copy min(length, n) bytes, completion(Ok(k))
//! ```
//!
//! # How to use this crate
//!
//! 1. Build a [`StdioBridge`] with [`StdioBridge::install`], before the host starts.
//!    Pass in the prior handler for descriptors the bridge does not own.
//! 2. Route the host's `read` / `write` imports to [`StdioBridge::read`] and
//!    [`StdioBridge::write`].
//! 3. Feed display input to [`StdioBridge::handle_event`].
//!
//! For tokio based hosts, wrap the bridge in a [`BridgeHandle`] which gives you `async`
//! reads and writes, and an event pump that drives an [`InputDevice`].

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide clean public API).
pub mod core;
pub mod fd_bridge;
pub mod line_discipline;

// Re-export stable public API using glob imports for ergonomic, flat API surface.
pub use core::*;
pub use fd_bridge::*;
pub use line_discipline::*;
