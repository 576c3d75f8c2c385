// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Routes a hosted process's `read` / `write` calls by descriptor number.
//!
//! | fd   | read                          | write                           |
//! | :--- | :---------------------------- | :------------------------------ |
//! | `0`  | parked in [`PendingReadSlot`] | prior handler, or invalid       |
//! | `1`  | prior handler, or invalid     | rendered to [`OutputSink`]      |
//! | `2`  | prior handler, or invalid     | rendered to [`OutputSink`]      |
//! | else | prior handler, or invalid     | prior handler, or invalid       |

// Attach.
pub mod bridge_config;
pub mod bridge_context;
pub mod bridge_handle;
pub mod descriptor_table;
pub mod output_sink;
pub mod pending_read;

// Re-export.
pub use bridge_config::*;
pub use bridge_context::*;
pub use bridge_handle::*;
pub use descriptor_table::*;
pub use output_sink::*;
pub use pending_read::*;
