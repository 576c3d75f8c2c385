// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod input_device_fixtures;
pub mod output_device_fixtures;

// Re-export.
pub use input_device_fixtures::*;
pub use output_device_fixtures::*;
