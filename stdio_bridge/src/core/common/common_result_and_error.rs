// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! For more information on error types, see:
//!
//! 1. [Article](https://developerlife.com/2024/06/10/rust-miette-error-handling/)
//! 2. [Video](https://youtu.be/TmLF7vI8lKk)

use miette::Diagnostic;
use std::io;

/// Type alias to make it easy to work with:
/// 1. [`std::result::Result`]
/// 2. [`miette::Result`] and [`miette::Report`], which are [`std::error::Error`]
///    wrappers.
///
/// - It is basically `miette::Result<T, miette::Report>`.
/// - Works hand in hand w/ [`BridgeError`] and any other type of error.
pub type CommonResult<T> = miette::Result<T>;

/// Result type that is handed to a [`crate::Completion`]. The success value is the number
/// of bytes that were read or written.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that finalize a single `read` or `write` call on the bridge. None of them are
/// fatal to the bridge itself, and none of them are ever retried. Each one is surfaced
/// through the completion continuation of the call that caused it.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum BridgeError {
    /// Read or write on a descriptor that is not `0`, `1`, or `2`, and there is no prior
    /// handler to delegate to.
    #[error("Invalid fd: {fd}")]
    #[diagnostic(
        code(stdio_bridge::invalid_descriptor),
        help("Only 0 (stdin), 1 (stdout), and 2 (stderr) are routed by the bridge; install it with a prior handler to serve other descriptors")
    )]
    InvalidDescriptor { fd: i32 },

    /// A second read was issued on `stdin` while one was still waiting for a line.
    #[error("A read on stdin is already pending")]
    #[diagnostic(
        code(stdio_bridge::double_read),
        help("Serialize stdin reads; wait for the previous read to complete before issuing another")
    )]
    DoubleRead,

    /// The `[offset, offset + length)` span does not fit inside the caller's buffer.
    #[error(
        "Span [{offset}, {offset}+{length}) is out of range for buffer of length {buffer_len}"
    )]
    #[diagnostic(code(stdio_bridge::invalid_buffer_range))]
    InvalidBufferRange {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },

    /// An I/O failure, eg: from a prior [`crate::FdHandler`] backed by a real file.
    /// Display failures on `stdout` / `stderr` are logged instead, and never surface
    /// here.
    #[error(transparent)]
    #[diagnostic(code(stdio_bridge::sink))]
    Sink(#[from] io::Error),

    /// The completion continuation was dropped without ever being invoked. Only the async
    /// facade ([`crate::BridgeHandle`]) can observe this, eg: when the bridge is dropped
    /// while a read is still parked.
    #[error("Bridge closed before the operation completed")]
    #[diagnostic(code(stdio_bridge::closed))]
    Closed,
}

impl BridgeError {
    /// Checks that `[offset, offset + length)` lies inside a buffer of `buffer_len`
    /// bytes, guarding against overflow.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidBufferRange`] if the span doesn't fit.
    pub fn check_span(offset: usize, length: usize, buffer_len: usize) -> BridgeResult<()> {
        match offset.checked_add(length) {
            Some(end) if end <= buffer_len => Ok(()),
            _ => Err(BridgeError::InvalidBufferRange {
                offset,
                length,
                buffer_len,
            }),
        }
    }
}
