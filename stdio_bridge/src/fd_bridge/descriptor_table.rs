// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{BridgeError, Completion, SafeHostBuffer};
use std::{fmt, sync::Arc};

pub const STDIN_FD: i32 = 0;
pub const STDOUT_FD: i32 = 1;
pub const STDERR_FD: i32 = 2;

/// Where a descriptor number is routed to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// `0`, served by the pending read slot.
    Stdin,
    /// `1`, rendered to the output sink.
    Stdout,
    /// `2`, rendered to the output sink.
    Stderr,
    /// Anything else, handed to the prior handler (if there is one).
    Delegated(i32),
}

impl From<i32> for Descriptor {
    fn from(fd: i32) -> Self {
        match fd {
            STDIN_FD => Descriptor::Stdin,
            STDOUT_FD => Descriptor::Stdout,
            STDERR_FD => Descriptor::Stderr,
            _ => Descriptor::Delegated(fd),
        }
    }
}

impl Descriptor {
    #[must_use]
    pub fn is_output(&self) -> bool {
        matches!(self, Descriptor::Stdout | Descriptor::Stderr)
    }
}

/// The host's own `read` / `write` implementation, which was in place before the bridge
/// was installed. Owns every descriptor the bridge does not.
///
/// The handler is responsible for eventually calling `completion` exactly once. The
/// `position` argument is passed through as given by the host (`None` means the current
/// file position).
pub trait FdHandler: Send + Sync {
    fn read(
        &self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    );

    fn write(
        &self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    );
}

/// Maps descriptor numbers to routes. Built once when the bridge is installed and never
/// changed after that, so it is cheap to clone and safe to consult without holding the
/// bridge lock.
#[derive(Clone, Default)]
pub struct DescriptorTable {
    prior: Option<Arc<dyn FdHandler>>,
}

impl fmt::Debug for DescriptorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorTable")
            .field("has_prior", &self.prior.is_some())
            .finish()
    }
}

impl DescriptorTable {
    #[must_use]
    pub fn new(prior: Option<Arc<dyn FdHandler>>) -> Self { Self { prior } }

    #[must_use]
    pub fn route(&self, fd: i32) -> Descriptor { Descriptor::from(fd) }

    #[must_use]
    pub fn has_prior(&self) -> bool { self.prior.is_some() }

    /// Hand a read the bridge doesn't serve to the prior handler, or fail it with
    /// [`BridgeError::InvalidDescriptor`].
    pub fn delegate_read(
        &self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    ) {
        match &self.prior {
            Some(prior) => {
                tracing::trace!(message = "Delegating read", fd = ?fd, length = ?length);
                prior.read(fd, buffer, offset, length, position, completion);
            }
            None => reject(fd, "read", completion),
        }
    }

    /// Hand a write the bridge doesn't serve to the prior handler, or fail it with
    /// [`BridgeError::InvalidDescriptor`].
    pub fn delegate_write(
        &self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    ) {
        match &self.prior {
            Some(prior) => {
                tracing::trace!(message = "Delegating write", fd = ?fd, length = ?length);
                prior.write(fd, buffer, offset, length, position, completion);
            }
            None => reject(fd, "write", completion),
        }
    }
}

fn reject(fd: i32, operation: &str, completion: Completion) {
    tracing::warn!(message = "No handler for descriptor", fd = ?fd, operation = %operation);
    completion(Err(BridgeError::InvalidDescriptor { fd }));
}
