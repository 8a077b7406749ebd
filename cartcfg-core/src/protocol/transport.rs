//! src/protocol/transport.rs
//! ============================================================================
//! # Register Window Transports
//!
//! The register window is an addressable range at a fixed absolute base
//! address. The base address belongs to the transport; encoders and callers
//! only deal in offsets.
//!
//! - [`WindowTransport`]: in-memory window, records every access (dry runs,
//!   tests)
//! - [`MmapTransport`]: window mapped from a device file with `memmap2`

use std::fs::OpenOptions;
use std::path::Path;
use std::ptr;

use memmap2::{MmapMut, MmapOptions};
use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::protocol::command::RegisterWrite;

/// Default absolute address of the cartridge register window.
pub const DEFAULT_BASE_ADDRESS: u64 = 0x00FB_0000;

/// A 16-bit offset space.
pub const DEFAULT_WINDOW_SIZE: usize = 0x1_0000;

pub trait RegisterTransport {
    fn write(&mut self, offset: u16, value: u8) -> Result<(), AppError>;

    fn read(&mut self, offset: u16) -> Result<u8, AppError>;

    /// Push pending accesses out to the device.
    fn flush(&mut self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Perform every access of `frame` in order. The `&mut` borrow keeps other
/// requests off the window until the whole frame is out.
#[instrument(level = "debug", skip_all, fields(operation_type = "protocol", accesses = frame.len()))]
pub fn dispatch<T: RegisterTransport + ?Sized>(
    transport: &mut T,
    frame: &[RegisterWrite],
) -> Result<(), AppError> {
    for access in frame {
        transport.write(access.offset, access.value)?;
    }
    transport.flush()?;

    info!(
        marker = "COMMAND_DISPATCHED",
        operation_type = "protocol",
        accesses = frame.len(),
        "Command frame sent"
    );
    Ok(())
}

fn check_offset(offset: u16, window_size: usize) -> Result<usize, AppError> {
    let index = usize::from(offset);
    if index < window_size {
        Ok(index)
    } else {
        Err(AppError::transport(
            offset,
            format!("outside the {window_size:#x} byte register window"),
        ))
    }
}

/// Register window kept in memory.
#[derive(Debug, Clone)]
pub struct WindowTransport {
    base_address: u64,
    window: Vec<u8>,
    accesses: Vec<RegisterWrite>,
}

impl WindowTransport {
    #[must_use]
    pub fn new(base_address: u64, window_size: usize) -> Self {
        Self {
            base_address,
            window: vec![0; window_size],
            accesses: Vec::new(),
        }
    }

    #[must_use]
    pub const fn base_address(&self) -> u64 {
        self.base_address
    }

    /// Writes seen so far, oldest first.
    #[must_use]
    pub fn accesses(&self) -> &[RegisterWrite] {
        &self.accesses
    }
}

impl RegisterTransport for WindowTransport {
    fn write(&mut self, offset: u16, value: u8) -> Result<(), AppError> {
        let index = check_offset(offset, self.window.len())?;
        self.window[index] = value;
        self.accesses.push(RegisterWrite { offset, value });

        debug!(
            marker = "REGISTER_WRITE",
            operation_type = "protocol",
            "{:#010x} <- {:#04x}",
            self.base_address + u64::from(offset),
            value
        );
        Ok(())
    }

    fn read(&mut self, offset: u16) -> Result<u8, AppError> {
        let index = check_offset(offset, self.window.len())?;
        Ok(self.window[index])
    }
}

/// Register window mapped from a device file (for example a UIO node).
pub struct MmapTransport {
    map: MmapMut,
    base_address: u64,
}

impl MmapTransport {
    /// Map `window_size` bytes of `device` starting at `base_address`.
    pub fn open(device: &Path, base_address: u64, window_size: usize) -> Result<Self, AppError> {
        let file = OpenOptions::new().read(true).write(true).open(device)?;

        // SAFETY: the mapping is only touched through volatile accesses below
        // and never handed out as a slice.
        let map = unsafe {
            MmapOptions::new()
                .offset(base_address)
                .len(window_size)
                .map_mut(&file)?
        };

        info!(
            marker = "REGISTER_WINDOW_MAPPED",
            operation_type = "protocol",
            device = %device.display(),
            "Mapped {window_size:#x} bytes at {base_address:#010x}"
        );

        Ok(Self { map, base_address })
    }

    #[must_use]
    pub const fn base_address(&self) -> u64 {
        self.base_address
    }
}

impl RegisterTransport for MmapTransport {
    fn write(&mut self, offset: u16, value: u8) -> Result<(), AppError> {
        let index = check_offset(offset, self.map.len())?;
        // SAFETY: index < map.len() was checked above.
        unsafe { ptr::write_volatile(self.map.as_mut_ptr().add(index), value) };
        Ok(())
    }

    fn read(&mut self, offset: u16) -> Result<u8, AppError> {
        let index = check_offset(offset, self.map.len())?;
        // SAFETY: index < map.len() was checked above.
        Ok(unsafe { ptr::read_volatile(self.map.as_ptr().add(index)) })
    }

    fn flush(&mut self) -> Result<(), AppError> {
        self.map.flush()?;
        Ok(())
    }
}
