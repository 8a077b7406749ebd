//! src/protocol/command.rs
//! ============================================================================
//! # Command Encoding
//!
//! A command is issued by touching addresses inside the cartridge register
//! window: the address itself is the message. A frame is
//!
//! ```text
//! header strobe | command strobe | payload size strobe | one strobe per 16-bit chunk
//! ```
//!
//! Payload chunks are big-endian. The payload is always padded to an even
//! length, so the size strobe never carries an odd count.
//!
//! Encoding is pure; [`crate::protocol::transport`] performs the accesses.

use smallvec::SmallVec;
use tracing::trace;

use crate::error::AppError;

/// Protocol header the cartridge firmware waits for before a command.
pub const DEFAULT_PROTOCOL_HEADER: u16 = 0xABCD;

/// Largest padded payload whose size still fits the 16-bit size strobe.
pub const MAX_PAYLOAD: usize = 0xFFFE;

/// One access to the register window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub offset: u16,

    /// Byte latched by the cartridge: the low half of the strobed offset.
    pub value: u8,
}

impl RegisterWrite {
    #[must_use]
    pub const fn strobe(offset: u16) -> Self {
        Self {
            offset,
            value: offset.to_be_bytes()[1],
        }
    }
}

/// Ordered accesses for one command.
pub type RegisterFrame = SmallVec<[RegisterWrite; 8]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    command_code: u16,
    payload: SmallVec<[u8; 16]>,
}

impl CommandRequest {
    /// Copy `payload`, appending one zero byte when its length is odd.
    pub fn new(command_code: u16, payload: &[u8]) -> Result<Self, AppError> {
        let padded = payload.len() + payload.len() % 2;
        if padded > MAX_PAYLOAD {
            return Err(AppError::invalid_input(
                "payload",
                format!("{} bytes exceed the {MAX_PAYLOAD} byte limit", payload.len()),
            ));
        }

        let mut bytes: SmallVec<[u8; 16]> = SmallVec::with_capacity(padded);
        bytes.extend_from_slice(payload);
        bytes.resize(padded, 0);

        Ok(Self {
            command_code,
            payload: bytes,
        })
    }

    /// Command carrying a 1-based list position as a big-endian word.
    pub fn for_selection(command_code: u16, position: usize) -> Result<Self, AppError> {
        let word = u16::try_from(position).map_err(|_| {
            AppError::invalid_input("position", format!("{position} does not fit 16 bits"))
        })?;
        Self::new(command_code, &word.to_be_bytes())
    }

    #[must_use]
    pub const fn command_code(&self) -> u16 {
        self.command_code
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Always even.
    #[must_use]
    pub fn payload_size(&self) -> u16 {
        // Bounded by MAX_PAYLOAD at construction.
        u16::try_from(self.payload.len()).unwrap_or(u16::MAX - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEncoder {
    protocol_header: u16,
}

impl Default for CommandEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PROTOCOL_HEADER)
    }
}

impl CommandEncoder {
    #[must_use]
    pub const fn new(protocol_header: u16) -> Self {
        Self { protocol_header }
    }

    #[must_use]
    pub fn encode(&self, request: &CommandRequest) -> RegisterFrame {
        let mut frame = RegisterFrame::with_capacity(3 + request.payload.len() / 2);

        frame.push(RegisterWrite::strobe(self.protocol_header));
        frame.push(RegisterWrite::strobe(request.command_code));
        frame.push(RegisterWrite::strobe(request.payload_size()));

        frame.extend(
            request
                .payload
                .chunks_exact(2)
                .map(|chunk| RegisterWrite::strobe(u16::from_be_bytes([chunk[0], chunk[1]]))),
        );

        trace!(
            marker = "COMMAND_ENCODED",
            operation_type = "protocol",
            command = request.command_code,
            accesses = frame.len(),
            "Encoded command frame"
        );

        frame
    }
}
