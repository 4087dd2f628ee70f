//! Frame encoding and decoding for the panel link.
//!
//! Frame format:
//! - SYNC (1 byte): 0x7E synchronization byte
//! - LENGTH (1 byte): payload length (0-240)
//! - KIND (1 byte): message kind identifier
//! - PAYLOAD (0-240 bytes): kind-specific data
//! - CHECKSUM (2 bytes): Fletcher-16 over LENGTH, KIND and PAYLOAD,
//!   high byte first

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_SYNC: u8 = 0x7E;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 240;

/// Framing overhead (SYNC + LENGTH + KIND + CHECKSUM)
pub const FRAME_OVERHEAD: usize = 5;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Invalid frame structure or unknown kind
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Payload did not decode
    Decode,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message kind identifier
    pub kind: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given kind and payload
    pub fn new(kind: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            kind,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(kind: u8) -> Self {
        Self {
            kind,
            payload: Vec::new(),
        }
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.payload.len();
        let frame_len = FRAME_OVERHEAD + len;
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let mut sum = Fletcher16::new();
        sum.push(len as u8);
        sum.push(self.kind);
        sum.extend(&self.payload);

        buffer[0] = FRAME_SYNC;
        buffer[1] = len as u8;
        buffer[2] = self.kind;
        buffer[3..3 + len].copy_from_slice(&self.payload);
        buffer[3 + len..frame_len].copy_from_slice(&sum.value().to_be_bytes());

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

/// Running Fletcher-16 checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fletcher16 {
    a: u16,
    b: u16,
}

impl Fletcher16 {
    pub const fn new() -> Self {
        Self { a: 0, b: 0 }
    }

    pub fn push(&mut self, byte: u8) {
        self.a = (self.a + byte as u16) % 255;
        self.b = (self.b + self.a) % 255;
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    pub const fn value(&self) -> u16 {
        (self.b << 8) | self.a
    }
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
    expected_length: u8,
    kind: u8,
    sum: Fletcher16,
    checksum_high: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for SYNC byte
    WaitingForSync,
    /// Got SYNC, waiting for LENGTH
    WaitingForLength,
    /// Got LENGTH, waiting for KIND
    WaitingForKind,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for the checksum high byte
    WaitingForChecksumHigh,
    /// Waiting for the checksum low byte
    WaitingForChecksumLow,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForSync,
            buffer: Vec::new(),
            expected_length: 0,
            kind: 0,
            sum: Fletcher16::new(),
            checksum_high: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForSync;
        self.buffer.clear();
        self.expected_length = 0;
        self.kind = 0;
        self.sum = Fletcher16::new();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    /// The parser resynchronizes on the next SYNC byte after an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForSync => {
                if byte == FRAME_SYNC {
                    self.state = ParseState::WaitingForLength;
                }
                // Line noise between frames is dropped
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::InvalidFrame);
                }
                self.expected_length = byte;
                self.sum.push(byte);
                self.state = ParseState::WaitingForKind;
                Ok(None)
            }
            ParseState::WaitingForKind => {
                self.kind = byte;
                self.sum.push(byte);
                self.buffer.clear();
                self.state = if self.expected_length == 0 {
                    ParseState::WaitingForChecksumHigh
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                // Cannot overflow: LENGTH was bounded by MAX_PAYLOAD_SIZE
                let _ = self.buffer.push(byte);
                self.sum.push(byte);
                if self.buffer.len() == self.expected_length as usize {
                    self.state = ParseState::WaitingForChecksumHigh;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksumHigh => {
                self.checksum_high = byte;
                self.state = ParseState::WaitingForChecksumLow;
                Ok(None)
            }
            ParseState::WaitingForChecksumLow => {
                let received = u16::from_be_bytes([self.checksum_high, byte]);
                if received != self.sum.value() {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }

                let frame = Frame {
                    kind: self.kind,
                    payload: self.buffer.clone(),
                };
                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
