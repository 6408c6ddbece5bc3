/*!
    wire vocabulary of the link

    both frame regions share the same shape: a start marker, a payload byte, an end marker.
    a region is well formed iff both markers match, no other byte takes part in validation.
*/

use bilge::prelude::*;
use packbytes::{FromBytes, ToBytes};
use thiserror::Error;

use crate::pack_enum;
use crate::registers::{self, ExchangeBuffer};


/// first byte of any frame region
pub const START: u8 = 0x01;
/// last byte of any frame region
pub const END: u8 = 0x17;
/// write offset inside the responder's buffer, prepended to every outbound frame and stripped by the transport
pub const BUFFER_BASE: u8 = 0x00;
/// bytes of a command frame as submitted to the transport, base byte included
pub const COMMAND_SIZE: usize = 4;


/// command frame as the controller puts it on the wire
#[derive(Copy, Clone, FromBytes, ToBytes, Debug, PartialEq)]
pub struct CommandFrame {
    /// destination offset in the responder's buffer
    pub base: u8,
    pub start: u8,
    /// requested output level, applied as `level != 0`
    pub level: u8,
    pub end: u8,
}
impl CommandFrame {
    pub fn new(level: u8) -> Self {
        Self {base: BUFFER_BASE, start: START, level, end: END}
    }
}

/// build the wire image of a command
pub fn encode_command(level: u8) -> [u8; COMMAND_SIZE] {
    CommandFrame::new(level).to_le_bytes()
}

/// check the inbound region markers: a command is present and not yet consumed
pub fn inbound_framed(buffer: &ExchangeBuffer) -> bool {
    buffer.get(registers::INBOUND_START) == START
    && buffer.get(registers::INBOUND_END) == END
}

/// extract the verdict from the reply region, markers first
pub fn decode_reply(buffer: &ExchangeBuffer) -> Result<Status, MalformedFrame> {
    if buffer.get(registers::REPLY_START) != START
    || buffer.get(registers::REPLY_END) != END
        {return Err(MalformedFrame)}
    Ok(buffer.get(registers::REPLY_STATUS))
}


/// verdict published by the responder after servicing a command
#[bitsize(8)]
#[derive(Copy, Clone, Default, FromBits, Debug, PartialEq)]
pub enum Status {
    /// command accepted and applied
    #[default]
    Done = 0x00,
    /// command rejected, inbound region left as received
    #[fallback]
    Fail = 0xFF,
}
pack_enum!(Status);

/// marker validation failed on a frame region
#[derive(Error, Debug, Copy, Clone, PartialEq)]
#[error("frame markers do not match")]
pub struct MalformedFrame;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wire_image() {
        assert_eq!(encode_command(0xff), [0x00, 0x01, 0xff, 0x17]);
        assert_eq!(encode_command(0x00), [0x00, 0x01, 0x00, 0x17]);
    }

    #[test]
    fn reply_markers_gate_decoding() {
        let mut buffer = ExchangeBuffer::new();
        buffer[5] = START;
        buffer[6] = 0x00;
        buffer[7] = END;
        assert_eq!(decode_reply(&buffer), Ok(Status::Done));

        buffer[6] = 0xff;
        assert_eq!(decode_reply(&buffer), Ok(Status::Fail));

        buffer[5] = 0x00;
        assert_eq!(decode_reply(&buffer), Err(MalformedFrame));

        buffer[5] = START;
        buffer[7] = 0x16;
        assert_eq!(decode_reply(&buffer), Err(MalformedFrame));
    }

    #[test]
    fn unknown_status_reads_failed() {
        let mut buffer = ExchangeBuffer::new();
        buffer[5] = START;
        buffer[6] = 0x2a;
        buffer[7] = END;
        assert_eq!(decode_reply(&buffer), Ok(Status::Fail));
    }

    #[test]
    fn inbound_markers() {
        let mut buffer = ExchangeBuffer::new();
        assert!(!inbound_framed(&buffer));

        buffer[0] = START;
        buffer[1] = 0xff;
        buffer[2] = END;
        assert!(inbound_framed(&buffer));

        // cleared start marker means the command was already consumed
        buffer[0] = 0x00;
        assert!(!inbound_framed(&buffer));
    }
}
