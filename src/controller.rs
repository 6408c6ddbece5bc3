/*!
    controller side of the link

    each operation is one bus transfer, polled to completion under a deadline
    and then judged on the transport's verdict. the session never retries by
    itself, skipping or repeating a failed exchange is the driver's call.
*/

use core::time::Duration;
use log::*;
use thiserror::Error;

use crate::{
    bus::{ControllerBus, ErrorFlags, Monotonic, SubmitError},
    frame::{self, Status},
    registers::{ExchangeBuffer, RESPONDER_ADDRESS},
    };


/// give up on a transfer after this much silence
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(1);
/// pause between two completion polls
pub const POLL_INTERVAL: Duration = Duration::from_micros(1);


/**
    controller session over a two-wire transport

    holds the transport and the clock used to bound every transfer. one
    transfer is outstanding at a time.
*/
pub struct Controller<B, T> {
    bus: B,
    clock: T,
    timeout: Duration,
}

impl<B: ControllerBus, T: Monotonic> Controller<B, T> {
    pub fn new(bus: B, clock: T) -> Self {
        Self {bus, clock, timeout: TRANSFER_TIMEOUT}
    }
    /// same session with a different transfer deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// frame `level` into a command and deliver it to the responder's inbound region
    pub fn send_command(&mut self, level: u8) -> Result<(), TransferError> {
        let command = frame::encode_command(level);
        debug!("sending command {:#04x}", level);
        self.bus.submit_write(RESPONDER_ADDRESS, &command)?;
        self.complete(Some(command.len() as u32))
    }

    /// fetch the responder's buffer and decode the reply region
    pub fn receive_reply(&mut self) -> Result<Status, TransferError> {
        let mut image = ExchangeBuffer::new();
        self.bus.submit_read(RESPONDER_ADDRESS, &mut image[..])?;
        self.complete(None)?;
        let status = frame::decode_reply(&image)
            .map_err(|_| TransferError::Failed(FailReason::Malformed))?;
        debug!("reply {:?}", status);
        Ok(status)
    }

    /// entry point for the transport's interrupt, to be called from the platform's handler
    pub fn service_interrupt(&mut self) {
        self.bus.service_interrupt();
    }

    /**
        poll the transfer in flight to completion, then evaluate the transport's verdict

        `wrote` carries the expected byte count of a write. reads skip the
        count check, a short read surfaces downstream as an unframed reply.
    */
    fn complete(&mut self, wrote: Option<u32>) -> Result<(), TransferError> {
        let deadline = self.clock.now_micros().saturating_add(self.timeout.as_micros() as u64);
        while self.bus.busy() {
            if self.clock.now_micros() >= deadline {
                // a stalled transfer leaves the wire in an unknown state, only a reset clears it
                warn!("transfer timed out, resetting the transport");
                self.bus.reset();
                return Err(TransferError::TimedOut);
            }
            self.clock.delay_us(POLL_INTERVAL.as_micros() as u32);
        }
        let flags = self.bus.error_flags();
        if flags.any()
            {return Err(TransferError::Failed(FailReason::Bus(flags)))}
        if let Some(expected) = wrote {
            let done = self.bus.bytes_transferred();
            if done != expected
                {return Err(TransferError::Failed(FailReason::ShortWrite {done, expected}))}
        }
        Ok(())
    }
}


/// terminal outcome of a transfer that did not complete
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum TransferError {
    /// the transport reported completion with a fault, or the reply was unusable
    #[error("transfer failed: {0}")]
    Failed(FailReason),
    /// no completion within the deadline, the transport was reset
    #[error("no completion within the deadline")]
    TimedOut,
}

/// what made a transfer fail
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum FailReason {
    /// the transport refused to start the transfer
    #[error("rejected at submission: {0}")]
    Rejected(SubmitError),
    /// the transport latched fault flags
    #[error("transport fault {0:?}")]
    Bus(ErrorFlags),
    /// fewer bytes were acknowledged than submitted
    #[error("short write, {done} of {expected} bytes")]
    ShortWrite {done: u32, expected: u32},
    /// the reply region markers did not match
    #[error("reply not framed")]
    Malformed,
}

impl From<SubmitError> for TransferError {
    fn from(error: SubmitError) -> Self {
        Self::Failed(FailReason::Rejected(error))
    }
}
