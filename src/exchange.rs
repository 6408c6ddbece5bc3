/*!
    ties both roles of one link together

    a cycle sends the current command and fetches the verdict published for
    the previous one, then the responder gets a turn to service its buffer.
    the level toggles only on a decoded [Status::Done], so a lost reply
    repeats the same request instead of skipping a state.
*/

use core::time::Duration;
use embedded_hal::delay::DelayNs;
use log::*;

use crate::{
    bus::{Actuator, ControllerBus, Monotonic, ResponderBus},
    controller::{Controller, TransferError},
    frame::Status,
    responder::Responder,
    };


/// level requesting the output on
pub const LEVEL_ON: u8 = 0xff;
/// level requesting the output off
pub const LEVEL_OFF: u8 = 0x00;
/// pause between two exchanges
pub const CADENCE: Duration = Duration::from_secs(1);


/// outcome of one exchange cycle
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// command delivered, reply received and decoded
    Exchanged(Status),
    /// command delivered, reply unusable
    ReplyFailed(TransferError),
    /// command never delivered
    SendFailed(TransferError),
}

/// drives one controller/responder pair, alternating their turns forever
pub struct Exchange<CB, T, RB, A> {
    controller: Controller<CB, T>,
    responder: Responder<RB, A>,
    level: u8,
}

impl<CB, T, RB, A> Exchange<CB, T, RB, A>
where
    CB: ControllerBus,
    T: Monotonic,
    RB: ResponderBus,
    A: Actuator,
{
    pub fn new(controller: Controller<CB, T>, responder: Responder<RB, A>) -> Self {
        Self {controller, responder, level: LEVEL_ON}
    }

    /// level the next cycle will request
    pub fn level(&self) -> u8 {self.level}

    /// one full exchange: deliver the current command and fetch the verdict, then let the responder service its buffer
    pub fn cycle(&mut self) -> CycleOutcome {
        if let Err(error) = self.controller.send_command(self.level) {
            warn!("command not delivered: {}", error);
            return CycleOutcome::SendFailed(error);
        }
        let outcome = match self.controller.receive_reply() {
            Ok(status) => {
                if status == Status::Done {
                    self.level = match self.level {
                        LEVEL_OFF => LEVEL_ON,
                        _ => LEVEL_OFF,
                        };
                }
                CycleOutcome::Exchanged(status)
            }
            Err(error) => {
                warn!("reply lost: {}", error);
                CycleOutcome::ReplyFailed(error)
            }
        };
        // the wire is quiet now, let the responder consume and answer
        self.responder.service();
        outcome
    }

    /// run forever at the nominal cadence, an undelivered command retries without pause
    pub fn run(&mut self, pacer: &mut impl DelayNs) -> ! {
        info!("exchange running");
        loop {
            match self.cycle() {
                CycleOutcome::SendFailed(_) => {}
                _ => pacer.delay_ms(CADENCE.as_millis() as u32),
            }
        }
    }
}
