/*!
    responder side of the link

    the exchange buffer is written by the bus interrupt, so every inspection
    here runs with that event source masked. a valid command is consumed by
    clearing its markers, the payload byte stays behind.
*/

use core::ops::{Deref, DerefMut};
use log::*;

use crate::{
    bus::{Actuator, ResponderBus},
    frame::{self, Status, START, END},
    registers,
    };


/// services the exchange buffer after bus activity and drives the actuator
pub struct Responder<B, A> {
    bus: B,
    actuator: A,
}

impl<B: ResponderBus, A: Actuator> Responder<B, A> {
    pub fn new(bus: B, actuator: A) -> Self {
        Self {bus, actuator}
    }

    /**
        check for a freshly written command, apply it and publish the verdict

        returns the published verdict, or None when there was nothing to
        service. a region whose markers were already cleared is not a command
        anymore and gets a [Status::Fail] reply without touching the actuator.
    */
    pub fn service(&mut self) -> Option<Status> {
        let mut bus = Masked::new(&mut self.bus);
        let activity = bus.activity();
        if !activity.write_complete() || activity.error()
            {return None}

        let verdict = if frame::inbound_framed(bus.buffer_mut()) {
            let level = bus.buffer_mut().get(registers::INBOUND_LEVEL);
            self.actuator.set_level(level != 0);
            // consume the command: only the markers drop, the payload stays
            let buffer = bus.buffer_mut();
            buffer.set(registers::INBOUND_START, 0);
            buffer.set(registers::INBOUND_END, 0);
            debug!("applied command {:#04x}", level);
            Status::Done
        } else {
            // stale or mangled region, leave it as received
            warn!("inbound region not framed, rejecting");
            Status::Fail
        };

        let buffer = bus.buffer_mut();
        buffer.set(registers::REPLY_START, START);
        buffer.set(registers::REPLY_STATUS, verdict);
        buffer.set(registers::REPLY_END, END);
        Some(verdict)
    }

    /// entry point for the peripheral's interrupt, to be called from the platform's handler
    pub fn service_interrupt(&mut self) {
        self.bus.service_interrupt();
    }
}


/// masks the bus event source on creation, unmasks on drop
struct Masked<'b, B: ResponderBus> {
    bus: &'b mut B,
}
impl<'b, B: ResponderBus> Masked<'b, B> {
    fn new(bus: &'b mut B) -> Self {
        bus.mask_event();
        Self {bus}
    }
}
impl<B: ResponderBus> Deref for Masked<'_, B> {
    type Target = B;
    fn deref(&self) -> &B {
        self.bus
    }
}
impl<B: ResponderBus> DerefMut for Masked<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.bus
    }
}
impl<B: ResponderBus> Drop for Masked<'_, B> {
    fn drop(&mut self) {
        self.bus.unmask_event();
    }
}
