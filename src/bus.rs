/*!
    contracts the protocol consumes from the platform

    the crate never drives peripherals itself: each role reaches its transport,
    clock and output through the traits here, so a host can be an mcu hal as
    well as the scripted doubles used in tests.
*/

use bilge::prelude::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use thiserror::Error;

use crate::registers::ExchangeBuffer;


/**
    transfer-level access to the two-wire peripheral, controller side

    the peripheral runs one transfer at a time: a submission starts it, the
    interrupt feeds it, [busy](Self::busy) reports its progress. a transfer
    that ends on a fault also clears busy, the cause stays latched in
    [error_flags](Self::error_flags) until the next submission.
*/
pub trait ControllerBus {
    /// start an addressed write of `frame`, without blocking
    fn submit_write(&mut self, dest: u8, frame: &[u8]) -> Result<(), SubmitError>;
    /// start an addressed read into `out`, without blocking
    ///
    /// the bytes must be deposited in `out` by the time [busy](Self::busy) reports idle
    fn submit_read(&mut self, dest: u8, out: &mut [u8]) -> Result<(), SubmitError>;
    /// transfer still in flight
    fn busy(&mut self) -> bool;
    /// faults latched by the current transfer
    fn error_flags(&mut self) -> ErrorFlags;
    /// bytes moved by the current transfer so far
    fn bytes_transferred(&mut self) -> u32;
    /// full disable/enable cycle of the peripheral, dropping any transfer in flight
    fn reset(&mut self);
    /// entry point for the peripheral's interrupt, to be called from the platform's handler
    fn service_interrupt(&mut self);
}

/**
    event-level access to the mapped-buffer peripheral, responder side

    the peripheral serves bus accesses to [buffer_mut](Self::buffer_mut) from
    its interrupt. masking that event source is the only exclusion primitive
    the handler uses, so both operations must nest correctly.
*/
pub trait ResponderBus {
    /// events latched since the previous query, cleared by the query
    fn activity(&mut self) -> Activity;
    /// hold back the peripheral's event interrupt
    fn mask_event(&mut self);
    /// undo [mask_event](Self::mask_event)
    fn unmask_event(&mut self);
    /// the buffer the peripheral exposes to the controller
    fn buffer_mut(&mut self) -> &mut ExchangeBuffer;
    /// entry point for the peripheral's interrupt, to be called from the platform's handler
    fn service_interrupt(&mut self);
}

/// single binary output driven on command
pub trait Actuator {
    fn set_level(&mut self, level: bool);
}

/// time source for the controller: a monotonic microsecond clock plus the pauses of [DelayNs]
pub trait Monotonic: DelayNs {
    /// microseconds since an arbitrary origin, never going backwards
    fn now_micros(&mut self) -> u64;
}

/// the one hook the fatal path needs from the platform's interrupt dispatch facility
pub trait InterruptControl {
    /// mask every interrupt source the application registered
    fn disable_all(&mut self);
}


/// faults a transfer can end with
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq, Default)]
pub struct ErrorFlags {
    /// a data byte was not acknowledged
    pub data_nak: bool,
    /// the address byte was not acknowledged
    pub addr_nak: bool,
    /// lost arbitration against another master
    pub arbitration_lost: bool,
    /// start condition could not be issued
    pub aborted_start: bool,
    /// misplaced start or stop seen on the wire
    pub bus_error: bool,
    _reserved: u3,
}
impl ErrorFlags {
    /// any of the faults is raised
    pub fn any(&self) -> bool {
        self.data_nak()
        || self.addr_nak()
        || self.arbitration_lost()
        || self.aborted_start()
        || self.bus_error()
    }
}

/// bus events latched by the responder peripheral
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq, Default)]
pub struct Activity {
    /// the controller completed a write into the buffer
    pub write_complete: bool,
    /// the controller completed a read from the buffer
    pub read_complete: bool,
    /// transport fault during the last access
    pub error: bool,
    _reserved: u5,
}

/// immediate rejection of a transfer submission
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum SubmitError {
    /// a transfer is already in flight
    #[error("transport busy")]
    Busy,
    /// the transport refused the request parameters
    #[error("bad transfer request")]
    Misconfigured,
}


/// adapter driving any [OutputPin] as the actuator
///
/// the actuator contract has no error channel, pin faults are discarded
pub struct PinActuator<P> {
    pin: P,
}
impl<P: OutputPin> PinActuator<P> {
    pub fn new(pin: P) -> Self {
        Self {pin}
    }
}
impl<P: OutputPin> Actuator for PinActuator<P> {
    fn set_level(&mut self, level: bool) {
        let _ = if level {self.pin.set_high()} else {self.pin.set_low()};
    }
}


// every contract also holds through a mutable borrow, as in embedded-hal
impl<B: ControllerBus + ?Sized> ControllerBus for &mut B {
    fn submit_write(&mut self, dest: u8, frame: &[u8]) -> Result<(), SubmitError> {
        (**self).submit_write(dest, frame)
    }
    fn submit_read(&mut self, dest: u8, out: &mut [u8]) -> Result<(), SubmitError> {
        (**self).submit_read(dest, out)
    }
    fn busy(&mut self) -> bool {
        (**self).busy()
    }
    fn error_flags(&mut self) -> ErrorFlags {
        (**self).error_flags()
    }
    fn bytes_transferred(&mut self) -> u32 {
        (**self).bytes_transferred()
    }
    fn reset(&mut self) {
        (**self).reset()
    }
    fn service_interrupt(&mut self) {
        (**self).service_interrupt()
    }
}
impl<B: ResponderBus + ?Sized> ResponderBus for &mut B {
    fn activity(&mut self) -> Activity {
        (**self).activity()
    }
    fn mask_event(&mut self) {
        (**self).mask_event()
    }
    fn unmask_event(&mut self) {
        (**self).unmask_event()
    }
    fn buffer_mut(&mut self) -> &mut ExchangeBuffer {
        (**self).buffer_mut()
    }
    fn service_interrupt(&mut self) {
        (**self).service_interrupt()
    }
}
impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn set_level(&mut self, level: bool) {
        (**self).set_level(level)
    }
}
impl<T: Monotonic + ?Sized> Monotonic for &mut T {
    fn now_micros(&mut self) -> u64 {
        (**self).now_micros()
    }
}
impl<I: InterruptControl + ?Sized> InterruptControl for &mut I {
    fn disable_all(&mut self) {
        (**self).disable_all()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_flags_any() {
        assert!(!ErrorFlags::default().any());

        let mut flags = ErrorFlags::default();
        flags.set_addr_nak(true);
        assert!(flags.any());

        let mut flags = ErrorFlags::default();
        flags.set_bus_error(true);
        assert!(flags.any());
    }

    struct Pin {
        level: Option<bool>,
    }
    impl embedded_hal::digital::ErrorType for Pin {
        type Error = core::convert::Infallible;
    }
    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.level = Some(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.level = Some(true);
            Ok(())
        }
    }

    #[test]
    fn pin_actuator_follows_levels() {
        let mut pin = Pin {level: None};
        {
            let mut actuator = PinActuator::new(&mut pin);
            actuator.set_level(true);
        }
        assert_eq!(pin.level, Some(true));
        {
            let mut actuator = PinActuator::new(&mut pin);
            actuator.set_level(false);
        }
        assert_eq!(pin.level, Some(false));
    }
}
