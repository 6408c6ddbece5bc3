/*!
    terminal state for bring-up failures

    nothing here is recoverable: once a peripheral refused to come up the
    application quiesces and parks, the protocol never starts.
*/

use log::*;
use thiserror::Error;

use crate::bus::InterruptControl;


/// one-time bring-up failure
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum InitError {
    /// the controller-side peripheral refused its configuration
    #[error("controller transport failed to start")]
    Controller,
    /// the responder-side peripheral refused its configuration or buffer
    #[error("responder transport failed to start")]
    Responder,
    /// an interrupt handler could not be attached
    #[error("interrupt handler registration failed")]
    Registration,
}

/// silence every interrupt source before parking
pub fn quiesce(dispatch: &mut impl InterruptControl, cause: InitError) {
    error!("fatal: {}", cause);
    dispatch.disable_all();
}

/// quiesce and park forever, the only way out is a hardware reset
pub fn halt(dispatch: &mut impl InterruptControl, cause: InitError) -> ! {
    quiesce(dispatch, cause);
    loop {
        core::hint::spin_loop();
    }
}
