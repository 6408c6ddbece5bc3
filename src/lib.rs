#![no_std]
#[cfg(any(test, feature = "std"))]
extern crate std;

mod utils;


pub mod frame;
pub mod registers;
pub mod bus;
pub mod fatal;
#[cfg(feature = "controller")]
pub mod controller;
#[cfg(feature = "responder")]
pub mod responder;
#[cfg(all(feature = "controller", feature = "responder"))]
pub mod exchange;
