/*!
    layout of the exchange buffer the responder exposes on the bus

    each cell is described by a serializable data type and a constant of type [Register] giving its fixed offset in the buffer.
*/

use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use packbytes::{FromBytes, ToBytes, ByteArray};

use crate::frame::Status;


/// bus address under which the responder's buffer is reachable
pub const RESPONDER_ADDRESS: u8 = 0x08;
/// number of bytes in the exchange buffer
pub const EXCHANGE_SIZE: usize = 8;


/**
    a register is a typed pointer into the exchange buffer.

    it only holds the offset of the starting byte of the referenced value, hence can be created, copied or destroyed at no cost
*/
#[derive(PartialEq, Hash)]
pub struct Register<T> {
    offset: u8,
    ty: PhantomData<T>,
}
impl<T> Register<T> {
    /// create a register from its starting byte
    pub const fn new(offset: u8) -> Self {
        Self {offset, ty: PhantomData}
    }
    /// starting byte in the buffer
    pub const fn offset(&self) -> u8 {self.offset}
}
impl<T> Clone for Register<T> {
    fn clone(&self) -> Self {
        Self::new(self.offset())
    }
}
impl<T> Copy for Register<T> {}


/// inbound region: start marker of a freshly written command
pub const INBOUND_START: Register<u8> = Register::new(0x0);
/// inbound region: requested output level
pub const INBOUND_LEVEL: Register<u8> = Register::new(0x1);
/// inbound region: end marker of a freshly written command
pub const INBOUND_END: Register<u8> = Register::new(0x2);
/// reply region: start marker of a published reply
pub const REPLY_START: Register<u8> = Register::new(0x5);
/// reply region: verdict for the last serviced command
pub const REPLY_STATUS: Register<Status> = Register::new(0x6);
/// reply region: end marker of a published reply
pub const REPLY_END: Register<u8> = Register::new(0x7);


/// the responder's mapped buffer: inbound command region, padding, reply region
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ExchangeBuffer {
    buffer: [u8; EXCHANGE_SIZE],
}
impl ExchangeBuffer {
    pub const fn new() -> Self {
        Self {buffer: [0; EXCHANGE_SIZE]}
    }
    /// get the current register's value
    pub fn get<T: FromBytes>(&self, register: Register<T>) -> T {
        let mut dst = T::Bytes::zeroed();
        dst.as_mut().copy_from_slice(&self.buffer[usize::from(register.offset()) ..][.. T::Bytes::SIZE]);
        T::from_le_bytes(dst)
    }
    /// set the given register's value
    pub fn set<T: ToBytes>(&mut self, register: Register<T>, value: T) {
        let src = value.to_le_bytes();
        self.buffer[usize::from(register.offset()) ..][.. T::Bytes::SIZE].copy_from_slice(src.as_ref());
    }
}
impl Deref for ExchangeBuffer {
    type Target = [u8; EXCHANGE_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}
impl DerefMut for ExchangeBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_read_back() {
        let mut buffer = ExchangeBuffer::new();
        buffer.set(INBOUND_LEVEL, 0xffu8);
        buffer.set(REPLY_STATUS, Status::Fail);
        assert_eq!(buffer.get(INBOUND_LEVEL), 0xff);
        assert_eq!(buffer.get(REPLY_STATUS), Status::Fail);
        assert_eq!(*buffer, [0, 0xff, 0, 0, 0, 0, 0xff, 0]);
    }

    #[test]
    fn regions_stay_disjoint() {
        let mut buffer = ExchangeBuffer::new();
        buffer[usize::from(INBOUND_START.offset())] = 0x01;
        buffer[usize::from(INBOUND_END.offset())] = 0x17;
        buffer.set(REPLY_START, 0x01u8);
        buffer.set(REPLY_STATUS, Status::Done);
        buffer.set(REPLY_END, 0x17u8);
        // inbound and padding bytes untouched by reply writes
        assert_eq!(buffer[.. 5], [0x01, 0, 0x17, 0, 0]);
        assert_eq!(buffer[5 ..], [0x01, 0x00, 0x17]);
    }
}
