#![allow(clippy::missing_safety_doc)]

use avr_device::atmega32u4::USART1;
use core::cell::RefCell;
use core::convert::Infallible;
use critical_section::Mutex;
use embedded_hal::serial;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};
use crate::os::Buffer;

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

const RXEN1: u8 = 1 << 4;
const TXEN1: u8 = 1 << 3;
const RXCIE1: u8 = 1 << 7;
const UDRIE1: u8 = 1 << 5;
/// 8 data bits, no parity, 1 stop bit
const UCSZ_8N1: u8 = 0x06;

// Global buffers for interrupt handlers
static TX_BUFFER: Mutex<RefCell<Buffer>> = Mutex::new(RefCell::new(Buffer::new()));
static RX_BUFFER: Mutex<RefCell<Buffer>> = Mutex::new(RefCell::new(Buffer::new()));

/// USART1 with interrupt-driven ring buffers on both directions
pub struct Uart {
    _private: (),
}

impl Uart {
    pub fn new() -> Self {
        unsafe {
            let p = USART1::ptr();
            (*p).ubrr1.write(|w| w.bits(UBRR));
            (*p).ucsr1c.write(|w| w.bits(UCSZ_8N1));
            (*p).ucsr1b.write(|w| w.bits(RXEN1 | TXEN1 | RXCIE1));
        }
        Self { _private: () }
    }

    /// Another handle onto the port set up by [`Uart::new`]; the buffers
    /// are shared
    pub const fn handle() -> Self {
        Self { _private: () }
    }

    /// Queues `byte`; false when the transmit buffer is full
    pub fn write_byte(&mut self, byte: u8) -> bool {
        critical_section::with(|cs| {
            let queued = TX_BUFFER.borrow_ref_mut(cs).write(byte);
            // Data register empty interrupt drains the buffer
            unsafe {
                (*USART1::ptr()).ucsr1b.modify(|r, w| w.bits(r.bits() | UDRIE1));
            }
            queued
        })
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        critical_section::with(|cs| RX_BUFFER.borrow_ref_mut(cs).read())
    }

    pub fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            while !self.write_byte(byte) {}
        }
    }
}

impl serial::Read<u8> for Uart {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.read_byte().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for Uart {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.write_byte(byte) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        let empty = critical_section::with(|cs| TX_BUFFER.borrow_ref(cs).is_empty());
        if empty {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

// Interrupt handlers
#[avr_device::interrupt(atmega32u4)]
fn USART1_RX() {
    unsafe {
        let byte = (*USART1::ptr()).udr1.read().bits();
        critical_section::with(|cs| {
            RX_BUFFER.borrow_ref_mut(cs).write(byte);
        });
    }
}

#[avr_device::interrupt(atmega32u4)]
fn USART1_UDRE() {
    critical_section::with(|cs| {
        if let Some(byte) = TX_BUFFER.borrow_ref_mut(cs).read() {
            unsafe {
                (*USART1::ptr()).udr1.write(|w| w.bits(byte));
            }
        } else {
            // Buffer empty - disable TX interrupt
            unsafe {
                (*USART1::ptr()).ucsr1b.modify(|r, w| w.bits(r.bits() & !UDRIE1));
            }
        }
    });
}
