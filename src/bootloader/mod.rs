//! Hand-off to the on-chip DFU bootloader

use avr_device::atmega32u4::{TC0, TC1, USART1};

/// Stops every interrupt source the firmware enabled and jumps into the
/// 4 KB boot section at byte address 0x7000. Only a reset comes back.
pub fn enter_bootloader() -> ! {
    avr_device::interrupt::disable();
    unsafe {
        (*TC0::ptr()).timsk0.write(|w| w.bits(0));
        (*TC1::ptr()).timsk1.write(|w| w.bits(0));
        (*USART1::ptr()).ucsr1b.write(|w| w.bits(0));
        let exint = &*avr_device::atmega32u4::EXINT::ptr();
        exint.eimsk.write(|w| w.bits(0));
        exint.pcicr.write(|w| w.bits(0));

        core::arch::asm!("jmp 0x7000", options(noreturn));
    }
}
