use avr_device::atmega32u4::EXINT;

use super::gpio::board::DIRECTION_PCINT_MASK;
use super::timer::HoldOffTimer;
use crate::drivers::button_handler::DebounceHardware;

const INT6: u8 = 1 << 6;
const INTF6: u8 = 1 << 6;
/// ISC61:ISC60 = 0b10, falling edge
const INT6_FALLING: u8 = 0b10 << 4;
const PCIE0: u8 = 1 << 0;
const PCIF0: u8 = 1 << 0;

/// INT6 (center button) and the PCINT0 group (direction buttons)
pub struct ButtonInterrupts {
    _private: (),
}

impl ButtonInterrupts {
    pub fn new() -> Self {
        unsafe {
            let p = EXINT::ptr();
            (*p).eicrb.modify(|r, w| w.bits((r.bits() & !(0b11 << 4)) | INT6_FALLING));
            (*p).pcmsk0.write(|w| w.bits(DIRECTION_PCINT_MASK));
        }
        let mut irq = Self { _private: () };
        irq.unmask();
        irq
    }

    pub fn mask(&mut self) {
        unsafe {
            let p = EXINT::ptr();
            (*p).eimsk.modify(|r, w| w.bits(r.bits() & !INT6));
            (*p).pcicr.modify(|r, w| w.bits(r.bits() & !PCIE0));
        }
    }

    /// Drops edges latched while masked, then re-enables both sources
    pub fn unmask(&mut self) {
        unsafe {
            let p = EXINT::ptr();
            (*p).eifr.write(|w| w.bits(INTF6));
            (*p).pcifr.write(|w| w.bits(PCIF0));
            (*p).eimsk.modify(|r, w| w.bits(r.bits() | INT6));
            (*p).pcicr.modify(|r, w| w.bits(r.bits() | PCIE0));
        }
    }
}

/// Register handles the debouncer drives, usable from any interrupt
pub struct ButtonHardware {
    interrupts: ButtonInterrupts,
    hold_off: HoldOffTimer,
}

impl ButtonHardware {
    /// Both peripherals must already be configured
    pub const fn handle() -> Self {
        Self {
            interrupts: ButtonInterrupts { _private: () },
            hold_off: HoldOffTimer::handle(),
        }
    }

    pub fn end_hold_off(&mut self) {
        self.hold_off.disarm();
    }
}

impl DebounceHardware for ButtonHardware {
    fn disable_buttons(&mut self) {
        self.interrupts.mask();
    }

    fn enable_buttons(&mut self) {
        self.interrupts.unmask();
    }

    fn restart_hold_off(&mut self) {
        self.hold_off.restart();
    }
}
