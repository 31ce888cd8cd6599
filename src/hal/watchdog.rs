use avr_device::atmega32u4::{CPU, WDT};

const WDRF: u8 = 1 << 3;
const WDCE: u8 = 1 << 4;
const WDE: u8 = 1 << 3;

pub struct Watchdog {
    _private: (),
}

impl Watchdog {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    pub fn feed(&mut self) {
        avr_device::asm::wdr();
    }

    /// A watchdog left running by the bootloader would reset the firmware
    /// within milliseconds; WDRF must be cleared before WDE can be.
    pub fn disable(&mut self) {
        avr_device::interrupt::free(|_| unsafe {
            avr_device::asm::wdr();
            (*CPU::ptr()).mcusr.modify(|r, w| w.bits(r.bits() & !WDRF));
            // Timed sequence to disable watchdog
            let p = WDT::ptr();
            (*p).wdtcsr.modify(|r, w| w.bits(r.bits() | WDCE | WDE));
            (*p).wdtcsr.write(|w| w.bits(0x00));
        });
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}
