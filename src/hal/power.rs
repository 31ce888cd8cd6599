use avr_device::atmega32u4::CPU;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum SleepMode {
    Idle = 0,
    AdcNoiseReduction = 1,
    PowerDown = 2,
    PowerSave = 3,
    Standby = 6,
    ExtendedStandby = 7,
}

const SE: u8 = 1 << 0;
const JTD: u8 = 1 << 7;
const CLKPCE: u8 = 1 << 7;

pub struct Power {
    _private: (),
}

impl Power {
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    pub fn set_sleep_mode(&mut self, mode: SleepMode) {
        unsafe {
            let p = CPU::ptr();
            (*p).smcr.modify(|r, w| w.bits((r.bits() & !0x0E) | ((mode as u8) << 1)));
        }
    }

    #[inline]
    pub fn enable_sleep(&mut self) {
        unsafe {
            (*CPU::ptr()).smcr.modify(|r, w| w.bits(r.bits() | SE));
        }
    }

    #[inline]
    pub fn disable_sleep(&mut self) {
        unsafe {
            (*CPU::ptr()).smcr.modify(|r, w| w.bits(r.bits() & !SE));
        }
    }

    /// Sleeps until the next interrupt; the tick wakes the CPU every millisecond
    pub fn enter_idle_mode(&mut self) {
        self.set_sleep_mode(SleepMode::Idle);
        self.enable_sleep();
        avr_device::asm::sleep();
        self.disable_sleep();
    }

    /// Frees PORTF for the LCD. JTD has to be written twice within four cycles.
    pub fn disable_jtag(&mut self) {
        avr_device::interrupt::free(|_| unsafe {
            let p = CPU::ptr();
            (*p).mcucr.modify(|r, w| w.bits(r.bits() | JTD));
            (*p).mcucr.modify(|r, w| w.bits(r.bits() | JTD));
        });
    }

    /// Runs the core at the full crystal frequency
    pub fn disable_clock_division(&mut self) {
        avr_device::interrupt::free(|_| unsafe {
            let p = CPU::ptr();
            (*p).clkpr.write(|w| w.bits(CLKPCE));
            (*p).clkpr.write(|w| w.bits(0));
        });
    }
}

impl Default for Power {
    fn default() -> Self {
        Self::new()
    }
}
