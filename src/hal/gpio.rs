use avr_device::atmega32u4::{PORTB, PORTC, PORTE, PORTF};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

#[derive(Debug)]
pub struct Pin<PORT, const PIN: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8, MODE: PinMode> Pin<PORT, P, MODE> {
    /// Caller guarantees no other `Pin` for the same line exists
    pub const unsafe fn steal() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $pin:ident, $ddr:ident, $port:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            /// Input with the internal pull-up enabled; buttons pull the line low
            pub fn into_pull_up_input(self) -> Pin<$PORT, P, Input> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Ok(())
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Infallible> {
                Ok(unsafe { (*$PORT::ptr()).$pin.read().bits() } & (1 << P) != 0)
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }
    };
}

impl_port!(PORTB, pinb, ddrb, portb);
impl_port!(PORTC, pinc, ddrc, portc);
impl_port!(PORTE, pine, ddre, porte);
impl_port!(PORTF, pinf, ddrf, portf);

// Environmental sensor board pin assignments
pub mod board {
    use super::*;
    use crate::drivers::button_handler::ButtonLines;

    // HD44780 in 4-bit mode on PORTF (JTAG must be off)
    pub type LcdRs = Pin<PORTF, 0, Output>;
    pub type LcdEn = Pin<PORTF, 1, Output>;
    pub type LcdD4 = Pin<PORTF, 4, Output>;
    pub type LcdD5 = Pin<PORTF, 5, Output>;
    pub type LcdD6 = Pin<PORTF, 6, Output>;
    pub type LcdD7 = Pin<PORTF, 7, Output>;

    pub type Backlight = Pin<PORTC, 6, Output>;

    // Direction buttons on PCINT4..7, center on INT6
    pub type BtnUp = Pin<PORTB, 4, Input>;
    pub type BtnDown = Pin<PORTB, 5, Input>;
    pub type BtnLeft = Pin<PORTB, 6, Input>;
    pub type BtnRight = Pin<PORTB, 7, Input>;
    pub type BtnCenter = Pin<PORTE, 6, Input>;

    /// PCMSK0 bits of the four direction buttons
    pub const DIRECTION_PCINT_MASK: u8 = 0xF0;

    pub type Buttons = ButtonLines<BtnUp, BtnDown, BtnLeft, BtnRight, BtnCenter>;

    pub struct BoardPins {
        pub lcd_rs: LcdRs,
        pub lcd_en: LcdEn,
        pub lcd_data: (LcdD4, LcdD5, LcdD6, LcdD7),
        pub backlight: Backlight,
    }

    /// One-time pin direction setup. Must be called once, before any
    /// interrupt that reads the buttons is enabled.
    pub unsafe fn configure() -> BoardPins {
        let _: BtnUp = Pin::<PORTB, 4, Input>::steal().into_pull_up_input();
        let _: BtnDown = Pin::<PORTB, 5, Input>::steal().into_pull_up_input();
        let _: BtnLeft = Pin::<PORTB, 6, Input>::steal().into_pull_up_input();
        let _: BtnRight = Pin::<PORTB, 7, Input>::steal().into_pull_up_input();
        let _: BtnCenter = Pin::<PORTE, 6, Input>::steal().into_pull_up_input();

        BoardPins {
            lcd_rs: Pin::<PORTF, 0, Input>::steal().into_output(),
            lcd_en: Pin::<PORTF, 1, Input>::steal().into_output(),
            lcd_data: (
                Pin::<PORTF, 4, Input>::steal().into_output(),
                Pin::<PORTF, 5, Input>::steal().into_output(),
                Pin::<PORTF, 6, Input>::steal().into_output(),
                Pin::<PORTF, 7, Input>::steal().into_output(),
            ),
            backlight: Pin::<PORTC, 6, Input>::steal().into_output(),
        }
    }

    /// Read-only view of the button inputs for interrupt handlers. The pins
    /// must have been switched to pull-up inputs first.
    pub fn buttons() -> Buttons {
        // Reading PINx never disturbs the owner of the line
        unsafe { ButtonLines::new(Pin::steal(), Pin::steal(), Pin::steal(), Pin::steal(), Pin::steal()) }
    }
}
