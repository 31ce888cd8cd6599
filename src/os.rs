//! State shared between interrupt handlers and the main loop
//!
//! Single-byte flags use plain atomic loads and stores, which are a single
//! instruction on AVR. Anything wider goes through a critical section.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use critical_section::Mutex;

use crate::clock::Clock;
use crate::drivers::button_handler::{Button, DebounceHardware, Debouncer, IdleTimeout};

// Buffer size must be power of 2 for efficient masking
pub const BUFFER_SIZE: usize = 32;
const BUFFER_MASK: usize = BUFFER_SIZE - 1;

/// Byte ring; one slot stays empty to tell full from empty
pub struct Buffer {
    data: [u8; BUFFER_SIZE],
    write_idx: usize,
    read_idx: usize,
}

impl Buffer {
    pub const fn new() -> Self {
        Self {
            data: [0; BUFFER_SIZE],
            write_idx: 0,
            read_idx: 0,
        }
    }

    pub fn write(&mut self, byte: u8) -> bool {
        let next_write = (self.write_idx + 1) & BUFFER_MASK;
        if next_write != self.read_idx {
            self.data[self.write_idx] = byte;
            self.write_idx = next_write;
            true
        } else {
            false
        }
    }

    pub fn read(&mut self) -> Option<u8> {
        if self.read_idx != self.write_idx {
            let byte = self.data[self.read_idx];
            self.read_idx = (self.read_idx + 1) & BUFFER_MASK;
            Some(byte)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read_idx == self.write_idx
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-safe byte FIFO
pub struct ByteQueue {
    buffer: Mutex<RefCell<Buffer>>,
}

impl ByteQueue {
    pub const fn new() -> Self {
        Self {
            buffer: Mutex::new(RefCell::new(Buffer::new())),
        }
    }

    /// Returns false and drops the byte when the queue is full
    pub fn push(&self, byte: u8) -> bool {
        critical_section::with(|cs| self.buffer.borrow_ref_mut(cs).write(byte))
    }

    pub fn pop(&self) -> Option<u8> {
        critical_section::with(|cs| self.buffer.borrow_ref_mut(cs).read())
    }
}

impl Default for ByteQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Coalescing event flag: raised from one context, consumed in another
pub struct Flag(AtomicBool);

impl Flag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the flag and reports whether it was raised
    pub fn take(&self) -> bool {
        if self.0.load(Ordering::Acquire) {
            self.0.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::new()
    }
}

/// Idle-screen refresh handshake between the tick handler and the menu
pub struct RefreshRequest {
    idle_mode: AtomicBool,
    pending: Flag,
}

impl RefreshRequest {
    pub const fn new() -> Self {
        Self {
            idle_mode: AtomicBool::new(true),
            pending: Flag::new(),
        }
    }

    /// Published by the menu whenever it enters or leaves the idle state
    pub fn set_idle_mode(&self, idle: bool) {
        self.idle_mode.store(idle, Ordering::Release);
    }

    pub fn idle_mode(&self) -> bool {
        self.idle_mode.load(Ordering::Acquire)
    }

    /// Tick side: ask for a redraw if the idle screen is showing
    pub fn request(&self) -> bool {
        if self.idle_mode() {
            self.pending.raise();
            true
        } else {
            false
        }
    }

    /// Main loop side
    pub fn take(&self) -> bool {
        self.pending.take()
    }
}

impl Default for RefreshRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the interrupt handlers touch, placed in one static by the binary
pub struct SharedState {
    pub clock: Clock,
    pub buttons: Debouncer,
    pub idle: IdleTimeout,
    pub refresh: RefreshRequest,
    pub input: ByteQueue,
    /// Raised by the tick when a received byte found the queue full
    pub input_overrun: Flag,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            clock: Clock::new(),
            buttons: Debouncer::new(),
            idle: IdleTimeout::new(),
            refresh: RefreshRequest::new(),
            input: ByteQueue::new(),
            input_overrun: Flag::new(),
        }
    }

    /// Button edge interrupt: any press counts as activity, even one the
    /// debouncer drops
    pub fn on_button_edge<H: DebounceHardware>(&self, button: Button, hw: &mut H) -> bool {
        self.idle.reset();
        self.buttons.on_edge(button, hw)
    }

    pub fn on_hold_off_expired<H: DebounceHardware>(&self, hw: &mut H) {
        self.buttons.on_hold_off_expired(hw);
    }

    pub fn on_idle_period(&self) {
        self.idle.on_period();
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
