//! 1 kHz tick dispatcher, run from the Timer0 compare interrupt

use crate::config::INPUT_POLL_MASK;
use crate::drivers::serial_console::InputSource;
use crate::os::SharedState;

/// Bytes an idle or disconnected line reads as
const LINE_NOISE: [u8; 2] = [0x00, 0xFF];

/// One millisecond of work, in this order: advance the clock, request an
/// idle-screen refresh on a completed second, and every 8th tick move one
/// byte from `input` to the command-line queue.
pub fn on_tick<I: InputSource>(shared: &SharedState, input: &mut I) {
    let outcome = shared.clock.advance_one_millisecond();

    if outcome.second_elapsed {
        shared.refresh.request();
    }

    if outcome.count & INPUT_POLL_MASK == 0 {
        if let Some(byte) = input.input_byte_available() {
            if !LINE_NOISE.contains(&byte) && !shared.input.push(byte) {
                shared.input_overrun.raise();
            }
        }
    }
}
