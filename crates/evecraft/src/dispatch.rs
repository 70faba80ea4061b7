//! Opcode dispatch: classifies a raw command word into its family and opcode.
//!
//! A word whose top 24 bits are all set is a coprocessor command with the opcode in the
//! low byte. Anything else is a display-list command keyed by its top byte, except that
//! a top byte with bit 6 or 7 set only carries a 2-bit opcode in its top bits.

use crate::command::Family;

/// Display-list opcodes stored in the top 2 bits of the word (VERTEX2F, VERTEX2II).
///
/// This is a closed list; a masked value of `0xc0` matches no command.
pub const SHORT_OPCODES: [u8; 2] = [0x40, 0x80];

/// Top 24 bits of every coprocessor command word.
pub const COPROCESSOR_MARKER: u32 = 0x00ff_ffff;

/// Returns the family and opcode encoded in `word`.
///
/// The returned opcode is the table value (e.g. `0x40`), not the value stored in the
/// word's top bits.
pub fn classify(word: u32) -> (Family, u8) {
    if word >> 8 == COPROCESSOR_MARKER {
        return (Family::Coprocessor, (word & 0xff) as u8);
    }

    let code = (word >> 24) as u8;
    if code & 0xc0 != 0 {
        (Family::DisplayList, code & 0xc0)
    } else {
        (Family::DisplayList, code)
    }
}
