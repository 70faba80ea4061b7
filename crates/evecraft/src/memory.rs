//! Command FIFO size and the registers used to feed it.

/// Size of the coprocessor command FIFO.
pub const CMDFIFO_SIZE: u32 = 4 * 1024;
/// [REG_CMDB_SPACE] reads this once the coprocessor has drained the FIFO.
pub const CMDB_SPACE_IDLE: u32 = CMDFIFO_SIZE - 4;

/// Free space in the command FIFO, in bytes.
pub const REG_CMDB_SPACE: u32 = 0x0030_2574;
/// Bulk write port: bytes written here are appended to the command FIFO.
pub const REG_CMDB_WRITE: u32 = 0x0030_2578;
