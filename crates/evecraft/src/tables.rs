//! Built-in command tables for the EVE display-list and coprocessor command sets.
//!
//! Fields are listed in declaration order. For display-list commands the first field
//! occupies the lowest bits of the word; for coprocessor commands fields follow the
//! opcode word at increasing offsets.

use crate::{
    command::CommandDef,
    field::Field,
    types::{
        ADDRESS, ANGLE, ARGB, BITMAP_FILTER, BITMAP_FORMAT, BITMAP_WRAP, BLEND_FUNCTION, BOOL,
        CELL, COLOR_CHANNEL, CSTRING, DL_OFFSET, FIXED8_8, FIXED15_8, FIXED16_16,
        GRAPHICS_PRIMITIVE, HANDLE, INT16, INT32, OPTIONS, RGB, STENCIL_OP, TAG, TEST_FUNCTION,
        TypeDef, UINT8, UINT16, UINT32,
    },
};

fn field(name: &'static str, ty: TypeDef) -> Field {
    Field::new(name, ty)
}

/// Unsigned integer field stored in `bits` bits.
fn bits(name: &'static str, bits: u32) -> Field {
    Field::new(name, UINT32).stored_bits(bits)
}

fn dl(code: u8, name: &'static str, description: &'static str) -> CommandDef {
    CommandDef::display_list(code, name, description)
}

fn cp(code: u8, name: &'static str, description: &'static str) -> CommandDef {
    CommandDef::coprocessor(code, name, description)
}

fn widget(code: u8, name: &'static str, description: &'static str) -> CommandDef {
    CommandDef::widget(code, name, description)
}

/// Returns every built-in display-list command, ordered by opcode.
pub fn display_list_commands() -> Vec<CommandDef> {
    vec![
        dl(0x00, "DISPLAY", "End the display list. All the commands following this command will be ignored."),
        dl(0x01, "BITMAP_SOURCE", "Specify the source address of bitmap data in RAM_G.")
            .field(field("addr", ADDRESS).describe(
                "Bitmap address in RAM_G, aligned with respect to the bitmap format.\n\
                 For example, if the bitmap format is RGB565/ARGB4/ARGB1555, the bitmap source shall be aligned to 2 bytes.",
            )),
        dl(0x02, "CLEAR_COLOR_RGB", "Specify clear values for red, green and blue channels")
            .field(field("blue", COLOR_CHANNEL))
            .field(field("green", COLOR_CHANNEL))
            .field(field("red", COLOR_CHANNEL)),
        dl(0x03, "TAG", "Attach the tag value for the following graphics objects drawn on the screen.\nThe initial tag buffer value is 255.")
            .field(field("tag", TAG).describe("Tag value. Valid value range is from 1 to 255.")),
        dl(0x04, "COLOR_RGB", "Set the current color red, green and blue.")
            .field(field("blue", COLOR_CHANNEL))
            .field(field("green", COLOR_CHANNEL))
            .field(field("red", COLOR_CHANNEL)),
        dl(0x05, "BITMAP_HANDLE", "Specify the bitmap handle")
            .field(field("handle", HANDLE)),
        dl(0x06, "CELL", "Specify the bitmap cell number for the VERTEX2F command.")
            .field(field("cell", CELL).describe("Bitmap cell number. The initial value is 0.")),
        dl(0x07, "BITMAP_LAYOUT", "Specify the source bitmap memory format and layout for the current handle.")
            .field(bits("height", 9))
            .field(bits("linestride", 10))
            .field(field("format", BITMAP_FORMAT)),
        dl(0x08, "BITMAP_SIZE", "Specify the screen drawing of bitmaps for the current handle")
            .field(bits("height", 9))
            .field(bits("width", 9))
            .field(field("wrapy", BITMAP_WRAP))
            .field(field("wrapx", BITMAP_WRAP))
            .field(field("filter", BITMAP_FILTER)),
        dl(0x09, "ALPHA_FUNC", "Specify the alpha test function")
            .field(field("ref", UINT8))
            .field(field("func", TEST_FUNCTION)),
        dl(0x0a, "STENCIL_FUNC", "Set function and reference value for stencil testing.")
            .field(field("mask", UINT8))
            .field(field("ref", UINT8))
            .field(field("func", TEST_FUNCTION)),
        dl(0x0b, "BLEND_FUNC", "Specify pixel arithmetic")
            .field(field("dst", BLEND_FUNCTION))
            .field(field("src", BLEND_FUNCTION)),
        dl(0x0c, "STENCIL_OP", "Set stencil test actions")
            .field(field("spass", STENCIL_OP))
            .field(field("sfail", STENCIL_OP)),
        dl(0x0d, "POINT_SIZE", "Specify the radius of points")
            .field(bits("size", 13)),
        dl(0x0e, "LINE_WIDTH", "Specify the width of lines to be drawn with primitive LINES in 1/16 pixel precision.")
            .field(bits("width", 12)),
        dl(0x0f, "CLEAR_COLOR_A", "Specify clear value for the alpha channel")
            .field(field("alpha", COLOR_CHANNEL)),
        dl(0x10, "COLOR_A", "Set the current color alpha")
            .field(field("alpha", COLOR_CHANNEL)),
        dl(0x11, "CLEAR_STENCIL", "Specify clear value for the stencil buffer")
            .field(field("s", COLOR_CHANNEL)),
        dl(0x12, "CLEAR_TAG", "Specify clear value for the tag buffer")
            .field(field("tag", TAG)),
        dl(0x13, "STENCIL_MASK", "Control the writing of individual bits in the stencil planes")
            .field(field("mask", UINT8)),
        dl(0x14, "TAG_MASK", "Control the writing of the tag buffer")
            .field(field("mask", BOOL).describe(
                "Allow updates to the tag buffer.\n\
                 The initial value is one and it means the tag buffer is updated with the value given by the TAG command.\n\
                 The value zero means the tag buffer is set as the default value, rather than the value given by TAG command in the display list.",
            )),
        dl(0x15, "BITMAP_TRANSFORM_A", "Specify the A coefficient of the bitmap transform matrix")
            .field(field("a", FIXED8_8)),
        dl(0x16, "BITMAP_TRANSFORM_B", "Specify the B coefficient of the bitmap transform matrix")
            .field(field("b", FIXED8_8)),
        dl(0x17, "BITMAP_TRANSFORM_C", "Specify the C coefficient of the bitmap transform matrix")
            .field(field("c", FIXED15_8)),
        dl(0x18, "BITMAP_TRANSFORM_D", "Specify the D coefficient of the bitmap transform matrix")
            .field(field("d", FIXED8_8)),
        dl(0x19, "BITMAP_TRANSFORM_E", "Specify the E coefficient of the bitmap transform matrix")
            .field(field("e", FIXED8_8)),
        dl(0x1a, "BITMAP_TRANSFORM_F", "Specify the F coefficient of the bitmap transform matrix")
            .field(field("f", FIXED15_8)),
        dl(0x1b, "SCISSOR_XY", "Specify the top left corner of the scissor clip rectangle")
            .field(bits("y", 11))
            .field(bits("x", 11)),
        dl(0x1c, "SCISSOR_SIZE", "Specify the size of the scissor clip rectangle")
            .field(bits("height", 12))
            .field(bits("width", 12)),
        dl(0x1d, "CALL", "Execute a sequence of commands at another location in the display list")
            .field(field("dest", DL_OFFSET)),
        dl(0x1e, "JUMP", "Execute commands at another location in the display list")
            .field(field("dest", DL_OFFSET)),
        dl(0x1f, "BEGIN", "Begin drawing a graphics primitive")
            .field(field("prim", GRAPHICS_PRIMITIVE)),
        dl(0x20, "COLOR_MASK", "Enable or disable writing of color components")
            .field(field("a", BOOL))
            .field(field("b", BOOL))
            .field(field("g", BOOL))
            .field(field("r", BOOL)),
        dl(0x21, "END", "End drawing a graphics primitive.\nIt is recommended to have an END for each BEGIN."),
        dl(0x22, "SAVE_CONTEXT", "Push the current graphics context on the context stack"),
        dl(0x23, "RESTORE_CONTEXT", "Restore the current graphics context from the context stack."),
        dl(0x24, "RETURN", "Return from a previous CALL command"),
        dl(0x25, "MACRO", "Execute a single command from a macro register")
            .field(bits("m", 1)),
        dl(0x26, "CLEAR", "Clear buffers to preset values")
            .field(field("t", BOOL).describe("Clear tag buffer"))
            .field(field("s", BOOL).describe("Clear stencil buffer"))
            .field(field("c", BOOL).describe("Clear color buffer")),
        dl(0x27, "VERTEX_FORMAT", "Set the precision of VERTEX2F coordinates")
            .field(bits("frac", 3)),
        dl(0x28, "BITMAP_LAYOUT_H", "Specify the 2 most significant bits of the source bitmap memory format and layout for the current handle.")
            .field(bits("height", 2))
            .field(bits("linestride", 2)),
        dl(0x29, "BITMAP_SIZE_H", "Specify the 2 most significant bits of bitmaps dimension for the current handle.")
            .field(bits("height", 2))
            .field(bits("width", 2)),
        dl(0x2a, "PALETTE_SOURCE", "Specify the base address of the palette")
            .field(field("addr", ADDRESS)),
        dl(0x2b, "VERTEX_TRANSLATE_X", "Specify the vertex transformation's X translation component")
            .field(bits("x", 17)),
        dl(0x2c, "VERTEX_TRANSLATE_Y", "Specify the vertex transformation's Y translation component")
            .field(bits("y", 17)),
        dl(0x2d, "NOP", "No operation"),
        // 2-bit opcodes
        dl(0x40, "VERTEX2F", "Start the operation of graphics primitives at the specified screen coordinate, in the pixel precision defined by VERTEX_FORMAT.")
            .field(bits("y", 15))
            .field(bits("x", 15)),
        dl(0x80, "VERTEX2II", "Start the operation of graphics primitive at the specified coordinates in pixel precision")
            .field(field("cell", CELL))
            .field(field("handle", HANDLE))
            .field(bits("y", 9))
            .field(bits("x", 9)),
    ]
}

/// Returns every built-in coprocessor command, widgets included, ordered by opcode.
pub fn coprocessor_commands() -> Vec<CommandDef> {
    vec![
        cp(0x00, "DLSTART", "Start a new display list.\nWaits until the current display list is ready for writing, then sets REG_CMD_DL to zero."),
        cp(0x01, "SWAP", "Swap the current display list.\nRequests a display list swap immediately after the current display list is scanned out."),
        cp(0x02, "INTERRUPT", "Trigger interrupt CMDFLAG.\nSets the CMDFLAG bit of REG_INT_FLAGS, unless the corresponding bit in REG_INT_MASK is zero.")
            .field(field("ms", UINT32)),
        cp(0x09, "BGCOLOR", "Set the background color")
            .field(field("color", RGB)),
        cp(0x0a, "FGCOLOR", "Set the foreground color")
            .field(field("color", RGB)),
        widget(0x0b, "GRADIENT", "Draw a smooth color gradient")
            .field(field("x0", INT16))
            .field(field("y0", INT16))
            .field(field("rgb0", RGB))
            .field(field("x1", INT16))
            .field(field("y1", INT16))
            .field(field("rgb1", RGB)),
        widget(0x0c, "TEXT", "Draw text")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("font", HANDLE).stored_bits(16))
            .field(field("options", OPTIONS))
            .field(field("s", CSTRING)),
        widget(0x0d, "BUTTON", "Draw a button")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("h", UINT16))
            .field(field("font", HANDLE))
            .field(field("options", OPTIONS))
            .field(field("s", CSTRING)),
        widget(0x0e, "KEYS", "Draw a row of keys")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("h", UINT16))
            .field(field("font", HANDLE))
            .field(field("options", OPTIONS))
            .field(field("s", CSTRING)),
        widget(0x0f, "PROGRESS", "Draw a progress bar")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("h", UINT16))
            .field(field("options", OPTIONS))
            .field(field("value", UINT16))
            .field(field("range", UINT16)),
        widget(0x10, "SLIDER", "Draw a slider")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("h", UINT16))
            .field(field("options", OPTIONS))
            .field(field("value", UINT16))
            .field(field("range", UINT16)),
        widget(0x11, "SCROLLBAR", "Draw a scroll bar")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("h", UINT16))
            .field(field("options", OPTIONS))
            .field(field("value", UINT16))
            .field(field("size", UINT16))
            .field(field("range", UINT16)),
        widget(0x12, "TOGGLE", "Draw a toggle switch")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("font", HANDLE))
            .field(field("options", OPTIONS))
            .field(field("state", UINT16))
            .field(field("s", CSTRING)),
        widget(0x13, "GAUGE", "Draw a gauge")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("r", UINT16))
            .field(field("options", OPTIONS))
            .field(field("major", UINT16))
            .field(field("minor", UINT16))
            .field(field("value", UINT16))
            .field(field("range", UINT16)),
        widget(0x14, "CLOCK", "Draw an analog clock")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("r", UINT16))
            .field(field("options", OPTIONS))
            .field(field("h", UINT16))
            .field(field("m", UINT16))
            .field(field("s", UINT16))
            .field(field("ms", UINT16)),
        cp(0x15, "CALIBRATE", "Execute the touch screen calibration routine")
            .field(field("result", UINT32).describe("Output")),
        cp(0x16, "SPINNER", "Start an animated spinner")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("style", UINT16))
            .field(field("scale", UINT16)),
        cp(0x17, "STOP", "Stop periodic operation (SKETCH, SPINNER, SCREENSAVER)"),
        cp(0x18, "MEMCRC", "Compute CRC32 for block of memory")
            .field(field("ptr", ADDRESS))
            .field(field("num", UINT32))
            .field(field("result", UINT32).describe("Output")),
        cp(0x19, "REGREAD", "Read a register value")
            .field(field("ptr", ADDRESS))
            .field(field("result", UINT32).describe("Output")),
        cp(0x1a, "MEMWRITE", "Write data into memory or registers")
            .field(field("ptr", ADDRESS))
            .field(field("num", UINT32))
            .field(field("data", TypeDef::block(Some("num")))),
        cp(0x1b, "MEMSET", "Fill memory with a byte value")
            .field(field("ptr", ADDRESS))
            .field(field("value", UINT8))
            .field(field("num", UINT32)),
        cp(0x1c, "MEMZERO", "Write zero to a block of memory")
            .field(field("ptr", ADDRESS))
            .field(field("num", UINT32)),
        cp(0x1d, "MEMCPY", "Copy a block of memory")
            .field(field("dest", ADDRESS))
            .field(field("src", ADDRESS))
            .field(field("num", UINT32)),
        cp(0x1e, "APPEND", "Append commands from RAM_G")
            .field(field("ptr", ADDRESS))
            .field(field("num", UINT32)),
        cp(0x1f, "SNAPSHOT", "Take screen snapshot as ARGB4 bitmap")
            .field(field("ptr", ADDRESS)),
        cp(0x22, "INFLATE", "Decompress ZLIB data into RAM_G")
            .field(field("ptr", ADDRESS))
            .field(field("data", TypeDef::block(None))),
        cp(0x23, "GETPTR", "Get end memory address from last INFLATE command")
            .field(field("result", INT32).describe("Output")),
        cp(0x24, "LOADIMAGE", "Load a JPEG or PNG image")
            .field(field("ptr", ADDRESS))
            .field(field("options", OPTIONS)),
        cp(0x25, "GETPROPS", "Get source address and bitmap size from previous LOADIMAGE")
            .field(field("ptr", ADDRESS))
            .field(field("width", UINT32).describe("Output"))
            .field(field("height", UINT32).describe("Output")),
        cp(0x26, "LOADIDENTITY", "Reset transform to identity matrix"),
        cp(0x27, "TRANSLATE", "Apply transformation to current matrix")
            .field(field("tx", FIXED16_16))
            .field(field("ty", FIXED16_16)),
        cp(0x28, "SCALE", "Apply scale to current matrix")
            .field(field("sx", FIXED16_16))
            .field(field("sy", FIXED16_16)),
        cp(0x29, "ROTATE", "Apply a rotation to the current matrix")
            .field(field("a", ANGLE)),
        cp(0x2a, "SETMATRIX", "Set current matrix as bitmap transform"),
        cp(0x2b, "SETFONT", "Register custom-defined bitmap font")
            .field(field("font", HANDLE))
            .field(field("ptr", ADDRESS).describe("Must be word-aligned")),
        cp(0x2c, "TRACK", "Setup tracking for graphical object")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("h", UINT16))
            .field(field("tag", UINT8)),
        widget(0x2d, "DIAL", "Draw a rotary dial control")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("r", UINT16))
            .field(field("options", OPTIONS))
            .field(field("value", UINT16)),
        widget(0x2e, "NUMBER", "Draw a decimal number")
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("font", HANDLE))
            .field(field("options", OPTIONS))
            .field(field("n", INT32)),
        cp(0x2f, "SCREENSAVER", "Start an animated screensaver"),
        cp(0x30, "SKETCH", "Start a continuous sketch update"),
        cp(0x31, "LOGO", "Play the device logo animation"),
        cp(0x32, "COLDSTART", "Reset coprocessor to default state"),
        cp(0x33, "GETMATRIX", "Get current matrix")
            .field(field("a", FIXED8_8))
            .field(field("b", FIXED8_8))
            .field(field("c", FIXED8_8))
            .field(field("d", FIXED8_8))
            .field(field("e", FIXED8_8))
            .field(field("f", FIXED8_8)),
        cp(0x34, "GRADCOLOR", "Set 3D button highlight color")
            .field(field("color", RGB)),
        cp(0x36, "SETROTATE", "Rotate the screen")
            .field(field("r", UINT8)),
        cp(0x37, "SNAPSHOT2", "Take partial screen snapshot")
            .field(field("fmt", UINT8))
            .field(field("ptr", ADDRESS))
            .field(field("x", INT16))
            .field(field("y", INT16))
            .field(field("w", UINT16))
            .field(field("h", UINT16)),
        cp(0x38, "SETBASE", "Set base for NUMBER output")
            .field(field("b", UINT8)),
        cp(0x39, "MEDIAFIFO", "Setup a streaming media FIFO")
            .field(field("ptr", ADDRESS))
            .field(field("size", UINT32)),
        cp(0x3a, "PLAYVIDEO", "Play MJPEG-encoded AVI video")
            .field(field("options", OPTIONS)),
        cp(0x3b, "SETFONT2", "Setup a custom font")
            .field(field("font", HANDLE))
            .field(field("ptr", ADDRESS))
            .field(field("firstchar", UINT8)),
        cp(0x3c, "SETSCRATCH", "Designate scratch bitmap for widgets to use")
            .field(field("handle", HANDLE).describe("Default is 15")),
        cp(0x3f, "ROMFONT", "Load a ROM font into a bitmap handle")
            .field(field("font", HANDLE).stored_bits(32))
            .field(field("romslot", UINT8)),
        cp(0x40, "VIDEOSTART", "Initialise video frame decoder"),
        cp(0x41, "VIDEOFRAME", "Load next frame of video")
            .field(field("dst", ADDRESS))
            .field(field("ptr", ADDRESS)),
        cp(0x43, "SETBITMAP", "Generate bitmap information DL commands")
            .field(field("source", ADDRESS))
            .field(field("fmt", UINT8))
            .field(field("width", UINT16))
            .field(field("height", UINT16)),
        widget(0x57, "GRADIENTA", "Draw a smooth color gradient with transparency (BT88x only)")
            .field(field("x0", INT16))
            .field(field("y0", INT16))
            .field(field("argb0", ARGB))
            .field(field("x1", INT16))
            .field(field("y1", INT16))
            .field(field("argb1", ARGB)),
    ]
}

/// Both tables, display-list commands first.
pub fn all_commands() -> Vec<CommandDef> {
    let mut commands = display_list_commands();
    commands.extend(coprocessor_commands());
    commands
}
