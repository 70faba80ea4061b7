//! `OPT_*` option flags accepted by the `options` field of coprocessor commands.

/// A named option flag and the commands that accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDef {
    /// Name without the `OPT_` prefix.
    pub name: &'static str,
    pub value: u16,
    pub description: &'static str,
    pub commands: &'static [&'static str],
}

const STYLED: &[&str] = &[
    "BUTTON", "CLOCK", "KEYS", "GAUGE", "SLIDER", "DIAL", "TOGGLE", "PROGRESS", "SCROLLBAR",
];
const ALIGNED: &[&str] = &["KEYS", "TEXT", "NUMBER"];

pub const OPTIONS: &[OptionDef] = &[
    OptionDef {
        name: "3D",
        value: 0,
        description: "3D effect",
        commands: STYLED,
    },
    OptionDef {
        name: "RGB565",
        value: 0,
        description: "Decode the source image to RGB565 format",
        commands: &["LOADIMAGE"],
    },
    OptionDef {
        name: "MONO",
        value: 1,
        description: "Decode the source JPEG image to L8 format, i.e., monochrome",
        commands: &["LOADIMAGE"],
    },
    OptionDef {
        name: "NODL",
        value: 2,
        description: "No display list commands generated",
        commands: &["LOADIMAGE"],
    },
    OptionDef {
        name: "FLAT",
        value: 256,
        description: "No 3D effect",
        commands: STYLED,
    },
    OptionDef {
        name: "SIGNED",
        value: 256,
        description: "The number is treated as a 32-bit signed integer",
        commands: &["NUMBER"],
    },
    OptionDef {
        name: "CENTERX",
        value: 512,
        description: "Horizontally-centered style",
        commands: ALIGNED,
    },
    OptionDef {
        name: "CENTERY",
        value: 1024,
        description: "Vertically centered style",
        commands: ALIGNED,
    },
    OptionDef {
        name: "CENTER",
        value: 1536,
        description: "Horizontally and vertically centered style",
        commands: ALIGNED,
    },
    OptionDef {
        name: "RIGHTX",
        value: 2048,
        description: "Right justified style",
        commands: ALIGNED,
    },
    OptionDef {
        name: "NOBACK",
        value: 4096,
        description: "No background drawn",
        commands: &["CLOCK", "GAUGE"],
    },
    OptionDef {
        name: "NOTICKS",
        value: 8192,
        description: "No ticks",
        commands: &["CLOCK", "GAUGE"],
    },
    OptionDef {
        name: "NOHM",
        value: 16384,
        description: "No hour and minute hands",
        commands: &["CLOCK"],
    },
    OptionDef {
        name: "NOPOINTER",
        value: 16384,
        description: "No pointer",
        commands: &["GAUGE"],
    },
    OptionDef {
        name: "NOSECS",
        value: 32768,
        description: "No second hands",
        commands: &["CLOCK"],
    },
    OptionDef {
        name: "NOHANDS",
        value: 49152,
        description: "No hands",
        commands: &["CLOCK"],
    },
    OptionDef {
        name: "NOTEAR",
        value: 4,
        description: "Synchronize video updates to the display blanking interval, avoiding horizontal tearing artefacts",
        commands: &["PLAYVIDEO"],
    },
    OptionDef {
        name: "FULLSCREEN",
        value: 8,
        description: "Zoom the video so that it fills as much of the screen as possible",
        commands: &["PLAYVIDEO"],
    },
    OptionDef {
        name: "MEDIAFIFO",
        value: 16,
        description: "Source video, image or compressed data from the defined media FIFO",
        commands: &["PLAYVIDEO", "VIDEOFRAME", "LOADIMAGE"],
    },
    OptionDef {
        name: "SOUND",
        value: 32,
        description: "Decode the audio data of MJPEG stream",
        commands: &["PLAYVIDEO"],
    },
];

/// Options accepted by the named coprocessor command, in table order.
pub fn for_command(command: &str) -> impl Iterator<Item = &'static OptionDef> + '_ {
    OPTIONS
        .iter()
        .filter(move |opt| opt.commands.contains(&command))
}

/// Finds an option by name, with or without the `OPT_` prefix.
pub fn lookup(name: &str) -> Option<&'static OptionDef> {
    let name = name.strip_prefix("OPT_").unwrap_or(name);
    OPTIONS.iter().find(|opt| opt.name == name)
}
