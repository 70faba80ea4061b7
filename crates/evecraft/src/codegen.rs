//! Code generator: turns a [Schema] into Rust source.
//!
//! For every display-list command the output has a `#[repr(transparent)]` word type and
//! for every coprocessor command a `#[repr(C)]` record whose fields sit at exactly the
//! resolved offsets, padding spelled out. A compile-time assertion ties each type's size
//! to the schema. Writer methods on the buffer type build the record, write it, then
//! write a trailing string or block.
//!
//! The output is a pure function of the schema and [GenerateOptions]. It expects the
//! buffer type to be in scope and to provide `write(&[u8])`, `write_str(&str)` and
//! `write_block(&[u8])`, the latter two padding to 4 bytes.
//!
//! [listing] renders the same layouts as a human-readable table.

use crate::{
    command::{BlockCommand, Command, TailLength, WordCommand},
    field::Field,
    options,
    schema::Schema,
    transform::Transform,
};

/// Knobs for [generate_with].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Type the writer methods are implemented on.
    pub buffer_type: String,
    /// Prefix of coprocessor writer method names.
    pub coprocessor_prefix: String,
    /// Emit command and field descriptions as doc comments.
    pub doc_comments: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            buffer_type: "CommandBuffer".to_string(),
            coprocessor_prefix: "cmd_".to_string(),
            doc_comments: true,
        }
    }
}

/// Generates Rust source for `schema` with the default options.
pub fn generate(schema: &Schema) -> String {
    generate_with(schema, &GenerateOptions::default())
}

/// Generates Rust source for `schema`.
pub fn generate_with(schema: &Schema, options: &GenerateOptions) -> String {
    let mut src = Source::default();
    src.line("// Generated by evecraft-gen from the command schema. Do not edit.");
    src.blank();

    for command in schema.commands() {
        match command {
            Command::Word(cmd) => word_record(&mut src, cmd, options),
            Command::Block(cmd) => block_record(&mut src, cmd, options),
        }
    }

    src.line(format!("impl {} {{", options.buffer_type));
    src.indent += 1;
    for (i, command) in schema.commands().iter().enumerate() {
        if i > 0 {
            src.blank();
        }
        match command {
            Command::Word(cmd) => word_writer(&mut src, cmd, options),
            Command::Block(cmd) => block_writer(&mut src, cmd, options),
        }
    }
    src.indent -= 1;
    src.line("}");

    src.text
}

#[derive(Default)]
struct Source {
    text: String,
    indent: usize,
}

impl Source {
    fn line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.text.push_str("    ");
        }
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }

    fn docs(&mut self, text: &str, options: &GenerateOptions) {
        if !options.doc_comments {
            return;
        }
        for line in text.lines() {
            if line.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {line}"));
            }
        }
    }
}

fn word_record(src: &mut Source, cmd: &WordCommand, options: &GenerateOptions) {
    let name = pascal_case(&cmd.name);
    let params = word_params(cmd);

    src.docs(&cmd.description, options);
    src.line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
    src.line("#[repr(transparent)]");
    src.line(format!("pub struct {name}(pub u32);"));
    src.blank();

    src.line(format!("impl {name} {{"));
    src.indent += 1;
    src.line(format!("pub const CODE: u8 = {:#04x};", cmd.opcode.code));
    src.line("pub const SIZE: usize = 4;");
    src.blank();

    let opcode = format!("{:#x}_u32 << {}", cmd.opcode.stored, 32 - cmd.opcode.bits);
    let mut terms = if cmd.fields.is_empty() {
        vec![opcode]
    } else {
        vec![format!("({opcode})")]
    };
    let layout: Vec<_> = cmd.bit_layout().collect();
    for (field, shift) in layout.into_iter().rev() {
        let value = word_value(field);
        if shift == 0 {
            terms.push(value);
        } else {
            terms.push(format!("({value} << {shift})"));
        }
    }

    src.line(format!("pub fn new({}) -> Self {{", params.join(", ")));
    src.indent += 1;
    src.line(format!("Self({})", terms.join(" | ")));
    src.indent -= 1;
    src.line("}");
    src.blank();
    src.line("pub fn to_bytes(self) -> [u8; 4] {");
    src.indent += 1;
    src.line("self.0.to_le_bytes()");
    src.indent -= 1;
    src.line("}");
    src.indent -= 1;
    src.line("}");
    src.blank();
    size_assertion(src, &name);
}

/// Parameters of a display-list constructor or writer, most significant field first.
fn word_params(cmd: &WordCommand) -> Vec<String> {
    cmd.fields
        .iter()
        .rev()
        .map(|field| format!("{}: {}", ident(&field.name), arg_type(field)))
        .collect()
}

/// Expression for the masked, unshifted bits of a display-list field.
fn word_value(field: &Field) -> String {
    let name = ident(&field.name);
    let mask = crate::bits::mask(field.bitcount());

    match field.ty.transform {
        Transform::Fixed { scale } => {
            format!("((({name} * {scale}.0) as i32 as u32) & {mask:#x})")
        }
        _ if arg_type(field) == "bool" => format!("({name} as u32)"),
        _ if arg_type(field) == "u32" => format!("({name} & {mask:#x})"),
        _ => format!("(({name} as u32) & {mask:#x})"),
    }
}

fn block_record(src: &mut Source, cmd: &BlockCommand, options: &GenerateOptions) {
    let name = record_name(cmd);

    src.docs(&cmd.description, options);
    src.line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
    src.line("#[repr(C)]");
    src.line(format!("pub struct {name} {{"));
    src.indent += 1;
    src.line("pub code: u32,");
    let mut pos = 4;
    let mut pads = Vec::new();
    for field in &cmd.head {
        let offset = field.offset.unwrap_or(pos);
        pad(src, &mut pads, &mut pos, offset);
        if let Some(description) = &field.description {
            src.docs(description, options);
        }
        src.line(format!("pub {}: {},", ident(&field.name), storage_type(field)));
        pos = offset + field.byte_size();
    }
    pad(src, &mut pads, &mut pos, cmd.size);
    src.indent -= 1;
    src.line("}");
    src.blank();

    src.line(format!("impl {name} {{"));
    src.indent += 1;
    src.line(format!("pub const CODE: u32 = 0xffff_ff{:02x};", cmd.code));
    src.line(format!("pub const SIZE: usize = {};", cmd.size));
    src.blank();

    let params: Vec<_> = cmd
        .head
        .iter()
        .map(|field| format!("{}: {}", ident(&field.name), arg_type(field)))
        .collect();
    src.line(format!("pub fn new({}) -> Self {{", params.join(", ")));
    src.indent += 1;
    src.line("Self {");
    src.indent += 1;
    src.line("code: Self::CODE,");
    for field in &cmd.head {
        src.line(format!("{},", record_init(field)));
    }
    for pad in &pads {
        src.line(format!("{pad}: 0,"));
    }
    src.indent -= 1;
    src.line("}");
    src.indent -= 1;
    src.line("}");
    src.blank();

    src.line("pub fn to_bytes(&self) -> [u8; Self::SIZE] {");
    src.indent += 1;
    src.line("let mut out = [0u8; Self::SIZE];");
    src.line("out[0..4].copy_from_slice(&self.code.to_le_bytes());");
    for field in &cmd.head {
        let offset = field.offset.unwrap_or_default();
        src.line(format!(
            "out[{offset}..{}].copy_from_slice(&self.{}.to_le_bytes());",
            offset + field.byte_size(),
            ident(&field.name)
        ));
    }
    src.line("out");
    src.indent -= 1;
    src.line("}");
    src.indent -= 1;
    src.line("}");
    src.blank();
    size_assertion(src, &name);
}

/// Emits `u16` padding members from `pos` up to `offset`.
fn pad(src: &mut Source, pads: &mut Vec<String>, pos: &mut usize, offset: usize) {
    while *pos < offset {
        let name = format!("_pad{pos}");
        src.line(format!("{name}: u16,"));
        pads.push(name);
        *pos += 2;
    }
}

/// Constructor initialiser for a record member.
fn record_init(field: &Field) -> String {
    let name = ident(&field.name);
    let storage = storage_type(field);

    match field.ty.transform {
        Transform::Fixed { scale } => format!("{name}: ({name} * {scale}.0) as {storage}"),
        _ if arg_type(field) == storage => name,
        _ => format!("{name}: {storage}::from({name})"),
    }
}

fn size_assertion(src: &mut Source, name: &str) {
    src.line(format!(
        "const _: () = assert!(::core::mem::size_of::<{name}>() == {name}::SIZE);"
    ));
    src.blank();
}

fn word_writer(src: &mut Source, cmd: &WordCommand, options: &GenerateOptions) {
    let name = pascal_case(&cmd.name);
    let args: Vec<_> = cmd.fields.iter().rev().map(|f| ident(&f.name)).collect();
    let mut params = vec!["&mut self".to_string()];
    params.extend(word_params(cmd));

    src.docs(&cmd.description, options);
    src.line(format!(
        "pub fn {}({}) {{",
        ident(&cmd.name.to_lowercase()),
        params.join(", ")
    ));
    src.indent += 1;
    src.line(format!(
        "self.write(&{name}::new({}).to_bytes());",
        args.join(", ")
    ));
    src.indent -= 1;
    src.line("}");
}

fn block_writer(src: &mut Source, cmd: &BlockCommand, options: &GenerateOptions) {
    let name = record_name(cmd);
    let method = ident(&format!(
        "{}{}",
        options.coprocessor_prefix,
        cmd.name.to_lowercase()
    ));

    let mut params = vec!["&mut self".to_string()];
    params.extend(
        cmd.head
            .iter()
            .map(|field| format!("{}: {}", ident(&field.name), arg_type(field))),
    );
    if let Some(tail) = &cmd.tail {
        let ty = match tail.length {
            TailLength::NulTerminated => "&str",
            TailLength::Governed { .. } | TailLength::ToEnd => "&[u8]",
        };
        params.push(format!("{}: {ty}", ident(&tail.field.name)));
    }
    let args: Vec<_> = cmd.head.iter().map(|f| ident(&f.name)).collect();

    src.docs(&cmd.description, options);
    src.line(format!("pub fn {method}({}) {{", params.join(", ")));
    src.indent += 1;
    if let Some(tail) = &cmd.tail
        && let TailLength::Governed { index } = tail.length
    {
        src.line(format!(
            "debug_assert_eq!({} as usize, {}.len());",
            ident(&cmd.head[index].name),
            ident(&tail.field.name)
        ));
    }
    src.line(format!("let cmd = {name}::new({});", args.join(", ")));
    match &cmd.tail {
        // The tail follows the head directly, inside the record's padding.
        Some(tail) if tail.offset() < cmd.size => {
            src.line(format!("self.write(&cmd.to_bytes()[..{}]);", tail.offset()));
        }
        _ => src.line("self.write(&cmd.to_bytes());"),
    }
    if let Some(tail) = &cmd.tail {
        let write = match tail.length {
            TailLength::NulTerminated => "write_str",
            TailLength::Governed { .. } | TailLength::ToEnd => "write_block",
        };
        src.line(format!("self.{write}({});", ident(&tail.field.name)));
    }
    src.indent -= 1;
    src.line("}");
}

fn record_name(cmd: &BlockCommand) -> String {
    format!("Cmd{}", pascal_case(&cmd.name))
}

/// Rust type of a writer argument.
fn arg_type(field: &Field) -> &'static str {
    if let Transform::Fixed { .. } = field.ty.transform {
        return "f64";
    }
    if field.ty.name == "bool" && field.bitcount() == 1 {
        return "bool";
    }

    match (field.bitcount(), field.ty.signed) {
        (0..=8, false) => "u8",
        (0..=8, true) => "i8",
        (9..=16, false) => "u16",
        (9..=16, true) => "i16",
        (_, false) => "u32",
        (_, true) => "i32",
    }
}

fn storage_type(field: &Field) -> &'static str {
    field.storage().map_or("u32", |storage| storage.rust_type())
}

/// `COLOR_RGB` -> `ColorRgb`.
fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Makes `name` usable as an identifier.
fn ident(name: &str) -> String {
    match name {
        "self" | "Self" | "super" | "crate" => format!("{name}_"),
        _ if KEYWORDS.contains(&name) => format!("r#{name}"),
        _ => name.to_string(),
    }
}

/// Renders the resolved layout of every command.
///
/// Coprocessor commands list each field's byte offset, type and name, then the fixed
/// size; `options` fields name the accepted `OPT_*` flags. Display-list commands list
/// the bit range of the opcode and of each field.
pub fn listing(schema: &Schema) -> String {
    let mut src = Source::default();

    for command in schema.commands() {
        match command {
            Command::Word(cmd) => {
                src.line(cmd.name.to_string());
                let opcode = &cmd.opcode;
                src.line(format!(
                    "  [31:{}] {:#04x}",
                    32 - opcode.bits,
                    opcode.code
                ));
                let layout: Vec<_> = cmd.bit_layout().collect();
                for (field, shift) in layout.into_iter().rev() {
                    let high = shift + field.bitcount() - 1;
                    src.line(format!(
                        "  [{high}:{shift}] {} {}",
                        field.ty.name, field.name
                    ));
                }
            }
            Command::Block(cmd) => {
                src.line(format!("CMD_{}", cmd.name));
                src.line(format!("  +0 FFFFFF{:02x}", cmd.code));
                for field in cmd.fields() {
                    let mut line = format!(
                        "  +{} {} {}",
                        field.offset.unwrap_or_default(),
                        field.ty.name,
                        field.name
                    );
                    let bits = field.bitcount();
                    if bits % 8 != 0 {
                        line.push_str(&format!(": {bits}"));
                    }
                    if field.name == "options" {
                        let flags: Vec<_> = options::for_command(&cmd.name)
                            .map(|opt| opt.name)
                            .collect();
                        if !flags.is_empty() {
                            line.push_str(&format!("  // {}", flags.join(", ")));
                        }
                    }
                    src.line(line);
                }
                src.line(format!("  +{}", cmd.size));
            }
        }
    }

    src.text
}
