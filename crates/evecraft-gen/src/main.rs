//! evecraft-gen - command line front end for the evecraft schema
//!
//! # Usage
//!
//! ```bash
//! # Rust writers for the built-in tables
//! evecraft-gen rust -o src/commands.rs
//!
//! # Layout listing of a custom table
//! evecraft-gen --schema bt817.json listing
//!
//! # Decode a captured command stream
//! evecraft-gen decode "0cffffff 0a001400 1f000000 48690000"
//! ```

use std::{fmt::Write as _, fs, path::Path};

use anyhow::{Context, Result, bail};
use clap::Parser;
use evecraft::{
    codegen::{self, GenerateOptions},
    command::Family,
    schema::{Decoded, Schema},
    serde::SchemaDef,
};
use log::info;

mod args;

use args::{Cli, Command};

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();

    let cli = Cli::parse();
    let defs = load_defs(cli.schema.as_deref())?;
    let schema = defs.compile().context("Failed to compile schema")?;
    info!(
        "schema: {} display-list, {} coprocessor commands",
        schema.display_list().count(),
        schema.coprocessor().count()
    );

    let output = match &cli.command {
        Command::Rust {
            buffer_type,
            prefix,
            no_docs,
        } => {
            let options = GenerateOptions {
                buffer_type: buffer_type.clone(),
                coprocessor_prefix: prefix.clone(),
                doc_comments: !no_docs,
            };
            codegen::generate_with(&schema, &options)
        }
        Command::Listing => codegen::listing(&schema),
        Command::Json => {
            let mut json =
                serde_json::to_string_pretty(&defs).context("Failed to serialize schema")?;
            json.push('\n');
            json
        }
        Command::Decode { hex } => {
            let data = parse_hex(hex)?;
            decode(&schema, &data)?
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => print!("{output}"),
    }

    Ok(())
}

fn load_defs(path: Option<&Path>) -> Result<SchemaDef> {
    let Some(path) = path else {
        return Ok(SchemaDef::builtin());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse schema file {}", path.display()))
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let mut digits = String::with_capacity(input.len());
    for token in input.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        digits.push_str(token);
    }

    if !digits.is_ascii() {
        bail!("Input contains non-hex characters");
    }
    if digits.len() % 2 != 0 {
        bail!("Odd number of hex digits ({})", digits.len());
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = &digits[i..i + 2];
            u8::from_str_radix(pair, 16).with_context(|| format!("Invalid hex byte '{pair}'"))
        })
        .collect()
}

/// One line per command: offset, name, then `field=value` pairs.
fn decode(schema: &Schema, data: &[u8]) -> Result<String> {
    let mut out = String::new();
    let mut stream = schema.decode_stream(data);

    loop {
        let offset = stream.offset();
        match stream.next() {
            Some(Ok(decoded)) => out.push_str(&format_decoded(offset, &decoded)),
            Some(Err(err)) => {
                return Err(err).with_context(|| format!("Failed to decode at offset {offset}"));
            }
            None => break,
        }
    }

    Ok(out)
}

fn format_decoded(offset: usize, decoded: &Decoded<'_>) -> String {
    let command = decoded.command;
    let prefix = match command.family() {
        Family::Coprocessor => "CMD_",
        Family::DisplayList => "",
    };

    let mut line = format!("{offset:06x} {prefix}{}", command.name());
    for (field, value) in command.fields().zip(&decoded.args) {
        let _ = write!(line, " {}={value}", field.name);
    }
    line.push('\n');
    line
}
