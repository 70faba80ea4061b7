use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// evecraft-gen - EVE command schema tool
#[derive(Parser, Debug)]
#[command(name = "evecraft-gen")]
#[command(version)]
#[command(about = "Generate writers, listings and decoders from the EVE command schema", long_about = None)]
pub struct Cli {
    /// JSON schema file to use instead of the built-in tables
    #[arg(short = 's', long = "schema", global = true)]
    pub schema: Option<PathBuf>,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output", global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Emit Rust records and writer methods
    Rust {
        /// Type the writer methods are implemented on
        #[arg(long = "buffer-type", default_value = "CommandBuffer")]
        buffer_type: String,

        /// Prefix of coprocessor writer method names
        #[arg(long = "prefix", default_value = "cmd_")]
        prefix: String,

        /// Leave out doc comments
        #[arg(long = "no-docs")]
        no_docs: bool,
    },

    /// Print the resolved layout of every command
    Listing,

    /// Dump the schema definitions as JSON
    Json,

    /// Decode a hex-encoded command stream
    Decode {
        /// Hex bytes; whitespace, commas and `0x` prefixes are ignored
        hex: String,
    },
}
