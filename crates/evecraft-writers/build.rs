use std::{env, fs, path::PathBuf};

use evecraft::{codegen::generate, schema::Schema};

fn main() {
    println!("cargo::rerun-if-changed=build.rs");

    let schema = match Schema::standard() {
        Ok(schema) => schema,
        Err(err) => panic!("built-in command tables are invalid: {err}"),
    };

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap_or_default());
    let path = out_dir.join("commands.rs");
    if let Err(err) = fs::write(&path, generate(&schema)) {
        panic!("cannot write {}: {err}", path.display());
    }
}
