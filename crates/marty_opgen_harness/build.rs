/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    ---------------------------------------------------------------------------

    build.rs

    Runs the generator over the bundled opcode table and splices its output into
    the stub core template. The result is included by lib.rs.

*/

use std::{env, fs, path::PathBuf};

use anyhow::{anyhow, Context};
use marty_opgen::{generate, semantics::catalog, splice, GenerationOptions};

const TABLE: &str = "../marty_opgen/tests/data/opcodes.json";
const TEMPLATE: &str = "templates/cpu.rs";

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", TABLE);
    println!("cargo:rerun-if-changed={}", TEMPLATE);

    let table = fs::read_to_string(TABLE).with_context(|| format!("reading {}", TABLE))?;
    let template = fs::read_to_string(TEMPLATE).with_context(|| format!("reading {}", TEMPLATE))?;

    let artifacts = generate(&table, &catalog(), &GenerationOptions::default())
        .map_err(|e| anyhow!("{}: {}", e.class(), e))?;

    let mut cpu = splice::splice(&template, splice::DECODING, &artifacts.decode)?;
    cpu = splice::splice(&cpu, splice::EXECUTION, &artifacts.execution)?;
    cpu = splice::splice(&cpu, splice::TESTS, &artifacts.tests)?;

    let out_dir = PathBuf::from(env::var("OUT_DIR").context("OUT_DIR not set")?);
    let target = out_dir.join("cpu.rs");
    fs::write(&target, cpu).with_context(|| format!("writing {}", target.display()))?;
    Ok(())
}
