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

    lib.rs

    Command line frontend: resolves configuration, runs the generator and splices the
    resulting artifacts into the target source files.

*/

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::Context;
use marty_opgen::{
    generate,
    semantics::catalog,
    splice::{self, MarkerPair},
    Artifacts,
    GenerationOptions,
    OpcodeKey,
    OpgenError,
};
use marty_opgen_config::{ConfigFileParams, Generator};

/// A target file with every artifact already spliced in, waiting to be written.
#[derive(Debug)]
pub struct PendingWrite {
    pub path: PathBuf,
    pub text: String,
}

pub fn parse_filter(opcodes: &[String]) -> anyhow::Result<BTreeSet<OpcodeKey>> {
    opcodes
        .iter()
        .map(|s| s.parse::<OpcodeKey>().map_err(anyhow::Error::from))
        .collect()
}

fn splice_into(
    files: &mut Vec<PendingWrite>,
    path: &Path,
    markers: MarkerPair,
    content: &str,
) -> anyhow::Result<()> {
    let index = match files.iter().position(|f| f.path == path) {
        Some(index) => index,
        None => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            files.push(PendingWrite {
                path: path.to_path_buf(),
                text,
            });
            files.len() - 1
        }
    };

    let file = &mut files[index];
    file.text = splice::splice(&file.text, markers, content).with_context(|| format!("splicing {}", path.display()))?;
    Ok(())
}

/// Splice all three artifacts in memory. The decode and execution artifacts go to the cpu
/// file; the test suite goes to the tests file, which may be the same file.
pub fn splice_artifacts(generator: &Generator, artifacts: &Artifacts) -> anyhow::Result<Vec<PendingWrite>> {
    let mut files = Vec::new();
    splice_into(&mut files, &generator.cpu_file, splice::DECODING, &artifacts.decode)?;
    splice_into(&mut files, &generator.cpu_file, splice::EXECUTION, &artifacts.execution)?;
    splice_into(&mut files, &generator.tests_file, splice::TESTS, &artifacts.tests)?;
    Ok(files)
}

/// Run the generator and prepare every output. Nothing is written.
pub fn prepare(generator: &Generator) -> anyhow::Result<Vec<PendingWrite>> {
    let table_json = std::fs::read_to_string(&generator.table_path)
        .with_context(|| format!("reading opcode table {}", generator.table_path.display()))?;

    let options = match &generator.opcodes {
        Some(opcodes) => GenerationOptions::with_filter(parse_filter(opcodes)?),
        None => GenerationOptions::default(),
    };

    let artifacts = generate(&table_json, &catalog(), &options)?;
    splice_artifacts(generator, &artifacts)
}

/// The sibling an output is staged at before it replaces its target.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".opgen-tmp");
    path.with_file_name(name)
}

fn discard(staged: &[PathBuf]) {
    for path in staged {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("Could not remove staged file {}: {}", path.display(), e);
        }
    }
}

/// Write all outputs or none. Each file is staged next to its target, and targets are only
/// replaced once every staged write has succeeded.
pub fn commit(files: &[PendingWrite]) -> anyhow::Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let staging = staging_path(&file.path);
        if let Err(e) = std::fs::write(&staging, &file.text) {
            if staging.exists() {
                staged.push(staging);
            }
            discard(&staged);
            return Err(e).with_context(|| format!("writing {}", file.path.display()));
        }
        staged.push(staging);
    }

    for (index, (file, staging)) in files.iter().zip(&staged).enumerate() {
        if let Err(e) = std::fs::rename(staging, &file.path) {
            discard(&staged[index..]);
            return Err(e).with_context(|| format!("replacing {}", file.path.display()));
        }
        log::info!("Wrote {}", file.path.display());
    }
    Ok(())
}

/// Generate and, unless this is a dry run, write the outputs.
pub fn execute(config: &ConfigFileParams) -> anyhow::Result<()> {
    let files = prepare(&config.generator)?;

    if config.generator.dry_run {
        for file in &files {
            log::info!("Dry run: {} not written ({} bytes)", file.path.display(), file.text.len());
        }
        return Ok(());
    }
    commit(&files)
}

pub fn run() {
    let config = match marty_opgen_config::read_config_file("./opgen.toml") {
        Ok(config) => config,
        Err(e) => match e.downcast_ref::<std::io::Error>() {
            Some(e) => {
                eprintln!("Error reading configuration file:\n{}", e);
                std::process::exit(1);
            }
            None => {
                eprintln!(
                    "Failed to parse configuration file. There may be a typo or otherwise invalid toml:\n{}",
                    e
                );
                std::process::exit(1);
            }
        },
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if let Err(e) = execute(&config) {
        match e.downcast_ref::<OpgenError>() {
            Some(fault) => log::error!("Generation failed ({}): {}", fault.class(), fault),
            None => log::error!("Generation failed: {:#}", e),
        }
        std::process::exit(1);
    }
}
