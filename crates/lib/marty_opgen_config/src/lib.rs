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

    Reads the opcode generator's TOML configuration and overlays command line arguments.

*/

//! Configuration for the opcode generator.
//!
//! Settings are read from a TOML file (`opgen.toml` by default). Command line arguments, when
//! enabled, take priority over the configuration file.
//!
//! Features:
//! - `use_bpaf`: Enable BPAF support for command line argument parsing.

mod bpaf_config;

use std::path::{Path, PathBuf};

#[cfg(feature = "use_bpaf")]
use bpaf_config::cli_args;
pub use bpaf_config::CmdLineArgs;

use cfg_if::cfg_if;
use serde_derive::Deserialize;

fn _default_table_path() -> PathBuf {
    PathBuf::from("opcodes.json")
}
fn _default_cpu_file() -> PathBuf {
    PathBuf::from("src/cpu.rs")
}
fn _default_tests_file() -> PathBuf {
    PathBuf::from("src/cpu/tests.rs")
}
fn _default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Generator {
    /// The opcode table, as JSON.
    #[serde(default = "_default_table_path")]
    pub table_path: PathBuf,
    /// Receives the decode and execution artifacts.
    #[serde(default = "_default_cpu_file")]
    pub cpu_file: PathBuf,
    /// Receives the generated test suite.
    #[serde(default = "_default_tests_file")]
    pub tests_file: PathBuf,
    /// Restrict generation to these opcodes, e.g. `["06", "CB40"]`.
    pub opcodes: Option<Vec<String>>,
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            table_path: _default_table_path(),
            cpu_file: _default_cpu_file(),
            tests_file: _default_tests_file(),
            opcodes: None,
            dry_run: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Logging {
    /// Default log filter, used when `RUST_LOG` is not set.
    #[serde(default = "_default_level")]
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self { level: _default_level() }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFileParams {
    #[serde(default)]
    pub generator: Generator,
    #[serde(default)]
    pub logging:   Logging,
}

impl ConfigFileParams {
    pub fn overlay(&mut self, shell_args: CmdLineArgs) {
        if let Some(table) = shell_args.table {
            self.generator.table_path = table;
        }
        if let Some(cpu_file) = shell_args.cpu_file {
            self.generator.cpu_file = cpu_file;
        }
        if let Some(tests_file) = shell_args.tests_file {
            self.generator.tests_file = tests_file;
        }
        if let Some(opcode_string) = shell_args.opcodes {
            // Split comma-separated list of opcodes into vector of strings
            let opcodes: Vec<String> = opcode_string
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            self.generator.opcodes = Some(opcodes);
        }
        if let Some(level) = shell_args.log_level {
            self.logging.level = level;
        }

        self.generator.dry_run |= shell_args.dry_run;
    }
}

pub fn read_config(toml_string: impl AsRef<str>, shell_args: CmdLineArgs) -> Result<ConfigFileParams, anyhow::Error> {
    let mut toml_args: ConfigFileParams = toml::from_str(toml_string.as_ref())?;

    // Command line arguments override config file arguments
    toml_args.overlay(shell_args);
    log::debug!("Resolved configuration: {:?}", toml_args);

    Ok(toml_args)
}

fn shell_args() -> CmdLineArgs {
    let shell_args: CmdLineArgs;

    cfg_if! {
        if #[cfg(feature = "use_bpaf")] {
            log::debug!("Reading command line arguments...");
            shell_args = cli_args().run();
        } else {
            log::debug!("Argument reading disabled...");
            shell_args = CmdLineArgs::default();
        }
    }
    shell_args
}

/// Read the TOML configuration from a file path, parse and overlay command line arguments.
/// A missing default configuration file is not an error; an explicitly named one is.
pub fn read_config_file<P>(default_path: P) -> Result<ConfigFileParams, anyhow::Error>
where
    P: AsRef<Path>,
{
    let shell_args = shell_args();

    // Allow configuration file path to be overridden by command line argument 'config_file'
    let toml_string = if let Some(configfile_path) = shell_args.config_file.as_ref() {
        std::fs::read_to_string(configfile_path)?
    }
    else if default_path.as_ref().exists() {
        std::fs::read_to_string(default_path)?
    }
    else {
        log::debug!(
            "No configuration file at {}, using defaults",
            default_path.as_ref().display()
        );
        String::new()
    };

    read_config(toml_string, shell_args)
}

/// Read the TOML configuration from a string, parse and overlay command line arguments.
pub fn read_config_string(toml_string: impl AsRef<str>) -> Result<ConfigFileParams, anyhow::Error> {
    read_config(toml_string, shell_args())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[generator]
table_path = "data/opcodes.json"
cpu_file = "../gb/src/cpu.rs"
tests_file = "../gb/src/cpu/tests.rs"
opcodes = ["06", "CB40"]

[logging]
level = "debug"
"#;

    #[test]
    fn parses_file_sections() {
        let config = read_config(CONFIG, CmdLineArgs::default()).unwrap();
        assert_eq!(config.generator.table_path, PathBuf::from("data/opcodes.json"));
        assert_eq!(config.generator.cpu_file, PathBuf::from("../gb/src/cpu.rs"));
        assert_eq!(config.generator.opcodes, Some(vec!["06".to_string(), "CB40".to_string()]));
        assert!(!config.generator.dry_run);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = read_config("", CmdLineArgs::default()).unwrap();
        assert_eq!(config.generator.table_path, PathBuf::from("opcodes.json"));
        assert_eq!(config.generator.tests_file, PathBuf::from("src/cpu/tests.rs"));
        assert_eq!(config.generator.opcodes, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn command_line_takes_priority() {
        let args = CmdLineArgs {
            table: Some(PathBuf::from("other.json")),
            opcodes: Some("0x3E, cb7c,".to_string()),
            dry_run: true,
            ..Default::default()
        };
        let config = read_config(CONFIG, args).unwrap();
        assert_eq!(config.generator.table_path, PathBuf::from("other.json"));
        assert_eq!(config.generator.cpu_file, PathBuf::from("../gb/src/cpu.rs"));
        assert_eq!(config.generator.opcodes, Some(vec!["0x3E".to_string(), "cb7c".to_string()]));
        assert!(config.generator.dry_run);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(read_config("[generator]\ndry_run = \"yes\"\n", CmdLineArgs::default()).is_err());
    }
}
