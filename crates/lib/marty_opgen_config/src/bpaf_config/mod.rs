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

    bpaf_config::mod.rs

    Command line arguments for the opcode generator.

*/

use std::path::PathBuf;

#[cfg(feature = "use_bpaf")]
use bpaf::Bpaf;

#[cfg_attr(feature = "use_bpaf", derive(Bpaf))]
#[cfg_attr(feature = "use_bpaf", bpaf(options, version, generate(cli_args)))]
#[derive(Debug, Default)]
pub struct CmdLineArgs {
    #[cfg_attr(feature = "use_bpaf", bpaf(long("config_file"), long("configfile")))]
    pub config_file: Option<PathBuf>,

    /// Opcode table (JSON)
    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub table: Option<PathBuf>,

    /// File holding the decode and execution markers
    #[cfg_attr(feature = "use_bpaf", bpaf(long("cpu_file"), long("cpufile")))]
    pub cpu_file: Option<PathBuf>,

    /// File holding the test markers
    #[cfg_attr(feature = "use_bpaf", bpaf(long("tests_file"), long("testsfile")))]
    pub tests_file: Option<PathBuf>,

    /// Comma-separated opcodes to generate, e.g. 06,CB40
    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub opcodes: Option<String>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("log_level"), long("loglevel")))]
    pub log_level: Option<String>,

    /// Generate and validate, but write nothing
    #[cfg_attr(feature = "use_bpaf", bpaf(long("dry_run"), long("dryrun"), switch))]
    pub dry_run: bool,
}
