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

    splice.rs

    Replaces the region between a pair of marker comments in a source file with
    generated text. The marker lines themselves are kept.

*/

use regex::Regex;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MarkerPair {
    pub start: &'static str,
    pub end: &'static str,
}

pub const DECODING: MarkerPair = MarkerPair {
    start: "// __OPCODES_DECODING_REPLACEMENT_START__",
    end: "// __OPCODES_DECODING_REPLACEMENT_END__",
};

pub const EXECUTION: MarkerPair = MarkerPair {
    start: "// __OPCODES_EXECUTION_REPLACEMENT_START__",
    end: "// __OPCODES_EXECUTION_REPLACEMENT_END__",
};

pub const TESTS: MarkerPair = MarkerPair {
    start: "// __TESTS_REPLACEMENT_START__",
    end: "// __TESTS_REPLACEMENT_END__",
};

#[derive(thiserror::Error, Debug)]
pub enum SpliceError {
    #[error("Marker pair '{start}' / '{end}' not found")]
    MarkersNotFound { start: &'static str, end: &'static str },
    #[error("Invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Replace everything between the line holding `markers.start` and the line holding
/// `markers.end`. `content` is inserted verbatim; a missing final newline is added.
pub fn splice(text: &str, markers: MarkerPair, content: &str) -> Result<String, SpliceError> {
    let pattern = format!(
        r"(?ms)^[ \t]*{}[^\n]*\n(.*?)^[ \t]*{}",
        regex::escape(markers.start),
        regex::escape(markers.end)
    );
    let re = Regex::new(&pattern)?;

    let region = re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or(SpliceError::MarkersNotFound {
            start: markers.start,
            end: markers.end,
        })?;

    let mut spliced = String::with_capacity(text.len() + content.len());
    spliced.push_str(&text[..region.start()]);
    spliced.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        spliced.push('\n');
    }
    spliced.push_str(&text[region.end()..]);
    Ok(spliced)
}
