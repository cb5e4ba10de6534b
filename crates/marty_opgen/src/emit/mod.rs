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

    emit::mod.rs

    Source emitters for the three generated artifacts, and the text helpers they share.

*/

pub mod decode;
pub mod execute;
pub mod tests;

/// Indentation of a dispatch branch inside the emulator's decode `match`.
pub const DECODE_INDENT: usize = 12;
/// Indentation of a routine inside the emulator's `impl` block.
pub const ROUTINE_INDENT: usize = 4;
/// Indentation of a test function inside the emulator's test module.
pub const TEST_INDENT: usize = 4;

/// Lines longer than this are broken one item per line.
pub const MAX_WIDTH: usize = 120;

/// Append `line` to `out` at `indent`, or a bare newline if `line` is empty.
pub(crate) fn push_line(out: &mut String, indent: usize, line: &str) {
    if !line.is_empty() {
        out.extend(std::iter::repeat(' ').take(indent));
        out.push_str(line);
    }
    out.push('\n');
}

/// Append a multi-line block, re-indented. Leading and trailing blank lines are dropped and
/// the block's common indentation is removed first.
pub(crate) fn push_block(out: &mut String, indent: usize, block: &str) {
    let lines: Vec<&str> = block.lines().map(|l| l.trim_end()).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => return,
    };

    let body = &lines[first..=last];
    let common = body
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    for line in body {
        push_line(out, indent, line.get(common..).unwrap_or(""));
    }
}

/// Emit `head(items)tail` on one line if it fits, otherwise one item per line with a
/// trailing comma.
pub(crate) fn push_list(out: &mut String, indent: usize, head: &str, items: &[String], tail: &str) {
    let single = format!("{}{}{}", head, items.join(", "), tail);
    if indent + single.len() <= MAX_WIDTH || items.is_empty() {
        push_line(out, indent, &single);
        return;
    }
    push_line(out, indent, head);
    for item in items {
        push_line(out, indent + 4, &format!("{},", item));
    }
    push_line(out, indent, tail);
}

/// A lowercase identifier fragment built from arbitrary text, e.g. `negative_immediate`.
pub(crate) fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

pub(crate) fn hex8(value: u8) -> String {
    format!("0x{:02X}", value)
}

pub(crate) fn hex16(value: u16) -> String {
    format!("0x{:04X}", value)
}
