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

    templates/cpu.rs

    Stub SM83 core. build.rs splices the generated decoder, execution routines
    and tests between the markers below; lib.rs includes the result.

*/

pub struct Cpu {
    pub pc: u16,
    pub registers: Registers,
    pub internal_ram: Vec<u8>,
    pub zf: bool,
    pub nf: bool,
    pub hf: bool,
    pub cf: bool,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            pc: 0,
            registers: Registers::default(),
            internal_ram: vec![0; MEMORY_SIZE],
            zf: false,
            nf: false,
            hf: false,
            cf: false,
        }
    }

    /// Register, program counter or flag value by the name the conformance tests use.
    pub fn observed(&self, name: &str) -> Option<u16> {
        let value = match name {
            "PC" => self.pc,
            "zf" => self.zf as u16,
            "nf" => self.nf as u16,
            "hf" => self.hf as u16,
            "cf" => self.cf as u16,
            _ => match (Reg8::from_name(name), Reg16::from_name(name)) {
                (Some(reg), _) => self.registers[reg] as u16,
                (None, Some(reg)) => self.registers.get16(reg),
                (None, None) => return None,
            },
        };
        Some(value)
    }

    /// Execute one complete instruction and return the cycles it took.
    pub fn decode_execute(&mut self, instruction_bytes: &[u8]) -> u8 {
        match instruction_bytes {
            // __OPCODES_DECODING_REPLACEMENT_START__
            // __OPCODES_DECODING_REPLACEMENT_END__
            _ => unimplemented!("no decoding for {:02X?}", instruction_bytes),
        }
    }
}

impl Cpu {
    // __OPCODES_EXECUTION_REPLACEMENT_START__
    // __OPCODES_EXECUTION_REPLACEMENT_END__
}

/// Run `instruction_bytes` on `cpu` and compare registers, flags, memory and cycles.
macro_rules! assert_cpu_execute {
    (@check $cpu:ident, $cycles:ident, cycles: $count:expr) => {
        assert_eq!($cycles, $count, "cycles");
    };
    (@check $cpu:ident, $cycles:ident, mem[$address:expr] => [$($value:expr),* $(,)?], $($rest:tt)*) => {{
        let start = $address as usize;
        let expected: &[u8] = &[$($value),*];
        assert_eq!(&$cpu.internal_ram[start..start + expected.len()], expected, "mem[{:#06X}]", start);
        assert_cpu_execute!(@check $cpu, $cycles, $($rest)*);
    }};
    (@check $cpu:ident, $cycles:ident, $name:ident => $value:expr, $($rest:tt)*) => {{
        let observed = $cpu
            .observed(stringify!($name))
            .unwrap_or_else(|| panic!("unknown register or flag {}", stringify!($name)));
        assert_eq!(observed, $value as u16, "{}", stringify!($name));
        assert_cpu_execute!(@check $cpu, $cycles, $($rest)*);
    }};
    ($cpu:ident, $instruction_bytes:expr, $($expected:tt)*) => {{
        let cycles = $cpu.decode_execute(&$instruction_bytes);
        assert_cpu_execute!(@check $cpu, cycles, $($expected)*);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    // __TESTS_REPLACEMENT_START__
    // __TESTS_REPLACEMENT_END__
}
