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

    A minimal SM83 register file and memory that the generated decoder and
    execution routines run against. The core itself is produced by build.rs.

*/

use std::ops::{Index, IndexMut};

pub const MEMORY_SIZE: usize = 0x10000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Reg8 {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "A" => Some(Reg8::A),
            "F" => Some(Reg8::F),
            "B" => Some(Reg8::B),
            "C" => Some(Reg8::C),
            "D" => Some(Reg8::D),
            "E" => Some(Reg8::E),
            "H" => Some(Reg8::H),
            "L" => Some(Reg8::L),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

impl Reg16 {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AF" => Some(Reg16::AF),
            "BC" => Some(Reg16::BC),
            "DE" => Some(Reg16::DE),
            "HL" => Some(Reg16::HL),
            "SP" => Some(Reg16::SP),
            _ => None,
        }
    }

    /// High and low halves of a pair. SP has no 8-bit halves.
    fn halves(&self) -> Option<(Reg8, Reg8)> {
        match self {
            Reg16::AF => Some((Reg8::A, Reg8::F)),
            Reg16::BC => Some((Reg8::B, Reg8::C)),
            Reg16::DE => Some((Reg8::D, Reg8::E)),
            Reg16::HL => Some((Reg8::H, Reg8::L)),
            Reg16::SP => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Registers {
    r8: [u8; 8],
    sp: u16,
}

impl Registers {
    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg.halves() {
            Some((hi, lo)) => u16::from_be_bytes([self[hi], self[lo]]),
            None => self.sp,
        }
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        match reg.halves() {
            Some((hi, lo)) => {
                let [high, low] = value.to_be_bytes();
                self[hi] = high;
                self[lo] = low;
            }
            None => self.sp = value,
        }
    }
}

impl Index<Reg8> for Registers {
    type Output = u8;

    fn index(&self, reg: Reg8) -> &u8 {
        &self.r8[reg as usize]
    }
}

impl IndexMut<Reg8> for Registers {
    fn index_mut(&mut self, reg: Reg8) -> &mut u8 {
        &mut self.r8[reg as usize]
    }
}

include!(concat!(env!("OUT_DIR"), "/cpu.rs"));

#[cfg(test)]
mod register_tests {
    use super::*;

    #[test]
    fn pairs_share_halves() {
        let mut registers = Registers::default();
        registers.set16(Reg16::HL, 0xCAFE);
        assert_eq!(registers[Reg8::H], 0xCA);
        assert_eq!(registers[Reg8::L], 0xFE);

        registers[Reg8::A] = 0xBE;
        registers[Reg8::F] = 0xF0;
        assert_eq!(registers.get16(Reg16::AF), 0xBEF0);

        registers.set16(Reg16::SP, 0xFFFE);
        assert_eq!(registers.get16(Reg16::SP), 0xFFFE);
        assert_eq!(registers.get16(Reg16::BC), 0x0000);
    }

    #[test]
    fn observed_names() {
        let mut cpu = Cpu::new();
        cpu.pc = 0x0021;
        cpu.cf = true;
        cpu.registers.set16(Reg16::DE, 0x1234);

        assert_eq!(cpu.observed("PC"), Some(0x0021));
        assert_eq!(cpu.observed("cf"), Some(1));
        assert_eq!(cpu.observed("zf"), Some(0));
        assert_eq!(cpu.observed("D"), Some(0x12));
        assert_eq!(cpu.observed("DE"), Some(0x1234));
        assert_eq!(cpu.observed("IX"), None);
    }

    #[test]
    fn executes_generated_load() {
        let mut cpu = Cpu::new();
        let instruction_bytes = [0x06, 0x5A];

        cpu.pc = 0x0021;

        assert_cpu_execute!(
            cpu,
            instruction_bytes,
            B => 0x5A,
            PC => 0x0023,
            cycles: 8
        );
    }
}
