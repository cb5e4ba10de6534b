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

    semantics::fixtures.rs

    Test scenario building blocks: CPU state presets and expected post-state.

*/

use crate::{flags::Flag, operand::is_reg16_name};

/// Address `(HL)`-style operands point at in generated scenarios.
pub const OPERAND_ADDRESS: u16 = 0x0CAF;

/// CPU state established before the instruction executes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Preset {
    Reg8(String, u8),
    Reg16(String, u16),
    Flag(Flag, bool),
    Memory(u16, u8),
}

/// CPU state asserted after the instruction executes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expectation {
    Reg8(String, u8),
    Reg16(String, u16),
    Pc(u16),
    Flag(Flag, bool),
    Memory(u16, Vec<u8>),
}

#[derive(Clone, Debug, Default)]
pub struct TestScenario {
    pub label: Option<String>,
    pub extra_bytes: Vec<u8>,
    pub presets: Vec<Preset>,
    pub expectations: Vec<Expectation>,
    pub skip: bool,
}

impl TestScenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Instruction bytes following the opcode.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.extra_bytes = bytes.to_vec();
        self
    }

    pub fn set_reg8(mut self, register: &str, value: u8) -> Self {
        self.presets.push(Preset::Reg8(register.to_string(), value));
        self
    }

    pub fn set_reg16(mut self, register: &str, value: u16) -> Self {
        self.presets.push(Preset::Reg16(register.to_string(), value));
        self
    }

    pub fn set_flag(mut self, flag: Flag, value: bool) -> Self {
        self.presets.push(Preset::Flag(flag, value));
        self
    }

    pub fn set_mem(mut self, address: u16, value: u8) -> Self {
        self.presets.push(Preset::Memory(address, value));
        self
    }

    pub fn expect_reg8(mut self, register: &str, value: u8) -> Self {
        self.expectations.push(Expectation::Reg8(register.to_string(), value));
        self
    }

    pub fn expect_reg16(mut self, register: &str, value: u16) -> Self {
        self.expectations.push(Expectation::Reg16(register.to_string(), value));
        self
    }

    pub fn expect_pc(mut self, value: u16) -> Self {
        self.expectations.push(Expectation::Pc(value));
        self
    }

    pub fn expect_flag(mut self, flag: Flag, value: bool) -> Self {
        self.expectations.push(Expectation::Flag(flag, value));
        self
    }

    pub fn expect_mem(mut self, address: u16, values: &[u8]) -> Self {
        self.expectations.push(Expectation::Memory(address, values.to_vec()));
        self
    }

    /// Preset an 8-bit operand: a register, or the byte a register pair points at.
    pub fn set_operand8(self, operand: &str, value: u8) -> Self {
        if is_reg16_name(operand) {
            self.set_mem(OPERAND_ADDRESS, value).set_reg16(operand, OPERAND_ADDRESS)
        }
        else {
            self.set_reg8(operand, value)
        }
    }

    pub fn expect_operand8(self, operand: &str, value: u8) -> Self {
        if is_reg16_name(operand) {
            self.expect_mem(OPERAND_ADDRESS, &[value])
        }
        else {
            self.expect_reg8(operand, value)
        }
    }

    pub fn skip_if(mut self, skip: bool) -> Self {
        self.skip |= skip;
        self
    }

    pub fn asserts_pc(&self) -> bool {
        self.expectations.iter().any(|e| matches!(e, Expectation::Pc(_)))
    }
}

/// The byte of `value` a register holds when `value` is loaded into `pair`, if `register`
/// is one half of `pair`.
pub fn pair_byte(pair: &str, register: &str, value: u16) -> Option<u8> {
    let [low, high] = value.to_le_bytes();
    let mut halves = pair.chars();
    match (halves.next(), halves.next()) {
        (Some(h), Some(l)) if pair.len() == 2 => {
            if register.len() == 1 && register.starts_with(h) {
                Some(high)
            }
            else if register.len() == 1 && register.starts_with(l) {
                Some(low)
            }
            else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_halves() {
        assert_eq!(pair_byte("HL", "H", 0x0CAF), Some(0x0C));
        assert_eq!(pair_byte("HL", "L", 0x0CAF), Some(0xAF));
        assert_eq!(pair_byte("BC", "A", 0x0CAF), None);
        assert_eq!(pair_byte("A", "A", 0x0CAF), None);
    }

    #[test]
    fn scenario_builder() {
        let scenario = TestScenario::new()
            .label("negative immediate")
            .bytes(&[0xFF])
            .set_reg16("SP", 0x2100)
            .expect_reg16("HL", 0x20FF)
            .skip_if(false);
        assert_eq!(scenario.label.as_deref(), Some("negative immediate"));
        assert_eq!(scenario.extra_bytes, vec![0xFF]);
        assert_eq!(scenario.presets, vec![Preset::Reg16("SP".to_string(), 0x2100)]);
        assert!(!scenario.asserts_pc());
        assert!(!scenario.skip);
        assert!(TestScenario::new().expect_pc(0xBEEF).asserts_pc());
    }

    #[test]
    fn operand8_through_pair() {
        let scenario = TestScenario::new().set_operand8("HL", 0x21).expect_operand8("HL", 0x22);
        assert_eq!(
            scenario.presets,
            vec![Preset::Memory(0x0CAF, 0x21), Preset::Reg16("HL".to_string(), 0x0CAF)]
        );
        assert_eq!(scenario.expectations, vec![Expectation::Memory(0x0CAF, vec![0x22])]);

        let scenario = TestScenario::new().set_operand8("B", 0x21);
        assert_eq!(scenario.presets, vec![Preset::Reg8("B".to_string(), 0x21)]);
    }
}
