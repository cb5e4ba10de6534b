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

    semantics::bits.rs

    Accumulator rotates, flag and decimal-adjust instructions, and the 0xCB page:
    rotates, shifts, SWAP, and the BIT/SET/RES families.

*/

use super::{literal, nth, FamilySemantics, Fixtures, TestScenario};
use crate::{flags::Flag, operand::OperandDescriptor};

const NOP: &str = "";

const CPL: &str = "registers[Reg8::A] = !registers[Reg8::A];";

const SCF: &str = "";

const CCF: &str = "*cf = !*cf;";

const DAA: &str = r"
let mut result = registers[Reg8::A] as u16;

if nf {
    if *hf {
        result = result.wrapping_sub(0x06) & 0xFF;
    }
    if *cf {
        result = result.wrapping_sub(0x60);
    }
}
else {
    if *hf || (result & 0x0F) > 0x09 {
        result += 0x06;
    }
    if *cf || result > 0x9F {
        result += 0x60;
    }
}

*cf = *cf || (result & 0x100) != 0;
registers[Reg8::A] = result as u8;
";

const RLCA: &str = r"
let value = registers[Reg8::A];

*cf = (value & 0x80) != 0;
registers[Reg8::A] = value.rotate_left(1);
";

const RRCA: &str = r"
let value = registers[Reg8::A];

*cf = (value & 0x01) != 0;
registers[Reg8::A] = value.rotate_right(1);
";

const RLA: &str = r"
let value = registers[Reg8::A];
let carry_in = *cf as u8;

*cf = (value & 0x80) != 0;
registers[Reg8::A] = (value << 1) | carry_in;
";

const RRA: &str = r"
let value = registers[Reg8::A];
let carry_in = (*cf as u8) << 7;

*cf = (value & 0x01) != 0;
registers[Reg8::A] = (value >> 1) | carry_in;
";

// Register-operand rotate or shift. `$carry_out` selects the bit shifted out of `value`.
macro_rules! shift_r {
    ($result:literal, $carry_out:literal) => {
        concat!(
            "let value = registers[dst_register];\n",
            "let result = ",
            $result,
            ";\n\n",
            "*cf = (value & ",
            $carry_out,
            ") != 0;\n",
            "registers[dst_register] = result;\n"
        )
    };
}

macro_rules! shift_ihl {
    ($result:literal, $carry_out:literal) => {
        concat!(
            "let address = registers.get16(dst_register) as usize;\n",
            "let value = memory[address];\n",
            "let result = ",
            $result,
            ";\n\n",
            "*cf = (value & ",
            $carry_out,
            ") != 0;\n",
            "memory[address] = result;\n"
        )
    };
}

const RLC_R: &str = shift_r!("value.rotate_left(1)", "0x80");
const RLC_IHL: &str = shift_ihl!("value.rotate_left(1)", "0x80");
const RRC_R: &str = shift_r!("value.rotate_right(1)", "0x01");
const RRC_IHL: &str = shift_ihl!("value.rotate_right(1)", "0x01");
const RL_R: &str = shift_r!("(value << 1) | *cf as u8", "0x80");
const RL_IHL: &str = shift_ihl!("(value << 1) | *cf as u8", "0x80");
const RR_R: &str = shift_r!("(value >> 1) | ((*cf as u8) << 7)", "0x01");
const RR_IHL: &str = shift_ihl!("(value >> 1) | ((*cf as u8) << 7)", "0x01");
const SLA_R: &str = shift_r!("value << 1", "0x80");
const SLA_IHL: &str = shift_ihl!("value << 1", "0x80");
const SRA_R: &str = shift_r!("(value >> 1) | (value & 0x80)", "0x01");
const SRA_IHL: &str = shift_ihl!("(value >> 1) | (value & 0x80)", "0x01");
const SRL_R: &str = shift_r!("value >> 1", "0x01");
const SRL_IHL: &str = shift_ihl!("value >> 1", "0x01");

const SWAP_R: &str = r"
let result = registers[dst_register].rotate_left(4);
registers[dst_register] = result;
";

const SWAP_IHL: &str = r"
let address = registers.get16(dst_register) as usize;
let result = memory[address].rotate_left(4);
memory[address] = result;
";

const BIT_N_R: &str = "let result = registers[src_register] & (1 << literal);";

const BIT_N_IHL: &str = "let result = memory[registers.get16(src_register) as usize] & (1 << literal);";

const SET_N_R: &str = "registers[src_register] |= 1 << literal;";

const SET_N_IHL: &str = r"
let address = registers.get16(src_register) as usize;
memory[address] |= 1 << literal;
";

const RES_N_R: &str = "registers[src_register] &= !(1 << literal);";

const RES_N_IHL: &str = r"
let address = registers.get16(src_register) as usize;
memory[address] &= !(1 << literal);
";

/// Register slots in opcode order, without the `(HL)` slot 6.
const REGISTER_SLOTS: [u8; 7] = [0, 1, 2, 3, 4, 5, 7];

/// The seven register forms of a 0xCB-page group starting at `base`.
fn register_row(base: u8) -> Vec<u8> {
    REGISTER_SLOTS.iter().map(|slot| base + slot).collect()
}

/// A bit-indexed group (BIT, RES, SET) starting at `base`, either the register forms or
/// the eight `(HL)` forms.
fn bit_block(base: u8, indirect: bool) -> Vec<u8> {
    (0..8u8)
        .flat_map(|bit| {
            let row = base + bit * 8;
            if indirect {
                vec![row + 6]
            }
            else {
                register_row(row)
            }
        })
        .collect()
}

pub(super) fn families() -> Vec<FamilySemantics> {
    vec![
        FamilySemantics::new("NOP", &[0x00], NOP, nop),
        FamilySemantics::new("RLCA", &[0x07], RLCA, rlca)
            .uses_registers()
            .manages(&[Flag::C]),
        FamilySemantics::new("RRCA", &[0x0F], RRCA, rrca)
            .uses_registers()
            .manages(&[Flag::C]),
        FamilySemantics::new("RLA", &[0x17], RLA, rla)
            .uses_registers()
            .manages(&[Flag::C]),
        FamilySemantics::new("RRA", &[0x1F], RRA, rra)
            .uses_registers()
            .manages(&[Flag::C]),
        FamilySemantics::new("DAA", &[0x27], DAA, daa)
            .uses_registers()
            .reads_flags(&[Flag::N])
            .manages(&[Flag::C]),
        FamilySemantics::new("CPL", &[0x2F], CPL, cpl).uses_registers(),
        FamilySemantics::new("SCF", &[0x37], SCF, scf),
        FamilySemantics::new("CCF", &[0x3F], CCF, ccf).manages(&[Flag::C]),
        FamilySemantics::new("RLC r", &register_row(0x00), RLC_R, rlc)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("RLC (HL)", &[0x06], RLC_IHL, rlc)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("RRC r", &register_row(0x08), RRC_R, rrc)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("RRC (HL)", &[0x0E], RRC_IHL, rrc)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("RL r", &register_row(0x10), RL_R, rl)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("RL (HL)", &[0x16], RL_IHL, rl)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("RR r", &register_row(0x18), RR_R, rr)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("RR (HL)", &[0x1E], RR_IHL, rr)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("SLA r", &register_row(0x20), SLA_R, sla)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("SLA (HL)", &[0x26], SLA_IHL, sla)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("SRA r", &register_row(0x28), SRA_R, sra)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("SRA (HL)", &[0x2E], SRA_IHL, sra)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("SWAP r", &register_row(0x30), SWAP_R, swap).cb(),
        FamilySemantics::new("SWAP (HL)", &[0x36], SWAP_IHL, swap).cb(),
        FamilySemantics::new("SRL r", &register_row(0x38), SRL_R, srl)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("SRL (HL)", &[0x3E], SRL_IHL, srl)
            .cb()
            .manages(&[Flag::C]),
        FamilySemantics::new("BIT n, r", &bit_block(0x40, false), BIT_N_R, bit).cb(),
        FamilySemantics::new("BIT n, (HL)", &bit_block(0x40, true), BIT_N_IHL, bit).cb(),
        FamilySemantics::new("RES n, r", &bit_block(0x80, false), RES_N_R, res).cb(),
        FamilySemantics::new("RES n, (HL)", &bit_block(0x80, true), RES_N_IHL, res)
            .cb()
            .writes_memory(),
        FamilySemantics::new("SET n, r", &bit_block(0xC0, false), SET_N_R, set).cb(),
        FamilySemantics::new("SET n, (HL)", &bit_block(0xC0, true), SET_N_IHL, set)
            .cb()
            .writes_memory(),
    ]
}

fn nop(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new().baseline(TestScenario::new())
}

fn accumulator(before: u8, after: u8) -> TestScenario {
    TestScenario::new().set_reg8("A", before).expect_reg8("A", after)
}

fn rlca(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(accumulator(0x78, 0xF0))
        .flag(Flag::C, accumulator(0xF0, 0xE1).expect_flag(Flag::C, true))
}

fn rrca(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(accumulator(0x1E, 0x0F))
        .flag(Flag::C, accumulator(0x0F, 0x87).expect_flag(Flag::C, true))
}

fn rla(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(accumulator(0x78, 0xF0))
        .baseline(
            accumulator(0x78, 0xF1)
                .label("carry set")
                .set_flag(Flag::C, true)
                .expect_flag(Flag::C, false),
        )
        .flag(Flag::C, accumulator(0xF0, 0xE0).expect_flag(Flag::C, true))
}

fn rra(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(accumulator(0x1E, 0x0F))
        .baseline(
            accumulator(0x1E, 0x8F)
                .label("carry set")
                .set_flag(Flag::C, true)
                .expect_flag(Flag::C, false),
        )
        .flag(Flag::C, accumulator(0x0F, 0x07).expect_flag(Flag::C, true))
}

fn daa(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(accumulator(0x1B, 0x21))
        .baseline(
            accumulator(0x0F, 0x09)
                .label("after subtraction")
                .set_flag(Flag::N, true)
                .set_flag(Flag::H, true),
        )
        .flag(
            Flag::Z,
            accumulator(0x9A, 0x00)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::C, accumulator(0xB1, 0x11).expect_flag(Flag::C, true))
}

fn cpl(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new().baseline(accumulator(0xF0, 0x0F))
}

fn scf(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new().baseline(TestScenario::new())
}

fn ccf(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(TestScenario::new().set_flag(Flag::C, false).expect_flag(Flag::C, true))
        .flag(
            Flag::C,
            TestScenario::new()
                .label("carry set")
                .set_flag(Flag::C, true)
                .expect_flag(Flag::C, false),
        )
}

fn operand8(operands: &[OperandDescriptor], before: u8, after: u8) -> TestScenario {
    let r = nth(operands, 0);
    TestScenario::new().set_operand8(r, before).expect_operand8(r, after)
}

fn rlc(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0x78, 0xF0))
        .flag(Flag::Z, operand8(operands, 0x00, 0x00).expect_flag(Flag::Z, true))
        .flag(Flag::C, operand8(operands, 0xF0, 0xE1).expect_flag(Flag::C, true))
}

fn rrc(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0x1E, 0x0F))
        .flag(Flag::Z, operand8(operands, 0x00, 0x00).expect_flag(Flag::Z, true))
        .flag(Flag::C, operand8(operands, 0x0F, 0x87).expect_flag(Flag::C, true))
}

fn rl(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0x78, 0xF0))
        .baseline(
            operand8(operands, 0x78, 0xF1)
                .label("carry set")
                .set_flag(Flag::C, true)
                .expect_flag(Flag::C, false),
        )
        .flag(
            Flag::Z,
            operand8(operands, 0x80, 0x00)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::C, operand8(operands, 0xF0, 0xE0).expect_flag(Flag::C, true))
}

fn rr(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0x1E, 0x0F))
        .baseline(
            operand8(operands, 0x1E, 0x8F)
                .label("carry set")
                .set_flag(Flag::C, true)
                .expect_flag(Flag::C, false),
        )
        .flag(
            Flag::Z,
            operand8(operands, 0x01, 0x00)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::C, operand8(operands, 0x0F, 0x07).expect_flag(Flag::C, true))
}

fn sla(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0x21, 0x42))
        .flag(
            Flag::Z,
            operand8(operands, 0x80, 0x00)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::C, operand8(operands, 0xF0, 0xE0).expect_flag(Flag::C, true))
}

fn sra(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0x8A, 0xC5))
        .flag(
            Flag::Z,
            operand8(operands, 0x01, 0x00)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::C, operand8(operands, 0x0F, 0x07).expect_flag(Flag::C, true))
}

fn srl(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0xF0, 0x78))
        .flag(
            Flag::Z,
            operand8(operands, 0x01, 0x00)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::C, operand8(operands, 0x0F, 0x07).expect_flag(Flag::C, true))
}

fn swap(operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new()
        .baseline(operand8(operands, 0xF0, 0x0F))
        .flag(Flag::Z, operand8(operands, 0x00, 0x00).expect_flag(Flag::Z, true))
}

/// The bit index and target operand of a BIT, SET or RES opcode.
fn bit_operands(operands: &[OperandDescriptor]) -> Result<(u8, &str), Fixtures> {
    match literal(operands, 0) {
        Some(bit) if bit < 8 => Ok((bit, nth(operands, 1))),
        _ => Err(Fixtures::invalid(format!("'{}' is not a bit index", nth(operands, 0)))),
    }
}

fn bit(operands: &[OperandDescriptor]) -> Fixtures {
    let (bit, target) = match bit_operands(operands) {
        Ok(parts) => parts,
        Err(invalid) => return invalid,
    };
    let mask = 1u8 << bit;
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .set_operand8(target, mask)
                .expect_flag(Flag::Z, false),
        )
        .flag(
            Flag::Z,
            TestScenario::new()
                .set_operand8(target, !mask)
                .expect_flag(Flag::Z, true),
        )
}

fn set(operands: &[OperandDescriptor]) -> Fixtures {
    let (bit, target) = match bit_operands(operands) {
        Ok(parts) => parts,
        Err(invalid) => return invalid,
    };
    Fixtures::new().baseline(
        TestScenario::new()
            .set_operand8(target, 0x00)
            .expect_operand8(target, 1 << bit),
    )
}

fn res(operands: &[OperandDescriptor]) -> Fixtures {
    let (bit, target) = match bit_operands(operands) {
        Ok(parts) => parts,
        Err(invalid) => return invalid,
    };
    Fixtures::new().baseline(
        TestScenario::new()
            .set_operand8(target, 0xFF)
            .expect_operand8(target, !(1 << bit)),
    )
}
