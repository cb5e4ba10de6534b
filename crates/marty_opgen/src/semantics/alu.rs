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

    semantics::alu.rs

    8-bit arithmetic and logic families, increments and decrements, and 16-bit
    arithmetic.

*/

use super::{nth, FamilySemantics, Fixtures, TestScenario};
use crate::{
    flags::{CarryWidth, Flag},
    operand::{is_reg16_name, OperandDescriptor},
};

// Accumulator arithmetic. `$source` reads the second operand, `$combine` widens the result
// so the carry out of bit 7 survives.
macro_rules! arith_fragment {
    ($source:literal, $combine:literal) => {
        concat!(
            "let operand1 = registers[dst_register];\n",
            "let operand2 = ",
            $source,
            ";\n",
            "let result = ",
            $combine,
            ";\n\n",
            "registers[dst_register] = result as u8;\n"
        )
    };
}

macro_rules! compare_fragment {
    ($source:literal) => {
        concat!(
            "let operand1 = registers[dst_register];\n",
            "let operand2 = ",
            $source,
            ";\n",
            "let result = (operand1 as u16).wrapping_sub(operand2 as u16);\n"
        )
    };
}

macro_rules! logic_fragment {
    ($op:literal, $source:literal) => {
        concat!(
            "let result = registers[dst_register] ",
            $op,
            " ",
            $source,
            ";\n",
            "registers[dst_register] = result;\n"
        )
    };
}

const ADD_A_R: &str = arith_fragment!("registers[src_register]", "operand1 as u16 + operand2 as u16");
const ADD_A_IHL: &str = arith_fragment!(
    "memory[registers.get16(src_register) as usize]",
    "operand1 as u16 + operand2 as u16"
);
const ADD_A_N: &str = arith_fragment!("immediate", "operand1 as u16 + operand2 as u16");

const ADC_A_R: &str = arith_fragment!(
    "registers[src_register]",
    "operand1 as u16 + operand2 as u16 + *cf as u16"
);
const ADC_A_IHL: &str = arith_fragment!(
    "memory[registers.get16(src_register) as usize]",
    "operand1 as u16 + operand2 as u16 + *cf as u16"
);
const ADC_A_N: &str = arith_fragment!("immediate", "operand1 as u16 + operand2 as u16 + *cf as u16");

const SUB_A_R: &str = arith_fragment!("registers[src_register]", "(operand1 as u16).wrapping_sub(operand2 as u16)");
const SUB_A_IHL: &str = arith_fragment!(
    "memory[registers.get16(src_register) as usize]",
    "(operand1 as u16).wrapping_sub(operand2 as u16)"
);
const SUB_A_N: &str = arith_fragment!("immediate", "(operand1 as u16).wrapping_sub(operand2 as u16)");

const SBC_A_R: &str = arith_fragment!(
    "registers[src_register]",
    "(operand1 as u16).wrapping_sub(operand2 as u16).wrapping_sub(*cf as u16)"
);
const SBC_A_IHL: &str = arith_fragment!(
    "memory[registers.get16(src_register) as usize]",
    "(operand1 as u16).wrapping_sub(operand2 as u16).wrapping_sub(*cf as u16)"
);
const SBC_A_N: &str = arith_fragment!(
    "immediate",
    "(operand1 as u16).wrapping_sub(operand2 as u16).wrapping_sub(*cf as u16)"
);

const AND_A_R: &str = logic_fragment!("&", "registers[src_register]");
const AND_A_IHL: &str = logic_fragment!("&", "memory[registers.get16(src_register) as usize]");
const AND_A_N: &str = logic_fragment!("&", "immediate");

const OR_A_R: &str = logic_fragment!("|", "registers[src_register]");
const OR_A_IHL: &str = logic_fragment!("|", "memory[registers.get16(src_register) as usize]");
const OR_A_N: &str = logic_fragment!("|", "immediate");

const XOR_A_R: &str = logic_fragment!("^", "registers[src_register]");
const XOR_A_IHL: &str = logic_fragment!("^", "memory[registers.get16(src_register) as usize]");
const XOR_A_N: &str = logic_fragment!("^", "immediate");

const CP_A_R: &str = compare_fragment!("registers[src_register]");
const CP_A_IHL: &str = compare_fragment!("memory[registers.get16(src_register) as usize]");
const CP_A_N: &str = compare_fragment!("immediate");

// A register combined with itself always yields zero; the table marks every flag fixed.
const SUB_A_A: &str = r"
let value = registers[dst_register].wrapping_sub(registers[src_register]);
registers[dst_register] = value;
";

const XOR_A_A: &str = r"
let value = registers[dst_register] ^ registers[src_register];
registers[dst_register] = value;
";

// Only the borrow survives: A becomes 0x00 or 0xFF and the carry flag is left as it was.
const SBC_A_A: &str = r"
let operand1 = registers[dst_register];
let operand2 = registers[src_register];
let result = (operand1 as u16).wrapping_sub(operand2 as u16).wrapping_sub(cf as u16);

registers[dst_register] = result as u8;
";

// Comparing A with itself always matches, so the accumulator is only read.
const CP_A_A: &str = "let _ = registers[dst_register].wrapping_sub(registers[src_register]);";

const INC_R: &str = r"
let operand1 = registers[dst_register];
let operand2 = 1u8;
let result = operand1 as u16 + operand2 as u16;

registers[dst_register] = result as u8;
";

const DEC_R: &str = r"
let operand1 = registers[dst_register];
let operand2 = 1u8;
let result = (operand1 as u16).wrapping_sub(operand2 as u16);

registers[dst_register] = result as u8;
";

const INC_IHL: &str = r"
let address = registers.get16(dst_register) as usize;
let operand1 = memory[address];
let operand2 = 1u8;
let result = operand1 as u16 + operand2 as u16;

memory[address] = result as u8;
";

const DEC_IHL: &str = r"
let address = registers.get16(dst_register) as usize;
let operand1 = memory[address];
let operand2 = 1u8;
let result = (operand1 as u16).wrapping_sub(operand2 as u16);

memory[address] = result as u8;
";

const INC_RR: &str = r"
let value = registers.get16(dst_register).wrapping_add(1);
registers.set16(dst_register, value);
";

const DEC_RR: &str = r"
let value = registers.get16(dst_register).wrapping_sub(1);
registers.set16(dst_register, value);
";

const ADD_HL_RR: &str = r"
let operand1 = registers.get16(dst_register);
let operand2 = registers.get16(src_register);
let result = operand1 as u32 + operand2 as u32;

registers.set16(dst_register, result as u16);
";

const ADD_SP_E8: &str = r"
let operand1 = registers.get16(dst_register);
let operand2 = immediate as i8 as i16 as u16;
let result = operand1.wrapping_add(operand2);

registers.set16(dst_register, result);
";

const R_B: [u8; 7] = [0, 1, 2, 3, 4, 5, 7];

/// Opcodes of an 8-bit register group starting at `base`, skipping the `(HL)` slot and,
/// when `with_a` is false, the `A` slot.
fn register_group(base: u8, with_a: bool) -> Vec<u8> {
    R_B.iter()
        .filter(|r| with_a || **r != 7)
        .map(|r| base + r)
        .collect()
}

fn half_and_full_carry(family: FamilySemantics) -> FamilySemantics {
    family.carry(Flag::H, CarryWidth::Bit4).carry(Flag::C, CarryWidth::Bit8)
}

pub(super) fn families() -> Vec<FamilySemantics> {
    vec![
        half_and_full_carry(FamilySemantics::new("ADD A, r", &register_group(0x80, true), ADD_A_R, add_a)),
        half_and_full_carry(FamilySemantics::new("ADD A, (HL)", &[0x86], ADD_A_IHL, add_a)),
        half_and_full_carry(FamilySemantics::new("ADD A, n", &[0xC6], ADD_A_N, add_a)),
        half_and_full_carry(FamilySemantics::new("ADC A, r", &register_group(0x88, true), ADC_A_R, adc_a)),
        half_and_full_carry(FamilySemantics::new("ADC A, (HL)", &[0x8E], ADC_A_IHL, adc_a)),
        half_and_full_carry(FamilySemantics::new("ADC A, n", &[0xCE], ADC_A_N, adc_a)),
        half_and_full_carry(FamilySemantics::new("SUB A, r", &register_group(0x90, false), SUB_A_R, sub_a)),
        half_and_full_carry(FamilySemantics::new("SUB A, (HL)", &[0x96], SUB_A_IHL, sub_a)),
        half_and_full_carry(FamilySemantics::new("SUB A, n", &[0xD6], SUB_A_N, sub_a)),
        FamilySemantics::new("SUB A, A", &[0x97], SUB_A_A, self_cancel),
        half_and_full_carry(FamilySemantics::new("SBC A, r", &register_group(0x98, false), SBC_A_R, sbc_a)),
        half_and_full_carry(FamilySemantics::new("SBC A, (HL)", &[0x9E], SBC_A_IHL, sbc_a)),
        half_and_full_carry(FamilySemantics::new("SBC A, n", &[0xDE], SBC_A_N, sbc_a)),
        FamilySemantics::new("SBC A, A", &[0x9F], SBC_A_A, sbc_a_a)
            .reads_flags(&[Flag::C])
            .carry(Flag::H, CarryWidth::Bit4),
        FamilySemantics::new("AND A, r", &register_group(0xA0, true), AND_A_R, and_a),
        FamilySemantics::new("AND A, (HL)", &[0xA6], AND_A_IHL, and_a),
        FamilySemantics::new("AND A, n", &[0xE6], AND_A_N, and_a),
        FamilySemantics::new("XOR A, r", &register_group(0xA8, false), XOR_A_R, xor_a),
        FamilySemantics::new("XOR A, (HL)", &[0xAE], XOR_A_IHL, xor_a),
        FamilySemantics::new("XOR A, n", &[0xEE], XOR_A_N, xor_a),
        FamilySemantics::new("XOR A, A", &[0xAF], XOR_A_A, self_cancel),
        FamilySemantics::new("OR A, r", &register_group(0xB0, true), OR_A_R, or_a),
        FamilySemantics::new("OR A, (HL)", &[0xB6], OR_A_IHL, or_a),
        FamilySemantics::new("OR A, n", &[0xF6], OR_A_N, or_a),
        half_and_full_carry(FamilySemantics::new("CP A, r", &register_group(0xB8, false), CP_A_R, cp_a)),
        half_and_full_carry(FamilySemantics::new("CP A, (HL)", &[0xBE], CP_A_IHL, cp_a)),
        half_and_full_carry(FamilySemantics::new("CP A, n", &[0xFE], CP_A_N, cp_a)),
        FamilySemantics::new("CP A, A", &[0xBF], CP_A_A, cp_a_a),
        FamilySemantics::new("INC r", &[0x04, 0x0C, 0x14, 0x1C, 0x24, 0x2C, 0x3C], INC_R, inc_8)
            .carry(Flag::H, CarryWidth::Bit4),
        FamilySemantics::new("INC (HL)", &[0x34], INC_IHL, inc_8).carry(Flag::H, CarryWidth::Bit4),
        FamilySemantics::new("DEC r", &[0x05, 0x0D, 0x15, 0x1D, 0x25, 0x2D, 0x3D], DEC_R, dec_8)
            .carry(Flag::H, CarryWidth::Bit4),
        FamilySemantics::new("DEC (HL)", &[0x35], DEC_IHL, dec_8).carry(Flag::H, CarryWidth::Bit4),
        FamilySemantics::new("INC rr", &[0x03, 0x13, 0x23], INC_RR, inc_16),
        FamilySemantics::new("INC SP", &[0x33], INC_RR, inc_16),
        FamilySemantics::new("DEC rr", &[0x0B, 0x1B, 0x2B], DEC_RR, dec_16),
        FamilySemantics::new("DEC SP", &[0x3B], DEC_RR, dec_16),
        FamilySemantics::new("ADD HL, rr", &[0x09, 0x19, 0x29], ADD_HL_RR, add_hl)
            .carry(Flag::H, CarryWidth::Bit12)
            .carry(Flag::C, CarryWidth::Bit16),
        FamilySemantics::new("ADD HL, SP", &[0x39], ADD_HL_RR, add_hl)
            .carry(Flag::H, CarryWidth::Bit12)
            .carry(Flag::C, CarryWidth::Bit16),
        half_and_full_carry(FamilySemantics::new("ADD SP, e8", &[0xE8], ADD_SP_E8, add_sp)),
    ]
}

/// Where the second operand of an accumulator operation comes from.
#[derive(Copy, Clone)]
enum Source<'a> {
    Register(&'a str),
    Memory(&'a str),
    Immediate,
}

impl<'a> Source<'a> {
    fn of(name: &'a str) -> Self {
        match name {
            "n8" | "d8" => Source::Immediate,
            n if is_reg16_name(n) => Source::Memory(n),
            n => Source::Register(n),
        }
    }

    fn is(&self, register: &str) -> bool {
        matches!(self, Source::Register(r) if *r == register)
    }

    fn load(&self, scenario: TestScenario, value: u8) -> TestScenario {
        match self {
            Source::Register(r) => scenario.set_reg8(r, value),
            Source::Memory(rr) => scenario.set_operand8(rr, value),
            Source::Immediate => scenario.bytes(&[value]),
        }
    }
}

/// A scenario with `lhs` in the accumulator and `rhs` in the source operand. When the
/// source is the accumulator itself, `rhs` wins.
fn binary(operands: &[OperandDescriptor], lhs: u8, rhs: u8) -> TestScenario {
    let a = nth(operands, 0);
    let source = Source::of(nth(operands, 1));
    source.load(TestScenario::new().set_reg8(a, lhs), rhs)
}

fn add_a(operands: &[OperandDescriptor]) -> Fixtures {
    let source = Source::of(nth(operands, 1));
    let a = nth(operands, 0);
    let same = source.is(a);

    let base = binary(operands, 0x21, if same { 0x21 } else { 0x30 });
    let zero = binary(operands, 0x00, 0x00);
    let half = binary(operands, 0x18, 0x18);
    let carry = binary(operands, 0x90, 0x90);

    Fixtures::new()
        .baseline(base.expect_reg8(a, if same { 0x42 } else { 0x51 }))
        .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
        .flag(Flag::H, half.expect_reg8(a, 0x30).expect_flag(Flag::H, true))
        .flag(Flag::C, carry.expect_reg8(a, 0x20).expect_flag(Flag::C, true))
}

fn adc_a(operands: &[OperandDescriptor]) -> Fixtures {
    let source = Source::of(nth(operands, 1));
    let a = nth(operands, 0);
    let same = source.is(a);

    let base = binary(operands, 0x21, if same { 0x21 } else { 0x30 });
    let carry_in = binary(operands, 0xFF, 0xFF);
    let zero = binary(operands, 0x00, 0x00);
    let half = binary(operands, 0x18, 0x18);
    let carry = binary(operands, 0x90, 0x90);

    Fixtures::new()
        .baseline(base.expect_reg8(a, if same { 0x42 } else { 0x51 }))
        .baseline(
            carry_in
                .label("carry set")
                .set_flag(Flag::C, true)
                .expect_reg8(a, 0xFF)
                .expect_flag(Flag::H, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
        .flag(Flag::H, half.expect_reg8(a, 0x30).expect_flag(Flag::H, true))
        .flag(Flag::C, carry.expect_reg8(a, 0x20).expect_flag(Flag::C, true))
}

fn sub_a(operands: &[OperandDescriptor]) -> Fixtures {
    let a = nth(operands, 0);
    let base = binary(operands, 0x51, 0x30);
    let zero = binary(operands, 0x21, 0x21);
    let half = binary(operands, 0x10, 0x01);
    let carry = binary(operands, 0x20, 0x30);

    Fixtures::new()
        .baseline(base.expect_reg8(a, 0x21))
        .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
        .flag(Flag::H, half.expect_reg8(a, 0x0F).expect_flag(Flag::H, true))
        .flag(Flag::C, carry.expect_reg8(a, 0xF0).expect_flag(Flag::C, true))
}

fn sbc_a(operands: &[OperandDescriptor]) -> Fixtures {
    let a = nth(operands, 0);
    let base = binary(operands, 0x51, 0x30);
    let borrow_in = binary(operands, 0x51, 0x30);
    let zero = binary(operands, 0x21, 0x21);
    let half = binary(operands, 0x10, 0x01);
    let carry = binary(operands, 0x20, 0x30);

    Fixtures::new()
        .baseline(base.expect_reg8(a, 0x21))
        .baseline(
            borrow_in
                .label("carry set")
                .set_flag(Flag::C, true)
                .expect_reg8(a, 0x20)
                .expect_flag(Flag::C, false),
        )
        .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
        .flag(Flag::H, half.expect_reg8(a, 0x0F).expect_flag(Flag::H, true))
        .flag(Flag::C, carry.expect_reg8(a, 0xF0).expect_flag(Flag::C, true))
}

fn cp_a(operands: &[OperandDescriptor]) -> Fixtures {
    let a = nth(operands, 0);
    let base = binary(operands, 0x51, 0x30);
    let zero = binary(operands, 0x21, 0x21);
    let half = binary(operands, 0x10, 0x01);
    let carry = binary(operands, 0x20, 0x30);

    // The accumulator is never written.
    Fixtures::new()
        .baseline(base.expect_reg8(a, 0x51))
        .flag(Flag::Z, zero.expect_reg8(a, 0x21).expect_flag(Flag::Z, true))
        .flag(Flag::H, half.expect_reg8(a, 0x10).expect_flag(Flag::H, true))
        .flag(Flag::C, carry.expect_reg8(a, 0x20).expect_flag(Flag::C, true))
}

fn sbc_a_a(operands: &[OperandDescriptor]) -> Fixtures {
    let a = nth(operands, 0);
    let with_carry = |carry: bool| TestScenario::new().set_reg8(a, 0x5A).set_flag(Flag::C, carry);

    Fixtures::new()
        .baseline(
            with_carry(true)
                .expect_reg8(a, 0xFF)
                .expect_flag(Flag::Z, false)
                .expect_flag(Flag::C, true),
        )
        .flag(
            Flag::Z,
            with_carry(false)
                .expect_reg8(a, 0x00)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::H, false)
                .expect_flag(Flag::C, false),
        )
        .flag(Flag::H, with_carry(true).expect_reg8(a, 0xFF).expect_flag(Flag::H, true))
}

fn cp_a_a(operands: &[OperandDescriptor]) -> Fixtures {
    let a = nth(operands, 0);
    Fixtures::new().baseline(TestScenario::new().set_reg8(a, 0x5A).expect_reg8(a, 0x5A))
}

fn and_a(operands: &[OperandDescriptor]) -> Fixtures {
    let source = Source::of(nth(operands, 1));
    let a = nth(operands, 0);

    if source.is(a) {
        let base = binary(operands, 0x21, 0x21);
        let zero = binary(operands, 0x00, 0x00);
        Fixtures::new()
            .baseline(base.expect_reg8(a, 0x21))
            .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
    }
    else {
        let base = binary(operands, 0xF0, 0x3C);
        let zero = binary(operands, 0xF0, 0x0F);
        Fixtures::new()
            .baseline(base.expect_reg8(a, 0x30))
            .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
    }
}

fn or_a(operands: &[OperandDescriptor]) -> Fixtures {
    let source = Source::of(nth(operands, 1));
    let a = nth(operands, 0);
    let same = source.is(a);

    let base = binary(operands, 0x21, if same { 0x21 } else { 0x30 });
    let zero = binary(operands, 0x00, 0x00);

    Fixtures::new()
        .baseline(base.expect_reg8(a, if same { 0x21 } else { 0x31 }))
        .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
}

fn xor_a(operands: &[OperandDescriptor]) -> Fixtures {
    let a = nth(operands, 0);
    let base = binary(operands, 0x21, 0x30);
    let zero = binary(operands, 0x21, 0x21);

    Fixtures::new()
        .baseline(base.expect_reg8(a, 0x11))
        .flag(Flag::Z, zero.expect_reg8(a, 0x00).expect_flag(Flag::Z, true))
}

fn self_cancel(operands: &[OperandDescriptor]) -> Fixtures {
    let a = nth(operands, 0);
    Fixtures::new().baseline(TestScenario::new().set_reg8(a, 0x21).expect_reg8(a, 0x00))
}

fn inc_8(operands: &[OperandDescriptor]) -> Fixtures {
    let r = nth(operands, 0);
    let case = |before: u8, after: u8| TestScenario::new().set_operand8(r, before).expect_operand8(r, after);
    Fixtures::new()
        .baseline(case(0x21, 0x22))
        .flag(Flag::Z, case(0xFF, 0x00).expect_flag(Flag::Z, true).expect_flag(Flag::H, true))
        .flag(Flag::H, case(0x1F, 0x20).expect_flag(Flag::H, true))
}

fn dec_8(operands: &[OperandDescriptor]) -> Fixtures {
    let r = nth(operands, 0);
    let case = |before: u8, after: u8| TestScenario::new().set_operand8(r, before).expect_operand8(r, after);
    Fixtures::new()
        .baseline(case(0x22, 0x21))
        .flag(Flag::Z, case(0x01, 0x00).expect_flag(Flag::Z, true))
        .flag(Flag::H, case(0x20, 0x1F).expect_flag(Flag::H, true))
}

fn inc_16(operands: &[OperandDescriptor]) -> Fixtures {
    let rr = nth(operands, 0);
    Fixtures::new()
        .baseline(TestScenario::new().set_reg16(rr, 0xCAFE).expect_reg16(rr, 0xCAFF))
        .baseline(
            TestScenario::new()
                .label("wraparound")
                .set_reg16(rr, 0xFFFF)
                .expect_reg16(rr, 0x0000),
        )
}

fn dec_16(operands: &[OperandDescriptor]) -> Fixtures {
    let rr = nth(operands, 0);
    Fixtures::new()
        .baseline(TestScenario::new().set_reg16(rr, 0xCAFE).expect_reg16(rr, 0xCAFD))
        .baseline(
            TestScenario::new()
                .label("wraparound")
                .set_reg16(rr, 0x0000)
                .expect_reg16(rr, 0xFFFF),
        )
}

fn add_hl(operands: &[OperandDescriptor]) -> Fixtures {
    let (hl, rr) = (nth(operands, 0), nth(operands, 1));

    if hl == rr {
        return Fixtures::new()
            .baseline(TestScenario::new().set_reg16(hl, 0x1111).expect_reg16(hl, 0x2222))
            .flag(
                Flag::H,
                TestScenario::new()
                    .set_reg16(hl, 0x0800)
                    .expect_reg16(hl, 0x1000)
                    .expect_flag(Flag::H, true),
            )
            .flag(
                Flag::C,
                TestScenario::new()
                    .set_reg16(hl, 0x8000)
                    .expect_reg16(hl, 0x0000)
                    .expect_flag(Flag::C, true),
            );
    }

    Fixtures::new()
        .baseline(
            TestScenario::new()
                .set_reg16(hl, 0x1234)
                .set_reg16(rr, 0x0101)
                .expect_reg16(hl, 0x1335),
        )
        .flag(
            Flag::H,
            TestScenario::new()
                .set_reg16(hl, 0x0F00)
                .set_reg16(rr, 0x0100)
                .expect_reg16(hl, 0x1000)
                .expect_flag(Flag::H, true),
        )
        .flag(
            Flag::C,
            TestScenario::new()
                .set_reg16(hl, 0xF000)
                .set_reg16(rr, 0x1000)
                .expect_reg16(hl, 0x0000)
                .expect_flag(Flag::C, true),
        )
}

fn add_sp(operands: &[OperandDescriptor]) -> Fixtures {
    let sp = nth(operands, 0);
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .label("positive immediate")
                .bytes(&[0x01])
                .set_reg16(sp, 0x2100)
                .expect_reg16(sp, 0x2101),
        )
        .baseline(
            TestScenario::new()
                .label("negative immediate")
                .bytes(&[0xFF])
                .set_reg16(sp, 0x2100)
                .expect_reg16(sp, 0x20FF),
        )
        .flag(
            Flag::H,
            TestScenario::new()
                .bytes(&[0x01])
                .set_reg16(sp, 0xCAEF)
                .expect_reg16(sp, 0xCAF0)
                .expect_flag(Flag::H, true),
        )
        .flag(
            Flag::C,
            TestScenario::new()
                .bytes(&[0x10])
                .set_reg16(sp, 0xCAFF)
                .expect_reg16(sp, 0xCB0F)
                .expect_flag(Flag::C, true),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::{operands, Expectation, Preset, ScenarioKind};

    #[test]
    fn register_groups() {
        assert_eq!(register_group(0x80, true), vec![0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x87]);
        assert_eq!(register_group(0x90, false), vec![0x90, 0x91, 0x92, 0x93, 0x94, 0x95]);
    }

    #[test]
    fn fragments_expand() {
        assert_eq!(
            ADD_A_N,
            "let operand1 = registers[dst_register];\n\
             let operand2 = immediate;\n\
             let result = operand1 as u16 + operand2 as u16;\n\n\
             registers[dst_register] = result as u8;\n"
        );
        assert!(CP_A_R.ends_with("wrapping_sub(operand2 as u16);\n"));
        assert!(!CP_A_R.contains("registers[dst_register] ="));
    }

    #[test]
    fn adc_carry_in_case() {
        let fixtures = adc_a(&operands(&["A", "B"]));
        let carry = fixtures
            .get(ScenarioKind::Baseline)
            .iter()
            .find(|s| s.label.as_deref() == Some("carry set"))
            .unwrap();
        assert!(carry.presets.contains(&Preset::Reg8("A".to_string(), 0xFF)));
        assert!(carry.presets.contains(&Preset::Reg8("B".to_string(), 0xFF)));
        assert!(carry.presets.contains(&Preset::Flag(Flag::C, true)));
        assert!(carry.expectations.contains(&Expectation::Reg8("A".to_string(), 0xFF)));
        assert!(carry.expectations.contains(&Expectation::Flag(Flag::C, true)));
    }

    #[test]
    fn accumulator_with_itself() {
        let fixtures = add_a(&operands(&["A", "A"]));
        let base = &fixtures.get(ScenarioKind::Baseline)[0];
        assert_eq!(base.presets, vec![Preset::Reg8("A".to_string(), 0x21), Preset::Reg8("A".to_string(), 0x21)]);
        assert_eq!(base.expectations, vec![Expectation::Reg8("A".to_string(), 0x42)]);
    }

    #[test]
    fn sources() {
        let imm = binary(&operands(&["A", "n8"]), 0x51, 0x30);
        assert_eq!(imm.extra_bytes, vec![0x30]);

        let mem = binary(&operands(&["A", "HL"]), 0x51, 0x30);
        assert!(mem.presets.contains(&Preset::Memory(0x0CAF, 0x30)));
        assert!(mem.presets.contains(&Preset::Reg16("HL".to_string(), 0x0CAF)));
    }

    #[test]
    fn subtract_with_carry_from_itself() {
        let fixtures = sbc_a_a(&operands(&["A", "A"]));
        let base = &fixtures.get(ScenarioKind::Baseline)[0];
        assert!(base.presets.contains(&Preset::Flag(Flag::C, true)));
        assert!(base.expectations.contains(&Expectation::Reg8("A".to_string(), 0xFF)));

        let zero = &fixtures.get(ScenarioKind::FlagCase(Flag::Z))[0];
        assert!(zero.presets.contains(&Preset::Flag(Flag::C, false)));
        assert!(zero.expectations.contains(&Expectation::Flag(Flag::Z, true)));
        assert!(fixtures.contains(ScenarioKind::FlagCase(Flag::H)));
        assert!(!fixtures.contains(ScenarioKind::FlagCase(Flag::C)));

        assert!(SBC_A_A.contains(".wrapping_sub(cf as u16)"));
    }

    #[test]
    fn compare_with_itself_keeps_accumulator() {
        let fixtures = cp_a_a(&operands(&["A", "A"]));
        let base = &fixtures.get(ScenarioKind::Baseline)[0];
        assert_eq!(base.expectations, vec![Expectation::Reg8("A".to_string(), 0x5A)]);
        assert!(!CP_A_A.contains("registers[dst_register] ="));
    }
}
