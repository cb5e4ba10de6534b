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

    semantics::loads.rs

    8 and 16-bit load families and the stack push/pop families.

*/

use super::{fixtures::pair_byte, nth, FamilySemantics, Fixtures, OperandRewrite, TestScenario};
use crate::{
    flags::{CarryWidth, Flag},
    operand::OperandDescriptor,
};

const LD_R_N: &str = "registers[dst_register] = immediate;";

const LD_R_R: &str = "registers[dst_register] = registers[src_register];";

const LD_R_IRR: &str = "registers[dst_register] = memory[registers.get16(src_register) as usize];";

const LD_IRR_R: &str = "memory[registers.get16(dst_register) as usize] = registers[src_register];";

const LD_IHL_N: &str = "memory[registers.get16(dst_register) as usize] = immediate;";

const LD_A_INN: &str = "registers[dst_register] = memory[immediate as usize];";

const LD_INN_A: &str = "memory[immediate as usize] = registers[src_register];";

const LDH_A_IN: &str = r"
let address = 0xFF00 + immediate as usize;
registers[dst_register] = memory[address];
";

const LDH_IN_A: &str = r"
let address = 0xFF00 + immediate as usize;
memory[address] = registers[src_register];
";

const LD_A_IC: &str = r"
let address = 0xFF00 + registers[src_register] as usize;
registers[dst_register] = memory[address];
";

const LD_IC_A: &str = r"
let address = 0xFF00 + registers[dst_register] as usize;
memory[address] = registers[src_register];
";

const LDI_IHL_A: &str = r"
let address = registers.get16(dst_register);
memory[address as usize] = registers[src_register];
registers.set16(dst_register, address.wrapping_add(1));
";

const LDD_IHL_A: &str = r"
let address = registers.get16(dst_register);
memory[address as usize] = registers[src_register];
registers.set16(dst_register, address.wrapping_sub(1));
";

const LDI_A_IHL: &str = r"
let address = registers.get16(src_register);
registers[dst_register] = memory[address as usize];
registers.set16(src_register, address.wrapping_add(1));
";

const LDD_A_IHL: &str = r"
let address = registers.get16(src_register);
registers[dst_register] = memory[address as usize];
registers.set16(src_register, address.wrapping_sub(1));
";

const LD_RR_NN: &str = "registers.set16(dst_register, immediate);";

const LD_SP_HL: &str = "registers.set16(dst_register, registers.get16(src_register));";

const LD_INN_SP: &str = r"
let [low, high] = registers.get16(src_register).to_le_bytes();
memory[immediate as usize] = low;
memory[immediate.wrapping_add(1) as usize] = high;
";

// Operands are SP and e8; the HL destination is dropped from the table's operand list.
const LD_HL_SP_E8: &str = r"
let operand1 = registers.get16(dst_register);
let operand2 = immediate as i8 as i16 as u16;
let result = operand1.wrapping_add(operand2);

registers.set16(Reg16::HL, result);
";

const PUSH_RR: &str = r"
let new_sp = registers.get16(Reg16::SP).wrapping_sub(2);
registers.set16(Reg16::SP, new_sp);

let [low, high] = registers.get16(dst_register).to_le_bytes();
memory[new_sp as usize] = low;
memory[new_sp.wrapping_add(1) as usize] = high;
";

const POP_RR: &str = r"
let sp = registers.get16(Reg16::SP);
let low = memory[sp as usize];
let high = memory[sp.wrapping_add(1) as usize];

registers.set16(dst_register, u16::from_le_bytes([low, high]));
registers.set16(Reg16::SP, sp.wrapping_add(2));
";

// F lives in the flag bits, so it is assembled from them rather than read from the pair.
const PUSH_AF: &str = r"
let new_sp = registers.get16(Reg16::SP).wrapping_sub(2);
registers.set16(Reg16::SP, new_sp);

let [_, accumulator] = registers.get16(dst_register).to_le_bytes();
let flags = (zf as u8) << 7 | (nf as u8) << 6 | (hf as u8) << 5 | (cf as u8) << 4;
memory[new_sp as usize] = flags;
memory[new_sp.wrapping_add(1) as usize] = accumulator;
";

// The low nibble of F always reads as zero.
const POP_AF: &str = r"
let sp = registers.get16(Reg16::SP);
let flags = memory[sp as usize] & 0xF0;
let accumulator = memory[sp.wrapping_add(1) as usize];

registers.set16(dst_register, u16::from_le_bytes([flags, accumulator]));
registers.set16(Reg16::SP, sp.wrapping_add(2));

*zf = flags & 0x80 != 0;
*nf = flags & 0x40 != 0;
*hf = flags & 0x20 != 0;
*cf = flags & 0x10 != 0;
";

pub(super) fn families() -> Vec<FamilySemantics> {
    vec![
        FamilySemantics::new("LD r, n", &[0x06, 0x0E, 0x16, 0x1E, 0x26, 0x2E, 0x3E], LD_R_N, ld_r_n),
        FamilySemantics::new(
            "LD r1, r2",
            &[
                0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x47, // B
                0x48, 0x49, 0x4A, 0x4B, 0x4C, 0x4D, 0x4F, // C
                0x50, 0x51, 0x52, 0x53, 0x54, 0x55, 0x57, // D
                0x58, 0x59, 0x5A, 0x5B, 0x5C, 0x5D, 0x5F, // E
                0x60, 0x61, 0x62, 0x63, 0x64, 0x65, 0x67, // H
                0x68, 0x69, 0x6A, 0x6B, 0x6C, 0x6D, 0x6F, // L
                0x78, 0x79, 0x7A, 0x7B, 0x7C, 0x7D, 0x7F, // A
            ],
            LD_R_R,
            ld_r_r,
        ),
        FamilySemantics::new(
            "LD r1, (rr2)",
            &[0x0A, 0x1A, 0x46, 0x4E, 0x56, 0x5E, 0x66, 0x6E, 0x7E],
            LD_R_IRR,
            ld_r_irr,
        ),
        FamilySemantics::new(
            "LD (rr1), r2",
            &[0x02, 0x12, 0x70, 0x71, 0x72, 0x73, 0x74, 0x75, 0x77],
            LD_IRR_R,
            ld_irr_r,
        ),
        FamilySemantics::new("LD (HL), n", &[0x36], LD_IHL_N, ld_ihl_n),
        FamilySemantics::new("LD A, (nn)", &[0xFA], LD_A_INN, ld_a_inn),
        FamilySemantics::new("LD (nn), A", &[0xEA], LD_INN_A, ld_inn_a),
        FamilySemantics::new("LDH A, (n)", &[0xF0], LDH_A_IN, ldh_a_in),
        FamilySemantics::new("LDH (n), A", &[0xE0], LDH_IN_A, ldh_in_a),
        FamilySemantics::new("LD A, (C)", &[0xF2], LD_A_IC, ld_a_ic),
        FamilySemantics::new("LD (C), A", &[0xE2], LD_IC_A, ld_ic_a),
        FamilySemantics::new("LDI (HL), A", &[0x22], LDI_IHL_A, ldi_ihl_a),
        FamilySemantics::new("LDD (HL), A", &[0x32], LDD_IHL_A, ldd_ihl_a),
        FamilySemantics::new("LDI A, (HL)", &[0x2A], LDI_A_IHL, ldi_a_ihl),
        FamilySemantics::new("LDD A, (HL)", &[0x3A], LDD_A_IHL, ldd_a_ihl),
        FamilySemantics::new("LD rr, nn", &[0x01, 0x11, 0x21], LD_RR_NN, ld_rr_nn),
        FamilySemantics::new("LD SP, nn", &[0x31], LD_RR_NN, ld_rr_nn),
        FamilySemantics::new("LD SP, HL", &[0xF9], LD_SP_HL, ld_sp_hl),
        FamilySemantics::new("LD (nn), SP", &[0x08], LD_INN_SP, ld_inn_sp),
        FamilySemantics::new("LD HL, SP+e8", &[0xF8], LD_HL_SP_E8, ld_hl_sp_e8)
            .rewrite(OperandRewrite::DropFirst)
            .carry(Flag::H, CarryWidth::Bit4)
            .carry(Flag::C, CarryWidth::Bit8),
        FamilySemantics::new("PUSH rr", &[0xC5, 0xD5, 0xE5], PUSH_RR, push_rr).writes_memory(),
        FamilySemantics::new("POP rr", &[0xC1, 0xD1, 0xE1], POP_RR, pop_rr).reads_memory(),
        FamilySemantics::new("PUSH AF", &[0xF5], PUSH_AF, push_af)
            .writes_memory()
            .reads_flags(&Flag::ALL),
        FamilySemantics::new("POP AF", &[0xF1], POP_AF, pop_af)
            .reads_memory()
            .manages(&Flag::ALL),
    ]
}

fn ld_r_n(operands: &[OperandDescriptor]) -> Fixtures {
    let r = nth(operands, 0);
    Fixtures::new().baseline(TestScenario::new().bytes(&[0x21]).expect_reg8(r, 0x21))
}

fn ld_r_r(operands: &[OperandDescriptor]) -> Fixtures {
    let (r1, r2) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new().baseline(TestScenario::new().set_reg8(r2, 0x21).expect_reg8(r1, 0x21))
}

fn ld_r_irr(operands: &[OperandDescriptor]) -> Fixtures {
    let (r1, rr2) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new().baseline(
        TestScenario::new()
            .set_mem(0x0CAF, 0x21)
            .set_reg16(rr2, 0x0CAF)
            .expect_reg8(r1, 0x21),
    )
}

fn ld_irr_r(operands: &[OperandDescriptor]) -> Fixtures {
    let (rr1, r2) = (nth(operands, 0), nth(operands, 1));
    // Storing H or L through HL stores the address byte itself.
    let stored = pair_byte(rr1, r2, 0x0CAF).unwrap_or(0x21);
    Fixtures::new().baseline(
        TestScenario::new()
            .set_reg8(r2, 0x21)
            .set_reg16(rr1, 0x0CAF)
            .expect_mem(0x0CAF, &[stored]),
    )
}

fn ld_ihl_n(operands: &[OperandDescriptor]) -> Fixtures {
    let rr = nth(operands, 0);
    Fixtures::new().baseline(
        TestScenario::new()
            .bytes(&[0x21])
            .set_reg16(rr, 0x0CAF)
            .expect_mem(0x0CAF, &[0x21]),
    )
}

fn ld_a_inn(operands: &[OperandDescriptor]) -> Fixtures {
    let r = nth(operands, 0);
    Fixtures::new().baseline(
        TestScenario::new()
            .bytes(&[0xAF, 0x0C])
            .set_mem(0x0CAF, 0x21)
            .expect_reg8(r, 0x21),
    )
}

fn ld_inn_a(operands: &[OperandDescriptor]) -> Fixtures {
    let r = nth(operands, 1);
    Fixtures::new().baseline(
        TestScenario::new()
            .bytes(&[0xAF, 0x0C])
            .set_reg8(r, 0x21)
            .expect_mem(0x0CAF, &[0x21]),
    )
}

fn ldh_a_in(operands: &[OperandDescriptor]) -> Fixtures {
    let r = nth(operands, 0);
    Fixtures::new().baseline(
        TestScenario::new()
            .bytes(&[0x13])
            .set_mem(0xFF13, 0x21)
            .expect_reg8(r, 0x21),
    )
}

fn ldh_in_a(operands: &[OperandDescriptor]) -> Fixtures {
    let r = nth(operands, 1);
    Fixtures::new().baseline(
        TestScenario::new()
            .bytes(&[0x13])
            .set_reg8(r, 0x21)
            .expect_mem(0xFF13, &[0x21]),
    )
}

fn ld_a_ic(operands: &[OperandDescriptor]) -> Fixtures {
    let (r, c) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new().baseline(
        TestScenario::new()
            .set_reg8(c, 0x13)
            .set_mem(0xFF13, 0x21)
            .expect_reg8(r, 0x21),
    )
}

fn ld_ic_a(operands: &[OperandDescriptor]) -> Fixtures {
    let (c, r) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new().baseline(
        TestScenario::new()
            .set_reg8(r, 0x21)
            .set_reg8(c, 0x13)
            .expect_mem(0xFF13, &[0x21]),
    )
}

fn ldi_ihl_a(operands: &[OperandDescriptor]) -> Fixtures {
    let (rr, r) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .set_reg8(r, 0x21)
                .set_reg16(rr, 0x0CAF)
                .expect_reg16(rr, 0x0CB0)
                .expect_mem(0x0CAF, &[0x21]),
        )
        .baseline(
            TestScenario::new()
                .label("wraparound")
                .set_reg8(r, 0x21)
                .set_reg16(rr, 0xFFFF)
                .expect_reg16(rr, 0x0000)
                .expect_mem(0xFFFF, &[0x21]),
        )
}

fn ldd_ihl_a(operands: &[OperandDescriptor]) -> Fixtures {
    let (rr, r) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .set_reg8(r, 0x21)
                .set_reg16(rr, 0x0CAF)
                .expect_reg16(rr, 0x0CAE)
                .expect_mem(0x0CAF, &[0x21]),
        )
        .baseline(
            TestScenario::new()
                .label("wraparound")
                .set_reg8(r, 0x21)
                .set_reg16(rr, 0x0000)
                .expect_reg16(rr, 0xFFFF)
                .expect_mem(0x0000, &[0x21]),
        )
}

fn ldi_a_ihl(operands: &[OperandDescriptor]) -> Fixtures {
    let (r, rr) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new().baseline(
        TestScenario::new()
            .set_mem(0x0CAF, 0x21)
            .set_reg16(rr, 0x0CAF)
            .expect_reg8(r, 0x21)
            .expect_reg16(rr, 0x0CB0),
    )
}

fn ldd_a_ihl(operands: &[OperandDescriptor]) -> Fixtures {
    let (r, rr) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new().baseline(
        TestScenario::new()
            .set_mem(0x0CAF, 0x21)
            .set_reg16(rr, 0x0CAF)
            .expect_reg8(r, 0x21)
            .expect_reg16(rr, 0x0CAE),
    )
}

fn ld_rr_nn(operands: &[OperandDescriptor]) -> Fixtures {
    let rr = nth(operands, 0);
    Fixtures::new().baseline(TestScenario::new().bytes(&[0xFE, 0xCA]).expect_reg16(rr, 0xCAFE))
}

fn ld_sp_hl(operands: &[OperandDescriptor]) -> Fixtures {
    let (sp, hl) = (nth(operands, 0), nth(operands, 1));
    Fixtures::new().baseline(
        TestScenario::new()
            .set_reg16(hl, 0xCAFE)
            .expect_reg16(sp, 0xCAFE),
    )
}

fn ld_inn_sp(operands: &[OperandDescriptor]) -> Fixtures {
    let sp = nth(operands, 1);
    Fixtures::new().baseline(
        TestScenario::new()
            .bytes(&[0xFE, 0xCA])
            .set_reg16(sp, 0xBEEF)
            .expect_mem(0xCAFE, &[0xEF, 0xBE]),
    )
}

fn ld_hl_sp_e8(operands: &[OperandDescriptor]) -> Fixtures {
    let sp = nth(operands, 0);
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .label("positive immediate")
                .bytes(&[0x01])
                .set_reg16(sp, 0x2100)
                .expect_reg16("HL", 0x2101),
        )
        .baseline(
            TestScenario::new()
                .label("negative immediate")
                .bytes(&[0xFF])
                .set_reg16(sp, 0x2100)
                .expect_reg16("HL", 0x20FF),
        )
        .flag(
            Flag::H,
            TestScenario::new()
                .label("positive immediate")
                .bytes(&[0x01])
                .set_reg16(sp, 0xCAEF)
                .expect_reg16("HL", 0xCAF0)
                .expect_flag(Flag::H, true),
        )
        .flag(
            Flag::H,
            TestScenario::new()
                .label("negative immediate")
                .bytes(&[0xE1])
                .set_reg16(sp, 0xCA0F)
                .expect_reg16("HL", 0xC9F0)
                .expect_flag(Flag::H, true),
        )
        .flag(
            Flag::C,
            TestScenario::new()
                .label("positive immediate")
                .bytes(&[0x10])
                .set_reg16(sp, 0xCAFF)
                .expect_reg16("HL", 0xCB0F)
                .expect_flag(Flag::C, true),
        )
        .flag(
            Flag::C,
            TestScenario::new()
                .label("negative immediate")
                .bytes(&[0xE0])
                .set_reg16(sp, 0xCA2F)
                .expect_reg16("HL", 0xCA0F)
                .expect_flag(Flag::C, true),
        )
}

fn push_rr(operands: &[OperandDescriptor]) -> Fixtures {
    let rr = nth(operands, 0);
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .set_reg16(rr, 0xBEEF)
                .set_reg16("SP", 0xCAFE)
                .expect_reg16("SP", 0xCAFC)
                .expect_mem(0xCAFC, &[0xEF, 0xBE]),
        )
        .baseline(
            TestScenario::new()
                .label("wraparound")
                .set_reg16(rr, 0xBEEF)
                .set_reg16("SP", 0x0000)
                .expect_reg16("SP", 0xFFFE)
                .expect_mem(0xFFFE, &[0xEF, 0xBE]),
        )
}

fn pop_rr(operands: &[OperandDescriptor]) -> Fixtures {
    let rr = nth(operands, 0);
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .set_mem(0xCAFE, 0xEF)
                .set_mem(0xCAFF, 0xBE)
                .set_reg16("SP", 0xCAFE)
                .expect_reg16(rr, 0xBEEF)
                .expect_reg16("SP", 0xCB00),
        )
        .baseline(
            TestScenario::new()
                .label("wraparound")
                .set_mem(0xFFFE, 0xEF)
                .set_mem(0xFFFF, 0xBE)
                .set_reg16("SP", 0xFFFE)
                .expect_reg16(rr, 0xBEEF)
                .expect_reg16("SP", 0x0000),
        )
}

fn push_af(operands: &[OperandDescriptor]) -> Fixtures {
    let af = nth(operands, 0);
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .set_reg16(af, 0xBE00)
                .set_flag(Flag::Z, true)
                .set_flag(Flag::C, true)
                .set_reg16("SP", 0xCAFE)
                .expect_reg16("SP", 0xCAFC)
                .expect_mem(0xCAFC, &[0x90, 0xBE]),
        )
        .baseline(
            TestScenario::new()
                .label("half carry and subtract")
                .set_reg16(af, 0xBE00)
                .set_flag(Flag::N, true)
                .set_flag(Flag::H, true)
                .set_reg16("SP", 0xCAFE)
                .expect_reg16("SP", 0xCAFC)
                .expect_mem(0xCAFC, &[0x60, 0xBE]),
        )
}

fn pop_af(operands: &[OperandDescriptor]) -> Fixtures {
    let af = nth(operands, 0);
    let popped = |low: u8, high: u8| {
        TestScenario::new()
            .set_mem(0xCAFE, low)
            .set_mem(0xCAFF, high)
            .set_reg16("SP", 0xCAFE)
            .expect_reg16("SP", 0xCB00)
    };
    let flag_case = |flag: Flag, bit: u8| {
        let mut scenario = popped(bit, 0x12).expect_reg16(af, 0x1200 | bit as u16);
        for other in Flag::ALL {
            scenario = scenario.expect_flag(other, other == flag);
        }
        scenario
    };

    Fixtures::new()
        .baseline(
            popped(0xFF, 0xBE)
                .expect_reg16(af, 0xBEF0)
                .expect_flag(Flag::Z, true)
                .expect_flag(Flag::N, true)
                .expect_flag(Flag::H, true)
                .expect_flag(Flag::C, true),
        )
        .flag(Flag::Z, flag_case(Flag::Z, 0x80))
        .flag(Flag::N, flag_case(Flag::N, 0x40))
        .flag(Flag::H, flag_case(Flag::H, 0x20))
        .flag(Flag::C, flag_case(Flag::C, 0x10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::{operands, Expectation, Preset, ScenarioKind};

    #[test]
    fn ld_r_n_loads_immediate() {
        let fixtures = ld_r_n(&operands(&["A", "n8"]));
        let base = &fixtures.get(ScenarioKind::Baseline)[0];
        assert!(base.presets.is_empty());
        assert_eq!(base.extra_bytes, vec![0x21]);
        assert_eq!(base.expectations, vec![Expectation::Reg8("A".to_string(), 0x21)]);
    }

    #[test]
    fn store_through_own_pair() {
        let h = ld_irr_r(&operands(&["HL", "H"]));
        assert_eq!(
            h.get(ScenarioKind::Baseline)[0].expectations,
            vec![Expectation::Memory(0x0CAF, vec![0x0C])]
        );
        let b = ld_irr_r(&operands(&["HL", "B"]));
        assert_eq!(
            b.get(ScenarioKind::Baseline)[0].expectations,
            vec![Expectation::Memory(0x0CAF, vec![0x21])]
        );
    }

    #[test]
    fn sp_offset_covers_both_signs() {
        let fixtures = ld_hl_sp_e8(&operands(&["SP", "e8"]));
        assert_eq!(fixtures.get(ScenarioKind::Baseline).len(), 2);
        assert_eq!(fixtures.get(ScenarioKind::FlagCase(Flag::H)).len(), 2);
        assert_eq!(fixtures.get(ScenarioKind::FlagCase(Flag::C)).len(), 2);

        let negative = &fixtures.get(ScenarioKind::Baseline)[1];
        assert_eq!(negative.extra_bytes, vec![0xFF]);
        assert!(negative
            .expectations
            .contains(&Expectation::Reg16("HL".to_string(), 0x20FF)));
    }

    #[test]
    fn pop_af_masks_low_nibble() {
        let fixtures = pop_af(&operands(&["AF"]));
        let base = &fixtures.get(ScenarioKind::Baseline)[0];
        assert!(base.expectations.contains(&Expectation::Reg16("AF".to_string(), 0xBEF0)));

        // Each flag case pops exactly one flag bit.
        let carry = &fixtures.get(ScenarioKind::FlagCase(Flag::C))[0];
        assert!(carry.presets.contains(&Preset::Memory(0xCAFE, 0x10)));
        assert!(carry.expectations.contains(&Expectation::Flag(Flag::C, true)));
        assert!(carry.expectations.contains(&Expectation::Flag(Flag::Z, false)));
        for flag in Flag::ALL {
            assert!(fixtures.contains(ScenarioKind::FlagCase(flag)));
        }
        assert!(POP_AF.contains("& 0xF0;"));
    }

    #[test]
    fn push_af_assembles_flags() {
        let fixtures = push_af(&operands(&["AF"]));
        let cases = fixtures.get(ScenarioKind::Baseline);
        assert!(cases[0].expectations.contains(&Expectation::Memory(0xCAFC, vec![0x90, 0xBE])));
        assert!(cases[1].expectations.contains(&Expectation::Memory(0xCAFC, vec![0x60, 0xBE])));
    }
}
