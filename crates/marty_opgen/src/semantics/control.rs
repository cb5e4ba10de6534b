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

    semantics::control.rs

    Jumps, calls, returns and restarts, with conditional forms that test the Z or
    C flag and fall through when the condition fails.

*/

use super::{condition, literal, nth, FamilySemantics, Fixtures, TestScenario};
use crate::operand::OperandDescriptor;

// The program counter has already been advanced past the instruction when these run.

const JP_NN: &str = "*pc = immediate;";

const JP_HL: &str = "*pc = registers.get16(dst_register);";

const JR_E8: &str = "*pc = pc.wrapping_add(immediate as i8 as i16 as u16);";

const CALL_NN: &str = r"
let new_sp = registers.get16(Reg16::SP).wrapping_sub(2);
registers.set16(Reg16::SP, new_sp);

let [low, high] = pc.to_le_bytes();
memory[new_sp as usize] = low;
memory[new_sp.wrapping_add(1) as usize] = high;

*pc = immediate;
";

const RET: &str = r"
let sp = registers.get16(Reg16::SP);
let low = memory[sp as usize];
let high = memory[sp.wrapping_add(1) as usize];

registers.set16(Reg16::SP, sp.wrapping_add(2));
*pc = u16::from_le_bytes([low, high]);
";

const RST: &str = r"
let new_sp = registers.get16(Reg16::SP).wrapping_sub(2);
registers.set16(Reg16::SP, new_sp);

let [low, high] = pc.to_le_bytes();
memory[new_sp as usize] = low;
memory[new_sp.wrapping_add(1) as usize] = high;

*pc = literal as u16;
";

pub(super) fn families() -> Vec<FamilySemantics> {
    vec![
        FamilySemantics::new("JP nn", &[0xC3], JP_NN, jp_nn),
        FamilySemantics::new("JP cc, nn", &[0xC2, 0xCA, 0xD2, 0xDA], JP_NN, jp_cc_nn).conditional(),
        FamilySemantics::new("JP HL", &[0xE9], JP_HL, jp_hl),
        FamilySemantics::new("JR e8", &[0x18], JR_E8, jr_e8),
        FamilySemantics::new("JR cc, e8", &[0x20, 0x28, 0x30, 0x38], JR_E8, jr_cc_e8).conditional(),
        FamilySemantics::new("CALL nn", &[0xCD], CALL_NN, call_nn)
            .uses_registers()
            .writes_memory(),
        FamilySemantics::new("CALL cc, nn", &[0xC4, 0xCC, 0xD4, 0xDC], CALL_NN, call_cc_nn)
            .conditional()
            .uses_registers()
            .writes_memory(),
        FamilySemantics::new("RET", &[0xC9], RET, ret)
            .uses_registers()
            .reads_memory(),
        FamilySemantics::new("RET cc", &[0xC0, 0xC8, 0xD0, 0xD8], RET, ret_cc)
            .conditional()
            .uses_registers()
            .reads_memory(),
        FamilySemantics::new("RST n", &[0xC7, 0xCF, 0xD7, 0xDF, 0xE7, 0xEF, 0xF7, 0xFF], RST, rst)
            .uses_registers()
            .writes_memory(),
    ]
}

/// Presets the tested flag so each `taken` scenario branches and each `untaken` one falls through.
fn conditional(operands: &[OperandDescriptor], taken: Vec<TestScenario>, untaken: Vec<TestScenario>) -> Fixtures {
    let (flag, value) = match condition(operands, 0) {
        Some(condition) => condition,
        None => return Fixtures::invalid(format!("'{}' is not a branch condition", nth(operands, 0))),
    };

    let taken = taken.into_iter().map(|scenario| scenario.set_flag(flag, value));
    let untaken = untaken.into_iter().map(|scenario| scenario.set_flag(flag, !value));
    taken.chain(untaken).fold(Fixtures::new(), |fixtures, scenario| fixtures.baseline(scenario))
}

fn jp_nn(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new().baseline(TestScenario::new().bytes(&[0xEF, 0xBE]).expect_pc(0xBEEF))
}

fn jp_cc_nn(operands: &[OperandDescriptor]) -> Fixtures {
    conditional(
        operands,
        vec![TestScenario::new().label("taken").bytes(&[0xEF, 0xBE]).expect_pc(0xBEEF)],
        vec![TestScenario::new().label("not taken").bytes(&[0xEF, 0xBE]).expect_pc(0x0024)],
    )
}

fn jp_hl(operands: &[OperandDescriptor]) -> Fixtures {
    let hl = nth(operands, 0);
    Fixtures::new().baseline(TestScenario::new().set_reg16(hl, 0xCAFE).expect_pc(0xCAFE))
}

fn jr_e8(_operands: &[OperandDescriptor]) -> Fixtures {
    // Relative to the address after the two-byte instruction at 0x21.
    Fixtures::new()
        .baseline(
            TestScenario::new()
                .label("forward")
                .bytes(&[0x10])
                .expect_pc(0x0033),
        )
        .baseline(
            TestScenario::new()
                .label("backward")
                .bytes(&[0xF0])
                .expect_pc(0x0013),
        )
}

fn jr_cc_e8(operands: &[OperandDescriptor]) -> Fixtures {
    conditional(
        operands,
        vec![
            TestScenario::new().label("taken forward").bytes(&[0x10]).expect_pc(0x0033),
            TestScenario::new().label("taken backward").bytes(&[0xF0]).expect_pc(0x0013),
        ],
        vec![TestScenario::new().label("not taken").bytes(&[0x10]).expect_pc(0x0023)],
    )
}

fn call_nn(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new().baseline(
        TestScenario::new()
            .bytes(&[0x21, 0x30])
            .set_reg16("SP", 0xCAFE)
            .expect_reg16("SP", 0xCAFC)
            .expect_pc(0x3021)
            .expect_mem(0xCAFC, &[0x24, 0x00]),
    )
}

fn call_cc_nn(operands: &[OperandDescriptor]) -> Fixtures {
    conditional(
        operands,
        vec![TestScenario::new()
            .label("taken")
            .bytes(&[0x21, 0x30])
            .set_reg16("SP", 0xCAFE)
            .expect_reg16("SP", 0xCAFC)
            .expect_pc(0x3021)
            .expect_mem(0xCAFC, &[0x24, 0x00])],
        vec![TestScenario::new()
            .label("not taken")
            .bytes(&[0x21, 0x30])
            .set_reg16("SP", 0xCAFE)
            .expect_reg16("SP", 0xCAFE)
            .expect_pc(0x0024)],
    )
}

fn ret(_operands: &[OperandDescriptor]) -> Fixtures {
    Fixtures::new().baseline(
        TestScenario::new()
            .set_mem(0xCAFC, 0x24)
            .set_mem(0xCAFD, 0x00)
            .set_reg16("SP", 0xCAFC)
            .expect_reg16("SP", 0xCAFE)
            .expect_pc(0x0024),
    )
}

fn ret_cc(operands: &[OperandDescriptor]) -> Fixtures {
    let stacked = |label: &str| {
        TestScenario::new()
            .label(label)
            .set_mem(0xCAFC, 0x30)
            .set_mem(0xCAFD, 0x21)
            .set_reg16("SP", 0xCAFC)
    };
    conditional(
        operands,
        vec![stacked("taken").expect_reg16("SP", 0xCAFE).expect_pc(0x2130)],
        vec![stacked("not taken").expect_reg16("SP", 0xCAFC).expect_pc(0x0022)],
    )
}

fn rst(operands: &[OperandDescriptor]) -> Fixtures {
    let vector = match literal(operands, 0) {
        Some(vector) => vector,
        None => return Fixtures::invalid(format!("restart vector '{}' is not a literal", nth(operands, 0))),
    };
    Fixtures::new().baseline(
        TestScenario::new()
            .set_reg16("SP", 0xCAFE)
            .expect_reg16("SP", 0xCAFC)
            .expect_pc(vector as u16)
            .expect_mem(0xCAFC, &[0x22, 0x00]),
    )
}
