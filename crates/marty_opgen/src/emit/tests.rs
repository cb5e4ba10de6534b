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

    emit::tests.rs

    Emits the conformance tests for one opcode: a baseline case and one case per
    computed flag, built from the family's fixture generator. Conditional opcodes
    also need a case on each side of the branch.

*/

use std::collections::HashSet;

use super::{hex16, hex8, push_line, slugify, TEST_INDENT};
use crate::{
    descriptor::{InstructionDescriptor, MemberOpcode},
    error::OpgenError,
    flags::Flag,
    operand::{is_reg16_name, is_reg8_name},
    semantics::{Expectation, Fixtures, Preset, ScenarioKind, TestScenario},
};

/// Program counter every generated case starts from.
pub const START_PC: u16 = 0x21;

/// Assertion order required by `assert_cpu_execute!`.
const REGISTER_ORDER: [&str; 13] = ["A", "F", "B", "C", "D", "E", "H", "L", "AF", "BC", "DE", "HL", "SP"];

fn expectation_rank(expectation: &Expectation) -> (u8, usize) {
    let register = |name: &str| REGISTER_ORDER.iter().position(|r| *r == name).unwrap_or(REGISTER_ORDER.len());
    match expectation {
        Expectation::Reg8(name, _) | Expectation::Reg16(name, _) => (0, register(name)),
        Expectation::Pc(_) => (0, REGISTER_ORDER.len()),
        Expectation::Flag(flag, _) => (1, flag.index()),
        Expectation::Memory(address, _) => (2, *address as usize),
    }
}

fn render_expectation(expectation: &Expectation) -> String {
    match expectation {
        Expectation::Reg8(name, value) => format!("{} => {}", name, hex8(*value)),
        Expectation::Reg16(name, value) => format!("{} => {}", name, hex16(*value)),
        Expectation::Pc(value) => format!("PC => {}", hex16(*value)),
        Expectation::Flag(flag, value) => format!("{} => {}", flag.binding(), value),
        Expectation::Memory(address, values) => {
            let values: Vec<String> = values.iter().map(|v| hex8(*v)).collect();
            format!("mem[{}] => [{}]", hex16(*address), values.join(", "))
        }
    }
}

fn render_preset(preset: &Preset) -> String {
    match preset {
        Preset::Reg8(name, value) => format!("cpu.registers[Reg8::{}] = {};", name, hex8(*value)),
        Preset::Reg16(name, value) => format!("cpu.registers.set16(Reg16::{}, {});", name, hex16(*value)),
        Preset::Flag(flag, value) => format!("cpu.{} = {};", flag.binding(), value),
        Preset::Memory(address, value) => format!("cpu.internal_ram[{}] = {};", hex16(*address), hex8(*value)),
    }
}

/// A scenario ready to render: presets and expectations completed and ordered.
struct Case {
    name: String,
    bytes: Vec<u8>,
    presets: Vec<Preset>,
    expectations: Vec<Expectation>,
    cycles: u8,
}

struct CaseBuilder<'d, 'a> {
    desc: &'d InstructionDescriptor<'a>,
    member: &'d MemberOpcode<'a>,
}

impl<'d, 'a> CaseBuilder<'d, 'a> {
    fn fault(&self, reason: String) -> OpgenError {
        OpgenError::InvalidFixture {
            family: self.desc.name().to_string(),
            key: self.member.key(),
            reason,
        }
    }

    fn missing(&self, reason: String) -> OpgenError {
        OpgenError::TestFixtureMissing {
            family: self.desc.name().to_string(),
            key: self.member.key(),
            reason,
        }
    }

    fn check_registers(&self, scenario: &TestScenario) -> Result<(), OpgenError> {
        let preset_names = scenario.presets.iter().filter_map(|p| match p {
            Preset::Reg8(name, _) => Some((name, false)),
            Preset::Reg16(name, _) => Some((name, true)),
            _ => None,
        });
        let expected_names = scenario.expectations.iter().filter_map(|e| match e {
            Expectation::Reg8(name, _) => Some((name, false)),
            Expectation::Reg16(name, _) => Some((name, true)),
            _ => None,
        });

        for (name, wide) in preset_names.chain(expected_names) {
            let valid = if wide { is_reg16_name(name) } else { is_reg8_name(name) };
            if !valid {
                return Err(self.fault(format!("'{}' is not a {}-bit register", name, if wide { 16 } else { 8 })));
            }
        }
        Ok(())
    }

    /// The flag a conditional member tests and the value that takes the branch.
    fn condition(&self) -> Option<(Flag, bool)> {
        match self.member.operands.first() {
            Some(operand) if self.desc.is_conditional() => operand.condition(),
            _ => None,
        }
    }

    /// Whether the scenario takes the branch, judged from its preset of the tested flag.
    fn branch_taken(&self, scenario: &TestScenario) -> Option<bool> {
        let (flag, expected) = self.condition()?;
        scenario.presets.iter().rev().find_map(|p| match p {
            Preset::Flag(f, value) if *f == flag => Some(*value == expected),
            _ => None,
        })
    }

    fn cycles(&self, kind: ScenarioKind, scenario: &TestScenario) -> Result<u8, OpgenError> {
        let cycles = self.member.record.cycles;
        let flag = match self.condition() {
            Some((flag, _)) => flag,
            None => return Ok(cycles.base),
        };
        match self.branch_taken(scenario) {
            Some(true) => Ok(cycles.base),
            Some(false) => cycles
                .alternate
                .ok_or_else(|| self.fault("no cycle count for the untaken branch".to_string())),
            None => Err(self.fault(format!("{} case does not preset the {} flag the branch tests", kind, flag))),
        }
    }

    fn build(&self, kind: ScenarioKind, scenario: &TestScenario) -> Result<Case, OpgenError> {
        let record = self.member.record;
        let key = self.member.key();

        let trailing = (record.length - 1 - key.prefix_len()) as usize;
        if scenario.extra_bytes.len() != trailing {
            return Err(self.fault(format!(
                "{} case supplies {} trailing bytes, instruction needs {}",
                kind,
                scenario.extra_bytes.len(),
                trailing
            )));
        }
        self.check_registers(scenario)?;
        let cycles = self.cycles(kind, scenario)?;

        let mut presets = scenario.presets.clone();
        let mut expectations = scenario.expectations.clone();

        if !scenario.asserts_pc() {
            expectations.push(Expectation::Pc(START_PC.wrapping_add(record.length as u16)));
        }

        for (flag, value) in self.desc.flags.fixed() {
            let asserted = scenario.expectations.iter().find_map(|e| match e {
                Expectation::Flag(f, v) if *f == flag => Some(*v),
                _ => None,
            });
            match asserted {
                Some(v) if v != value => {
                    return Err(self.fault(format!("{} case expects {} flag {}, which is fixed", kind, flag, v)));
                }
                Some(_) => {}
                None => expectations.push(Expectation::Flag(flag, value)),
            }

            // Start from the opposite value so the fixed assignment is observable.
            let preset = presets.iter().any(|p| matches!(p, Preset::Flag(f, _) if *f == flag));
            if kind == ScenarioKind::Baseline && !preset {
                presets.push(Preset::Flag(flag, !value));
            }
        }

        expectations.sort_by_key(expectation_rank);

        let mut name = format!("{}_{}_{}", self.desc.family.encoded_name(), key.slug(), kind.slug());
        if let Some(label) = &scenario.label {
            name.push('_');
            name.push_str(&slugify(label));
        }

        let mut bytes = key.bytes();
        bytes.extend_from_slice(&scenario.extra_bytes);

        Ok(Case {
            name,
            bytes,
            presets,
            expectations,
            cycles,
        })
    }

    /// Every computed flag needs a case of its own, and every opcode a baseline.
    fn check_coverage(&self, fixtures: &Fixtures) -> Result<(), OpgenError> {
        if !fixtures.contains(ScenarioKind::Baseline) {
            return Err(self.missing("no baseline case".to_string()));
        }
        for flag in self.desc.flags.computed() {
            if !fixtures.contains(ScenarioKind::FlagCase(flag)) {
                return Err(self.missing(format!("no case for computed {} flag", flag)));
            }
        }
        if self.condition().is_some() {
            let outcomes: Vec<Option<bool>> = fixtures.iter().map(|(_, s)| self.branch_taken(s)).collect();
            if !outcomes.contains(&Some(true)) {
                return Err(self.missing("no case where the branch is taken".to_string()));
            }
            if !outcomes.contains(&Some(false)) {
                return Err(self.missing("no case where the branch falls through".to_string()));
            }
        }
        Ok(())
    }
}

fn render(out: &mut String, case: &Case) {
    let body = TEST_INDENT + 4;
    let bytes: Vec<String> = case.bytes.iter().map(|b| hex8(*b)).collect();

    push_line(out, TEST_INDENT, "#[test]");
    push_line(out, TEST_INDENT, &format!("fn {}() {{", case.name));
    push_line(out, body, "let mut cpu = Cpu::new();");
    push_line(out, body, &format!("let instruction_bytes = [{}];", bytes.join(", ")));
    push_line(out, 0, "");
    push_line(out, body, &format!("cpu.pc = {};", hex16(START_PC)));
    for preset in &case.presets {
        push_line(out, body, &render_preset(preset));
    }
    push_line(out, 0, "");
    push_line(out, body, "assert_cpu_execute!(");
    push_line(out, body + 4, "cpu,");
    push_line(out, body + 4, "instruction_bytes,");
    for expectation in &case.expectations {
        push_line(out, body + 4, &format!("{},", render_expectation(expectation)));
    }
    push_line(out, body + 4, &format!("cycles: {}", case.cycles));
    push_line(out, body, ");");
    push_line(out, TEST_INDENT, "}");
}

/// All test cases for `member`, preceded by a comment naming the opcode.
pub fn cases(desc: &InstructionDescriptor, member: &MemberOpcode) -> Result<String, OpgenError> {
    let builder = CaseBuilder { desc, member };
    let fixtures = (desc.family.fixtures)(&member.operands);
    if let Some(reason) = fixtures.error() {
        return Err(builder.fault(reason.to_string()));
    }

    builder.check_coverage(&fixtures)?;

    let mut out = String::new();
    push_line(
        &mut out,
        TEST_INDENT,
        &format!("// {} [{}]", member.record.assembly(), member.key()),
    );

    let mut labels = HashSet::new();
    for (kind, scenario) in fixtures.iter() {
        if !labels.insert((kind, scenario.label.clone())) {
            let label = scenario.label.as_deref().unwrap_or("unlabeled");
            return Err(builder.fault(format!("duplicate {} case '{}'", kind, label)));
        }
        if scenario.skip {
            log::debug!("{}: skipping {} case {:?}", member.key(), kind, scenario.label);
            continue;
        }

        let case = builder.build(kind, scenario)?;
        push_line(&mut out, 0, "");
        render(&mut out, &case);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FaultClass,
        flags::Flag,
        semantics::{catalog, FamilySemantics},
        table::{OpcodeKey, OpcodeTable},
    };

    const TABLE: &str = include_str!("../../tests/data/opcodes.json");

    fn emit_for(family: &FamilySemantics, key: OpcodeKey) -> Result<String, OpgenError> {
        let table = OpcodeTable::from_json(TABLE).unwrap();
        let records: Vec<_> = family.keys().map(|k| table.get(&k).unwrap()).collect();
        let desc = InstructionDescriptor::merge(family, &records).unwrap();
        let member = desc.members.iter().find(|m| m.key() == key).unwrap();
        cases(&desc, member)
    }

    fn authored(name: &str) -> FamilySemantics {
        catalog().into_iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn immediate_load_case() {
        let code = emit_for(&authored("LD r, n"), OpcodeKey::new(0x3E)).unwrap();
        assert_eq!(
            code,
            concat!(
                "    // LD A, n8 [0x3E]\n",
                "\n",
                "    #[test]\n",
                "    fn ld_r_n_3e_base() {\n",
                "        let mut cpu = Cpu::new();\n",
                "        let instruction_bytes = [0x3E, 0x21];\n",
                "\n",
                "        cpu.pc = 0x0021;\n",
                "\n",
                "        assert_cpu_execute!(\n",
                "            cpu,\n",
                "            instruction_bytes,\n",
                "            A => 0x21,\n",
                "            PC => 0x0023,\n",
                "            cycles: 8\n",
                "        );\n",
                "    }\n",
            )
        );
    }

    #[test]
    fn carry_in_case() {
        let code = emit_for(&authored("ADC A, r"), OpcodeKey::new(0x88)).unwrap();
        let case = code
            .split("#[test]")
            .find(|c| c.contains("fn adc_a_r_88_base_carry_set()"))
            .unwrap();

        assert!(case.contains("cpu.registers[Reg8::A] = 0xFF;\n        cpu.registers[Reg8::B] = 0xFF;\n"));
        assert!(case.contains("cpu.cf = true;\n        cpu.nf = true;\n"));
        assert!(case.contains("A => 0xFF,\n            PC => 0x0022,\n            nf => false,\n"));
        assert!(case.contains("hf => true,\n            cf => true,\n            cycles: 4\n"));

        for name in ["adc_a_r_88_base()", "adc_a_r_88_flag_z()", "adc_a_r_88_flag_h()", "adc_a_r_88_flag_c()"] {
            assert!(code.contains(name), "{}", name);
        }
    }

    #[test]
    fn signed_offset_cases() {
        let code = emit_for(&authored("LD HL, SP+e8"), OpcodeKey::new(0xF8)).unwrap();
        let case = code
            .split("#[test]")
            .find(|c| c.contains("fn ld_hl_sp_e8_f8_base_negative_immediate()"))
            .unwrap();

        assert!(case.contains("let instruction_bytes = [0xF8, 0xFF];"));
        assert!(case.contains("cpu.registers.set16(Reg16::SP, 0x2100);"));
        assert!(case.contains("cpu.zf = true;"));
        assert!(case.contains("HL => 0x20FF,\n            PC => 0x0023,\n"));
        assert!(case.contains("zf => false,\n            nf => false,\n"));
        assert!(code.contains("fn ld_hl_sp_e8_f8_flag_h_positive_immediate()"));
        assert!(code.contains("fn ld_hl_sp_e8_f8_flag_c_negative_immediate()"));
    }

    #[test]
    fn memory_expectations_last() {
        let code = emit_for(&authored("CALL nn"), OpcodeKey::new(0xCD)).unwrap();
        assert!(code.contains("SP => 0xCAFC,\n            PC => 0x3021,\n            mem[0xCAFC] => [0x24, 0x00],\n"));
        assert!(!code.contains("PC => 0x0024"));
    }

    #[test]
    fn missing_flag_case() {
        let mut family = authored("INC r");
        family.fixtures = |_| Fixtures::new().baseline(TestScenario::new().expect_reg8("B", 0x01));
        let err = emit_for(&family, OpcodeKey::new(0x04)).unwrap_err();
        assert_eq!(err.class(), FaultClass::TestFixtureMissing);
        assert!(matches!(err, OpgenError::TestFixtureMissing { .. }));
        assert!(err.to_string().contains("Z flag"));

        family.fixtures = |_| Fixtures::new();
        let err = emit_for(&family, OpcodeKey::new(0x04)).unwrap_err();
        assert!(err.to_string().contains("no baseline"));
    }

    #[test]
    fn skipped_case_counts_as_coverage() {
        let mut family = authored("LD r, n");
        family.fixtures = |_| Fixtures::new().baseline(TestScenario::new().skip_if(true));
        let code = emit_for(&family, OpcodeKey::new(0x06)).unwrap();
        assert!(!code.contains("#[test]"));
    }

    #[test]
    fn trailing_bytes_must_fill_instruction() {
        let mut family = authored("LD r, n");
        family.fixtures = |_| Fixtures::new().baseline(TestScenario::new().expect_reg8("B", 0x00));
        let err = emit_for(&family, OpcodeKey::new(0x06)).unwrap_err();
        assert!(matches!(err, OpgenError::InvalidFixture { .. }));
        assert_eq!(err.class(), FaultClass::TestFixtureMissing);
    }

    #[test]
    fn duplicate_labels() {
        let mut family = authored("LD r, n");
        family.fixtures = |_| {
            Fixtures::new()
                .baseline(TestScenario::new().bytes(&[0x01]).label("one"))
                .baseline(TestScenario::new().bytes(&[0x01]).label("one"))
        };
        let err = emit_for(&family, OpcodeKey::new(0x06)).unwrap_err();
        assert!(err.to_string().contains("duplicate baseline case 'one'"));
    }

    #[test]
    fn unknown_register_names() {
        let mut family = authored("LD r, n");
        family.fixtures = |_| Fixtures::new().baseline(TestScenario::new().bytes(&[0x01]).expect_reg8("", 0x01));
        let err = emit_for(&family, OpcodeKey::new(0x06)).unwrap_err();
        assert!(matches!(err, OpgenError::InvalidFixture { .. }));

        family.fixtures = |_| Fixtures::new().baseline(TestScenario::new().bytes(&[0x01]).set_reg16("B", 0x01));
        assert!(emit_for(&family, OpcodeKey::new(0x06)).is_err());
    }

    #[test]
    fn contradicting_fixed_flag() {
        let mut family = authored("SCF");
        family.fixtures = |_| Fixtures::new().baseline(TestScenario::new().expect_flag(Flag::C, false));
        let err = emit_for(&family, OpcodeKey::new(0x37)).unwrap_err();
        assert!(matches!(err, OpgenError::InvalidFixture { .. }));
    }

    #[test]
    fn fixed_flags_on_every_case() {
        let code = emit_for(&authored("INC r"), OpcodeKey::new(0x04)).unwrap();
        assert_eq!(code.matches("nf => false,").count(), 3);
        // Only the baseline starts from the negated value.
        assert_eq!(code.matches("cpu.nf = true;").count(), 1);
    }

    #[test]
    fn conditional_cycles_follow_the_branch() {
        let code = emit_for(&authored("JR cc, e8"), OpcodeKey::new(0x20)).unwrap();
        let case = |name: &str| code.split("#[test]").find(|c| c.contains(name)).unwrap().to_string();

        let taken = case("fn jr_cc_e8_20_base_taken_forward()");
        assert!(taken.contains("let instruction_bytes = [0x20, 0x10];"));
        assert!(taken.contains("cpu.zf = false;"));
        assert!(taken.contains("PC => 0x0033,\n            cycles: 12\n"));

        let untaken = case("fn jr_cc_e8_20_base_not_taken()");
        assert!(untaken.contains("cpu.zf = true;"));
        assert!(untaken.contains("PC => 0x0023,\n            cycles: 8\n"));

        // JR C tests the carry flag, not register C.
        let code = emit_for(&authored("JR cc, e8"), OpcodeKey::new(0x38)).unwrap();
        assert!(code.contains("cpu.cf = true;"));
        assert!(code.contains("cpu.cf = false;"));
        assert!(!code.contains("Reg8::C"));
    }

    #[test]
    fn conditional_needs_both_outcomes() {
        let mut family = authored("JP cc, nn");
        family.fixtures = |_| {
            Fixtures::new().baseline(
                TestScenario::new()
                    .bytes(&[0xEF, 0xBE])
                    .set_flag(Flag::Z, false)
                    .expect_pc(0xBEEF),
            )
        };
        let err = emit_for(&family, OpcodeKey::new(0xC2)).unwrap_err();
        assert!(matches!(err, OpgenError::TestFixtureMissing { .. }));
        assert!(err.to_string().contains("falls through"));

        family.fixtures = |_| Fixtures::new().baseline(TestScenario::new().bytes(&[0xEF, 0xBE]));
        let err = emit_for(&family, OpcodeKey::new(0xC2)).unwrap_err();
        assert!(err.to_string().contains("taken"));

        // A case that leaves the tested flag alone has no defined cycle count.
        family.fixtures = |_| {
            Fixtures::new()
                .baseline(TestScenario::new().label("taken").bytes(&[0xEF, 0xBE]).set_flag(Flag::Z, false))
                .baseline(TestScenario::new().label("untaken").bytes(&[0xEF, 0xBE]).set_flag(Flag::Z, true))
                .baseline(TestScenario::new().label("either").bytes(&[0xEF, 0xBE]))
        };
        let err = emit_for(&family, OpcodeKey::new(0xC2)).unwrap_err();
        assert!(matches!(err, OpgenError::InvalidFixture { .. }));
        assert!(err.to_string().contains("does not preset the Z flag"));
    }

    #[test]
    fn invalid_fixtures_surface() {
        let mut family = authored("RST n");
        family.fixtures = |_| Fixtures::invalid("restart vector 'n8' is not a literal");
        let err = emit_for(&family, OpcodeKey::new(0xC7)).unwrap_err();
        assert!(matches!(err, OpgenError::InvalidFixture { .. }));
        assert!(err.to_string().contains("'n8' is not a literal"));
    }
}
