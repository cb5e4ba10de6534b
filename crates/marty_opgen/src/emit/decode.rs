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

    emit::decode.rs

    Emits one dispatch branch per opcode: a slice pattern over the instruction bytes
    and a call into the family's execution routine, evaluating to the cycle count.

*/

use super::{hex8, push_line, push_list, DECODE_INDENT};
use crate::{
    descriptor::{FlagParam, InstructionDescriptor, MemberOpcode},
    operand::{OperandDescriptor, OperandType},
    semantics::MemoryAccess,
};

/// The slice pattern selecting `member`, binding any trailing immediate bytes.
pub fn pattern(member: &MemberOpcode) -> String {
    let mut parts: Vec<String> = member.key().bytes().into_iter().map(hex8).collect();

    for operand in &member.operands {
        match operand.kind {
            OperandType::Imm8 => parts.push("immediate @ _".to_string()),
            OperandType::Imm16 => {
                parts.push("immediate_low @ _".to_string());
                parts.push("immediate_high @ _".to_string());
            }
            _ => {}
        }
    }
    format!("[{}]", parts.join(", "))
}

fn operand_arguments(operand: &OperandDescriptor) -> Vec<String> {
    let argument = match operand.kind {
        OperandType::Reg8 => format!("Reg8::{}", operand.name),
        OperandType::Reg16 | OperandType::RegSP => format!("Reg16::{}", operand.name),
        OperandType::Imm8 => "*immediate".to_string(),
        OperandType::Imm16 => "u16::from_le_bytes([*immediate_low, *immediate_high])".to_string(),
        OperandType::Literal => {
            let value = operand.literal_value().unwrap_or(0);
            if operand.name.chars().all(|c| c.is_ascii_digit()) {
                value.to_string()
            }
            else {
                hex8(value)
            }
        }
        OperandType::Condition => match operand.condition() {
            Some((flag, value)) => return vec![format!("self.{}", flag.binding()), value.to_string()],
            None => return Vec::new(),
        },
    };
    vec![argument]
}

/// Call arguments, in routine parameter order.
pub fn arguments(desc: &InstructionDescriptor, member: &MemberOpcode) -> Vec<String> {
    let mut args = vec!["&mut self.pc".to_string()];

    if desc.uses_registers() {
        args.push("&mut self.registers".to_string());
    }
    match desc.memory_access() {
        MemoryAccess::None => {}
        MemoryAccess::Read => args.push("&self.internal_ram".to_string()),
        MemoryAccess::Write => args.push("&mut self.internal_ram".to_string()),
    }

    args.extend(member.operands.iter().flat_map(operand_arguments));

    for param in desc.flag_params() {
        match param {
            FlagParam::Mutable(flag) => args.push(format!("&mut self.{}", flag.binding())),
            FlagParam::ReadOnly(flag) => args.push(format!("self.{}", flag.binding())),
        }
    }
    args
}

pub fn branch(desc: &InstructionDescriptor, member: &MemberOpcode) -> String {
    let mut out = String::new();
    let body = DECODE_INDENT + 4;

    push_line(&mut out, DECODE_INDENT, &format!("{} => {{", pattern(member)));
    let cycles = member.record.cycles;
    match cycles.alternate.filter(|_| desc.is_conditional()) {
        Some(untaken) => {
            // Conditional routines report whether the branch was taken.
            push_list(
                &mut out,
                body,
                &format!("if Self::{}(", desc.routine_name()),
                &arguments(desc, member),
                ") {",
            );
            push_line(&mut out, body + 4, &cycles.base.to_string());
            push_line(&mut out, body, "}");
            push_line(&mut out, body, "else {");
            push_line(&mut out, body + 4, &untaken.to_string());
            push_line(&mut out, body, "}");
        }
        None => {
            push_list(
                &mut out,
                body,
                &format!("Self::{}(", desc.routine_name()),
                &arguments(desc, member),
                ");",
            );
            push_line(&mut out, body, &cycles.base.to_string());
        }
    }
    push_line(&mut out, DECODE_INDENT, "}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{semantics::catalog, table::OpcodeKey, table::OpcodeTable};

    const TABLE: &str = include_str!("../../tests/data/opcodes.json");

    fn with_member(name: &str, key: OpcodeKey, check: impl Fn(&InstructionDescriptor, &MemberOpcode)) {
        let families = catalog();
        let table = OpcodeTable::load(TABLE, &families).unwrap();
        let (index, family) = families.iter().enumerate().find(|(_, f)| f.name == name).unwrap();
        let records: Vec<_> = table.members(index).collect();
        let desc = InstructionDescriptor::merge(family, &records).unwrap();
        let member = desc.members.iter().find(|m| m.key() == key).unwrap();
        check(&desc, member);
    }

    #[test]
    fn immediate_load_branch() {
        with_member("LD r, n", OpcodeKey::new(0x06), |desc, member| {
            assert_eq!(
                branch(desc, member),
                concat!(
                    "            [0x06, immediate @ _] => {\n",
                    "                Self::execute_ld_r_n(&mut self.pc, &mut self.registers, Reg8::B, *immediate);\n",
                    "                8\n",
                    "            }\n",
                )
            );
        });
    }

    #[test]
    fn wide_immediate_pattern() {
        with_member("LD A, (nn)", OpcodeKey::new(0xFA), |desc, member| {
            assert_eq!(pattern(member), "[0xFA, immediate_low @ _, immediate_high @ _]");
            let args = arguments(desc, member);
            assert!(args.contains(&"&self.internal_ram".to_string()));
            assert!(args.contains(&"u16::from_le_bytes([*immediate_low, *immediate_high])".to_string()));
        });
    }

    #[test]
    fn prefixed_literal_branch() {
        with_member("BIT n, r", OpcodeKey::prefixed(0x7C), |desc, member| {
            assert_eq!(pattern(member), "[0xCB, 0x7C]");
            assert_eq!(
                arguments(desc, member),
                vec![
                    "&mut self.pc",
                    "&mut self.registers",
                    "7",
                    "Reg8::H",
                    "&mut self.zf",
                    "&mut self.nf",
                    "&mut self.hf"
                ]
            );
            assert!(branch(desc, member).contains("\n                8\n"));
        });
    }

    #[test]
    fn restart_vector_literal() {
        with_member("RST n", OpcodeKey::new(0xEF), |desc, member| {
            assert_eq!(
                arguments(desc, member),
                vec!["&mut self.pc", "&mut self.registers", "&mut self.internal_ram", "0x28"]
            );
        });
    }

    #[test]
    fn conditional_branch_selects_cycles() {
        with_member("JR cc, e8", OpcodeKey::new(0x20), |desc, member| {
            assert_eq!(
                branch(desc, member),
                concat!(
                    "            [0x20, immediate @ _] => {\n",
                    "                if Self::execute_jr_cc_e8(&mut self.pc, self.zf, false, *immediate) {\n",
                    "                    12\n",
                    "                }\n",
                    "                else {\n",
                    "                    8\n",
                    "                }\n",
                    "            }\n",
                )
            );
        });
        with_member("RET cc", OpcodeKey::new(0xD8), |desc, member| {
            assert_eq!(
                arguments(desc, member),
                vec!["&mut self.pc", "&mut self.registers", "&self.internal_ram", "self.cf", "true"]
            );
            let text = branch(desc, member);
            assert!(text.contains("\n                    20\n"));
            assert!(text.contains("\n                    8\n"));
        });
    }

    #[test]
    fn read_only_flag_argument() {
        with_member("DAA", OpcodeKey::new(0x27), |desc, member| {
            let args = arguments(desc, member);
            assert!(args.contains(&"self.nf".to_string()));
            assert!(args.contains(&"&mut self.cf".to_string()));
        });
    }
}
