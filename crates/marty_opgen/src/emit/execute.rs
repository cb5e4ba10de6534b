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

    emit::execute.rs

    Emits one execution routine per family: program counter advance, the authored
    fragment, and the flag updates implied by the family's flag effects. Conditional
    routines return early when the branch is not taken and report which way it went.

*/

use super::{push_block, push_line, push_list, ROUTINE_INDENT};
use crate::{
    descriptor::{FlagParam, InstructionDescriptor},
    error::OpgenError,
    flags::{CarryWidth, Flag, FlagEffect},
    semantics::MemoryAccess,
};

/// Routines taking more parameters than this get a `too_many_arguments` allowance.
const CLIPPY_MAX_ARGUMENTS: usize = 7;

/// Check that every computed flag can be produced, and that declared carry widths are sound.
pub fn validate_flags(desc: &InstructionDescriptor) -> Result<(), OpgenError> {
    let family = desc.family;
    let violation = |flag: Flag, reason: &str| OpgenError::FlagSpecViolation {
        family: family.name.to_string(),
        flag,
        reason: reason.to_string(),
    };

    for (i, (flag, _)) in family.carry_widths.iter().enumerate() {
        if matches!(flag, Flag::Z | Flag::N) {
            return Err(violation(*flag, "carry width declared for a flag that has none"));
        }
        if family.carry_widths[..i].iter().any(|(f, _)| f == flag) {
            return Err(violation(*flag, "carry width declared twice"));
        }
        if family.is_self_managed(*flag) {
            return Err(violation(*flag, "carry width declared for a self-managed flag"));
        }
        if !desc.flags.get(*flag).is_computed() {
            return Err(violation(*flag, "carry width declared for a flag the table does not compute"));
        }
    }

    for flag in desc.flags.computed() {
        if family.is_self_managed(flag) {
            continue;
        }
        match (flag, desc.flags.get(flag)) {
            (Flag::N, _) => return Err(violation(flag, "computed, but not managed by the fragment")),
            (Flag::H | Flag::C, FlagEffect::Computed(None)) => {
                return Err(violation(flag, "computed, with neither a carry width nor self-management"))
            }
            _ => {}
        }
    }
    Ok(())
}

/// The flag assignment appended after the fragment, if any.
fn flag_statement(desc: &InstructionDescriptor, flag: Flag) -> Option<String> {
    let binding = flag.binding();
    match desc.flags.get(flag) {
        FlagEffect::FixedFalse => Some(format!("*{} = false;", binding)),
        FlagEffect::FixedTrue => Some(format!("*{} = true;", binding)),
        FlagEffect::Unaffected => None,
        _ if desc.family.is_self_managed(flag) => None,
        FlagEffect::Computed(None) => Some(format!("*{} = (result as u8) == 0;", binding)),
        FlagEffect::Computed(Some(width)) => Some(carry_statement(binding, width)),
    }
}

/// A carry into (or borrow from) bit `width` shows up as a difference between the operands'
/// XOR and the result at that bit.
fn carry_statement(binding: &str, width: CarryWidth) -> String {
    let ty = width.widened_type();
    format!(
        "*{binding} = ((operand1 as {ty}) ^ (operand2 as {ty}) ^ (result as {ty})) & (1 << {bit}) != 0;",
        binding = binding,
        ty = ty,
        bit = width.bit()
    )
}

/// Routine parameters, in the order the decode branches pass their arguments.
pub fn parameters(desc: &InstructionDescriptor) -> Vec<String> {
    let mut params = vec!["pc: &mut u16".to_string()];

    if desc.uses_registers() {
        params.push("registers: &mut Registers".to_string());
    }
    match desc.memory_access() {
        MemoryAccess::None => {}
        MemoryAccess::Read => params.push("memory: &[u8]".to_string()),
        MemoryAccess::Write => params.push("memory: &mut [u8]".to_string()),
    }

    params.extend(desc.operand_params().iter().map(|p| format!("{}: {}", p.name, p.ty)));

    for param in desc.flag_params() {
        match param {
            FlagParam::Mutable(flag) => params.push(format!("{}: &mut bool", flag.binding())),
            FlagParam::ReadOnly(flag) => params.push(format!("{}: bool", flag.binding())),
        }
    }
    params
}

pub fn routine(desc: &InstructionDescriptor) -> Result<String, OpgenError> {
    validate_flags(desc)?;

    let mut out = String::new();
    let body = ROUTINE_INDENT + 4;

    push_line(&mut out, ROUTINE_INDENT, &format!("/// {}", desc.name()));
    if desc.aliased {
        push_line(&mut out, ROUTINE_INDENT, "///");
        push_line(
            &mut out,
            ROUTINE_INDENT,
            "/// Some members name overlapping registers as both operands.",
        );
    }

    let params = parameters(desc);
    if params.len() > CLIPPY_MAX_ARGUMENTS {
        push_line(&mut out, ROUTINE_INDENT, "#[allow(clippy::too_many_arguments)]");
    }
    let tail = if desc.is_conditional() { ") -> bool {" } else { ") {" };
    push_list(
        &mut out,
        ROUTINE_INDENT,
        &format!("fn {}(", desc.routine_name()),
        &params,
        tail,
    );

    push_line(&mut out, body, &format!("*pc = pc.wrapping_add({});", desc.length));

    if desc.is_conditional() {
        push_line(&mut out, 0, "");
        push_line(&mut out, body, "if condition_flag != flag_condition {");
        push_line(&mut out, body + 4, "return false;");
        push_line(&mut out, body, "}");
    }

    if !desc.family.fragment.trim().is_empty() {
        push_line(&mut out, 0, "");
        push_block(&mut out, body, desc.family.fragment);
    }

    let flag_lines: Vec<String> = Flag::ALL.iter().filter_map(|f| flag_statement(desc, *f)).collect();
    if !flag_lines.is_empty() {
        push_line(&mut out, 0, "");
        for line in &flag_lines {
            push_line(&mut out, body, line);
        }
    }

    if desc.is_conditional() {
        push_line(&mut out, 0, "");
        push_line(&mut out, body, "true");
    }
    push_line(&mut out, ROUTINE_INDENT, "}");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FaultClass,
        semantics::{catalog, FamilySemantics, Fixtures},
        table::OpcodeTable,
    };

    const TABLE: &str = include_str!("../../tests/data/opcodes.json");

    fn emit(family: &FamilySemantics) -> Result<String, OpgenError> {
        let table = OpcodeTable::from_json(TABLE).unwrap();
        let records: Vec<_> = family.keys().map(|k| table.get(&k).unwrap()).collect();
        let desc = InstructionDescriptor::merge(family, &records).unwrap();
        routine(&desc)
    }

    fn authored(name: &str) -> FamilySemantics {
        catalog().into_iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn immediate_load_routine() {
        let code = emit(&authored("LD r, n")).unwrap();
        assert_eq!(
            code,
            concat!(
                "    /// LD r, n\n",
                "    fn execute_ld_r_n(pc: &mut u16, registers: &mut Registers, dst_register: Reg8, immediate: u8) {\n",
                "        *pc = pc.wrapping_add(2);\n",
                "\n",
                "        registers[dst_register] = immediate;\n",
                "    }\n",
            )
        );
    }

    #[test]
    fn carry_widths_in_flag_block() {
        let code = emit(&authored("ADD HL, rr")).unwrap();
        assert!(code.contains("*nf = false;"));
        assert!(code.contains("*hf = ((operand1 as u32) ^ (operand2 as u32) ^ (result as u32)) & (1 << 12) != 0;"));
        assert!(code.contains("*cf = ((operand1 as u32) ^ (operand2 as u32) ^ (result as u32)) & (1 << 16) != 0;"));
        assert!(!code.contains("*zf"));

        let code = emit(&authored("INC r")).unwrap();
        assert!(code.contains("*zf = (result as u8) == 0;"));
        assert!(code.contains("*hf = ((operand1 as u16) ^ (operand2 as u16) ^ (result as u16)) & (1 << 4) != 0;"));
        assert!(!code.contains("*cf"));
    }

    #[test]
    fn self_managed_flag_left_to_fragment() {
        let code = emit(&authored("RLCA")).unwrap();
        // Only the fragment's own assignment to the carry flag.
        assert_eq!(code.matches("*cf =").count(), 1);
        assert!(code.contains("*zf = false;"));
    }

    #[test]
    fn aliased_routine_doc() {
        let code = emit(&authored("LD r1, r2")).unwrap();
        assert!(code.contains("/// Some members name overlapping registers"));
        assert!(code.contains("dst_register: Reg8, src_register: Reg8"));
    }

    #[test]
    fn memory_parameters() {
        let code = emit(&authored("LD (rr1), r2")).unwrap();
        // Too long for one line.
        assert!(code.contains("    fn execute_ld_irr1_r2(\n        pc: &mut u16,\n"));
        assert!(code.contains("        memory: &mut [u8],\n        dst_register: Reg16,\n"));
        assert!(code.contains("        src_register: Reg8,\n    ) {\n"));

        let code = emit(&authored("DAA")).unwrap();
        assert!(code.contains("zf: &mut bool, nf: bool, hf: &mut bool, cf: &mut bool"));
        assert!(code.contains("*hf = false;"));
    }

    #[test]
    fn conditional_routine_reports_branch() {
        let code = emit(&authored("JR cc, e8")).unwrap();
        assert_eq!(
            code,
            concat!(
                "    /// JR cc, e8\n",
                "    fn execute_jr_cc_e8(pc: &mut u16, condition_flag: bool, flag_condition: bool, ",
                "immediate: u8) -> bool {\n",
                "        *pc = pc.wrapping_add(2);\n",
                "\n",
                "        if condition_flag != flag_condition {\n",
                "            return false;\n",
                "        }\n",
                "\n",
                "        *pc = pc.wrapping_add(immediate as i8 as i16 as u16);\n",
                "\n",
                "        true\n",
                "    }\n",
            )
        );

        let code = emit(&authored("CALL cc, nn")).unwrap();
        assert!(code.contains("        flag_condition: bool,\n        immediate: u16,\n    ) -> bool {\n"));
        assert!(code.contains("memory: &mut [u8]"));

        // Unconditional forms keep the plain signature.
        let code = emit(&authored("JR e8")).unwrap();
        assert!(code.contains("immediate: u8) {\n"));
        assert!(!code.contains("true"));
    }

    #[test]
    fn missing_carry_width() {
        let mut family = authored("ADD A, r");
        family.carry_widths.retain(|(f, _)| *f != Flag::C);
        let err = emit(&family).unwrap_err();
        assert_eq!(err.class(), FaultClass::FlagSpecViolation);
        assert!(matches!(err, OpgenError::FlagSpecViolation { flag: Flag::C, .. }));
    }

    #[test]
    fn unsound_carry_widths() {
        let zero = authored("ADD A, r").carry(Flag::Z, CarryWidth::Bit8);
        assert!(matches!(emit(&zero), Err(OpgenError::FlagSpecViolation { flag: Flag::Z, .. })));

        let twice = authored("ADD A, r").carry(Flag::H, CarryWidth::Bit8);
        assert!(matches!(emit(&twice), Err(OpgenError::FlagSpecViolation { flag: Flag::H, .. })));

        let not_computed =
            FamilySemantics::new("LD B, n", &[0x06], "", |_| Fixtures::new()).carry(Flag::C, CarryWidth::Bit8);
        assert!(matches!(
            emit(&not_computed),
            Err(OpgenError::FlagSpecViolation { flag: Flag::C, .. })
        ));

        let managed = authored("RLCA").carry(Flag::C, CarryWidth::Bit8);
        assert!(matches!(emit(&managed), Err(OpgenError::FlagSpecViolation { flag: Flag::C, .. })));
    }

    #[test]
    fn every_authored_family_emits() {
        let families = catalog();
        let table = OpcodeTable::load(TABLE, &families).unwrap();
        for (index, family) in families.iter().enumerate() {
            let records: Vec<_> = table.members(index).collect();
            let desc = InstructionDescriptor::merge(family, &records).unwrap();
            let code = routine(&desc).unwrap();
            assert!(code.contains(&format!("fn {}(", desc.routine_name())), "{}", family.name);
        }
    }
}
