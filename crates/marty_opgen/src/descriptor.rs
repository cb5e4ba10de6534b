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

    descriptor.rs

    Folds the member opcodes of one mnemonic family into a single instruction
    descriptor, rejecting families whose members differ in shape.

*/

use std::fmt::Write;

use indexmap::IndexMap;

use crate::{
    error::OpgenError,
    flags::{Flag, FlagEffect, FlagEffectMap},
    operand::{classify, detect_aliasing, OperandDescriptor, OperandShape, OperandType},
    semantics::{FamilySemantics, MemoryAccess},
    table::{OpcodeKey, OpcodeRecord},
};

/// One member opcode with its operands classified after the family's rewrite.
#[derive(Clone, Debug)]
pub struct MemberOpcode<'a> {
    pub record: &'a OpcodeRecord,
    pub operands: Vec<OperandDescriptor>,
}

impl<'a> MemberOpcode<'a> {
    pub fn key(&self) -> OpcodeKey {
        self.record.key
    }

    pub fn operand_names(&self) -> Vec<&str> {
        self.operands.iter().map(|op| op.name.as_str()).collect()
    }
}

/// How a flag is handed to an execution routine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagParam {
    Mutable(Flag),
    ReadOnly(Flag),
}

/// A routine parameter carrying one operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperandParam {
    pub name: &'static str,
    pub ty:   &'static str,
}

#[derive(Clone, Debug)]
pub struct InstructionDescriptor<'a> {
    pub family: &'a FamilySemantics,
    pub shapes: Vec<OperandShape>,
    /// Flag effects with the family's carry widths applied.
    pub flags: FlagEffectMap,
    pub length: u8,
    pub aliased: bool,
    pub members: Vec<MemberOpcode<'a>>,
}

type Signature = (FlagEffectMap, u8, Vec<OperandShape>);

impl<'a> InstructionDescriptor<'a> {
    /// Merge the members of `family`, given in table order.
    pub fn merge(family: &'a FamilySemantics, records: &[&'a OpcodeRecord]) -> Result<Self, OpgenError> {
        let mut members = Vec::with_capacity(records.len());
        let mut signatures: IndexMap<Signature, Vec<OpcodeKey>> = IndexMap::new();

        for record in records {
            let rewritten = family.rewrite.apply(&record.operands);
            let mut operands = classify(record.key, &rewritten)?;
            if family.conditional {
                claim_condition(family, record, &mut operands)?;
            }
            check_layout(family, record, &operands)?;

            let shapes: Vec<OperandShape> = operands.iter().map(|op| op.shape()).collect();
            signatures
                .entry((record.flags, record.length, shapes))
                .or_default()
                .push(record.key);

            members.push(MemberOpcode {
                record: *record,
                operands,
            });
        }

        if signatures.len() > 1 {
            let mut opcodes = String::new();
            for (i, ((flags, length, shapes), keys)) in signatures.iter().enumerate() {
                if i > 0 {
                    opcodes.push_str("; ");
                }
                let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
                let _ = write!(
                    opcodes,
                    "[{}] flags {} length {} operands {:?}",
                    keys.join(", "),
                    flags,
                    length,
                    shapes
                );
            }
            return Err(OpgenError::DivergentFamily {
                family: family.name.to_string(),
                opcodes,
            });
        }

        let ((flags, length, shapes), _) = signatures
            .into_iter()
            .next()
            .ok_or_else(|| OpgenError::EmptyFamily(family.name.to_string()))?;

        let aliased = members.iter().any(|m| detect_aliasing(&m.operands));
        if aliased {
            let keys: Vec<String> = members
                .iter()
                .filter(|m| detect_aliasing(&m.operands))
                .map(|m| m.key().to_string())
                .collect();
            log::debug!("Family '{}': aliased operands in {}", family.name, keys.join(", "));
        }

        Ok(InstructionDescriptor {
            family,
            shapes,
            flags: apply_widths(family, flags),
            length,
            aliased,
            members,
        })
    }

    pub fn name(&self) -> &'static str {
        self.family.name
    }

    pub fn routine_name(&self) -> String {
        format!("execute_{}", self.family.encoded_name())
    }

    pub fn is_conditional(&self) -> bool {
        self.family.conditional
    }

    pub fn uses_registers(&self) -> bool {
        self.family.implicit.registers || self.shapes.iter().any(|s| s.kind.is_register())
    }

    /// The memory view the routine needs: writable when the destination operand is
    /// indirect or the family writes implicitly.
    pub fn memory_access(&self) -> MemoryAccess {
        let operand_access = match self.shapes.first() {
            Some(dst) if dst.indirect => MemoryAccess::Write,
            _ if self.shapes.iter().any(|s| s.indirect) => MemoryAccess::Read,
            _ => MemoryAccess::None,
        };
        operand_access.max(self.family.implicit.memory)
    }

    pub fn operand_params(&self) -> Vec<OperandParam> {
        self.shapes
            .iter()
            .enumerate()
            .flat_map(|(position, shape)| operand_param(position, shape.kind))
            .collect()
    }

    /// Fixed and computed flags are written, so they are passed by mutable reference.
    /// Unaffected flags are only passed when the family reads them.
    pub fn flag_params(&self) -> Vec<FlagParam> {
        self.flags
            .iter()
            .filter_map(|(flag, effect)| match effect {
                FlagEffect::Unaffected if self.family.implicit.reads_flags.contains(&flag) => {
                    Some(FlagParam::ReadOnly(flag))
                }
                FlagEffect::Unaffected => None,
                _ => Some(FlagParam::Mutable(flag)),
            })
            .collect()
    }

    /// Number of instruction bytes following the opcode.
    pub fn immediate_bytes(&self) -> u8 {
        self.shapes.iter().map(|s| s.kind.immediate_bytes()).sum()
    }
}

fn operand_param(position: usize, kind: OperandType) -> Vec<OperandParam> {
    let register_name = if position == 0 { "dst_register" } else { "src_register" };
    let param = match kind {
        OperandType::Reg8 => OperandParam {
            name: register_name,
            ty:   "Reg8",
        },
        OperandType::Reg16 | OperandType::RegSP => OperandParam {
            name: register_name,
            ty:   "Reg16",
        },
        OperandType::Imm8 => OperandParam {
            name: "immediate",
            ty:   "u8",
        },
        OperandType::Imm16 => OperandParam {
            name: "immediate",
            ty:   "u16",
        },
        OperandType::Literal => OperandParam {
            name: "literal",
            ty:   "u8",
        },
        // The flag's current value, and the value that takes the branch.
        OperandType::Condition => {
            return vec![
                OperandParam {
                    name: "condition_flag",
                    ty:   "bool",
                },
                OperandParam {
                    name: "flag_condition",
                    ty:   "bool",
                },
            ]
        }
    };
    vec![param]
}

fn apply_widths(family: &FamilySemantics, mut flags: FlagEffectMap) -> FlagEffectMap {
    for (flag, width) in &family.carry_widths {
        if flags.get(*flag) == FlagEffect::Computed(None) {
            flags.set(*flag, FlagEffect::Computed(Some(*width)));
        }
    }
    flags
}

/// Reinterprets a conditional member's first operand as its branch condition.
fn claim_condition(
    family: &FamilySemantics,
    record: &OpcodeRecord,
    operands: &mut [OperandDescriptor],
) -> Result<(), OpgenError> {
    let condition = operands.first().and_then(|op| op.as_condition()).ok_or_else(|| {
        OpgenError::UnsupportedLayout {
            family: family.name.to_string(),
            key:    record.key,
            reason: "first operand is not a branch condition".to_string(),
        }
    })?;
    operands[0] = condition;
    Ok(())
}

/// Routines take at most a destination and a source, one immediate and one literal.
fn check_layout(
    family: &FamilySemantics,
    record: &OpcodeRecord,
    operands: &[OperandDescriptor],
) -> Result<(), OpgenError> {
    let fault = |reason: String| OpgenError::UnsupportedLayout {
        family: family.name.to_string(),
        key: record.key,
        reason,
    };

    if operands.len() > 2 {
        return Err(fault(format!("{} operands after rewrite", operands.len())));
    }
    if operands.iter().filter(|op| op.kind.is_immediate()).count() > 1 {
        return Err(fault("more than one immediate operand".to_string()));
    }
    if operands.iter().filter(|op| op.kind == OperandType::Literal).count() > 1 {
        return Err(fault("more than one literal operand".to_string()));
    }

    let conditions: Vec<(Flag, bool)> = operands.iter().filter_map(|op| op.condition()).collect();
    match (family.conditional, conditions.as_slice()) {
        (false, []) => {}
        (false, _) => return Err(fault("branch condition outside a conditional family".to_string())),
        (true, [(flag, _)]) => {
            // The decoder reads the flag by value while the routine may borrow written flags.
            if record.flags.get(*flag) != FlagEffect::Unaffected {
                return Err(fault(format!("condition flag {} is also written", flag)));
            }
            if record.cycles.alternate.is_none() {
                return Err(fault("no cycle count for the untaken branch".to_string()));
            }
        }
        (true, _) => return Err(fault(format!("{} branch conditions", conditions.len()))),
    }

    let immediate_bytes: u8 = operands.iter().map(|op| op.kind.immediate_bytes()).sum();
    if record.length != 1 + record.key.prefix_len() + immediate_bytes {
        return Err(OpgenError::InvalidLength {
            key:    record.key,
            length: record.length,
        });
    }
    Ok(())
}
