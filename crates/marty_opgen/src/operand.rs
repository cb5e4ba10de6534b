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

    operand.rs

    Operand classification. Maps each table operand onto a closed set of operand
    types, decides indirection, and detects operands that overlap in storage.

*/

use crate::{error::OpgenError, flags::Flag, table::OpcodeKey, table::RawOperand};

const REG8_NAMES: [&str; 8] = ["A", "F", "B", "C", "D", "E", "H", "L"];
const REG16_NAMES: [&str; 4] = ["AF", "BC", "DE", "HL"];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperandType {
    Reg8,
    Reg16,
    RegSP,
    Imm8,
    Imm16,
    Literal,
    Condition,
}

impl OperandType {
    pub fn is_register(&self) -> bool {
        matches!(self, OperandType::Reg8 | OperandType::Reg16 | OperandType::RegSP)
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, OperandType::Imm8 | OperandType::Imm16)
    }

    /// Number of instruction bytes following the opcode that hold this operand.
    pub fn immediate_bytes(&self) -> u8 {
        match self {
            OperandType::Imm8 => 1,
            OperandType::Imm16 => 2,
            _ => 0,
        }
    }
}

/// Post-access adjustment of a register used as an address, as in `(HL+)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PostStep {
    None,
    Increment,
    Decrement,
}

/// The part of an operand that must be identical across a family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperandShape {
    pub kind: OperandType,
    pub indirect: bool,
    pub step: PostStep,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperandDescriptor {
    pub name: String,
    pub kind: OperandType,
    pub indirect: bool,
    pub step: PostStep,
}

impl OperandDescriptor {
    pub fn shape(&self) -> OperandShape {
        OperandShape {
            kind: self.kind,
            indirect: self.indirect,
            step: self.step,
        }
    }

    pub fn literal_value(&self) -> Option<u8> {
        match self.kind {
            OperandType::Literal => parse_literal(&self.name),
            _ => None,
        }
    }

    /// The flag a condition operand tests and the value it must hold for the branch to be taken.
    pub fn condition(&self) -> Option<(Flag, bool)> {
        match self.kind {
            OperandType::Condition => condition(&self.name),
            _ => None,
        }
    }

    /// Reinterprets the operand as a branch condition. `C` classifies as a register until a
    /// conditional family claims it.
    pub fn as_condition(&self) -> Option<OperandDescriptor> {
        condition(&self.name).filter(|_| !self.indirect).map(|_| OperandDescriptor {
            kind: OperandType::Condition,
            ..self.clone()
        })
    }
}

pub fn is_reg8_name(name: &str) -> bool {
    REG8_NAMES.contains(&name)
}

pub fn is_reg16_name(name: &str) -> bool {
    REG16_NAMES.contains(&name) || name == "SP"
}

/// Numeric literal operands: decimal (`3`), `$`-prefixed hex (`$08`) or `H`-suffixed hex (`08H`).
fn parse_literal(name: &str) -> Option<u8> {
    if let Some(hex) = name.strip_prefix('$') {
        u8::from_str_radix(hex, 16).ok()
    }
    else if let Some(hex) = name.strip_suffix('H').filter(|h| !h.is_empty()) {
        u8::from_str_radix(hex, 16).ok()
    }
    else if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        name.parse::<u8>().ok()
    }
    else {
        None
    }
}

/// `NZ` tests for Z clear, `C` for C set.
pub fn condition(name: &str) -> Option<(Flag, bool)> {
    match name {
        "Z" => Some((Flag::Z, true)),
        "NZ" => Some((Flag::Z, false)),
        "C" => Some((Flag::C, true)),
        "NC" => Some((Flag::C, false)),
        _ => None,
    }
}

fn operand_type(name: &str) -> Option<OperandType> {
    match name {
        "d8" | "n8" | "a8" | "r8" | "e8" => Some(OperandType::Imm8),
        "Z" | "NZ" | "NC" => Some(OperandType::Condition),
        "d16" | "n16" | "a16" => Some(OperandType::Imm16),
        "SP" => Some(OperandType::RegSP),
        n if is_reg8_name(n) => Some(OperandType::Reg8),
        n if REG16_NAMES.contains(&n) => Some(OperandType::Reg16),
        n if parse_literal(n).is_some() => Some(OperandType::Literal),
        _ => None,
    }
}

pub fn classify_operand(key: OpcodeKey, raw: &RawOperand) -> Result<OperandDescriptor, OpgenError> {
    let kind = operand_type(&raw.name).ok_or_else(|| OpgenError::UnsupportedOperand {
        key,
        operand: raw.name.clone(),
    })?;

    // The table marks direct operands as "immediate"; everything else is dereferenced.
    let indirect = !raw.immediate;

    let plausible = !indirect
        || match kind {
            OperandType::Imm8 => raw.name == "a8",
            OperandType::Imm16 => raw.name == "a16",
            OperandType::Reg8 => raw.name == "C",
            OperandType::Reg16 => raw.name != "AF",
            OperandType::RegSP | OperandType::Literal | OperandType::Condition => false,
        };
    if !plausible {
        log::warn!(
            "Opcode {}: operand '{}' is marked indirect but does not name an address",
            key,
            raw.name
        );
    }

    let step = match (raw.increment, raw.decrement) {
        (true, false) => PostStep::Increment,
        (false, true) => PostStep::Decrement,
        (false, false) => PostStep::None,
        (true, true) => {
            return Err(OpgenError::UnsupportedOperand {
                key,
                operand: format!("{}+-", raw.name),
            })
        }
    };

    Ok(OperandDescriptor {
        name: raw.name.clone(),
        kind,
        indirect,
        step,
    })
}

pub fn classify(key: OpcodeKey, operands: &[RawOperand]) -> Result<Vec<OperandDescriptor>, OpgenError> {
    operands.iter().map(|op| classify_operand(key, op)).collect()
}

/// Returns true if any two operands refer to overlapping register storage.
pub fn detect_aliasing(operands: &[OperandDescriptor]) -> bool {
    let reg8: Vec<&str> = operands
        .iter()
        .filter(|op| op.kind == OperandType::Reg8)
        .map(|op| op.name.as_str())
        .collect();
    let reg16: Vec<&str> = operands
        .iter()
        .filter(|op| matches!(op.kind, OperandType::Reg16 | OperandType::RegSP))
        .map(|op| op.name.as_str())
        .collect();

    let has_duplicate = |names: &[&str]| {
        names
            .iter()
            .enumerate()
            .any(|(i, a)| names[i + 1..].iter().any(|b| a == b))
    };

    has_duplicate(&reg8) || has_duplicate(&reg16) || reg8.iter().any(|r| reg16.iter().any(|pair| pair.contains(r)))
}
