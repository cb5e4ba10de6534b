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

    error.rs

    Defines the error type for the opcode generator. Every fault carries the
    identity of the offending opcode or family and maps onto a fault class.

*/

use std::fmt::{self, Display};

use crate::{flags::Flag, table::OpcodeKey};

/// The broad category of a generation fault.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaultClass {
    /// The opcode table, or the table and the authored catalog, disagree with themselves.
    DataInconsistency,
    /// An opcode in the table has no authored semantics.
    AuthoringGap,
    /// A computed flag has no way of being computed.
    FlagSpecViolation,
    /// A family's test fixtures do not cover what the generated tests need.
    TestFixtureMissing,
}

impl Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FaultClass::DataInconsistency => write!(f, "data inconsistency"),
            FaultClass::AuthoringGap => write!(f, "authoring gap"),
            FaultClass::FlagSpecViolation => write!(f, "flag specification violation"),
            FaultClass::TestFixtureMissing => write!(f, "missing test fixture"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum OpgenError {
    #[error("Malformed opcode table: {0}")]
    TableParse(#[from] serde_json::Error),
    #[error("Invalid opcode key '{0}'")]
    InvalidOpcodeKey(String),
    #[error("Opcode {key}: invalid {flag} flag state '{state}'")]
    InvalidFlagState { key: OpcodeKey, flag: Flag, state: String },
    #[error("Opcode {key}: expected one or two cycle counts, found {count}")]
    InvalidCycles { key: OpcodeKey, count: usize },
    #[error("Opcode {key}: byte length {length} does not fit its operands")]
    InvalidLength { key: OpcodeKey, length: u8 },
    #[error("Opcode {key} is claimed by both '{first}' and '{second}'")]
    DuplicateOpcode {
        key:    OpcodeKey,
        first:  String,
        second: String,
    },
    #[error("Family '{family}' claims opcode {key}, which is not in the opcode table")]
    MissingOpcode { family: String, key: OpcodeKey },
    #[error("Family name '{0}' is used more than once")]
    DuplicateFamily(String),
    #[error("Family '{0}' claims no opcodes")]
    EmptyFamily(String),
    #[error("Opcode {key}: unsupported operand '{operand}'")]
    UnsupportedOperand { key: OpcodeKey, operand: String },
    #[error("Family '{family}', opcode {key}: {reason}")]
    UnsupportedLayout {
        family: String,
        key:    OpcodeKey,
        reason: String,
    },
    #[error("Instruction data not unique for family '{family}': {opcodes}")]
    DivergentFamily { family: String, opcodes: String },
    #[error("No authored semantics for {mnemonic} ({opcodes})")]
    AuthoringGap { mnemonic: String, opcodes: String },
    #[error("Family '{family}', {flag} flag: {reason}")]
    FlagSpecViolation {
        family: String,
        flag:   Flag,
        reason: String,
    },
    #[error("Family '{family}', opcode {key}: {reason}")]
    TestFixtureMissing {
        family: String,
        key:    OpcodeKey,
        reason: String,
    },
    #[error("Family '{family}', opcode {key}: invalid fixture: {reason}")]
    InvalidFixture {
        family: String,
        key:    OpcodeKey,
        reason: String,
    },
}

impl OpgenError {
    pub fn class(&self) -> FaultClass {
        match self {
            OpgenError::TableParse(_)
            | OpgenError::InvalidOpcodeKey(_)
            | OpgenError::InvalidFlagState { .. }
            | OpgenError::InvalidCycles { .. }
            | OpgenError::InvalidLength { .. }
            | OpgenError::DuplicateOpcode { .. }
            | OpgenError::MissingOpcode { .. }
            | OpgenError::DuplicateFamily(_)
            | OpgenError::EmptyFamily(_)
            | OpgenError::UnsupportedOperand { .. }
            | OpgenError::UnsupportedLayout { .. }
            | OpgenError::DivergentFamily { .. } => FaultClass::DataInconsistency,
            OpgenError::AuthoringGap { .. } => FaultClass::AuthoringGap,
            OpgenError::FlagSpecViolation { .. } => FaultClass::FlagSpecViolation,
            OpgenError::TestFixtureMissing { .. } | OpgenError::InvalidFixture { .. } => {
                FaultClass::TestFixtureMissing
            }
        }
    }
}
