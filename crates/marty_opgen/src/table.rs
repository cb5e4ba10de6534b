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

    table.rs

    Loads the cached SM83 opcode table (JSON) into normalized per-opcode records and
    attaches each record to the authored family that claims it.

*/

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use indexmap::IndexMap;
use serde_derive::Deserialize;

use crate::{
    error::OpgenError,
    flags::{Flag, FlagEffect, FlagEffectMap},
    semantics::FamilySemantics,
};

/// The prefix byte selecting the SM83's second opcode page.
pub const CB_PREFIX: u8 = 0xCB;

const fn _default_true() -> bool {
    true
}

/// Identifies an opcode by its optional prefix byte and its opcode byte.
/// Ordering is table order: the unprefixed page first, then by byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpcodeKey {
    pub prefix: Option<u8>,
    pub opcode: u8,
}

impl OpcodeKey {
    pub const fn new(opcode: u8) -> Self {
        Self { prefix: None, opcode }
    }

    pub const fn prefixed(opcode: u8) -> Self {
        Self {
            prefix: Some(CB_PREFIX),
            opcode,
        }
    }

    /// The bytes that select this opcode, prefix first.
    pub fn bytes(&self) -> Vec<u8> {
        match self.prefix {
            Some(prefix) => vec![prefix, self.opcode],
            None => vec![self.opcode],
        }
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix.map_or(0, |_| 1)
    }

    /// A lowercase identifier fragment, e.g. `06` or `cb40`.
    pub fn slug(&self) -> String {
        self.bytes().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl Display for OpcodeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "0x{:02X} 0x{:02X}", prefix, self.opcode),
            None => write!(f, "0x{:02X}", self.opcode),
        }
    }
}

impl FromStr for OpcodeKey {
    type Err = OpgenError;

    /// Accepts `06`, `0x06`, `CB40`, `CB:40`, `CB 40` and `0xCB 0x40`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s
            .trim()
            .to_uppercase()
            .replace("0X", "")
            .chars()
            .filter(|c| !matches!(c, ':' | ' ' | '_'))
            .collect();

        let bad_key = || OpgenError::InvalidOpcodeKey(s.to_string());

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad_key());
        }

        match digits.len() {
            1 | 2 => u8::from_str_radix(&digits, 16)
                .map(OpcodeKey::new)
                .map_err(|_| bad_key()),
            4 if digits.starts_with("CB") => u8::from_str_radix(&digits[2..], 16)
                .map(OpcodeKey::prefixed)
                .map_err(|_| bad_key()),
            _ => Err(bad_key()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    unprefixed: IndexMap<String, RawEntry>,
    #[serde(default, alias = "cbprefixed")]
    prefixed: IndexMap<String, RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    mnemonic: String,
    bytes: u8,
    cycles: Vec<u8>,
    #[serde(default)]
    operands: Vec<RawOperand>,
    flags: RawFlags,
}

#[derive(Debug, Deserialize)]
struct RawFlags {
    #[serde(rename = "Z")]
    z: String,
    #[serde(rename = "N")]
    n: String,
    #[serde(rename = "H")]
    h: String,
    #[serde(rename = "C")]
    c: String,
}

/// An operand exactly as the table describes it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RawOperand {
    pub name: String,
    #[serde(default = "_default_true")]
    pub immediate: bool,
    #[serde(default)]
    pub increment: bool,
    #[serde(default)]
    pub decrement: bool,
}

impl RawOperand {
    pub fn new(name: &str, immediate: bool) -> Self {
        Self {
            name: name.to_string(),
            immediate,
            increment: false,
            decrement: false,
        }
    }
}

/// Cycle counts. Conditional instructions carry a second count for the path not taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cycles {
    pub base: u8,
    pub alternate: Option<u8>,
}

#[derive(Clone, Debug)]
pub struct OpcodeRecord {
    pub key: OpcodeKey,
    pub mnemonic: String,
    pub operands: Vec<RawOperand>,
    pub flags: FlagEffectMap,
    pub length: u8,
    pub cycles: Cycles,
    family: Option<usize>,
}

impl OpcodeRecord {
    /// Index into the catalog of the family claiming this opcode, if any.
    pub fn family(&self) -> Option<usize> {
        self.family
    }

    /// The table's own assembly form, e.g. `LD B, n8` or `LD A, [HL]`.
    pub fn assembly(&self) -> String {
        let operands: Vec<String> = self
            .operands
            .iter()
            .map(|op| {
                let mut name = op.name.clone();
                if op.increment {
                    name.push('+');
                }
                else if op.decrement {
                    name.push('-');
                }
                if op.immediate {
                    name
                }
                else {
                    format!("[{}]", name)
                }
            })
            .collect();

        if operands.is_empty() {
            self.mnemonic.clone()
        }
        else {
            format!("{} {}", self.mnemonic, operands.join(", "))
        }
    }

    fn from_raw(key: OpcodeKey, raw: RawEntry) -> Result<Self, OpgenError> {
        let parse_flag = |flag: Flag, state: &str| {
            FlagEffect::parse(flag, state).ok_or_else(|| OpgenError::InvalidFlagState {
                key,
                flag,
                state: state.to_string(),
            })
        };

        let flags = FlagEffectMap::new(
            parse_flag(Flag::Z, &raw.flags.z)?,
            parse_flag(Flag::N, &raw.flags.n)?,
            parse_flag(Flag::H, &raw.flags.h)?,
            parse_flag(Flag::C, &raw.flags.c)?,
        );

        let cycles = match raw.cycles.as_slice() {
            [base] => Cycles {
                base: *base,
                alternate: None,
            },
            [base, alternate] => Cycles {
                base: *base,
                alternate: Some(*alternate),
            },
            other => {
                return Err(OpgenError::InvalidCycles {
                    key,
                    count: other.len(),
                })
            }
        };

        if raw.bytes <= key.prefix_len() {
            return Err(OpgenError::InvalidLength { key, length: raw.bytes });
        }

        Ok(OpcodeRecord {
            key,
            mnemonic: raw.mnemonic,
            operands: raw.operands,
            flags,
            length: raw.bytes,
            cycles,
            family: None,
        })
    }
}

/// The loaded opcode table, in table order.
#[derive(Debug, Default)]
pub struct OpcodeTable {
    records: IndexMap<OpcodeKey, OpcodeRecord>,
}

impl OpcodeTable {
    /// Parse the opcode table without attaching any families.
    pub fn from_json(json: &str) -> Result<Self, OpgenError> {
        let raw: RawTable = serde_json::from_str(json)?;
        let mut records = IndexMap::new();

        let partitions = [(None, raw.unprefixed), (Some(CB_PREFIX), raw.prefixed)];
        for (prefix, partition) in partitions {
            for (key_str, entry) in partition {
                let mut key: OpcodeKey = key_str.parse()?;
                if key.prefix.is_none() {
                    key.prefix = prefix;
                }
                if key.prefix != prefix {
                    return Err(OpgenError::InvalidOpcodeKey(key_str));
                }

                let record = OpcodeRecord::from_raw(key, entry)?;
                if records.insert(key, record).is_some() {
                    return Err(OpgenError::InvalidOpcodeKey(key_str));
                }
            }
        }

        records.sort_keys();
        log::debug!("Loaded {} opcodes from table", records.len());
        Ok(OpcodeTable { records })
    }

    /// Parse the opcode table and attach every claimed opcode to its family.
    pub fn load(json: &str, catalog: &[FamilySemantics]) -> Result<Self, OpgenError> {
        let mut table = OpcodeTable::from_json(json)?;
        table.assign_families(catalog)?;
        Ok(table)
    }

    fn assign_families(&mut self, catalog: &[FamilySemantics]) -> Result<(), OpgenError> {
        for (index, family) in catalog.iter().enumerate() {
            for key in family.keys() {
                let record = self.records.get_mut(&key).ok_or_else(|| OpgenError::MissingOpcode {
                    family: family.name.to_string(),
                    key,
                })?;

                if let Some(existing) = record.family {
                    return Err(OpgenError::DuplicateOpcode {
                        key,
                        first: catalog[existing].name.to_string(),
                        second: family.name.to_string(),
                    });
                }
                record.family = Some(index);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &OpcodeKey) -> Option<&OpcodeRecord> {
        self.records.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpcodeRecord> {
        self.records.values()
    }

    /// Records claimed by the family at `index`, in table order.
    pub fn members(&self, index: usize) -> impl Iterator<Item = &OpcodeRecord> {
        self.records.values().filter(move |r| r.family == Some(index))
    }

    pub fn unclaimed(&self) -> impl Iterator<Item = &OpcodeRecord> {
        self.records.values().filter(|r| r.family.is_none())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
