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

    semantics::mod.rs

    The curated semantic layer. Each mnemonic family names the opcodes it covers,
    supplies the Rust fragment implementing it, states how its computed flags are
    produced, and generates the test fixtures for any concrete member opcode.

*/

//! Authoring contract for fragments.
//!
//! A fragment is spliced into the family's execution routine after the program counter
//! has been advanced. It may use the following bindings:
//!
//! - `pc: &mut u16`
//! - `registers: &mut Registers`, indexed by `Reg8` and accessed through `get16`/`set16` for `Reg16`
//! - `memory`, indexable by `usize`, when an operand is indirect or memory access is declared
//! - `dst_register`, `src_register` for register operands in first and second position
//! - `immediate` (`u8` or `u16`) and `literal` (`u8`)
//! - one flag parameter per fixed or computed flag (`&mut bool`), or per declared flag read (`bool`)
//!
//! In a conditional family the first operand is a branch condition. The routine receives it as
//! `condition_flag` and `flag_condition` and returns early when they differ, so the fragment only
//! describes the taken branch.
//!
//! A fragment producing a computed Z flag must bind `result`. A fragment producing a computed
//! H or C flag through a carry width must bind `operand1`, `operand2` and `result`, with
//! `result` wide enough to hold the carry bit.

mod alu;
mod bits;
mod control;
mod fixtures;
mod loads;

use std::collections::BTreeMap;

pub use fixtures::{Expectation, Preset, TestScenario};

use crate::{
    flags::{CarryWidth, Flag},
    operand::{self, OperandDescriptor},
    table::{OpcodeKey, CB_PREFIX},
    table::RawOperand,
};

/// Generates a family's test scenarios from one member's classified operands.
pub type FixtureFn = fn(&[OperandDescriptor]) -> Fixtures;

/// How a family touches memory outside of its indirect operands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemoryAccess {
    #[default]
    None,
    Read,
    Write,
}

/// State a fragment uses without it appearing as an operand.
#[derive(Clone, Debug, Default)]
pub struct ImplicitAccess {
    pub registers: bool,
    pub memory: MemoryAccess,
    pub reads_flags: Vec<Flag>,
}

/// Per-family adjustment of the table's operand list before classification.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OperandRewrite {
    #[default]
    None,
    /// Drop the first operand. `LD HL, SP+e8` names its fixed destination.
    DropFirst,
    /// Insert a register operand the table leaves implicit, as in `SUB B`.
    PrependRegister(&'static str),
}

impl OperandRewrite {
    pub fn apply(&self, operands: &[RawOperand]) -> Vec<RawOperand> {
        match self {
            OperandRewrite::None => operands.to_vec(),
            OperandRewrite::DropFirst => operands.iter().skip(1).cloned().collect(),
            OperandRewrite::PrependRegister(name) => {
                if operands.first().is_some_and(|op| op.name == *name) {
                    operands.to_vec()
                }
                else {
                    std::iter::once(RawOperand::new(name, true))
                        .chain(operands.iter().cloned())
                        .collect()
                }
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScenarioKind {
    Baseline,
    FlagCase(Flag),
}

impl ScenarioKind {
    pub fn slug(&self) -> String {
        match self {
            ScenarioKind::Baseline => "base".to_string(),
            ScenarioKind::FlagCase(flag) => format!("flag_{}", flag.letter().to_ascii_lowercase()),
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ScenarioKind::Baseline => write!(f, "baseline"),
            ScenarioKind::FlagCase(flag) => write!(f, "{} flag", flag),
        }
    }
}

/// The scenarios a fixture generator produced for one opcode, grouped by kind.
#[derive(Clone, Debug, Default)]
pub struct Fixtures {
    scenarios: BTreeMap<ScenarioKind, Vec<TestScenario>>,
    error: Option<String>,
}

impl Fixtures {
    pub fn new() -> Self {
        Self::default()
    }

    /// The member's operands cannot be turned into scenarios.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn baseline(mut self, scenario: TestScenario) -> Self {
        self.scenarios.entry(ScenarioKind::Baseline).or_default().push(scenario);
        self
    }

    pub fn flag(mut self, flag: Flag, scenario: TestScenario) -> Self {
        self.scenarios
            .entry(ScenarioKind::FlagCase(flag))
            .or_default()
            .push(scenario);
        self
    }

    pub fn get(&self, kind: ScenarioKind) -> &[TestScenario] {
        self.scenarios.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, kind: ScenarioKind) -> bool {
        !self.get(kind).is_empty()
    }

    /// All scenarios, baseline first, then flag cases in Z N H C order.
    pub fn iter(&self) -> impl Iterator<Item = (ScenarioKind, &TestScenario)> {
        self.scenarios
            .iter()
            .flat_map(|(kind, list)| list.iter().map(move |s| (*kind, s)))
    }
}

/// The authored description of one mnemonic family.
#[derive(Clone, Debug)]
pub struct FamilySemantics {
    pub name: &'static str,
    pub prefix: Option<u8>,
    pub opcodes: Vec<u8>,
    pub fragment: &'static str,
    pub carry_widths: Vec<(Flag, CarryWidth)>,
    pub self_managed: Vec<Flag>,
    pub implicit: ImplicitAccess,
    pub rewrite: OperandRewrite,
    /// The first operand is a branch condition and members carry a second cycle count.
    pub conditional: bool,
    pub fixtures: FixtureFn,
}

impl FamilySemantics {
    pub fn new(name: &'static str, opcodes: &[u8], fragment: &'static str, fixtures: FixtureFn) -> Self {
        Self {
            name,
            prefix: None,
            opcodes: opcodes.to_vec(),
            fragment,
            carry_widths: Vec::new(),
            self_managed: Vec::new(),
            implicit: ImplicitAccess::default(),
            rewrite: OperandRewrite::None,
            conditional: false,
            fixtures,
        }
    }

    /// Members live on the `0xCB` page.
    pub fn cb(mut self) -> Self {
        self.prefix = Some(CB_PREFIX);
        self
    }

    pub fn carry(mut self, flag: Flag, width: CarryWidth) -> Self {
        self.carry_widths.push((flag, width));
        self
    }

    /// The fragment assigns these flags itself.
    pub fn manages(mut self, flags: &[Flag]) -> Self {
        self.self_managed.extend_from_slice(flags);
        self
    }

    pub fn uses_registers(mut self) -> Self {
        self.implicit.registers = true;
        self
    }

    pub fn reads_memory(mut self) -> Self {
        self.implicit.memory = self.implicit.memory.max(MemoryAccess::Read);
        self
    }

    pub fn writes_memory(mut self) -> Self {
        self.implicit.memory = MemoryAccess::Write;
        self
    }

    pub fn reads_flags(mut self, flags: &[Flag]) -> Self {
        self.implicit.reads_flags.extend_from_slice(flags);
        self
    }

    pub fn rewrite(mut self, rewrite: OperandRewrite) -> Self {
        self.rewrite = rewrite;
        self
    }

    pub fn conditional(mut self) -> Self {
        self.conditional = true;
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = OpcodeKey> + '_ {
        self.opcodes.iter().map(move |opcode| OpcodeKey {
            prefix: self.prefix,
            opcode: *opcode,
        })
    }

    pub fn width_for(&self, flag: Flag) -> Option<CarryWidth> {
        self.carry_widths.iter().find(|(f, _)| *f == flag).map(|(_, w)| *w)
    }

    pub fn is_self_managed(&self, flag: Flag) -> bool {
        self.self_managed.contains(&flag)
    }

    /// Identifier fragment for generated code, e.g. `ld_r1_irr2` for `LD r1, (rr2)`.
    pub fn encoded_name(&self) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                current.push(c.to_ascii_lowercase());
                continue;
            }
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            if c == '(' {
                current.push('i');
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words.join("_")
    }
}

/// The SM83 semantic catalog, in emission order.
pub fn catalog() -> Vec<FamilySemantics> {
    let mut families = Vec::new();
    families.extend(loads::families());
    families.extend(alu::families());
    families.extend(bits::families());
    families.extend(control::families());
    families
}

/// Operand name at `index`, or an empty string. An empty name never passes fixture validation.
pub(crate) fn nth(operands: &[OperandDescriptor], index: usize) -> &str {
    operands.get(index).map(|op| op.name.as_str()).unwrap_or("")
}

pub(crate) fn literal(operands: &[OperandDescriptor], index: usize) -> Option<u8> {
    operands.get(index).and_then(|op| op.literal_value())
}

/// The branch condition named at `index`. `C` is accepted whatever it classified as.
pub(crate) fn condition(operands: &[OperandDescriptor], index: usize) -> Option<(Flag, bool)> {
    operand::condition(nth(operands, index))
}

#[cfg(test)]
pub(crate) fn operands(names: &[&str]) -> Vec<OperandDescriptor> {
    let raw: Vec<RawOperand> = names.iter().map(|name| RawOperand::new(name, true)).collect();
    operand::classify(OpcodeKey::new(0x00), &raw).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn encoded_names() {
        let f = |name: &'static str| FamilySemantics::new(name, &[], "", |_| Fixtures::new());
        assert_eq!(f("LD r, n").encoded_name(), "ld_r_n");
        assert_eq!(f("LD r1, (rr2)").encoded_name(), "ld_r1_irr2");
        assert_eq!(f("LD (HL), n").encoded_name(), "ld_ihl_n");
        assert_eq!(f("LD HL, SP+e8").encoded_name(), "ld_hl_sp_e8");
        assert_eq!(f("LDH A, (n)").encoded_name(), "ldh_a_in");
        assert_eq!(f("BIT n, r").encoded_name(), "bit_n_r");
    }

    #[test]
    fn catalog_names_unique() {
        let families = catalog();
        let mut names = HashSet::new();
        let mut encoded = HashSet::new();
        for family in &families {
            assert!(names.insert(family.name), "duplicate family {}", family.name);
            assert!(encoded.insert(family.encoded_name()), "duplicate encoding {}", family.name);
            assert!(!family.opcodes.is_empty(), "empty family {}", family.name);
        }
    }

    #[test]
    fn catalog_opcodes_unique() {
        let mut seen = HashSet::new();
        for family in catalog() {
            for key in family.keys() {
                assert!(seen.insert(key), "opcode {} claimed twice", key);
            }
        }
    }

    #[test]
    fn rewrites() {
        let ops = vec![
            RawOperand::new("HL", true),
            RawOperand::new("SP", true),
            RawOperand::new("e8", true),
        ];
        let dropped = OperandRewrite::DropFirst.apply(&ops);
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].name, "SP");

        let sub = vec![RawOperand::new("B", true)];
        let prepended = OperandRewrite::PrependRegister("A").apply(&sub);
        assert_eq!(prepended[0].name, "A");
        assert_eq!(prepended[1].name, "B");
        // Already explicit.
        assert_eq!(OperandRewrite::PrependRegister("A").apply(&prepended).len(), 2);
    }

    #[test]
    fn fixtures_order() {
        let fixtures = Fixtures::new()
            .flag(Flag::C, TestScenario::new())
            .baseline(TestScenario::new())
            .flag(Flag::Z, TestScenario::new());
        let kinds: Vec<ScenarioKind> = fixtures.iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                ScenarioKind::Baseline,
                ScenarioKind::FlagCase(Flag::Z),
                ScenarioKind::FlagCase(Flag::C)
            ]
        );
        assert!(!fixtures.contains(ScenarioKind::FlagCase(Flag::H)));
        assert!(fixtures.error().is_none());
    }

    #[test]
    fn operand_helpers() {
        let ops = operands(&["$38", "NZ"]);
        assert_eq!(nth(&ops, 0), "$38");
        assert_eq!(nth(&ops, 2), "");
        assert_eq!(literal(&ops, 0), Some(0x38));
        assert_eq!(literal(&ops, 1), None);
        assert_eq!(condition(&ops, 1), Some((Flag::Z, false)));
        assert_eq!(condition(&operands(&["C"]), 0), Some((Flag::C, true)));
        assert_eq!(condition(&ops, 0), None);
    }
}
