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

    pipeline.rs

    Runs a complete generation: loads the table against the catalog, validates every
    family, and emits the decode, execution and test artifacts.

*/

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::{
    descriptor::InstructionDescriptor,
    emit,
    error::OpgenError,
    semantics::FamilySemantics,
    table::{OpcodeKey, OpcodeTable},
};

#[derive(Clone, Debug, Default)]
pub struct GenerationOptions {
    /// Restrict output to these opcodes. Every listed opcode must be claimed by a family.
    pub opcode_filter: Option<BTreeSet<OpcodeKey>>,
}

impl GenerationOptions {
    pub fn with_filter<I: IntoIterator<Item = OpcodeKey>>(keys: I) -> Self {
        Self {
            opcode_filter: Some(keys.into_iter().collect()),
        }
    }

    fn selects(&self, key: OpcodeKey) -> bool {
        self.opcode_filter.as_ref().map_or(true, |filter| filter.contains(&key))
    }
}

/// The three generated texts, ready to be spliced into the emulator sources.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub decode: String,
    pub execution: String,
    pub tests: String,
}

/// Family names and the identifiers derived from them must be unique.
fn check_catalog(catalog: &[FamilySemantics]) -> Result<(), OpgenError> {
    let mut names = HashSet::new();
    let mut encoded = HashSet::new();
    for family in catalog {
        if !names.insert(family.name) || !encoded.insert(family.encoded_name()) {
            return Err(OpgenError::DuplicateFamily(family.name.to_string()));
        }
        if family.opcodes.is_empty() {
            return Err(OpgenError::EmptyFamily(family.name.to_string()));
        }
    }
    Ok(())
}

/// Report table opcodes no family claims. Fatal when such an opcode was asked for.
fn check_authoring_gaps(table: &OpcodeTable, options: &GenerationOptions) -> Result<(), OpgenError> {
    if let Some(filter) = &options.opcode_filter {
        for key in filter {
            match table.get(key) {
                Some(record) if record.family().is_some() => {}
                Some(record) => {
                    return Err(OpgenError::AuthoringGap {
                        mnemonic: record.assembly(),
                        opcodes: key.to_string(),
                    })
                }
                None => {
                    return Err(OpgenError::AuthoringGap {
                        mnemonic: "opcode not in table".to_string(),
                        opcodes: key.to_string(),
                    })
                }
            }
        }
        return Ok(());
    }

    let mut gaps: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in table.unclaimed() {
        gaps.entry(record.mnemonic.clone()).or_default().push(record.key.to_string());
    }
    for (mnemonic, opcodes) in &gaps {
        log::warn!("No authored semantics for {} ({}), skipping", mnemonic, opcodes.join(", "));
    }
    Ok(())
}

/// Generate all three artifacts. Every family is merged and flag-checked regardless of the
/// filter, so a run restricted to a few opcodes still rejects an inconsistent catalog.
pub fn generate(
    table_json: &str,
    catalog: &[FamilySemantics],
    options: &GenerationOptions,
) -> Result<Artifacts, OpgenError> {
    check_catalog(catalog)?;

    let table = OpcodeTable::load(table_json, catalog)?;
    check_authoring_gaps(&table, options)?;

    let mut descriptors = Vec::with_capacity(catalog.len());
    for (index, family) in catalog.iter().enumerate() {
        let records: Vec<_> = table.members(index).collect();
        let desc = InstructionDescriptor::merge(family, &records)?;
        log::debug!(
            "Family '{}': {} opcodes, flags {}, length {}",
            family.name,
            desc.members.len(),
            desc.flags,
            desc.length
        );
        descriptors.push(desc);
    }

    let mut artifacts = Artifacts::default();
    let mut routines = Vec::new();
    let mut test_blocks = Vec::new();
    let mut opcode_count = 0;

    for desc in &descriptors {
        let routine = emit::execute::routine(desc)?;

        let selected: Vec<_> = desc.members.iter().filter(|m| options.selects(m.key())).collect();
        if selected.is_empty() {
            continue;
        }

        for member in selected {
            artifacts.decode.push_str(&emit::decode::branch(desc, member));
            test_blocks.push(emit::tests::cases(desc, member)?);
            opcode_count += 1;
        }
        routines.push(routine);
    }

    artifacts.execution = routines.join("\n");
    artifacts.tests = test_blocks.join("\n");

    log::info!(
        "Generated {} opcodes in {} routines ({} opcodes in table)",
        opcode_count,
        routines.len(),
        table.len()
    );
    Ok(artifacts)
}
