// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The label pipeline: build the name -> cell index map by consuming
//! `LABEL`-pseudos, resolve every symbolic reference against it, and
//! materialize trailing `DEF` cells for id-constants that weren't
//! reused from an existing instruction (spec §4.5).
//!
//! Unlike the original, which keeps consumed `LABEL` statements in
//! place and skips them via a `do_ignore` flag at print time, this
//! physically drops them from the statement vector as soon as they're
//! folded into the map -- every stage after [`build_map`] only ever
//! sees real instructions, so a cell's final index is just its
//! position in the vector.

use std::collections::HashMap;

use crate::error::UndefinedLabel;
use crate::stmt::{AType, Cmd, Stmt};

pub type LabelMap = HashMap<String, usize>;

/// First pass (spec §4.5.1): fold every `LABEL`-pseudo into `name ->
/// cell index` and remove it from `stmts`; convert `Relative` arguments
/// to `Absolute` using the cell index they'd occupy.
pub fn build_map(stmts: &mut Vec<Stmt>) -> LabelMap {
    let mut labels = LabelMap::new();
    let mut cell = 0usize;
    stmts.retain_mut(|stmt| {
        if stmt.cmd == Cmd::Label {
            let name = stmt.sym_arg.take().expect("label statement always carries a name");
            labels.insert(name, cell);
            return false;
        }
        if stmt.atyp == AType::Relative {
            stmt.atyp = AType::Absolute;
            stmt.int_arg += cell as i32;
        }
        cell += 1;
        true
    });
    labels
}

/// Second pass (spec §4.5.2): resolve every surviving `Label` argument
/// against the map built by [`build_map`]. The first unresolved
/// reference is a hard failure.
pub fn resolve(stmts: &mut [Stmt], labels: &LabelMap) -> Result<(), UndefinedLabel> {
    for stmt in stmts {
        if stmt.atyp != AType::Label {
            continue;
        }
        let name = stmt.sym_arg.as_deref().expect("label-typed statement always carries a name");
        match labels.get(name) {
            Some(&idx) => {
                stmt.int_arg = idx as i32;
                stmt.sym_arg = None;
                stmt.atyp = AType::Absolute;
            }
            None => {
                return Err(UndefinedLabel {
                    name: name.to_string(),
                    cmd: stmt.cmd,
                });
            }
        }
    }
    Ok(())
}

/// Spec §4.5.4-5: resolve every `IdConst` argument against `labels`
/// (already seeded with reuse hits by [`crate::idconst::find_reusable`]),
/// allocating a new trailing cell for whichever values weren't reused,
/// then append one `DEF` per newly allocated constant in first-seen
/// order.
pub fn materialize_idconsts(stmts: &mut Vec<Stmt>, labels: &mut LabelMap) {
    let base_len = stmts.len();
    let mut new_consts: Vec<i32> = Vec::new();
    for stmt in stmts.iter_mut() {
        if stmt.atyp != AType::IdConst {
            continue;
        }
        let value = stmt.int_arg;
        let key = format!("${value}");
        let idx = match labels.get(&key) {
            Some(&idx) => idx,
            None => {
                // lands just past the last real instruction, plus
                // however many new constants are already queued ahead of
                // it in this same pass.
                let idx = base_len + new_consts.len();
                labels.insert(key, idx);
                new_consts.push(value);
                idx
            }
        };
        stmt.int_arg = idx as i32;
        stmt.atyp = AType::Absolute;
    }
    for value in new_consts {
        stmts.push(Stmt::with_int(Cmd::Def, AType::Absolute, value));
    }
}
