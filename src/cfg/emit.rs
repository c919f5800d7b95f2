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

//! Fini: re-linearize the surviving blocks back into a statement
//! stream, emitting a label for every block unconditionally and a
//! `JMP` only where the target isn't the next block in emission order
//! (spec §4.3.4).

use super::Block;
use crate::stmt::{AType, Cmd, Stmt};

pub(super) fn fini(mut blocks: Vec<Block>) -> Vec<Stmt> {
    let n = blocks.len();

    // Forward-propagate is_jump_target across live exits, so a block only
    // reachable via a jump-targeted predecessor is itself treated as a
    // jump target when deciding whether its trailing HLT is implicit.
    for i in 0..n {
        if blocks[i].is_jump_target {
            for exit in [blocks[i].exit_norm, blocks[i].exit_ovfl, blocks[i].exit_sign] {
                if let Some(t) = exit {
                    blocks[t].is_jump_target = true;
                }
            }
        }
    }

    let names: Vec<String> = blocks
        .iter()
        .map(|b| b.entry_labels.first().cloned().unwrap_or_default())
        .collect();

    let mut out = Vec::new();
    for (i, block) in blocks.into_iter().enumerate() {
        for name in &block.entry_labels {
            out.push(Stmt::label(name.clone()));
        }
        let is_jump_target = block.is_jump_target;
        out.extend(block.body);
        if let Some(t) = block.exit_ovfl {
            out.push(Stmt::with_sym(Cmd::Jpo, AType::Label, names[t].clone()));
        }
        if let Some(t) = block.exit_sign {
            out.push(Stmt::with_sym(Cmd::Jps, AType::Label, names[t].clone()));
        }
        match block.exit_norm {
            None => {
                if is_jump_target {
                    out.push(Stmt::new(Cmd::Hlt, AType::None));
                }
            }
            Some(t) if t == i + 1 && t < n => {}
            Some(t) => out.push(Stmt::with_sym(Cmd::Jmp, AType::Label, names[t].clone())),
        }
    }
    out
}
