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

//! Init: turn the linear statement stream into a block arena (spec
//! §4.3.1), grounded on `zdo_data::do_init` in the original optimizer.

use std::collections::HashMap;

use super::Block;
use crate::stmt::{AType, Cmd, Stmt};

/// Start a fresh block, optionally wiring the outgoing block's
/// `exit_norm` to it when that block doesn't already have one (i.e. it
/// falls through rather than ending on an unconditional jump).
fn split(blocks: &mut Vec<Block>, current: usize, link_fallthrough: bool) -> usize {
    let new_idx = blocks.len();
    blocks.push(Block::default());
    if link_fallthrough && blocks[current].exit_norm.is_none() {
        blocks[current].exit_norm = Some(new_idx);
        blocks[new_idx].entry_count += 1;
    }
    new_idx
}

pub(super) fn init(stmts: Vec<Stmt>, verbose: bool) -> Vec<Block> {
    let mut blocks: Vec<Block> = vec![Block::default()];
    blocks[0].entry_count = 1;
    blocks[0].is_jump_target = true;
    let mut current = 0usize;

    // Label name -> source block, one entry per JMP/JPO/JPS referencing it.
    let mut jmp_cache: HashMap<String, Vec<usize>> = HashMap::new();
    let mut jpo_cache: HashMap<String, Vec<usize>> = HashMap::new();
    let mut jps_cache: HashMap<String, Vec<usize>> = HashMap::new();
    // Label name -> every block that declares it, in declaration order.
    let mut dest_cache: HashMap<String, Vec<usize>> = HashMap::new();

    for stmt in stmts {
        match (stmt.cmd, stmt.atyp) {
            (Cmd::Label, _) => {
                let name = stmt.sym_arg.expect("label statement always carries a name");
                if !blocks[current].body.is_empty() {
                    current = split(&mut blocks, current, true);
                }
                blocks[current].entry_labels.push(name.clone());
                dest_cache.entry(name).or_default().push(current);
            }
            (Cmd::Jmp, AType::Label) => {
                let name = stmt.sym_arg.expect("jmp label always carries a name");
                jmp_cache.entry(name).or_default().push(current);
                current = split(&mut blocks, current, false);
            }
            (Cmd::Jpo, AType::Label) => {
                let name = stmt.sym_arg.expect("jpo label always carries a name");
                jpo_cache.entry(name).or_default().push(current);
                current = split(&mut blocks, current, true);
            }
            (Cmd::Jps, AType::Label) => {
                let name = stmt.sym_arg.expect("jps label always carries a name");
                jps_cache.entry(name).or_default().push(current);
                current = split(&mut blocks, current, true);
            }
            (Cmd::Hlt, _) => {
                // HLT carries no operand and terminates the block; Fini
                // regenerates it from `exit_norm == None`, so it is not
                // itself kept in the body.
                blocks[current].exit_norm = None;
                current = split(&mut blocks, current, false);
            }
            _ => {
                blocks[current].body.push(stmt);
            }
        }
    }

    // Duplicate declarations: warn (when verbose) and keep the last one.
    let mut dest: HashMap<String, usize> = HashMap::with_capacity(dest_cache.len());
    for (name, mut owners) in dest_cache {
        if owners.len() > 1 && verbose {
            log::warn!("duplicate label '{name}' defined {} times, last wins", owners.len());
        }
        dest.insert(name, owners.pop().expect("push always happens before owners exists"));
    }

    // Assign synthetic names to blocks no source label ever touched.
    let mut anon = 0usize;
    for block in &mut blocks {
        if block.entry_labels.is_empty() {
            block.entry_labels.push(format!("%{anon}"));
            anon += 1;
        }
    }

    // Body references (e.g. a `CAL target`) keep their target block alive
    // even though they never split the block graph.
    let mut body_refs = Vec::new();
    for block in &blocks {
        for stmt in &block.body {
            if stmt.atyp == AType::Label {
                if let Some(name) = stmt.sym_arg.as_deref() {
                    if let Some(&target) = dest.get(name) {
                        body_refs.push(target);
                    }
                }
            }
        }
    }
    for target in body_refs {
        blocks[target].entry_count += 1;
    }

    drain_cache(&mut blocks, jmp_cache, &dest, |b, t| b.exit_norm = Some(t));
    drain_cache(&mut blocks, jpo_cache, &dest, |b, t| b.exit_ovfl = Some(t));
    drain_cache(&mut blocks, jps_cache, &dest, |b, t| b.exit_sign = Some(t));

    blocks
}

/// Wire every cached `(name, sources)` pair to its resolved destination
/// block, via `set_exit`, bumping the destination's entry count once per
/// source edge and propagating `is_jump_target` from any source block
/// that already carried it.
///
/// Names absent from `dest` are genuinely undefined labels; they are
/// left unresolved here and surface as an [`crate::error::UndefinedLabel`]
/// during label resolution later in the pipeline.
fn drain_cache(
    blocks: &mut [Block],
    cache: HashMap<String, Vec<usize>>,
    dest: &HashMap<String, usize>,
    set_exit: impl Fn(&mut Block, usize),
) {
    for (name, sources) in cache {
        let Some(&target) = dest.get(&name) else {
            continue;
        };
        let mut any_jump_target = false;
        for &src in &sources {
            set_exit(&mut blocks[src], target);
            any_jump_target |= blocks[src].is_jump_target;
        }
        blocks[target].entry_count += sources.len();
        blocks[target].is_jump_target |= any_jump_target;
    }
}
