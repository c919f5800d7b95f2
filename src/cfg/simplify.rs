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

//! Run and Cleanup: splice away single-use straight-line successors,
//! then drop whatever became unreachable (spec §4.3.2, §4.3.3).

use super::{unref_all_exits, Block};

/// Splice every block `a` that ends in a plain `exit_norm` (no `JPO`/
/// `JPS` of its own) whose target `b` is used nowhere else
/// (`entry_count == 1`) into `a` itself: `b`'s body and exits are
/// absorbed and `b` is left with `entry_count == 0` for [`cleanup`] to
/// collect. Runs to a local fixed point so absorbed chains merge in one
/// call. Returns whether anything changed.
pub(super) fn run(blocks: &mut [Block]) -> bool {
    let mut changed = false;
    loop {
        let mut progressed = false;
        for a in 0..blocks.len() {
            if blocks[a].exit_ovfl.is_some() || blocks[a].exit_sign.is_some() {
                continue;
            }
            let Some(b) = blocks[a].exit_norm else {
                continue;
            };
            if b == a || blocks[b].entry_count != 1 {
                continue;
            }
            let body = std::mem::take(&mut blocks[b].body);
            let exit_norm = blocks[b].exit_norm;
            let exit_ovfl = blocks[b].exit_ovfl;
            let exit_sign = blocks[b].exit_sign;
            blocks[a].body.extend(body);
            blocks[a].exit_norm = exit_norm;
            blocks[a].exit_ovfl = exit_ovfl;
            blocks[a].exit_sign = exit_sign;
            blocks[b].exit_norm = None;
            blocks[b].exit_ovfl = None;
            blocks[b].exit_sign = None;
            blocks[b].entry_count = 0;
            progressed = true;
            changed = true;
        }
        if !progressed {
            break;
        }
    }
    changed
}

/// Repeatedly drop blocks with `entry_count == 0`, unreferencing
/// whatever they in turn pointed at (which may cascade), until none
/// remain, then physically compact the arena and remap every
/// `BlockId`. Block 0's seeded entry count never reaches zero on its
/// own, so program entry is never collected.
pub(super) fn cleanup(blocks: &mut Vec<Block>) {
    loop {
        let dead: Vec<bool> = blocks.iter().map(Block::is_unused).collect();
        if !dead.iter().any(|&d| d) {
            break;
        }
        for (id, &is_dead) in dead.iter().enumerate() {
            if is_dead {
                unref_all_exits(blocks, id);
            }
        }

        let mut remap = vec![None; blocks.len()];
        let mut kept = Vec::with_capacity(blocks.len());
        for (old_idx, block) in std::mem::take(blocks).into_iter().enumerate() {
            if dead[old_idx] {
                continue;
            }
            remap[old_idx] = Some(kept.len());
            kept.push(block);
        }
        for block in &mut kept {
            block.exit_norm = block.exit_norm.and_then(|t| remap[t]);
            block.exit_ovfl = block.exit_ovfl.and_then(|t| remap[t]);
            block.exit_sign = block.exit_sign.and_then(|t| remap[t]);
        }
        *blocks = kept;
    }
}
