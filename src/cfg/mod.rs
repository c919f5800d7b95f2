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

//! The "deep" optimizer: builds a control-flow graph of basic blocks
//! from the linear statement stream, merges single-use straight-line
//! blocks and drops unreachable ones, then re-linearizes with the
//! minimal set of synthetic jumps and labels (spec §4.3).
//!
//! Blocks live in a single `Vec<Block>` arena owned by this pass; the
//! three typed exits are plain `Option<BlockId>` indices rather than
//! the raw `zdo_basic_block*` pointers of the original implementation,
//! so there is no lifetime cycle to worry about (Design Note 1).

mod build;
mod emit;
mod simplify;

use crate::stmt::Stmt;

/// An index into the block arena used during one run of the deep pass.
pub type BlockId = usize;

/// A basic block: a maximal run of straight-line instructions with a
/// single entry and up to three typed exits.
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Labels that denote this block's address, in declaration order;
    /// the first is canonical (used whenever some other block needs to
    /// name this one as a jump target).
    pub entry_labels: Vec<String>,
    /// Number of live edges into this block, plus one for each entry
    /// label that is targeted from a statement body (e.g. a `CAL`).
    pub entry_count: usize,
    /// Whether this block's address is itself a jump target (including
    /// program entry). Used in Fini to decide whether a trailing `HLT`
    /// must be made explicit.
    pub is_jump_target: bool,
    /// Fall-through or unconditional-jump successor. `None` means the
    /// block's natural end is program termination (`HLT`).
    pub exit_norm: Option<BlockId>,
    /// Taken branch of a trailing `JPO`.
    pub exit_ovfl: Option<BlockId>,
    /// Taken branch of a trailing `JPS`.
    pub exit_sign: Option<BlockId>,
    pub body: Vec<Stmt>,
}

impl Block {
    fn is_unused(&self) -> bool {
        self.entry_count == 0
    }
}

/// Decrement `target`'s entry count, logging (but not failing) if it
/// was already at zero -- spec §4.3.5 treats this as a reportable
/// internal inconsistency, not a fatal error.
fn unref(blocks: &mut [Block], target: BlockId) {
    if blocks[target].entry_count == 0 {
        log::error!(
            "deep optimizer: decrement on block {target} already at zero entry_count"
        );
    } else {
        blocks[target].entry_count -= 1;
    }
}

/// Unreference whichever of a block's three exits are set, as when the
/// block itself is discarded.
fn unref_all_exits(blocks: &mut [Block], id: BlockId) {
    for exit in [
        blocks[id].exit_norm,
        blocks[id].exit_ovfl,
        blocks[id].exit_sign,
    ] {
        if let Some(target) = exit {
            unref(blocks, target);
        }
    }
    blocks[id].exit_norm = None;
    blocks[id].exit_ovfl = None;
    blocks[id].exit_sign = None;
}

/// Run the full deep pass: Init, then Run+Cleanup to a fixed point,
/// then Fini. Replaces `stmts` in place with the re-linearized form.
pub fn optimize(stmts: &mut Vec<Stmt>, verbose: bool) {
    let mut blocks = build::init(std::mem::take(stmts), verbose);
    simplify::cleanup(&mut blocks);
    loop {
        let before = blocks.len();
        simplify::run(&mut blocks);
        simplify::cleanup(&mut blocks);
        if blocks.len() == before {
            break;
        }
    }
    *stmts = emit::fini(blocks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{AType, Cmd};

    #[test]
    fn trivial_straight_line_program_keeps_its_body_and_entry_label() {
        // The single surviving block still carries a (synthetic) entry
        // label pseudo -- the deep pass doesn't strip those, the later
        // label pipeline does.
        let mut stmts = vec![
            Stmt::with_int(Cmd::Lda, AType::Absolute, 0),
            Stmt::with_int(Cmd::Add, AType::Absolute, 1),
            Stmt::new(Cmd::Hlt, AType::None),
        ];
        optimize(&mut stmts, false);
        assert_eq!(
            stmts,
            vec![
                Stmt::label("%0"),
                Stmt::with_int(Cmd::Lda, AType::Absolute, 0),
                Stmt::with_int(Cmd::Add, AType::Absolute, 1),
                Stmt::new(Cmd::Hlt, AType::None),
            ]
        );
    }

    #[test]
    fn jump_to_immediately_following_hlt_collapses() {
        let mut stmts = vec![
            Stmt::with_sym(Cmd::Jmp, AType::Label, "done"),
            Stmt::label("done"),
            Stmt::new(Cmd::Hlt, AType::None),
        ];
        optimize(&mut stmts, false);
        // The jump and its target block merge away entirely; only the
        // entry block (now under its own synthetic name) remains.
        assert_eq!(
            stmts,
            vec![Stmt::label("%0"), Stmt::new(Cmd::Hlt, AType::None)]
        );
    }
}
