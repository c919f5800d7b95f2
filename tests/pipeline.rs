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

//! End-to-end scenarios driving the full pipeline (parse -> peephole ->
//! deep -> labels -> idconst -> writer) through the crate's public API,
//! the way `src/bin/lc1asm.rs` wires it together.

use lc1asm::{cfg, idconst, labels, parser, peephole, writer};

fn assemble(source: &str, deep: bool) -> String {
    let (mut stmts, errors) = parser::parse(source);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");

    peephole::optimize(&mut stmts, false);
    if deep {
        cfg::optimize(&mut stmts, false);
        peephole::optimize(&mut stmts, false);
    }

    let mut label_map = labels::build_map(&mut stmts);
    labels::resolve(&mut stmts, &label_map).unwrap();

    let reuse = idconst::find_reusable(&stmts, false);
    label_map.extend(reuse);
    labels::materialize_idconsts(&mut stmts, &mut label_map);

    let mut out = Vec::new();
    writer::write(&mut out, &stmts, false).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn add_then_sub_same_operand_cancels() {
    let out = assemble("lda @0\nadd @1\nsub @1\nhlt\n", false);
    assert_eq!(out, "0 LDA 0\n1 HLT\n");
}

#[test]
fn jump_to_trailing_hlt_collapses_under_deep_optimization() {
    let out = assemble("jmp done\ndone: hlt\n", true);
    assert_eq!(out, "0 HLT\n");
}

#[test]
fn tail_call_pattern_becomes_a_jump() {
    let out = assemble("cal fn\nret\nfn: add @0\nret\nhlt\n", false);
    // a call immediately followed by a return is equivalent to a jump.
    assert_eq!(out, "0 JMP 1\n1 ADD 0\n2 RET\n3 HLT\n");
}

#[test]
fn idconst_reused_against_existing_matching_instruction() {
    // 0x41 = hi=1 (LDB), lo=1 -- LDB 1 already exists, so the LDA's
    // $0x41 reference reuses cell 0 instead of allocating a new DEF.
    let out = assemble("ldb @1\nlda $65\nhlt\n", false);
    assert_eq!(out, "0 LDB 1\n1 LDA 0\n2 HLT\n");
}

#[test]
fn idconst_materializes_a_new_trailing_cell_when_unreusable() {
    let out = assemble("lda $7\nhlt\n", false);
    assert_eq!(out, "0 LDA 2\n1 HLT\n2 DEF 7\n");
}

#[test]
fn shared_idconst_value_materializes_only_once() {
    let out = assemble("lda $9\nldb $9\nhlt\n", false);
    assert_eq!(out, "0 LDA 3\n1 LDB 3\n2 HLT\n3 DEF 9\n");
}

#[test]
fn loop_with_backward_jump_is_preserved_under_deep_optimization() {
    let out = assemble("top: lda @0\nsub @1\njps top\nhlt\n", true);
    assert_eq!(out, "0 LDA 0\n1 SUB 1\n2 JPS 0\n3 HLT\n");
}

#[test]
fn second_lda_overwrites_the_first() {
    let out = assemble("lda @3\nlda @4\nhlt\n", false);
    assert_eq!(out, "0 LDA 4\n1 HLT\n");
}

#[test]
fn relative_jump_survives_peephole_hazard_protection() {
    let out = assemble("jmp .2\nlda @0\nlda @1\nhlt\n", false);
    // Without the hazard the two LDAs (erase-prev) would collapse; the
    // relative jump's landing interval keeps them both in place.
    assert_eq!(out, "0 JMP 2\n1 LDA 0\n2 LDA 1\n3 HLT\n");
}

#[test]
fn undefined_label_is_a_hard_failure() {
    let (mut stmts, errors) = parser::parse("jmp nowhere\nhlt\n");
    assert!(errors.is_empty());
    let label_map = labels::build_map(&mut stmts);
    let err = labels::resolve(&mut stmts, &label_map).unwrap_err();
    assert_eq!(err.name, "nowhere");
}

#[test]
fn invalid_source_line_is_reported_but_parsing_continues() {
    let (stmts, errors) = parser::parse("xyz\nhlt\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(stmts.len(), 1);
}
