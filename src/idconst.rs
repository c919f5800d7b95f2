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

//! Id-constant reuse: for every distinct `IDCONST` value, look for an
//! existing instruction that already encodes it and can be addressed
//! as if it were that constant (spec §4.4), grounded on
//! `mark_idconst`/`optimize_idconsts` in the original optimizer.

use std::collections::HashMap;

use crate::labels::LabelMap;
use crate::stmt::{AType, Cmd, Stmt};

/// Scan `stmts` for every distinct `IdConst` value and, where an
/// existing instruction can stand in for the constant it would
/// otherwise need a new cell for, record `"$<value>" -> <cell index>`.
/// Values with no reuse hit are simply absent from the result; the
/// caller ([`crate::labels::materialize_idconsts`]) allocates a new
/// trailing cell for those.
pub fn find_reusable(stmts: &[Stmt], verbose: bool) -> LabelMap {
    let mut values: Vec<i32> = stmts
        .iter()
        .filter(|s| s.atyp == AType::IdConst)
        .map(|s| s.int_arg)
        .collect();
    values.sort_unstable();
    values.dedup();

    let mut labels = LabelMap::new();
    for value in values {
        if let Some(idx) = find_reuse_site(stmts, value) {
            if verbose {
                log::info!("optimize: re-use existing const {value} @ {idx}");
            }
            labels.insert(format!("${value}"), idx);
        }
    }
    labels
}

fn find_reuse_site(stmts: &[Stmt], value: i32) -> Option<usize> {
    let hi = value >> 6;
    let lo = value & 0x3F;
    if !(0..=15).contains(&hi) {
        return None;
    }
    let candidate = Cmd::from_real_index(hi as u8)?;
    if !candidate.has_operand() && lo != 0 {
        return None;
    }
    stmts.iter().position(|s| {
        s.cmd == candidate && s.atyp == AType::Absolute && (!candidate.has_operand() || s.int_arg == lo)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_an_existing_matching_absolute_instruction() {
        // value 0x41 = 0b01_000001 -> hi=1 (LDB), lo=1
        let stmts = vec![
            Stmt::with_int(Cmd::Ldb, AType::Absolute, 1),
            Stmt::with_int(Cmd::Lda, AType::IdConst, 0x41),
        ];
        let labels = find_reusable(&stmts, false);
        assert_eq!(labels.get("$65"), Some(&0));
    }

    #[test]
    fn no_hit_when_no_matching_instruction_exists() {
        let stmts = vec![Stmt::with_int(Cmd::Lda, AType::IdConst, 0x41)];
        let labels = find_reusable(&stmts, false);
        assert!(labels.is_empty());
    }

    #[test]
    fn zero_operand_opcode_only_matches_zero_low_bits() {
        // hi = 15 -> HLT, which takes no operand; lo must be 0 to match.
        let value = 15 << 6; // lo == 0
        let stmts = vec![Stmt::new(Cmd::Hlt, AType::None)];
        // HLT's own statement has atyp None, not Absolute, so it can
        // never itself be a reuse site -- this just exercises the
        // lo == 0 acceptance path without crashing on a no-operand cmd.
        assert!(find_reuse_site(&stmts, value).is_none());
    }

    #[test]
    fn distinct_values_are_deduplicated_before_scanning() {
        let stmts = vec![
            Stmt::with_int(Cmd::Lda, AType::IdConst, 5),
            Stmt::with_int(Cmd::Ldb, AType::IdConst, 5),
        ];
        // Just verifying this doesn't panic and treats both occurrences
        // identically (same value, same lookup key).
        let labels = find_reusable(&stmts, false);
        assert!(labels.get("$5").is_none() || labels.len() == 1);
    }
}
