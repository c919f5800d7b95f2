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

//! Final emission: one line per statement, `<index> <MNEMONIC>[
//! <int_arg>]`, optionally with a trailing CR for DOS-style output
//! (spec §4.6).

use std::io::Write;

use crate::error::AsmError;
use crate::stmt::{AType, Stmt};

/// Write every statement in `stmts` to `out`. Fails with
/// [`crate::error::ImpossibleState`] at the first statement whose
/// argument type is anything other than `None` or `Absolute` -- by this
/// point in the pipeline that can only happen if an earlier stage has a
/// bug -- or with an I/O error from `out` itself.
pub fn write(out: &mut dyn Write, stmts: &[Stmt], unix2dos: bool) -> Result<(), AsmError> {
    for (index, stmt) in stmts.iter().enumerate() {
        match stmt.atyp {
            AType::Absolute => write!(out, "{index} {} {}", stmt.cmd, stmt.int_arg)?,
            AType::None => write!(out, "{index} {}", stmt.cmd)?,
            other => return Err(crate::error::ImpossibleState { atyp: other }.into()),
        }
        if unix2dos {
            write!(out, "\r")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
