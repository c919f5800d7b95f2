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
use std::fmt;

// ============================================================================
// Cmd
// ============================================================================

/// A command: one of the sixteen real LC1 opcodes, or one of the two
/// pseudo-commands (`Def`, `Label`) consumed entirely by the assembler
/// pipeline and never written to a real cell with their own encoding.
///
/// Real opcodes carry stable 8-bit codes `0x10..0x1F` in the order given
/// here; this ordering is load-bearing, not cosmetic — the peephole pair
/// table and the id-constant reuse pass both key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmd {
    Lda,
    Ldb,
    Mov,
    Mab,
    Add,
    Sub,
    And,
    Not,
    Jmp,
    Jps,
    Jpo,
    Cal,
    Ret,
    Rra,
    Rla,
    Hlt,
    Def,
    Label,
}

/// All real opcodes, in their canonical (and encoding-relevant) order.
pub const REAL_CMDS: [Cmd; 16] = [
    Cmd::Lda,
    Cmd::Ldb,
    Cmd::Mov,
    Cmd::Mab,
    Cmd::Add,
    Cmd::Sub,
    Cmd::And,
    Cmd::Not,
    Cmd::Jmp,
    Cmd::Jps,
    Cmd::Jpo,
    Cmd::Cal,
    Cmd::Ret,
    Cmd::Rra,
    Cmd::Rla,
    Cmd::Hlt,
];

impl Cmd {
    /// The 8-bit instruction encoding of this command. Pseudo-commands
    /// use the low codes `0x01`/`0x02`, which can never collide with a
    /// real opcode (`0x10..0x1F`).
    pub const fn code(&self) -> u8 {
        match self {
            Cmd::Lda => 0x10,
            Cmd::Ldb => 0x11,
            Cmd::Mov => 0x12,
            Cmd::Mab => 0x13,
            Cmd::Add => 0x14,
            Cmd::Sub => 0x15,
            Cmd::And => 0x16,
            Cmd::Not => 0x17,
            Cmd::Jmp => 0x18,
            Cmd::Jps => 0x19,
            Cmd::Jpo => 0x1A,
            Cmd::Cal => 0x1B,
            Cmd::Ret => 0x1C,
            Cmd::Rra => 0x1D,
            Cmd::Rla => 0x1E,
            Cmd::Hlt => 0x1F,
            Cmd::Def => 0x01,
            Cmd::Label => 0x02,
        }
    }

    /// Look up a real opcode by its index into [`REAL_CMDS`] (`0..=15`),
    /// i.e. by `code() - 0x10`. Used by the id-constant reuse pass to go
    /// from a synthesized constant's high bits back to a candidate
    /// instruction.
    pub const fn from_real_index(index: u8) -> Option<Cmd> {
        if index > 15 {
            return None;
        }
        Some(REAL_CMDS[index as usize])
    }

    /// Recover a command from its raw 8-bit encoding.
    pub fn from_code(code: u8) -> Option<Cmd> {
        match code {
            0x01 => Some(Cmd::Def),
            0x02 => Some(Cmd::Label),
            0x10..=0x1F => Cmd::from_real_index(code - 0x10),
            _ => None,
        }
    }

    /// Uppercase mnemonic, as emitted by the writer.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Cmd::Lda => "LDA",
            Cmd::Ldb => "LDB",
            Cmd::Mov => "MOV",
            Cmd::Mab => "MAB",
            Cmd::Add => "ADD",
            Cmd::Sub => "SUB",
            Cmd::And => "AND",
            Cmd::Not => "NOT",
            Cmd::Jmp => "JMP",
            Cmd::Jps => "JPS",
            Cmd::Jpo => "JPO",
            Cmd::Cal => "CAL",
            Cmd::Ret => "RET",
            Cmd::Rra => "RRA",
            Cmd::Rla => "RLA",
            Cmd::Hlt => "HLT",
            Cmd::Def => "DEF",
            Cmd::Label => "LABEL",
        }
    }

    /// Lowercase 3-letter mnemonic, as accepted by the parser. `Label`
    /// has no source-level mnemonic of its own (it is derived from the
    /// `name:` syntax) and is not reachable here.
    pub fn from_mnemonic(s: &str) -> Option<Cmd> {
        match s {
            "lda" => Some(Cmd::Lda),
            "ldb" => Some(Cmd::Ldb),
            "mov" => Some(Cmd::Mov),
            "mab" => Some(Cmd::Mab),
            "add" => Some(Cmd::Add),
            "sub" => Some(Cmd::Sub),
            "and" => Some(Cmd::And),
            "not" => Some(Cmd::Not),
            "jmp" => Some(Cmd::Jmp),
            "jps" => Some(Cmd::Jps),
            "jpo" => Some(Cmd::Jpo),
            "cal" => Some(Cmd::Cal),
            "ret" => Some(Cmd::Ret),
            "rra" => Some(Cmd::Rra),
            "rla" => Some(Cmd::Rla),
            "hlt" => Some(Cmd::Hlt),
            "def" => Some(Cmd::Def),
            _ => None,
        }
    }

    /// Whether this command's mnemonic must be followed by an operand.
    pub const fn has_operand(&self) -> bool {
        matches!(
            self,
            Cmd::Cal
                | Cmd::Def
                | Cmd::Jmp
                | Cmd::Jpo
                | Cmd::Jps
                | Cmd::Lda
                | Cmd::Ldb
                | Cmd::Mov
                | Cmd::Rla
                | Cmd::Rra
        )
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

// ============================================================================
// AType
// ============================================================================

/// The classification of a statement's argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AType {
    /// Parser-internal marker for "failed to classify"; never appears on
    /// a constructed `Stmt`.
    Invalid,
    /// No argument.
    None,
    /// A resolved, non-negative absolute cell index (or, for `DEF`, a
    /// raw signed cell value).
    Absolute,
    /// `current address + offset`, resolved to `Absolute` during label
    /// map construction.
    Relative,
    /// A request to materialize (or reuse) a constant cell encoding the
    /// given value, and reference its address.
    IdConst,
    /// An unresolved symbolic label reference.
    Label,
}

impl fmt::Display for AType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            AType::Invalid => "invalid",
            AType::None => "none",
            AType::Absolute => "absolute",
            AType::Relative => "relative",
            AType::IdConst => "ind.const",
            AType::Label => "label",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// Stmt
// ============================================================================

/// A single parsed (or synthesized) statement.
///
/// Invariants (see spec §3):
/// - if `atyp == Label`, `sym_arg` is `Some` and `int_arg == 0`;
/// - if `atyp` is `Absolute`, `Relative` or `IdConst`, `sym_arg` is `None`
///   and `int_arg` carries the value;
/// - if `atyp == None`, both are unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub cmd: Cmd,
    pub atyp: AType,
    pub int_arg: i32,
    pub sym_arg: Option<String>,
    /// Set on instructions the peephole pass must not touch: relative
    /// branch sites and everything they can land on, plus (during label
    /// map construction) every consumed `Label` pseudo-statement.
    pub ignore: bool,
}

impl Stmt {
    pub fn new(cmd: Cmd, atyp: AType) -> Self {
        Stmt {
            cmd,
            atyp,
            int_arg: 0,
            sym_arg: None,
            ignore: false,
        }
    }

    pub fn with_int(cmd: Cmd, atyp: AType, int_arg: i32) -> Self {
        Stmt {
            cmd,
            atyp,
            int_arg,
            sym_arg: None,
            ignore: false,
        }
    }

    pub fn with_sym(cmd: Cmd, atyp: AType, sym_arg: impl Into<String>) -> Self {
        Stmt {
            cmd,
            atyp,
            int_arg: 0,
            sym_arg: Some(sym_arg.into()),
            ignore: false,
        }
    }

    pub fn label(name: impl Into<String>) -> Self {
        Stmt::with_sym(Cmd::Label, AType::Label, name)
    }

    /// The 16-bit peephole pairing key for `(prev, self)`.
    pub fn pair_key(prev: &Stmt, cur: &Stmt) -> u16 {
        ((prev.cmd.code() as u16) << 8) | (cur.cmd.code() as u16)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.cmd)?;
        match self.atyp {
            AType::Absolute | AType::Relative | AType::IdConst => {
                write!(f, " {}", self.int_arg)
            }
            AType::Label => write!(f, " {}", self.sym_arg.as_deref().unwrap_or("")),
            AType::None | AType::Invalid => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_through_real_index() {
        for (i, cmd) in REAL_CMDS.iter().enumerate() {
            assert_eq!(cmd.code(), 0x10 + i as u8);
            assert_eq!(Cmd::from_real_index(i as u8), Some(*cmd));
        }
    }

    #[test]
    fn code_round_trips_through_from_code() {
        for cmd in REAL_CMDS.iter().chain([Cmd::Def, Cmd::Label].iter()) {
            assert_eq!(Cmd::from_code(cmd.code()), Some(*cmd));
        }
    }

    #[test]
    fn mnemonic_round_trips_for_real_opcodes() {
        for cmd in REAL_CMDS {
            let lower = cmd.mnemonic().to_lowercase();
            assert_eq!(Cmd::from_mnemonic(&lower), Some(cmd));
        }
    }

    #[test]
    fn operand_taking_set_matches_spec() {
        let yes = [
            Cmd::Cal,
            Cmd::Def,
            Cmd::Jmp,
            Cmd::Jpo,
            Cmd::Jps,
            Cmd::Lda,
            Cmd::Ldb,
            Cmd::Mov,
            Cmd::Rla,
            Cmd::Rra,
        ];
        for cmd in yes {
            assert!(cmd.has_operand(), "{cmd} should take an operand");
        }
        let no = [Cmd::Mab, Cmd::Add, Cmd::Sub, Cmd::And, Cmd::Not, Cmd::Ret, Cmd::Hlt];
        for cmd in no {
            assert!(!cmd.has_operand(), "{cmd} should not take an operand");
        }
    }
}
