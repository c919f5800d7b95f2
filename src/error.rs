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
use crate::stmt::AType;

/// A single non-fatal diagnostic produced while parsing one line of one
/// file. The offending statement is dropped; parsing continues with the
/// next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based source line number of the *first* token on this logical
    /// line (the original line, before any label prefix was split off).
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Raised when label resolution reaches end-of-pipeline with a symbolic
/// reference that no `Label`-pseudo ever defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedLabel {
    pub name: String,
    pub cmd: crate::stmt::Cmd,
}

impl fmt::Display for UndefinedLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "undefined label '{}' @ cmd {}", self.name, self.cmd)
    }
}

impl std::error::Error for UndefinedLabel {}

/// Raised by the writer when a statement reaches emission with an
/// argument type other than `None` or `Absolute`. This can only happen
/// if an earlier pipeline stage has a bug, hence "internal error".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpossibleState {
    pub atyp: AType,
}

impl fmt::Display for ImpossibleState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "internal error: impossible state, argument type ({}) != (absolute|none)",
            self.atyp
        )
    }
}

impl std::error::Error for ImpossibleState {}

/// Top-level pipeline error, combining every stage's failure mode.
#[derive(Debug)]
pub enum AsmError {
    /// Bad flag, missing option argument, or bad output path.
    Invocation(String),
    /// A symbolic label was never defined.
    UndefinedLabel(UndefinedLabel),
    /// An impossible argument type survived to the writer.
    ImpossibleState(ImpossibleState),
    /// An I/O failure reading a source file or writing the object file.
    Io(std::io::Error),
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AsmError::Invocation(msg) => write!(f, "INVOCATION ERROR: {msg}"),
            AsmError::UndefinedLabel(e) => write!(f, "{e}"),
            AsmError::ImpossibleState(e) => write!(f, "{e}"),
            AsmError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AsmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AsmError::UndefinedLabel(e) => Some(e),
            AsmError::ImpossibleState(e) => Some(e),
            AsmError::Io(e) => Some(e),
            AsmError::Invocation(_) => None,
        }
    }
}

impl From<UndefinedLabel> for AsmError {
    fn from(e: UndefinedLabel) -> Self {
        AsmError::UndefinedLabel(e)
    }
}

impl From<ImpossibleState> for AsmError {
    fn from(e: ImpossibleState) -> Self {
        AsmError::ImpossibleState(e)
    }
}

impl From<std::io::Error> for AsmError {
    fn from(e: std::io::Error) -> Self {
        AsmError::Io(e)
    }
}

impl AsmError {
    /// The process exit code this error should produce, per spec §7.
    pub fn exit_code(&self) -> i32 {
        match self {
            AsmError::Invocation(_) => 1,
            AsmError::UndefinedLabel(_) => 1,
            AsmError::ImpossibleState(_) => 2,
            AsmError::Io(_) => 1,
        }
    }
}
