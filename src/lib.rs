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

/// The control-flow-graph based "deep" optimizer pass.  This builds a
/// graph of basic blocks from the linear statement stream, merges
/// single-use straight-line blocks and drops unreachable ones, then
/// re-linearizes with the minimal set of synthetic jumps and labels.
pub mod cfg;
/// Threading-free run configuration for the pipeline (which passes are
/// enabled, and output formatting flags).
pub mod config;
/// Error types produced by each pipeline stage.
pub mod error;
/// Replaces synthesized id-constants with references to existing
/// instructions carrying the same bit pattern, and materializes the
/// constants that couldn't be reused as trailing `DEF` cells.
pub mod idconst;
/// Builds the label -> cell index map and resolves symbolic/relative
/// references into absolute cell indices.
pub mod labels;
/// Splits a source line into whitespace-delimited tokens for `parser`.
mod lexer;
/// The line-oriented lexer and parser that turn source text into a
/// sequence of `Stmt`.
pub mod parser;
/// The peephole optimizer, operating on adjacent instruction pairs.
pub mod peephole;
/// Core data model: commands, argument types and statements.
pub mod stmt;
/// Serializes the final statement sequence to the line-oriented object
/// format.
pub mod writer;

pub use config::Config;
pub use error::AsmError;
pub use stmt::{AType, Cmd, Stmt};
