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

//! Turns source text into a sequence of [`Stmt`]s. Per line: strip a
//! trailing `;`-comment, trim whitespace, skip if empty. A leading token
//! ending in `:` declares a label; everything after it is reparsed as a
//! command. Parse errors are line-scoped: the offending statement is
//! dropped and parsing continues with the next line (spec §4.1, §7).

use crate::error::ParseError;
use crate::lexer::{Lexer, Token};
use crate::stmt::{AType, Cmd, Stmt};

enum OperandValue {
    Int(i32),
    Sym(String),
}

/// Parse a complete source file into its statement sequence, collecting
/// (but never raising) parse errors along the way.
///
/// The reported line number for a diagnostic is the 0-based index of the
/// physical line within `source` -- this reproduces the original
/// implementation's off-by-one (it increments a 1-based line counter
/// *before* consuming the line, then reports `lineno - 1`), without
/// requiring a separate subtraction here.
pub fn parse(source: &str) -> (Vec<Stmt>, Vec<ParseError>) {
    let mut stmts = Vec::new();
    let mut errors = Vec::new();
    for (line_no, raw_line) in source.lines().enumerate() {
        parse_line(line_no, raw_line, &mut stmts, &mut errors);
    }
    (stmts, errors)
}

fn err(line: usize, message: impl Into<String>) -> ParseError {
    ParseError {
        line,
        message: message.into(),
    }
}

fn parse_line(line_no: usize, raw_line: &str, stmts: &mut Vec<Stmt>, errors: &mut Vec<ParseError>) {
    let line = strip_comment(raw_line).trim();
    if line.is_empty() {
        return;
    }
    let mut lex = Lexer::new(line);
    let mut tok = lex.next();

    if let Token::Label(name) = tok {
        stmts.push(Stmt::label(name));
        tok = lex.next();
        if matches!(tok, Token::Eof) {
            return;
        }
    }

    let cmd_word = match tok {
        Token::Word(w) => w,
        Token::Label(_) => {
            errors.push(err(line_no, "a label cannot appear as a command"));
            return;
        }
        Token::Eof => return,
    };

    let lower = cmd_word.to_lowercase();
    let (mnemonic, ignore) = match split_mnemonic(&lower) {
        Some(parts) => parts,
        None => {
            errors.push(err(line_no, format!("got invalid command '{cmd_word}'")));
            return;
        }
    };
    let cmd = match Cmd::from_mnemonic(mnemonic) {
        Some(c) => c,
        None => {
            errors.push(err(line_no, format!("got invalid command '{cmd_word}'")));
            return;
        }
    };

    let operand_tok = lex.next();
    let operand_present = !matches!(operand_tok, Token::Eof);
    if operand_present != cmd.has_operand() {
        errors.push(err(
            line_no,
            format!("invalid invocation of command '{mnemonic}'"),
        ));
        return;
    }

    let mut stmt = Stmt::new(cmd, AType::None);
    stmt.ignore = ignore;

    if let Token::Word(operand) = operand_tok {
        match classify_operand(cmd, operand) {
            Ok((atyp, value)) => {
                stmt.atyp = atyp;
                match value {
                    OperandValue::Int(v) => stmt.int_arg = v,
                    OperandValue::Sym(s) => stmt.sym_arg = Some(s),
                }
            }
            Err(message) => {
                errors.push(err(line_no, message));
                return;
            }
        }
    }

    if !matches!(lex.next(), Token::Eof) {
        errors.push(err(line_no, "unexpected trailing input"));
        return;
    }

    stmts.push(stmt);
}

/// Strip a trailing `;`-comment, if any.
fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Split a lowercased command word into its 3-letter mnemonic and
/// whether the "tolerated but unused" `*` marker was present.
fn split_mnemonic(lower: &str) -> Option<(&str, bool)> {
    if lower.len() == 3 {
        Some((lower, false))
    } else if lower.len() == 4 && lower.ends_with('*') {
        Some((&lower[..3], true))
    } else {
        None
    }
}

fn classify_operand(cmd: Cmd, word: &str) -> Result<(AType, OperandValue), String> {
    let invalid = || format!("invalid argument '{word}'");
    let mut chars = word.chars();
    let first = chars.next().expect("lexer never yields empty words");
    match first {
        '@' => {
            let rest = &word[1..];
            if rest.is_empty() {
                return Err(invalid());
            }
            let v: i32 = rest.parse().map_err(|_| invalid())?;
            if v < 0 {
                return Err(invalid());
            }
            Ok((AType::Absolute, OperandValue::Int(v)))
        }
        '.' => {
            let rest = &word[1..];
            if rest.is_empty() {
                return Err(invalid());
            }
            let v: i32 = rest.parse().map_err(|_| invalid())?;
            Ok((AType::Relative, OperandValue::Int(v)))
        }
        '$' => {
            let rest = &word[1..];
            if rest.is_empty() {
                return Err(invalid());
            }
            let v: i32 = rest.parse().map_err(|_| invalid())?;
            if v < 0 {
                return Err(invalid());
            }
            Ok((AType::IdConst, OperandValue::Int(v)))
        }
        c if c.is_ascii_alphabetic() => Ok((AType::Label, OperandValue::Sym(word.to_string()))),
        c if (c.is_ascii_digit() || c == '-') && cmd == Cmd::Def => {
            let v: i32 = word.parse().map_err(|_| invalid())?;
            Ok((AType::Absolute, OperandValue::Int(v)))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_label_and_absolute_argument() {
        let (stmts, errors) = parse("loop: lda @5\nhlt\n");
        assert!(errors.is_empty());
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0], Stmt::label("loop"));
        assert_eq!(stmts[1].cmd, Cmd::Lda);
        assert_eq!(stmts[1].atyp, AType::Absolute);
        assert_eq!(stmts[1].int_arg, 5);
        assert_eq!(stmts[2].cmd, Cmd::Hlt);
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let (stmts, errors) = parse("; a whole comment line\n\nhlt ; trailing\n");
        assert!(errors.is_empty());
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].cmd, Cmd::Hlt);
    }

    #[test]
    fn tolerates_star_suffixed_mnemonic_and_sets_ignore() {
        let (stmts, errors) = parse("hlt*\n");
        assert!(errors.is_empty());
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].cmd, Cmd::Hlt);
        assert!(stmts[0].ignore);
    }

    #[test]
    fn rejects_unknown_command() {
        let (stmts, errors) = parse("xyz\n");
        assert!(stmts.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 0);
    }

    #[test]
    fn rejects_missing_required_operand() {
        let (stmts, errors) = parse("lda\n");
        assert!(stmts.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn rejects_unexpected_operand() {
        let (stmts, errors) = parse("hlt @1\n");
        assert!(stmts.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn def_permits_negative_immediate() {
        let (stmts, errors) = parse("def -5\n");
        assert!(errors.is_empty());
        assert_eq!(stmts[0].cmd, Cmd::Def);
        assert_eq!(stmts[0].int_arg, -5);
    }

    #[test]
    fn absolute_rejects_negative_values() {
        let (stmts, errors) = parse("lda @-1\n");
        assert!(stmts.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn relative_permits_negative_offset() {
        let (stmts, errors) = parse("jmp .-2\n");
        assert!(errors.is_empty());
        assert_eq!(stmts[0].atyp, AType::Relative);
        assert_eq!(stmts[0].int_arg, -2);
    }

    #[test]
    fn label_reference_operand() {
        let (stmts, errors) = parse("jmp done\n");
        assert!(errors.is_empty());
        assert_eq!(stmts[0].atyp, AType::Label);
        assert_eq!(stmts[0].sym_arg.as_deref(), Some("done"));
    }

    #[test]
    fn errors_continue_parsing_subsequent_lines() {
        let (stmts, errors) = parse("xyz\nhlt\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].cmd, Cmd::Hlt);
    }
}
