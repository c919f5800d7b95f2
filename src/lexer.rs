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

//! A very simple whitespace-delimited word lexer, used to split one
//! (already comment-stripped, trimmed) source line into its component
//! tokens. Mirrors the char-vector scanning style used elsewhere for
//! small hand-written lexers, rather than pulling in a parser-combinator
//! crate for a three-token-per-line grammar.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Eof,
    /// A bare word ending in `:` -- a label declaration. The `:` is not
    /// included in the returned slice.
    Label(&'a str),
    /// Any other whitespace-delimited word.
    Word(&'a str),
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<char>,
    index: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        Lexer {
            input,
            chars,
            index: 0,
        }
    }

    /// Return the next token, advancing past it. Returns `Token::Eof`
    /// once nothing but whitespace remains.
    pub fn next(&mut self) -> Token<'a> {
        self.index = skip(&self.chars, self.index, |c| c.is_ascii_whitespace());
        if self.index >= self.chars.len() {
            return Token::Eof;
        }
        let start = self.index;
        let end = skip(&self.chars, start, |c| !c.is_ascii_whitespace());
        self.index = end;
        let word = &self.input[start..end];
        if let Some(name) = word.strip_suffix(':') {
            Token::Label(name)
        } else {
            Token::Word(word)
        }
    }

    /// True once only whitespace remains.
    pub fn at_eof(&self) -> bool {
        skip(&self.chars, self.index, |c| c.is_ascii_whitespace()) >= self.chars.len()
    }
}

fn skip<P>(input: &[char], index: usize, pred: P) -> usize
where
    P: Fn(char) -> bool,
{
    let mut i = index;
    while i < input.len() && pred(input[i]) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_label_command_and_operand() {
        let mut lex = Lexer::new("loop: lda @1");
        assert_eq!(lex.next(), Token::Label("loop"));
        assert_eq!(lex.next(), Token::Word("lda"));
        assert_eq!(lex.next(), Token::Word("@1"));
        assert_eq!(lex.next(), Token::Eof);
    }

    #[test]
    fn handles_empty_input() {
        let mut lex = Lexer::new("   ");
        assert_eq!(lex.next(), Token::Eof);
    }
}
