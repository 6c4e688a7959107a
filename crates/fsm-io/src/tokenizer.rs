// Lexical layer for FSM sources.
//
// Character classes:
// - word: ASCII letters and digits, `-`, `_`, U+00A0..=U+00FF and every code
//   point above U+00FF
// - whitespace: U+0000..=U+0020, except line terminators
// - quote: `"` starts a quoted string whose content becomes the token value
// - end of line: `\n`, `\r` or `\r\n`, reported as a token
// - everything else (parentheses included) is a one-character ordinary token
//
// There is no comment syntax. Input is pulled from the reader one source line
// at a time, so tokens are produced lazily.

use std::fmt;
use std::io::BufRead;

use crate::{Expected, FsmError};

/// 1-based line and column of a token in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A maximal run of word characters.
    Word(String),
    /// The content of a double-quoted string, escapes resolved.
    Quoted(String),
    /// Any single character outside the other classes.
    Ordinary(char),
    Eol,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "word {word:?}"),
            Token::Quoted(value) => write!(f, "string {value:?}"),
            Token::Ordinary(c) => write!(f, "character {c:?}"),
            Token::Eol => f.write_str("end of line"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// Token with source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Word,
    Whitespace,
    Quote,
    Eol,
    Ordinary,
}

/// Classify a single character.
pub fn classify(c: char) -> CharClass {
    match c {
        '\n' | '\r' => CharClass::Eol,
        '"' => CharClass::Quote,
        'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => CharClass::Word,
        '\u{a0}'.. => CharClass::Word,
        '\0'..=' ' => CharClass::Whitespace,
        _ => CharClass::Ordinary,
    }
}

/// Token stream over a buffered reader, with one token of push-back.
pub struct Tokenizer<R> {
    reader: R,
    /// Characters of the most recently read source line.
    buffer: Vec<char>,
    cursor: usize,
    /// Buffer index at which the current line starts (a lone `\r` can end a
    /// line in the middle of the buffer).
    line_start: usize,
    line: usize,
    exhausted: bool,
    pushed_back: Option<SpannedToken>,
    last_position: Position,
    scratch: String,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            cursor: 0,
            line_start: 0,
            line: 1,
            exhausted: false,
            pushed_back: None,
            last_position: Position { line: 1, column: 1 },
            scratch: String::new(),
        }
    }

    /// Return the next token, or the pushed-back one if present.
    pub fn next_token(&mut self) -> Result<SpannedToken, FsmError> {
        let token = match self.pushed_back.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        self.last_position = token.position;
        Ok(token)
    }

    /// Push a token back so the next call to [`next_token`](Self::next_token)
    /// returns it again. Only one token of push-back is supported.
    pub fn push_back(&mut self, token: SpannedToken) {
        debug_assert!(self.pushed_back.is_none(), "double push-back");
        self.pushed_back = Some(token);
    }

    /// Position of the most recently returned token.
    pub fn position(&self) -> Position {
        self.last_position
    }

    /// Read a decimal state number.
    pub fn expect_number(&mut self) -> Result<(u32, Position), FsmError> {
        let SpannedToken { token, position } = self.next_token()?;
        if let Token::Word(word) = &token {
            if let Ok(number) = word.parse::<u32>() {
                return Ok((number, position));
            }
        }
        Err(FsmError::Unexpected {
            expected: Expected::Number,
            found: token.to_string(),
            position,
        })
    }

    /// Read a quoted string.
    pub fn expect_quoted(&mut self) -> Result<(String, Position), FsmError> {
        let SpannedToken { token, position } = self.next_token()?;
        match token {
            Token::Quoted(value) => Ok((value, position)),
            other => Err(FsmError::Unexpected {
                expected: Expected::String,
                found: other.to_string(),
                position,
            }),
        }
    }

    /// Discard tokens up to and including the next end of line.
    ///
    /// Stops at end of input as well, leaving the end-of-input token in place.
    pub fn skip_line(&mut self) -> Result<(), FsmError> {
        loop {
            let token = self.next_token()?;
            match token.token {
                Token::Eol => return Ok(()),
                Token::Eof => {
                    self.push_back(token);
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    fn current_position(&self) -> Position {
        Position {
            line: self.line,
            column: self.cursor - self.line_start + 1,
        }
    }

    fn fill_buffer(&mut self) -> Result<bool, FsmError> {
        if self.exhausted {
            return Ok(false);
        }
        self.scratch.clear();
        if self.reader.read_line(&mut self.scratch)? == 0 {
            self.exhausted = true;
            return Ok(false);
        }
        self.buffer.clear();
        self.buffer.extend(self.scratch.chars());
        self.cursor = 0;
        self.line_start = 0;
        Ok(true)
    }

    fn scan(&mut self) -> Result<SpannedToken, FsmError> {
        loop {
            let Some(&c) = self.buffer.get(self.cursor) else {
                if self.fill_buffer()? {
                    continue;
                }
                return Ok(SpannedToken {
                    token: Token::Eof,
                    position: self.current_position(),
                });
            };

            let position = self.current_position();
            let token = match classify(c) {
                CharClass::Whitespace => {
                    self.cursor += 1;
                    continue;
                }
                CharClass::Eol => {
                    self.cursor += 1;
                    if c == '\r' && self.buffer.get(self.cursor) == Some(&'\n') {
                        self.cursor += 1;
                    }
                    self.line += 1;
                    self.line_start = self.cursor;
                    Token::Eol
                }
                CharClass::Word => Token::Word(self.scan_word()),
                CharClass::Quote => Token::Quoted(self.scan_quoted()),
                CharClass::Ordinary => {
                    self.cursor += 1;
                    Token::Ordinary(c)
                }
            };
            return Ok(SpannedToken { token, position });
        }
    }

    fn scan_word(&mut self) -> String {
        let start = self.cursor;
        while let Some(&c) = self.buffer.get(self.cursor) {
            if classify(c) != CharClass::Word {
                break;
            }
            self.cursor += 1;
        }
        self.buffer[start..self.cursor].iter().collect()
    }

    /// Scan a quoted string. An unterminated string ends at the end of the
    /// line; the line terminator is left for the next token.
    fn scan_quoted(&mut self) -> String {
        self.cursor += 1; // opening quote
        let mut value = String::new();
        while let Some(&c) = self.buffer.get(self.cursor) {
            match c {
                '"' => {
                    self.cursor += 1;
                    break;
                }
                '\n' | '\r' => break,
                '\\' => {
                    self.cursor += 1;
                    if let Some(escaped) = self.scan_escape() {
                        value.push(escaped);
                    }
                }
                _ => {
                    value.push(c);
                    self.cursor += 1;
                }
            }
        }
        value
    }

    fn scan_escape(&mut self) -> Option<char> {
        let c = *self.buffer.get(self.cursor)?;
        if matches!(c, '\n' | '\r') {
            return None;
        }
        self.cursor += 1;
        let escaped = match c {
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            '0'..='7' => {
                // Up to three octal digits, capped at \377.
                let mut code = c.to_digit(8)?;
                let max_digits = if c <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match self.buffer.get(self.cursor).and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.cursor += 1;
                        }
                        None => break,
                    }
                }
                char::from_u32(code)?
            }
            other => other,
        };
        Some(escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap().token;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    fn quoted(s: &str) -> Token {
        Token::Quoted(s.to_string())
    }

    #[test]
    fn character_classes() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('Z'), CharClass::Word);
        assert_eq!(classify('7'), CharClass::Word);
        assert_eq!(classify('-'), CharClass::Word);
        assert_eq!(classify('_'), CharClass::Word);
        assert_eq!(classify('\u{e4}'), CharClass::Word); // ä
        assert_eq!(classify('\u{20ac}'), CharClass::Word); // €
        assert_eq!(classify(' '), CharClass::Whitespace);
        assert_eq!(classify('\t'), CharClass::Whitespace);
        assert_eq!(classify('\0'), CharClass::Whitespace);
        assert_eq!(classify('\n'), CharClass::Eol);
        assert_eq!(classify('\r'), CharClass::Eol);
        assert_eq!(classify('"'), CharClass::Quote);
        assert_eq!(classify('('), CharClass::Ordinary);
        assert_eq!(classify(')'), CharClass::Ordinary);
        assert_eq!(classify('#'), CharClass::Ordinary);
        assert_eq!(classify('\u{85}'), CharClass::Ordinary);
    }

    #[test]
    fn transition_line() {
        assert_eq!(
            tokenize("0 1 \"a\" \"x y\"\n"),
            vec![
                word("0"),
                word("1"),
                quoted("a"),
                quoted("x y"),
                Token::Eol,
                Token::Eof
            ]
        );
    }

    #[test]
    fn separator_is_a_word() {
        assert_eq!(tokenize("---"), vec![word("---"), Token::Eof]);
    }

    #[test]
    fn data_definition_line() {
        assert_eq!(
            tokenize("s0(2) state \"a\" \"b\""),
            vec![
                word("s0"),
                Token::Ordinary('('),
                word("2"),
                Token::Ordinary(')'),
                word("state"),
                quoted("a"),
                quoted("b"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn ordinary_characters_split_words() {
        assert_eq!(
            tokenize("a,b#"),
            vec![
                word("a"),
                Token::Ordinary(','),
                word("b"),
                Token::Ordinary('#'),
                Token::Eof
            ]
        );
    }

    #[test]
    fn quoted_escapes() {
        assert_eq!(
            tokenize(r#""tab\there" "q\"q" "\101\7" "\x""#),
            vec![
                quoted("tab\there"),
                quoted("q\"q"),
                quoted("A\u{7}"),
                quoted("x"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn unterminated_quote_ends_at_line_end() {
        assert_eq!(
            tokenize("\"open\n1"),
            vec![quoted("open"), Token::Eol, word("1"), Token::Eof]
        );
    }

    #[test]
    fn empty_quoted_string() {
        assert_eq!(tokenize("\"\""), vec![quoted(""), Token::Eof]);
    }

    #[test]
    fn line_endings() {
        assert_eq!(
            tokenize("a\r\nb\rc\n"),
            vec![
                word("a"),
                Token::Eol,
                word("b"),
                Token::Eol,
                word("c"),
                Token::Eol,
                Token::Eof
            ]
        );
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(tokenize(""), vec![Token::Eof]);
        assert_eq!(tokenize("  \t "), vec![Token::Eof]);
        assert_eq!(tokenize("\n\n"), vec![Token::Eol, Token::Eol, Token::Eof]);
    }

    #[test]
    fn non_ascii_words() {
        assert_eq!(
            tokenize("k\u{e4}si \u{20ac}uro"),
            vec![word("k\u{e4}si"), word("\u{20ac}uro"), Token::Eof]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let mut tokenizer = Tokenizer::new("---\n  12 \"a\"\r\nx\ry".as_bytes());
        let mut positions = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            positions.push((token.position.line, token.position.column));
            if token.token == Token::Eof {
                break;
            }
        }
        assert_eq!(
            positions,
            vec![
                (1, 1), // ---
                (1, 4), // eol
                (2, 3), // 12
                (2, 6), // "a"
                (2, 9), // eol (\r\n)
                (3, 1), // x
                (3, 2), // eol (\r)
                (4, 1), // y
                (4, 2), // eof
            ]
        );
    }

    #[test]
    fn push_back_returns_same_token() {
        let mut tokenizer = Tokenizer::new("a b".as_bytes());
        let first = tokenizer.next_token().unwrap();
        tokenizer.push_back(first.clone());
        assert_eq!(tokenizer.next_token().unwrap(), first);
        assert_eq!(tokenizer.next_token().unwrap().token, word("b"));
    }

    #[test]
    fn skip_line_stops_at_eol_and_eof() {
        let mut tokenizer = Tokenizer::new("a b c\nd e".as_bytes());
        tokenizer.skip_line().unwrap();
        assert_eq!(tokenizer.next_token().unwrap().token, word("d"));
        tokenizer.skip_line().unwrap();
        assert_eq!(tokenizer.next_token().unwrap().token, Token::Eof);
        // repeated reads past the end keep returning end of input
        assert_eq!(tokenizer.next_token().unwrap().token, Token::Eof);
    }

    #[test]
    fn expect_number() {
        let mut tokenizer = Tokenizer::new("42 abc \"7\" -1".as_bytes());
        assert_eq!(
            tokenizer.expect_number().unwrap(),
            (42, Position { line: 1, column: 1 })
        );

        let err = tokenizer.expect_number().unwrap_err();
        assert!(matches!(
            err,
            FsmError::Unexpected {
                expected: Expected::Number,
                position: Position { line: 1, column: 4 },
                ..
            }
        ));
        assert!(err.to_string().contains("word \"abc\""));

        assert!(tokenizer.expect_number().is_err());
        assert!(tokenizer.expect_number().is_err());
    }

    #[test]
    fn expect_quoted() {
        let mut tokenizer = Tokenizer::new("\"in put\" 3".as_bytes());
        assert_eq!(tokenizer.expect_quoted().unwrap().0, "in put");
        let err = tokenizer.expect_quoted().unwrap_err();
        assert!(matches!(
            err,
            FsmError::Unexpected {
                expected: Expected::String,
                ..
            }
        ));
    }

    #[test]
    fn invalid_utf8_is_an_io_error() {
        let bytes: &[u8] = &[b'a', b' ', 0xff, 0xfe, b'\n'];
        let mut tokenizer = Tokenizer::new(bytes);
        assert!(matches!(tokenizer.next_token(), Err(FsmError::Io(_))));
    }

    #[test]
    fn determinism_100_iterations() {
        let input = "---\n\n---\n0 1 \"a\" \"b\"\n1 0 \"c d\" \"e\"\n";
        let first = tokenize(input);
        for i in 0..100 {
            assert_eq!(first, tokenize(input), "determinism failure at iteration {i}");
        }
    }
}
