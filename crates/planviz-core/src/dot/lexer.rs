use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Tok {
    Strict,
    Graph,
    Digraph,
    Node,
    Edge,
    Subgraph,
    /// Plain identifier or numeral.
    Id(String),
    /// `<...>` HTML string, without the outer angle brackets.
    Html(String),
    /// Double-quoted string with `\"` and line continuations resolved.
    Quoted(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Eq,
    Semi,
    Comma,
    Colon,
    Plus,
    DirectedEdge,
    UndirectedEdge,
}

#[derive(Debug, Clone)]
pub(super) struct Token {
    pub(super) tok: Tok,
    pub(super) line: usize,
    pub(super) column: usize,
}

pub(super) struct Lexer<'input> {
    input: &'input str,
    pos: usize,
    line: usize,
    /// 1-based character column of `pos`.
    column: usize,
    /// Whether the current line has anything but blanks before `pos`.
    line_has_content: bool,
}

impl<'input> Lexer<'input> {
    pub(super) fn new(input: &'input str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            line_has_content: false,
        }
    }

    pub(super) fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut out = Vec::new();
        while let Some(tok) = self.next_token()? {
            out.push(tok);
        }
        Ok(out)
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.input[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
                self.line_has_content = false;
            }
            ' ' | '\t' => self.column += 1,
            _ => {
                self.column += 1;
                self.line_has_content = true;
            }
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::dot(self.line, self.column, message)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.bump();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line(),
                Some(b'#') if !self.line_has_content => self.skip_line(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(Error::dot(line, column, "unterminated comment"));
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let Some(b) = self.peek() else {
            return Ok(None);
        };

        let tok = match b {
            b'{' => self.single(Tok::LBrace),
            b'}' => self.single(Tok::RBrace),
            b'[' => self.single(Tok::LBracket),
            b']' => self.single(Tok::RBracket),
            b'=' => self.single(Tok::Eq),
            b';' => self.single(Tok::Semi),
            b',' => self.single(Tok::Comma),
            b':' => self.single(Tok::Colon),
            b'+' => self.single(Tok::Plus),
            b'-' if self.peek_at(1) == Some(b'>') => {
                self.bump();
                self.bump();
                Tok::DirectedEdge
            }
            b'-' if self.peek_at(1) == Some(b'-') => {
                self.bump();
                self.bump();
                Tok::UndirectedEdge
            }
            b'"' => Tok::Quoted(self.lex_quoted()?),
            b'<' => Tok::Html(self.lex_html()?),
            b'-' | b'.' | b'0'..=b'9' => Tok::Id(self.lex_numeral()?),
            _ => {
                let ch = self.input[self.pos..].chars().next().unwrap_or('\0');
                if !is_id_start(ch) {
                    return Err(self.error(format!("unexpected character `{ch}`")));
                }
                let word = self.lex_word();
                keyword(&word).unwrap_or(Tok::Id(word))
            }
        };

        Ok(Some(Token { tok, line, column }))
    }

    fn single(&mut self, tok: Tok) -> Tok {
        self.bump();
        tok
    }

    fn lex_word(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.input[self.pos..].chars().next() {
            if !is_id_continue(ch) {
                break;
            }
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn lex_numeral(&mut self) -> Result<String> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.bump();
        }
        let mut digits = 0usize;
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => digits += 1,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.bump();
        }
        if digits == 0 {
            return Err(self.error("malformed numeral"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn lex_quoted(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut out = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(Error::dot(line, column, "unterminated string"));
            };
            match ch {
                '"' => return Ok(out),
                '\\' => match self.peek() {
                    Some(b'"') => {
                        self.bump();
                        out.push('"');
                    }
                    Some(b'\n') => {
                        self.bump();
                    }
                    Some(b'\r') if self.peek_at(1) == Some(b'\n') => {
                        self.bump();
                        self.bump();
                    }
                    _ => out.push('\\'),
                },
                other => out.push(other),
            }
        }
    }

    fn lex_html(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let start = self.pos;
        let mut depth = 1usize;
        loop {
            let Some(ch) = self.bump() else {
                return Err(Error::dot(line, column, "unterminated HTML string"));
            };
            match ch {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.input[start..self.pos - 1].to_string());
                    }
                }
                _ => {}
            }
        }
    }
}

fn keyword(word: &str) -> Option<Tok> {
    match word.to_ascii_lowercase().as_str() {
        "strict" => Some(Tok::Strict),
        "graph" => Some(Tok::Graph),
        "digraph" => Some(Tok::Digraph),
        "node" => Some(Tok::Node),
        "edge" => Some(Tok::Edge),
        "subgraph" => Some(Tok::Subgraph),
        _ => None,
    }
}

fn is_id_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_id_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || !ch.is_ascii()
}
