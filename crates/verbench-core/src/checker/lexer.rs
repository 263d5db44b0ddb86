//! Tolerant JavaScript/TypeScript tokenizer.
//!
//! The lexer never fails: unterminated strings end at the line break,
//! unterminated comments and templates end at end of input, and unknown
//! characters become single-character punctuators.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Template,
    Number,
    Regex,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier/punctuator text, or the unquoted body of a string literal.
    pub text: String,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub newline_before: bool,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }
}

const PUNCTS_3: &[&str] = &["...", "===", "!==", "**=", "&&=", "||=", "??="];
const PUNCTS_2: &[&str] = &[
    "=>", "?.", "??", "&&", "||", "==", "!=", "<=", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "++", "--", "**",
];

/// Words after which a `/` starts a regular expression rather than a division.
const REGEX_PREFIX_WORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

enum Mode {
    Code { braces: usize },
    Template,
}

struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: u32,
    newline_pending: bool,
    tokens: Vec<Token>,
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let mut lx = Lexer {
        src,
        chars: src.char_indices().collect(),
        pos: 0,
        line: 1,
        newline_pending: false,
        tokens: Vec::new(),
    };
    lx.run();
    lx.tokens
}

impl<'a> Lexer<'a> {
    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn offset(&self, idx: usize) -> usize {
        self.chars
            .get(idx)
            .map(|(o, _)| *o)
            .unwrap_or(self.src.len())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, text: String, start_idx: usize, line: u32) {
        let start = self.offset(start_idx);
        let end = self.offset(self.pos);
        self.tokens.push(Token {
            kind,
            text,
            start,
            end,
            line,
            newline_before: std::mem::take(&mut self.newline_pending),
        });
    }

    fn run(&mut self) {
        let mut modes = vec![Mode::Code { braces: 0 }];
        while self.pos < self.chars.len() {
            let nested = modes.len() > 1;
            match modes.last_mut() {
                Some(Mode::Template) => {
                    if self.lex_template_chunk() {
                        // `${` opened a substitution
                        modes.push(Mode::Code { braces: 0 });
                    } else {
                        modes.pop();
                    }
                }
                Some(Mode::Code { braces }) => {
                    let Some(c) = self.peek(0) else { break };
                    if c == '}' && *braces == 0 && nested {
                        // end of a template substitution
                        self.bump();
                        modes.pop();
                        continue;
                    }
                    if c == '{' {
                        *braces += 1;
                    } else if c == '}' {
                        *braces = braces.saturating_sub(1);
                    }
                    if c == '`' {
                        self.bump();
                        modes.push(Mode::Template);
                        continue;
                    }
                    self.lex_code_char(c);
                }
                None => break,
            }
        }
    }

    /// Consumes template text up to the closing backtick or a `${`.
    /// Returns true when a substitution was opened.
    fn lex_template_chunk(&mut self) -> bool {
        let start_idx = self.pos;
        let line = self.line;
        let mut text = String::new();
        loop {
            match self.peek(0) {
                None => {
                    self.push(TokenKind::Template, text, start_idx, line);
                    return false;
                }
                Some('`') => {
                    self.push(TokenKind::Template, text, start_idx, line);
                    self.bump();
                    return false;
                }
                Some('$') if self.peek(1) == Some('{') => {
                    self.push(TokenKind::Template, text, start_idx, line);
                    self.bump();
                    self.bump();
                    return true;
                }
                Some('\\') => {
                    self.bump();
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                Some(_) => {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
            }
        }
    }

    fn lex_code_char(&mut self, c: char) {
        if c == '\n' {
            self.bump();
            self.newline_pending = true;
            return;
        }
        if c.is_whitespace() {
            self.bump();
            return;
        }
        if c == '/' && self.peek(1) == Some('/') {
            while let Some(n) = self.peek(0) {
                if n == '\n' {
                    break;
                }
                self.bump();
            }
            return;
        }
        if c == '/' && self.peek(1) == Some('*') {
            self.bump();
            self.bump();
            while let Some(n) = self.bump() {
                if n == '\n' {
                    self.newline_pending = true;
                }
                if n == '*' && self.peek(0) == Some('/') {
                    self.bump();
                    break;
                }
            }
            return;
        }
        if c == '"' || c == '\'' {
            self.lex_string(c);
            return;
        }
        if is_ident_start(c) {
            let start_idx = self.pos;
            let line = self.line;
            let mut text = String::new();
            text.push(c);
            self.bump();
            while let Some(n) = self.peek(0) {
                if !is_ident_part(n) {
                    break;
                }
                text.push(n);
                self.bump();
            }
            self.push(TokenKind::Ident, text, start_idx, line);
            return;
        }
        if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) {
            let start_idx = self.pos;
            let line = self.line;
            let mut text = String::new();
            while let Some(n) = self.peek(0) {
                if !(n.is_ascii_alphanumeric() || n == '.' || n == '_') {
                    break;
                }
                text.push(n);
                self.bump();
            }
            self.push(TokenKind::Number, text, start_idx, line);
            return;
        }
        if c == '/' && self.regex_allowed() && self.lex_regex() {
            return;
        }
        self.lex_punct();
    }

    fn lex_string(&mut self, quote: char) {
        let start_idx = self.pos;
        let line = self.line;
        self.bump();
        let mut text = String::new();
        while let Some(n) = self.peek(0) {
            if n == '\n' {
                break;
            }
            self.bump();
            if n == quote {
                break;
            }
            if n == '\\' {
                if let Some(esc) = self.peek(0) {
                    if esc != '\n' {
                        self.bump();
                        text.push(esc);
                    }
                }
                continue;
            }
            text.push(n);
        }
        self.push(TokenKind::Str, text, start_idx, line);
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(t) => match t.kind {
                TokenKind::Ident => REGEX_PREFIX_WORDS.contains(&t.text.as_str()),
                TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => {
                    false
                }
                TokenKind::Punct => !matches!(t.text.as_str(), ")" | "]" | "}" | "<" | "++" | "--"),
            },
        }
    }

    /// Attempts a regex literal; rewinds and returns false if the line ends first.
    fn lex_regex(&mut self) -> bool {
        let save = self.pos;
        let start_idx = self.pos;
        let line = self.line;
        self.bump();
        let mut in_class = false;
        loop {
            match self.peek(0) {
                None | Some('\n') => {
                    self.pos = save;
                    return false;
                }
                Some('\\') => {
                    self.bump();
                    if self.peek(0) != Some('\n') {
                        self.bump();
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.bump();
                }
                Some(']') => {
                    in_class = false;
                    self.bump();
                }
                Some('/') if !in_class => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        while self.peek(0).is_some_and(is_ident_part) {
            self.bump();
        }
        let text = self.src[self.offset(start_idx)..self.offset(self.pos)].to_string();
        self.push(TokenKind::Regex, text, start_idx, line);
        true
    }

    fn lex_punct(&mut self) {
        let start_idx = self.pos;
        let line = self.line;
        for group in [PUNCTS_3, PUNCTS_2] {
            for p in group {
                let n = p.chars().count();
                let candidate: String = (0..n).filter_map(|k| self.peek(k)).collect();
                if candidate == *p {
                    // `?.5` is a conditional followed by a number
                    if *p == "?." && self.peek(2).is_some_and(|d| d.is_ascii_digit()) {
                        continue;
                    }
                    for _ in 0..n {
                        self.bump();
                    }
                    self.push(TokenKind::Punct, (*p).to_string(), start_idx, line);
                    return;
                }
            }
        }
        if let Some(c) = self.bump() {
            self.push(TokenKind::Punct, c.to_string(), start_idx, line);
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c == '#' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
