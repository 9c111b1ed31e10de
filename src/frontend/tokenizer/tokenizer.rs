//! Character-level scanning primitives for ShaderLab source.
//!
//! The tokenizer owns a single mutable cursor ([`PositionTicker`]) over
//! the source bytes and offers a handful of scanning shapes: maximal
//! word-run tokens with one token of lookahead, raw chunks up to a
//! terminator, and nested-balanced content between a delimiter pair.
//! ShaderLab tokens are ASCII; multi-byte UTF-8 sequences are carried
//! through chunk scans verbatim.

use crate::common::error::CompileError;
use crate::common::position::PositionTicker;
use super::token::Token;

/// Result of a chunk or pair scan: the collected value plus whether the
/// end of input was reached before the scan could finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan<T> {
    pub value: T,
    pub end: bool,
}

/// Options for [`Tokenizer::scan_chunk`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkOptions {
    /// Discard leading spaces and tabs before real content begins.
    pub skip_heading_space: bool,
    /// Append the terminating character to the result.
    pub keep_terminator: bool,
}

/// Token delimiters: whitespace and punctuation, except that `#`, `.` and
/// `_` count as word constituents (`#define` and `2.0` are single tokens).
fn is_delimiter_byte(b: u8) -> bool {
    b.is_ascii_whitespace() || (b.is_ascii_punctuation() && b != b'#' && b != b'.' && b != b'_')
}

pub struct Tokenizer {
    source: Vec<u8>,
    ticker: PositionTicker,
    lookahead: Option<Token>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        let bytes: Vec<u8> = source.bytes().collect();
        let ticker = PositionTicker::new(bytes.len());
        Self { source: bytes, ticker, lookahead: None }
    }

    /// Current global byte offset of the cursor.
    pub fn index(&self) -> usize {
        self.ticker.index()
    }

    /// Byte at an arbitrary offset, if in range.
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.source.get(index).copied()
    }

    fn cur(&self) -> Option<u8> {
        self.source.get(self.ticker.index()).copied()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.source.get(self.ticker.index() + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.cur()?;
        self.ticker.tick(b == b'\n');
        Some(b)
    }

    fn at_line_comment(&self) -> bool {
        self.cur() == Some(b'/') && self.peek_byte() == Some(b'/')
    }

    /// Next maximal non-delimiter run, or `None` at end of input.
    /// Consumes the buffered lookahead token first if one exists.
    pub fn scan_token(&mut self) -> Option<Token> {
        if let Some(token) = self.lookahead.take() {
            return Some(token);
        }
        self.scan_token_inner()
    }

    /// One-token lookahead: scans the next token and buffers it so a
    /// later [`scan_token`](Self::scan_token) returns the same token.
    pub fn peek_token(&mut self) -> Option<&Token> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan_token_inner();
        }
        self.lookahead.as_ref()
    }

    fn scan_token_inner(&mut self) -> Option<Token> {
        while matches!(self.cur(), Some(b) if is_delimiter_byte(b)) {
            self.advance();
        }
        self.cur()?;
        let mut buf: Vec<u8> = Vec::new();
        while let Some(b) = self.cur() {
            if is_delimiter_byte(b) {
                break;
            }
            buf.push(b);
            self.advance();
        }
        let end = self.ticker.to_position(0);
        let start = self.ticker.to_position(buf.len());
        let text = String::from_utf8_lossy(&buf).into_owned();
        Some(Token::new(text, start, end))
    }

    /// Consume characters until `terminator` matches or input ends.
    ///
    /// The terminating character is consumed but only appended to the
    /// result under `opts.keep_terminator`. Aborts early without
    /// consuming anything further when `//` sits at the cursor, so
    /// trailing comments never leak into scanned content.
    pub fn scan_chunk(&mut self, terminator: impl Fn(u8) -> bool, opts: ChunkOptions) -> Scan<String> {
        if opts.skip_heading_space {
            while matches!(self.cur(), Some(b' ') | Some(b'\t')) {
                self.advance();
            }
        }
        let mut buf: Vec<u8> = Vec::new();
        loop {
            if self.at_line_comment() {
                return Scan { value: String::from_utf8_lossy(&buf).into_owned(), end: false };
            }
            let Some(b) = self.cur() else {
                return Scan { value: String::from_utf8_lossy(&buf).into_owned(), end: true };
            };
            self.advance();
            if terminator(b) {
                if opts.keep_terminator {
                    buf.push(b);
                }
                return Scan { value: String::from_utf8_lossy(&buf).into_owned(), end: false };
            }
            buf.push(b);
        }
    }

    /// Skip whitespace up to the opening delimiter `l`. Errors when any
    /// other character arrives first; `Ok(true)` means end of input.
    fn expect_pair_start(&mut self, l: u8) -> Result<bool, CompileError> {
        loop {
            match self.cur() {
                None => return Ok(true),
                Some(b) if b == l => return Ok(false),
                Some(b) if b.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b) => {
                    return Err(CompileError::UnexpectedCharacter {
                        ch: b as char,
                        line: self.ticker.line(),
                        column: self.ticker.character(),
                    })
                }
            }
        }
    }

    /// Scan the tokens of nested-balanced content between `l` and `r`.
    ///
    /// The depth counter is incremented on `l` and decremented on `r`;
    /// scanning stops when it returns to zero. End of input mid-pair
    /// yields `end: true` with the tokens collected so far.
    pub fn scan_token_between_pair(&mut self, l: u8, r: u8) -> Result<Scan<Vec<Token>>, CompileError> {
        if self.expect_pair_start(l)? {
            return Ok(Scan { value: Vec::new(), end: true });
        }
        self.advance();
        let mut depth = 1usize;
        let mut tokens = Vec::new();
        let mut buf: Vec<u8> = Vec::new();
        loop {
            match self.cur() {
                None => {
                    self.flush_word(&mut buf, &mut tokens);
                    return Ok(Scan { value: tokens, end: true });
                }
                Some(b) if b == l => {
                    self.flush_word(&mut buf, &mut tokens);
                    self.advance();
                    depth += 1;
                }
                Some(b) if b == r => {
                    self.flush_word(&mut buf, &mut tokens);
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Scan { value: tokens, end: false });
                    }
                }
                Some(b) if is_delimiter_byte(b) => {
                    self.flush_word(&mut buf, &mut tokens);
                    self.advance();
                }
                Some(b) => {
                    buf.push(b);
                    self.advance();
                }
            }
        }
    }

    /// Scan the raw text of nested-balanced content between `l` and `r`,
    /// excluding the outermost pair but keeping inner pairs verbatim.
    pub fn scan_chunk_between_pair(&mut self, l: u8, r: u8) -> Result<Scan<String>, CompileError> {
        if self.expect_pair_start(l)? {
            return Ok(Scan { value: String::new(), end: true });
        }
        self.advance();
        let mut depth = 1usize;
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let Some(b) = self.cur() else {
                return Ok(Scan { value: String::from_utf8_lossy(&buf).into_owned(), end: true });
            };
            self.advance();
            if b == l {
                depth += 1;
            } else if b == r {
                depth -= 1;
                if depth == 0 {
                    return Ok(Scan { value: String::from_utf8_lossy(&buf).into_owned(), end: false });
                }
            }
            buf.push(b);
        }
    }

    fn flush_word(&self, buf: &mut Vec<u8>, tokens: &mut Vec<Token>) {
        if buf.is_empty() {
            return;
        }
        let end = self.ticker.to_position(0);
        let start = self.ticker.to_position(buf.len());
        let text = String::from_utf8_lossy(buf).into_owned();
        buf.clear();
        tokens.push(Token::new(text, start, end));
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.scan_token()
    }
}
