//! Compiles the textual concrete syntax into a [`Spec`] tree.
//!
//! Whitespace and case are insignificant. A number literal is decimal or
//! `0x`-hex. This module implements the grammar by recursive descent over a
//! char buffer, tracking the "pending" auto-named variables allocated by `%`
//! until a later `s`/`(`/`{` consumes the oldest one still unconsumed.

use std::collections::VecDeque;

use crate::error::SpecTextError;
use crate::int_spec::{Endian, IntSpec};
use crate::spec::{Spec, VarName};

/// Compiles `format` into a [`Spec`], allocating auto-named variables as
/// `"{var_prefix}{index}"` in allocation order.
pub fn compile(format: &str, var_prefix: &str) -> Result<Spec, SpecTextError> {
    let mut c = Compiler::new(format, var_prefix);
    let (items, _) = c.parse_sequence(&[])?;
    Ok(wrap_seq(items))
}

/// Convenience entry point using `"v"` as the auto-naming prefix.
pub fn compile_default(format: &str) -> Result<Spec, SpecTextError> {
    compile(format, "v")
}

fn wrap_seq(mut items: Vec<Spec>) -> Spec {
    if items.len() == 1 {
        items.pop().unwrap()
    } else {
        Spec::Seq(items)
    }
}

fn remap_eof(err: SpecTextError, open_offset: usize) -> SpecTextError {
    match err {
        SpecTextError::UnexpectedEof => SpecTextError::UnbalancedBrackets { offset: open_offset },
        other => other,
    }
}

struct Compiler<'a> {
    chars: Vec<char>,
    pos: usize,
    endian: Endian,
    next_index: usize,
    pending: VecDeque<VarName>,
    prefix: &'a str,
}

impl<'a> Compiler<'a> {
    fn new(text: &str, prefix: &'a str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            endian: Endian::Big,
            next_index: 0,
            pending: VecDeque::new(),
            prefix,
        }
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn pop_pending(&mut self, offset: usize) -> Result<VarName, SpecTextError> {
        self.pending
            .pop_front()
            .ok_or(SpecTextError::NoUnconsumedVariable { offset })
    }

    fn parse_number(&mut self) -> Result<u64, SpecTextError> {
        let offset = self.offset();

        if self.peek() == Some('0') {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some('x') | Some('X')) {
                self.bump();
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                    self.bump();
                }
                if self.pos == start {
                    return Err(SpecTextError::InvalidNumber {
                        offset,
                        text: self.slice(offset, self.pos),
                    });
                }
                let text = self.slice(start, self.pos);
                return u64::from_str_radix(&text, 16)
                    .map_err(|_| SpecTextError::InvalidNumber { offset, text });
            }
            self.pos = save;
        }

        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == start {
            return Err(SpecTextError::InvalidNumber {
                offset,
                text: String::new(),
            });
        }
        let text = self.slice(start, self.pos);
        text.parse::<u64>()
            .map_err(|_| SpecTextError::InvalidNumber { offset, text })
    }

    fn parse_width_token(&mut self) -> Result<IntSpec, SpecTextError> {
        let offset = self.offset();
        match self.bump().map(|c| c.to_ascii_uppercase()) {
            // B is native-endian length 1: either endianness reads the same
            // for a single byte, so this ignores the current `>`/`<` marker.
            Some('B') => Ok(IntSpec::byte()),
            Some('H') => Ok(IntSpec::new(2, self.endian)),
            Some('T') => Ok(IntSpec::new(3, self.endian)),
            Some('I') => Ok(IntSpec::new(4, self.endian)),
            Some('Q') => Ok(IntSpec::new(8, self.endian)),
            Some(found) => Err(SpecTextError::UnexpectedChar { offset, found }),
            None => Err(SpecTextError::UnexpectedEof),
        }
    }

    /// Parses one "base token": a width letter, `%`, `s`, `(...)`, or `{...}`.
    /// Called either directly, or as the `X` following a numeric repeat
    /// prefix (`N X`).
    fn parse_base_token(&mut self) -> Result<Spec, SpecTextError> {
        self.skip_ws();
        let offset = self.offset();
        match self.peek() {
            Some(c) if matches!(c.to_ascii_uppercase(), 'B' | 'H' | 'T' | 'I' | 'Q') => {
                let int_spec = self.parse_width_token()?;
                Ok(Spec::Integer(int_spec))
            }
            Some('%') => {
                self.bump();
                self.skip_ws();
                let int_spec = self.parse_width_token()?;
                let idx = self.next_index;
                self.next_index += 1;
                let name = VarName::new(format!("{}{}", self.prefix, idx));
                self.pending.push_back(name.clone());
                Ok(Spec::Variable(int_spec, name))
            }
            Some(c) if c.to_ascii_uppercase() == 'S' => {
                self.bump();
                let name = self.pop_pending(offset)?;
                Ok(Spec::Bytes(name))
            }
            Some('(') => {
                self.bump();
                let name = self.pop_pending(offset)?;
                let (items, _) = self
                    .parse_sequence(&[')'])
                    .map_err(|e| remap_eof(e, offset))?;
                Ok(Spec::until(name, wrap_seq(items)))
            }
            Some('{') => {
                self.bump();
                self.parse_switch(offset)
            }
            Some(found) => Err(SpecTextError::UnexpectedChar { offset, found }),
            None => Err(SpecTextError::UnexpectedEof),
        }
    }

    fn parse_switch(&mut self, open_offset: usize) -> Result<Spec, SpecTextError> {
        let selector = self.pop_pending(open_offset)?;
        let mut cases: Vec<(u64, Spec)> = Vec::new();
        let mut default: Option<Spec> = None;

        loop {
            self.skip_ws();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    break;
                }
                None => return Err(SpecTextError::UnbalancedBrackets { offset: open_offset }),
                _ => {
                    let key_offset = self.offset();
                    let is_default = if self.peek() == Some('*') {
                        self.bump();
                        true
                    } else {
                        false
                    };
                    let key = if is_default {
                        None
                    } else {
                        Some(self.parse_number()?)
                    };

                    self.skip_ws();
                    match self.peek() {
                        Some('=') => {
                            self.bump();
                        }
                        Some(found) => {
                            return Err(SpecTextError::UnexpectedChar {
                                offset: self.offset(),
                                found,
                            });
                        }
                        None => return Err(SpecTextError::UnexpectedEof),
                    }

                    let (items, stopper) = self.parse_sequence(&[',', '}'])?;
                    let value = wrap_seq(items);

                    if is_default {
                        default = Some(value);
                    } else {
                        let k = key.expect("key is Some when not default");
                        if cases.iter().any(|(ck, _)| *ck == k) {
                            return Err(SpecTextError::DuplicateSwitchKey {
                                offset: key_offset,
                                key: k,
                            });
                        }
                        cases.push((k, value));
                    }

                    match stopper {
                        Some('}') => break,
                        Some(',') => continue,
                        _ => unreachable!("parse_sequence only stops on its requested chars"),
                    }
                }
            }
        }

        let default =
            default.ok_or(SpecTextError::MissingSwitchDefault { offset: open_offset })?;
        Ok(Spec::switch(selector, cases, default))
    }

    /// Parses tokens until one of `stop` is seen (which is consumed and
    /// returned) or, when `stop` is empty, until end of input.
    fn parse_sequence(&mut self, stop: &[char]) -> Result<(Vec<Spec>, Option<char>), SpecTextError> {
        let mut specs = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => {
                    if stop.is_empty() {
                        return Ok((specs, None));
                    }
                    return Err(SpecTextError::UnexpectedEof);
                }
                Some(c) if stop.contains(&c) => {
                    self.bump();
                    return Ok((specs, Some(c)));
                }
                Some('>') => {
                    self.bump();
                    self.endian = Endian::Big;
                }
                Some('<') => {
                    self.bump();
                    self.endian = Endian::Little;
                }
                Some(c) if c.is_ascii_digit() => {
                    let offset = self.offset();
                    let n = self.parse_number()?;
                    self.skip_ws();
                    match self.peek().map(|c| c.to_ascii_lowercase()) {
                        Some('x') => {
                            self.bump();
                            specs.push(Spec::Skip(n as u32));
                        }
                        Some(_) => {
                            let item = self.parse_base_token()?;
                            specs.push(Spec::Seq(vec![item; n as usize]));
                        }
                        None => return Err(SpecTextError::DanglingNumericPrefix { offset }),
                    }
                }
                Some(_) => {
                    specs.push(self.parse_base_token()?);
                }
            }
        }
    }
}
