//! Shell-style command line tokenizer.
//!
//! Rules:
//! * unquoted whitespace separates tokens
//! * `'...'` keeps everything literally
//! * `"..."` keeps everything except `\"`, `\\`, `\$` and `` \` ``, which
//!   drop the backslash
//! * outside quotes a backslash takes the next char literally
//! * adjacent quoted and unquoted pieces form one token; `""` is an empty token
//!
//! An unterminated quote runs to the end of the line. The tokenizer never
//! fails; operators, globs and variables are not interpreted.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommandLine {
    pub name: String,
    pub args: Vec<String>,
}

impl ParsedCommandLine {
    /// Split `line` into command name and arguments. `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = tokenize(line).into_iter();
        let name = tokens.next()?;
        Some(Self {
            name,
            args: tokens.collect(),
        })
    }
}

pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(esc @ ('"' | '\\' | '$' | '`')) => current.push(esc),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => current.push('\\'),
                        },
                        other => current.push(other),
                    }
                }
            }
            '\\' => {
                in_token = true;
                current.push(chars.next().unwrap_or('\\'));
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
