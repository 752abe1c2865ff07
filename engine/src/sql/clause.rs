use crate::error::{Error, Result};
use crate::sql::Conditions;
use crate::storage::record::Field;

/// Where a value literal stops.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ValueContext {
    /// `VALUES (a, b)`
    List,
    /// `SET a=1, b=2 WHERE`
    Assignment,
    /// `WHERE a=1 AND b=2`
    Condition,
}

/// Reads the value-bearing tail of a command straight from the source text.
///
/// Literals are never tokenized: a value is whatever text sits between its
/// delimiters, so `O'Brien` or `a--b` arrive intact. Only a value that opens
/// with a quote is read as a quoted string first, which lets it carry
/// delimiters such as `,` or ` AND `.
pub(crate) struct ClauseScanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> ClauseScanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// `(value, value, ...)`
    pub(crate) fn value_list(&mut self) -> Result<Vec<Field>> {
        self.expect_char('(')?;
        let mut values = vec![self.literal(ValueContext::List)?];
        while self.eat_char(',') {
            values.push(self.literal(ValueContext::List)?);
        }
        self.expect_char(')')?;
        Ok(values)
    }

    /// `col=value [, col=value ...]`
    pub(crate) fn assignments(&mut self) -> Result<Conditions> {
        let mut assignments = Conditions::new();
        loop {
            let column = self.identifier()?;
            self.expect_char('=')?;
            let value = self.literal(ValueContext::Assignment)?;
            assignments.insert(column, value);
            if !self.eat_char(',') {
                break;
            }
        }
        Ok(assignments)
    }

    /// `col=value [AND col=value ...]`, nothing else. Columns may be
    /// qualified as `table.col`.
    pub(crate) fn conjunction(&mut self) -> Result<Conditions> {
        let mut conditions = Conditions::new();
        loop {
            let column = self.column_ref()?;
            if !self.eat_char('=') {
                return Err(self.unexpected("'=' (only equality conditions are supported)"));
            }
            let value = self.literal(ValueContext::Condition)?;
            conditions.insert(column, value);
            if !self.eat_keyword("AND") {
                break;
            }
        }
        Ok(conditions)
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    pub(crate) fn expect_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.rest().split_whitespace().next() {
            None => Ok(()),
            Some(word) => Err(Error::Syntax(format!(
                "unexpected '{}' after end of command",
                word
            ))),
        }
    }

    /// One value, classified from its raw text: `'...'` is Text with `''`
    /// unescaped, TRUE/FALSE any case is Boolean, an i32 is Integer, and
    /// anything else is Text holding the trimmed raw text.
    fn literal(&mut self, context: ValueContext) -> Result<Field> {
        self.skip_whitespace();
        let start = self.pos;
        if self.peek() == Some('\'')
            && let Some(len) = quoted_len(self.rest())
        {
            self.pos += len;
        }
        while let Some(c) = self.peek() {
            if self.ends_value(c, context) {
                break;
            }
            self.pos += c.len_utf8();
        }

        let raw = self.src[start..self.pos].trim();
        if raw.is_empty() {
            return Err(self.unexpected("a value"));
        }
        Ok(classify(raw))
    }

    fn ends_value(&self, c: char, context: ValueContext) -> bool {
        match context {
            ValueContext::List => c == ',' || c == ')',
            ValueContext::Assignment => c == ',' || c == '=' || self.at_keyword("WHERE"),
            ValueContext::Condition => {
                c == '=' || self.at_keyword("AND") || self.at_keyword("OR")
            }
        }
    }

    fn identifier(&mut self) -> Result<String> {
        self.skip_whitespace();
        let len = self
            .rest()
            .find(|c: char| !is_word_char(c))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.unexpected("a column name"));
        }
        let name = self.rest()[..len].to_string();
        self.pos += len;
        Ok(name)
    }

    /// `column` or `table.column`, kept as written.
    fn column_ref(&mut self) -> Result<String> {
        let name = self.identifier()?;
        if self.peek() == Some('.') {
            self.pos += 1;
            let column = self.identifier()?;
            return Ok(format!("{}.{}", name, column));
        }
        Ok(name)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        self.pos = self.src.len() - self.rest().trim_start().len();
    }

    fn eat_char(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        if self.eat_char(expected) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        if self.at_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    /// A keyword counts only as a whole word that follows whitespace.
    fn at_keyword(&self, keyword: &str) -> bool {
        let after_space = self.src[..self.pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        after_space && starts_with_word(self.rest(), keyword)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = match self.rest().split_whitespace().next() {
            Some(word) => format!("'{}'", word),
            None => "end of input".to_string(),
        };
        Error::Syntax(format!("expected {}, found {}", expected, found))
    }
}

fn classify(raw: &str) -> Field {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Field::Text(raw[1..raw.len() - 1].replace("''", "'"));
    }
    if raw.eq_ignore_ascii_case("true") {
        return Field::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Field::Boolean(false);
    }
    match raw.parse::<i32>() {
        Ok(v) => Field::Integer(v),
        Err(_) => Field::Text(raw.to_string()),
    }
}

/// Length of the quoted string `text` opens with, closing quote included.
/// `''` inside is an escaped quote. `None` when the quote is never closed.
fn quoted_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            continue;
        }
        if matches!(chars.peek(), Some((_, '\''))) {
            chars.next();
        } else {
            return Some(i + 1);
        }
    }
    None
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `text` begins with `word`, in any case, not followed by more word characters.
pub(crate) fn starts_with_word(text: &str, word: &str) -> bool {
    text.get(..word.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(word))
        && !text[word.len()..].starts_with(is_word_char)
}
