use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Token, Tokenizer, Word};

use crate::catalog::schema::{Column, DataType};
use crate::error::{Error, Result};
use crate::sql::clause::{ClauseScanner, is_word_char, starts_with_word};
use crate::sql::{Command, Conditions, JoinClause};

/// Parses one command. Recognised forms are tried by their leading keywords,
/// in a fixed order; text that starts with none of them is `UnknownCommand`.
///
/// Only the part of a command before its first value goes through the
/// tokenizer. `VALUES`, `SET` and `WHERE` clauses are read from the raw text
/// by [`ClauseScanner`].
pub fn parse_sql(sql: &str) -> Result<Command> {
    let sql = sql.trim();
    let sql = sql.strip_suffix(';').unwrap_or(sql).trim_end();

    if starts_with_keywords(sql, &["CREATE", "TABLE"]) {
        let mut parser = CommandParser::new(sql, &["CREATE", "TABLE"])?;
        let command = parser.parse_create_table()?;
        parser.expect_end()?;
        Ok(command)
    } else if starts_with_keywords(sql, &["DROP", "TABLE"]) {
        let mut parser = CommandParser::new(sql, &["DROP", "TABLE"])?;
        let table_name = parser.parse_identifier()?;
        parser.expect_end()?;
        Ok(Command::DropTable { table_name })
    } else if starts_with_keywords(sql, &["INSERT", "INTO"]) {
        parse_insert(sql)
    } else if starts_with_keywords(sql, &["SELECT"]) {
        parse_select(sql)
    } else if starts_with_keywords(sql, &["UPDATE"]) {
        parse_update(sql)
    } else if starts_with_keywords(sql, &["DELETE", "FROM"]) {
        parse_delete(sql)
    } else if starts_with_keywords(sql, &["SHOW", "TABLES"]) {
        CommandParser::new(sql, &["SHOW", "TABLES"])?.expect_end()?;
        Ok(Command::ShowTables)
    } else {
        Err(Error::UnknownCommand)
    }
}

fn parse_insert(sql: &str) -> Result<Command> {
    let (head, values) = split_at_keyword(sql, "VALUES");

    let mut parser = CommandParser::new(head, &["INSERT", "INTO"])?;
    let table_name = parser.parse_identifier()?;
    parser.expect_token(&Token::LParen)?;
    let mut columns = vec![parser.parse_identifier()?];
    while parser.eat_token(&Token::Comma) {
        columns.push(parser.parse_identifier()?);
    }
    parser.expect_token(&Token::RParen)?;
    parser.expect_end()?;

    let values = values.ok_or_else(|| Error::Syntax("expected VALUES".to_string()))?;
    let mut scanner = ClauseScanner::new(values);
    let values = scanner.value_list()?;
    scanner.expect_end()?;

    if columns.len() != values.len() {
        return Err(Error::Syntax(format!(
            "INSERT lists {} columns but {} values",
            columns.len(),
            values.len()
        )));
    }

    Ok(Command::Insert {
        table_name,
        values: columns.into_iter().zip(values).collect(),
    })
}

fn parse_select(sql: &str) -> Result<Command> {
    let (head, clause) = split_at_keyword(sql, "WHERE");

    let mut parser = CommandParser::new(head, &["SELECT"])?;
    parser.expect_token(&Token::Mul)?;
    parser.expect_keyword("FROM")?;
    let table_name = parser.parse_identifier()?;

    let join = if parser.eat_keywords(&["JOIN"]) {
        let right_table = parser.parse_identifier()?;
        parser.expect_keyword("ON")?;
        let (left_table, left_column) = parser.parse_qualified_column()?;
        parser.expect_token(&Token::Eq)?;
        let (_, right_column) = parser.parse_qualified_column()?;
        Some(JoinClause {
            left_table,
            left_column,
            right_table,
            right_column,
        })
    } else {
        None
    };
    parser.expect_end()?;

    Ok(Command::Select {
        table_name,
        filter: parse_where(clause)?,
        join,
    })
}

fn parse_update(sql: &str) -> Result<Command> {
    let (head, clause) = split_at_keyword(sql, "SET");

    let mut parser = CommandParser::new(head, &["UPDATE"])?;
    let table_name = parser.parse_identifier()?;
    parser.expect_end()?;

    let clause = clause.ok_or_else(|| Error::Syntax("expected SET".to_string()))?;
    let mut scanner = ClauseScanner::new(clause);
    let assignments = scanner.assignments()?;
    scanner.expect_keyword("WHERE")?;
    let filter = scanner.conjunction()?;
    scanner.expect_end()?;

    Ok(Command::Update {
        table_name,
        assignments,
        filter,
    })
}

fn parse_delete(sql: &str) -> Result<Command> {
    let (head, clause) = split_at_keyword(sql, "WHERE");

    let mut parser = CommandParser::new(head, &["DELETE", "FROM"])?;
    let table_name = parser.parse_identifier()?;
    parser.expect_end()?;

    Ok(Command::Delete {
        table_name,
        filter: parse_where(clause)?,
    })
}

/// The text after `WHERE`, if the command had one.
fn parse_where(clause: Option<&str>) -> Result<Conditions> {
    let Some(clause) = clause else {
        return Ok(Conditions::new());
    };
    let mut scanner = ClauseScanner::new(clause);
    let conditions = scanner.conjunction()?;
    scanner.expect_end()?;
    Ok(conditions)
}

/// Token cursor over the structural part of a command.
struct CommandParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl CommandParser {
    /// Tokenizes `text` and consumes its leading keywords.
    fn new(text: &str, leading: &[&str]) -> Result<Self> {
        let dialect = GenericDialect {};
        let tokens = Tokenizer::new(&dialect, text).tokenize()?;
        let mut parser = Self { tokens, pos: 0 };
        for keyword in leading {
            parser.expect_keyword(keyword)?;
        }
        Ok(parser)
    }

    fn parse_create_table(&mut self) -> Result<Command> {
        let name = self.parse_identifier()?;
        self.expect_token(&Token::LParen)?;

        let mut columns = vec![self.parse_column_def()?];
        while self.eat_token(&Token::Comma) {
            columns.push(self.parse_column_def()?);
        }
        self.expect_token(&Token::RParen)?;

        Ok(Command::CreateTable { name, columns })
    }

    /// `<name> <type> [...]`. Everything after the type up to the next `,` or
    /// `)` is searched for PRIMARY KEY and UNIQUE.
    fn parse_column_def(&mut self) -> Result<Column> {
        let name = self.parse_identifier()?;
        let type_name = match self.next() {
            Some(Token::Word(w)) => w.value,
            other => return Err(unexpected("a data type", other.as_ref())),
        };
        let data_type = DataType::from_sql(&type_name)
            .ok_or_else(|| Error::Syntax(format!("unknown data type {}", type_name)))?;

        let mut words = Vec::new();
        let mut depth = 0usize;
        while let Some(tok) = self.peek().cloned() {
            match tok {
                Token::Comma | Token::RParen if depth == 0 => break,
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            words.push(tok.to_string());
            self.next();
        }
        let options = words.join(" ").to_ascii_uppercase();

        let mut column = Column::new(&name, data_type);
        column.is_primary = options.contains("PRIMARY KEY");
        column.is_unique = options.contains("UNIQUE");
        Ok(column)
    }

    fn parse_identifier(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Word(w)) => Ok(w.value),
            other => Err(unexpected("an identifier", other.as_ref())),
        }
    }

    fn parse_qualified_column(&mut self) -> Result<(String, String)> {
        let table = self.parse_identifier()?;
        self.expect_token(&Token::Period)?;
        let column = self.parse_identifier()?;
        Ok((table, column))
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(Error::Syntax(format!(
                "unexpected '{}' after end of command",
                tok
            ))),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens[self.pos..].iter().find(|t| !is_blank(t))
    }

    fn next(&mut self) -> Option<Token> {
        while let Some(tok) = self.tokens.get(self.pos) {
            self.pos += 1;
            if !is_blank(tok) {
                return Some(tok.clone());
            }
        }
        None
    }

    fn eat_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(tok) if &tok == expected => Ok(()),
            other => Err(unexpected(&format!("'{}'", expected), other.as_ref())),
        }
    }

    /// Consumes the keywords only if all of them are next, in order.
    fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let mut upcoming = self.tokens[self.pos..].iter().filter(|t| !is_blank(t));
        let matched = keywords.iter().all(|kw| {
            matches!(upcoming.next(), Some(Token::Word(w)) if is_keyword(w, kw))
        });
        if matched {
            for _ in keywords {
                self.next();
            }
        }
        matched
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keywords(&[keyword]) {
            Ok(())
        } else {
            Err(unexpected(keyword, self.peek()))
        }
    }
}

fn is_blank(tok: &Token) -> bool {
    matches!(tok, Token::Whitespace(_) | Token::EOF)
}

fn is_keyword(word: &Word, keyword: &str) -> bool {
    word.quote_style.is_none() && word.value.eq_ignore_ascii_case(keyword)
}

fn unexpected(expected: &str, found: Option<&Token>) -> Error {
    let found = match found {
        Some(tok) => format!("'{}'", tok),
        None => "end of input".to_string(),
    };
    Error::Syntax(format!("expected {}, found {}", expected, found))
}

/// The leading words of `sql` are `keywords`, in order, in any case.
fn starts_with_keywords(sql: &str, keywords: &[&str]) -> bool {
    let mut rest = sql;
    for keyword in keywords {
        rest = rest.trim_start();
        if !starts_with_word(rest, keyword) {
            return false;
        }
        rest = &rest[keyword.len()..];
    }
    true
}

/// Splits around the first whole-word `keyword`: the text before it, and the
/// text after it if it occurs at all.
fn split_at_keyword<'a>(sql: &'a str, keyword: &str) -> (&'a str, Option<&'a str>) {
    for (i, _) in sql.char_indices() {
        let after_word = sql[..i].chars().next_back().is_some_and(is_word_char);
        if !after_word && starts_with_word(&sql[i..], keyword) {
            return (&sql[..i], Some(&sql[i + keyword.len()..]));
        }
    }
    (sql, None)
}
