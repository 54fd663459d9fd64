//! `nom` grammar for the native dictionary text format.
//!
//! ```text
//! // comment
//! key     value;
//! block
//! {
//!     nested  'quoted string';
//!     list    (1 2.5 true None);
//! }
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, multispace1, not_line_ending},
    combinator::{all_consuming, map, opt, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};
use serde_json::{Map, Number, Value};

/// Characters that end a bare (unquoted) token
const DELIMITERS: &str = "{}();'\",";

/// Whitespace and comments
fn sp(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(tag("//"), not_line_ending)),
            value((), (tag("/*"), take_until("*/"), tag("*/"))),
            value((), pair(char('#'), not_line_ending)),
        ))),
    )
    .parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
    ))
    .parse(input)
}

fn bare(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !DELIMITERS.contains(c)).parse(input)
}

/// Interpret an unquoted token: booleans, `None`, integers and finite floats; anything else is
/// a string.
pub fn scalar_from_bare(token: &str) -> Value {
    match token {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        "None" | "null" => return Value::Null,
        _ => {}
    }
    if let Ok(integer) = token.parse::<i64>() {
        return Value::from(integer);
    }
    if let Some(number) = token
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
    {
        return Value::Number(number);
    }
    Value::String(token.to_owned())
}

fn scalar(input: &str) -> IResult<&str, Value> {
    alt((
        map(quoted, |s| Value::String(s.to_owned())),
        map(bare, scalar_from_bare),
    ))
    .parse(input)
}

fn list(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            char('('),
            many0(preceded(
                sp,
                terminated(value_, opt(preceded(sp, char(',')))),
            )),
            preceded(sp, char(')')),
        ),
        Value::Array,
    )
    .parse(input)
}

fn block(input: &str) -> IResult<&str, Map<String, Value>> {
    delimited(char('{'), entries, preceded(sp, char('}'))).parse(input)
}

fn value_(input: &str) -> IResult<&str, Value> {
    alt((map(block, Value::Object), list, scalar)).parse(input)
}

fn key(input: &str) -> IResult<&str, &str> {
    alt((quoted, bare)).parse(input)
}

fn entry(input: &str) -> IResult<&str, (String, Value)> {
    let (input, key) = key(input)?;
    let (input, _) = sp(input)?;
    let (input, value) = alt((
        terminated(map(block, Value::Object), opt(preceded(sp, char(';')))),
        terminated(value_, preceded(sp, char(';'))),
        // `key;` carries no value
        map(char(';'), |_| Value::Null),
    ))
    .parse(input)?;
    Ok((input, (key.to_owned(), value)))
}

fn entries(input: &str) -> IResult<&str, Map<String, Value>> {
    map(many0(preceded(sp, entry)), |entries| {
        entries.into_iter().collect::<Map<_, _>>()
    })
    .parse(input)
}

/// Parse a complete document. The error message names the line where parsing stopped.
pub fn parse_document(text: &str) -> Result<Map<String, Value>, String> {
    match all_consuming(delimited(sp, entries, sp)).parse(text) {
        Ok((_, map)) => Ok(map),
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => {
            let consumed = text.len() - err.input.len();
            let line = text[..consumed].matches('\n').count() + 1;
            let context: String = err.input.chars().take(40).collect();
            Err(format!("unexpected input at line {line}: {context:?}"))
        }
        Err(nom::Err::Incomplete(_)) => Err("unexpected end of input".to_owned()),
    }
}
