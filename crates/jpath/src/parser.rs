//! A `nom`-based parser for the normalized path text form (`$['a'][0]`).
use crate::error::JPathError;
use crate::path::{NormalizedPath, PathStep};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{char, digit0, none_of, one_of},
    combinator::{map, map_opt, map_res, recognize, value, verify},
    multi::many0,
    sequence::{delimited, pair, preceded},
};

// --- Main Public Parser ---

pub fn parse_normalized_path(input: &str) -> Result<NormalizedPath, JPathError> {
    match normalized_path(input) {
        Ok(("", path)) => Ok(path),
        Ok((rem, _)) => Err(JPathError::NormalizedPathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(JPathError::NormalizedPathParse(input.to_string(), e.to_string())),
    }
}

// --- Combinators ---

fn normalized_path(input: &str) -> IResult<&str, NormalizedPath> {
    map(preceded(char('$'), many0(step)), NormalizedPath::from_steps).parse(input)
}

fn step(input: &str) -> IResult<&str, PathStep> {
    delimited(
        char('['),
        alt((
            map(index, PathStep::Index),
            map(name, PathStep::Name),
        )),
        char(']'),
    )
    .parse(input)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(
        alt((tag("0"), recognize(pair(one_of("123456789"), digit0)))),
        |digits: &str| digits.parse::<usize>(),
    )
    .parse(input)
}

// --- Name Parsers ---

fn name(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('\''), many0(name_char), char('\'')),
        |chars: Vec<char>| chars.into_iter().collect(),
    )
    .parse(input)
}

fn name_char(input: &str) -> IResult<&str, char> {
    alt((preceded(char('\\'), escape), none_of("'\\"))).parse(input)
}

fn escape(input: &str) -> IResult<&str, char> {
    alt((
        value('\'', char('\'')),
        value('"', char('"')),
        value('\\', char('\\')),
        value('/', char('/')),
        value('\u{08}', char('b')),
        value('\u{0C}', char('f')),
        value('\n', char('n')),
        value('\r', char('r')),
        value('\t', char('t')),
        unicode_escape,
    ))
    .parse(input)
}

fn hex4(input: &str) -> IResult<&str, u32> {
    map_res(
        take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit()),
        |hex: &str| u32::from_str_radix(hex, 16),
    )
    .parse(input)
}

/// `\uXXXX`, combining a high/low surrogate pair into one character.
fn unicode_escape(input: &str) -> IResult<&str, char> {
    alt((
        map_opt(
            pair(
                preceded(char('u'), verify(hex4, |hi: &u32| (0xD800..0xDC00).contains(hi))),
                preceded(tag("\\u"), verify(hex4, |lo: &u32| (0xDC00..0xE000).contains(lo))),
            ),
            |(hi, lo)| char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)),
        ),
        map_opt(preceded(char('u'), hex4), char::from_u32),
    ))
    .parse(input)
}
