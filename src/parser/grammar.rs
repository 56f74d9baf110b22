//! nom fragments shared by the ability parser
//!
//! Every parser here works on lowercased clause text. [`scan`] runs a fragment at
//! each word boundary so callers can pull "the first number after `draw`" or
//! "the first phase name" out of free-form text.

use crate::game::Phase;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{char, digit1, multispace0, multispace1};
use nom::combinator::{map, map_res, value};
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::IResult;

/// Decimal or spelled-out count ("2", "two")
pub fn number(input: &str) -> IResult<&str, i32> {
    alt((
        map_res(digit1, str::parse::<i32>),
        value(1, alt((tag("one"), tag("a "), tag("an ")))),
        value(2, tag("two")),
        value(3, tag("three")),
        value(4, tag("four")),
        value(5, tag("five")),
    ))(input)
}

/// "up to N" or "N"; the flag is true for "up to"
pub fn count(input: &str) -> IResult<&str, (i32, bool)> {
    alt((
        map(preceded(tuple((tag("up to"), multispace1)), number), |n| {
            (n, true)
        }),
        map(number, |n| (n, false)),
    ))(input)
}

/// A phase name as written in ability text ("battle phase", "main phase 2")
pub fn phase_name(input: &str) -> IResult<&str, Phase> {
    alt((
        value(Phase::Main1, alt((tag("main phase 1"), tag("first main phase")))),
        value(Phase::Main2, alt((tag("main phase 2"), tag("second main phase")))),
        terminated(
            alt((
                value(Phase::Draw, tag("draw")),
                value(Phase::Standby, tag("standby")),
                value(Phase::Battle, tag("battle")),
                value(Phase::End, tag("end")),
            )),
            tag(" phase"),
        ),
    ))(input)
}

/// "gains 500 atk", "lose 300 def"; returns the signed amount and whether it is DEF
pub fn stat_change(input: &str) -> IResult<&str, (i32, bool)> {
    let (rest, (direction, _, amount, _, is_def)) = tuple((
        alt((
            value(1, alt((tag("gains"), tag("gain")))),
            value(-1, alt((tag("loses"), tag("lose")))),
        )),
        multispace1,
        number,
        multispace1,
        alt((value(false, tag("atk")), value(true, tag("def")))),
    ))(input)?;
    Ok((rest, (direction * amount, is_def)))
}

/// Text inside double quotes: an archetype or card name reference
pub fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

/// "level 4 or lower"
pub fn level_cap(input: &str) -> IResult<&str, u8> {
    delimited(
        tuple((tag("level"), multispace1)),
        map_res(digit1, str::parse::<u8>),
        tuple((multispace0, tag("or lower"))),
    )(input)
}

/// Amount after an action word: "pay 1000 lp" → ("lp", 1000)
pub fn payment(input: &str) -> IResult<&str, (i32, &str)> {
    let (rest, (_, _, amount, _, unit)) = tuple((
        tag("pay"),
        multispace1,
        number,
        multispace1,
        alt((tag("lp"), tag("life points"), tag("mana"), tag("resources"))),
    ))(input)?;
    Ok((rest, (amount, unit)))
}

/// Run `parser` at every word boundary of `text`, returning the first success
pub fn scan<'a, T>(
    text: &'a str,
    mut parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> Option<T> {
    let mut start = 0;
    loop {
        if let Ok((_, found)) = parser(&text[start..]) {
            return Some(found);
        }
        let next = text[start..].find(' ')?;
        start += next + 1;
    }
}

/// The first number appearing after `keyword`
pub fn number_after(text: &str, keyword: &str) -> Option<i32> {
    let pos = text.find(keyword)?;
    scan(&text[pos + keyword.len()..], number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_words_and_digits() {
        assert_eq!(number("2 cards"), Ok((" cards", 2)));
        assert_eq!(number("two cards"), Ok((" cards", 2)));
        assert_eq!(number("1000"), Ok(("", 1000)));
        assert!(number("cards").is_err());
    }

    #[test]
    fn test_count_up_to() {
        assert_eq!(count("up to 2 monsters").map(|(_, c)| c), Ok((2, true)));
        assert_eq!(count("1 monster").map(|(_, c)| c), Ok((1, false)));
    }

    #[test]
    fn test_phase_name() {
        assert_eq!(phase_name("battle phase").map(|(_, p)| p), Ok(Phase::Battle));
        assert_eq!(phase_name("end phase").map(|(_, p)| p), Ok(Phase::End));
        assert_eq!(phase_name("standby phase").map(|(_, p)| p), Ok(Phase::Standby));
        assert!(phase_name("end of turn").is_err());
    }

    #[test]
    fn test_stat_change() {
        assert_eq!(stat_change("gains 500 atk").map(|(_, s)| s), Ok((500, false)));
        assert_eq!(stat_change("lose 300 def").map(|(_, s)| s), Ok((-300, true)));
    }

    #[test]
    fn test_scan_finds_fragment_mid_sentence() {
        let text = "all \"dragon knight\" monsters you control gain 300 atk";
        assert_eq!(scan(text, stat_change), Some((300, false)));
        assert_eq!(scan(text, quoted), Some("dragon knight"));
        assert_eq!(scan("at the end of the battle phase", phase_name), Some(Phase::Battle));
        assert_eq!(scan("nothing here", number), None);
    }

    #[test]
    fn test_level_cap_and_payment() {
        assert_eq!(level_cap("level 4 or lower monster").map(|(_, l)| l), Ok(4));
        assert_eq!(payment("pay 1000 lp").map(|(_, p)| p), Ok((1000, "lp")));
        assert_eq!(number_after("draw 2 cards", "draw"), Some(2));
    }
}
