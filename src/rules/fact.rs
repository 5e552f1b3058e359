//! Plain-text perception facts
//!
//! A world state travels to the rule engine as a list of two-element lists of
//! double-quoted strings: `[["S1","True"],["S2","None"]]`.

use nom::{
    bytes::complete::take_while,
    character::complete::{char, multispace0},
    combinator::all_consuming,
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult, Parser,
};

use crate::perception::{escape_quotes, Percept};

/// Render percepts as fact text. Embedded double quotes become single quotes.
pub fn render_percepts(percepts: &[Percept]) -> String {
    let pairs: Vec<String> = percepts
        .iter()
        .map(|p| {
            format!(
                "[\"{}\",\"{}\"]",
                escape_quotes(&p.sensor_id),
                escape_quotes(p.value.as_str())
            )
        })
        .collect();
    format!("[{}]", pairs.join(","))
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"')).parse(input)
}

fn pair(input: &str) -> IResult<&str, (&str, &str)> {
    delimited(
        (char('['), multispace0),
        separated_pair(quoted, (multispace0, char(','), multispace0), quoted),
        (multispace0, char(']')),
    )
    .parse(input)
}

fn pair_list(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    delimited(
        (multispace0, char('['), multispace0),
        separated_list0((multispace0, char(','), multispace0), pair),
        (multispace0, char(']'), multispace0),
    )
    .parse(input)
}

/// Parse fact text back into (sensor id, value) pairs
pub fn parse_fact(text: &str) -> Result<Vec<(String, String)>, String> {
    match all_consuming(pair_list).parse(text) {
        Ok((_, pairs)) => Ok(pairs
            .into_iter()
            .map(|(id, value)| (id.to_string(), value.to_string()))
            .collect()),
        Err(e) => Err(format!("cannot parse {:?}: {}", text, e)),
    }
}
