//! Report protocol numbers: `OS-<YYYY>-<NNNNNN>`, sequential within a year.

pub const PROTOCOL_PREFIX: &str = "OS";
const SEQUENCE_DIGITS: usize = 6;

pub fn year_prefix(year: i32) -> String {
    format!("{}-{}-", PROTOCOL_PREFIX, year)
}

pub fn format_protocol(year: i32, sequence: u32) -> String {
    format!("{}{:0width$}", year_prefix(year), sequence, width = SEQUENCE_DIGITS)
}

/// Sequence following `last`, the most recent protocol issued for `year`.
pub fn next_sequence(last: Option<&str>, year: i32) -> u32 {
    last.and_then(|protocol| protocol.strip_prefix(year_prefix(year).as_str()))
        .and_then(|seq| seq.parse::<u32>().ok())
        .map_or(1, |seq| seq + 1)
}
