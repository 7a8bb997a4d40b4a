//! Engineering-notation resistance values: `4.7k`, `220`, `1M`, `10kΩ`,
//! `68R`, `2.2 Mohm`.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::space0,
    combinator::{all_consuming, opt, value},
    number::complete::double,
    sequence::{delimited, preceded},
    IResult,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("malformed resistance value {0:?}")]
    Malformed(String),
}

/// Engineering-notation multiplier suffix.
fn eng_suffix(input: &str) -> IResult<&str, f64> {
    alt((
        value(1e-12, tag("p")),
        value(1e-9, tag("n")),
        value(1e-6, tag("u")),
        value(1e-6, tag("µ")),
        value(1e3, tag("k")),
        value(1e3, tag("K")),
        value(1e6, tag("M")),
        value(1e9, tag("G")),
        value(1e-3, tag("m")), // milli – after 'M' to disambiguate
    ))(input)
}

/// Optional unit: `Ω`, `ohm`, `ohms` or a bare `R`.
fn unit_suffix(input: &str) -> IResult<&str, ()> {
    value(
        (),
        alt((tag("Ω"), tag_no_case("ohms"), tag_no_case("ohm"), tag("R"))),
    )(input)
}

/// Parse a number with optional engineering suffix and unit.
pub fn eng_value(input: &str) -> IResult<&str, f64> {
    let (input, num) = double(input)?;
    let (input, mult) = opt(preceded(space0, eng_suffix))(input)?;
    let (input, _) = opt(preceded(space0, unit_suffix))(input)?;
    Ok((input, num * mult.unwrap_or(1.0)))
}

/// Parse a complete resistance string into ohms.
///
/// Surrounding whitespace is ignored; anything else left over is an error.
pub fn parse_resistance(src: &str) -> Result<f64, ValueError> {
    all_consuming(delimited(space0, eng_value, space0))(src)
        .map(|(_, v)| v)
        .map_err(|_| ValueError::Malformed(src.to_string()))
}

/// Format ohms the way part values are printed on schematics (`4.7kΩ`).
pub fn format_resistance(ohms: f64) -> String {
    let (scaled, suffix) = if ohms >= 1e9 {
        (ohms / 1e9, "G")
    } else if ohms >= 1e6 {
        (ohms / 1e6, "M")
    } else if ohms >= 1e3 {
        (ohms / 1e3, "k")
    } else {
        (ohms, "")
    };
    let text = format!("{scaled:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}{suffix}Ω")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ohms(s: &str) -> f64 {
        parse_resistance(s).unwrap_or_else(|e| panic!("{s}: {e}"))
    }

    #[test]
    fn plain_numbers() {
        assert_eq!(ohms("470"), 470.0);
        assert_eq!(ohms("1e5"), 100_000.0);
        assert_eq!(ohms("  22.5 "), 22.5);
    }

    #[test]
    fn suffixes() {
        assert!((ohms("4.7k") - 4_700.0).abs() < 1e-9);
        assert!((ohms("1M") - 1e6).abs() < 1e-6);
        assert!((ohms("2.2G") - 2.2e9).abs() < 1e-3);
        assert!((ohms("100m") - 0.1).abs() < 1e-12);
        assert!((ohms("10K") - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn units() {
        assert!((ohms("10kΩ") - 10_000.0).abs() < 1e-9);
        assert!((ohms("68R") - 68.0).abs() < 1e-12);
        assert!((ohms("2.2 Mohm") - 2.2e6).abs() < 1e-6);
        assert!((ohms("330 ohms") - 330.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_resistance("").is_err());
        assert!(parse_resistance("ten k").is_err());
        assert!(parse_resistance("4.7kx").is_err());
        assert_eq!(
            parse_resistance("1k2k"),
            Err(ValueError::Malformed("1k2k".to_string()))
        );
    }

    #[test]
    fn formatting() {
        assert_eq!(format_resistance(4_700.0), "4.7kΩ");
        assert_eq!(format_resistance(100_000.0), "100kΩ");
        assert_eq!(format_resistance(1e6), "1MΩ");
        assert_eq!(format_resistance(68.0), "68Ω");
    }
}
