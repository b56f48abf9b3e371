//! Challenge input: a line-oriented text format naming the route endpoints
//! and the available relays.
//!
//! ```text
//! #SEED: 0.0594
//! SAT0,-35.2,72.6,638.7
//! ROUTE,31.8,-0.56,-36.1,159.7
//! ```

use std::fs;
use std::io::{self, Read};
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::{GeoPosition, Location};

pub const SOURCE_NAME: &str = "SOURCE";
pub const TARGET_NAME: &str = "TARGET";

const ROUTE_RECORD: &str = "ROUTE";
const COMMENT_MARKER: char = '#';

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error reading standard input: {0}")]
    Stdin(#[source] io::Error),
    #[error("line {line}: '{value}' is not a number")]
    InvalidNumber {
        line: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("line {line}: {record} record expects {expected} fields, found {found}")]
    MalformedRecord {
        line: usize,
        record: String,
        expected: usize,
        found: usize,
    },
    #[error("challenge data has no ROUTE record")]
    MissingRoute,
}

/// Parsed challenge: route endpoints, relays in input order, and the
/// comment lines verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct ChallengeDetails {
    pub source: Location,
    pub target: Location,
    pub relays: Vec<Location>,
    pub comments: Vec<String>,
}

/// Reads challenge text from `path`, or from standard input when `path` is
/// absent or `-`. Surrounding whitespace is trimmed.
pub fn read_challenge(path: Option<&Path>) -> Result<String, DataError> {
    let contents = match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).map_err(|source| DataError::Read {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(DataError::Stdin)?;
            buffer
        }
    };
    Ok(contents.trim().to_string())
}

pub fn read_challenge_from_file<P: AsRef<Path>>(path: P) -> Result<ChallengeDetails, DataError> {
    let contents = read_challenge(Some(path.as_ref()))?;
    parse(&contents)
}

/// Parses challenge text.
///
/// Lines containing `#` are comments. `ROUTE,lat,lon,lat,lon` sets the
/// source and target (at zero altitude; the last such record wins); any
/// other `NAME,lat,lon,alt` record adds a relay. Blank lines are skipped.
pub fn parse(contents: &str) -> Result<ChallengeDetails, DataError> {
    let mut endpoints = None;
    let mut relays = Vec::new();
    let mut comments = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line = idx + 1;

        if raw.contains(COMMENT_MARKER) {
            comments.push(raw.to_string());
            continue;
        }
        if raw.trim().is_empty() {
            continue;
        }

        let mut fields = raw.split(',').map(str::trim);
        let record = fields.next().unwrap_or_default();
        let values = fields
            .map(|value| parse_number(line, value))
            .collect::<Result<Vec<f64>, DataError>>()?;

        if record == ROUTE_RECORD {
            let [lat_s, lon_s, lat_t, lon_t] = expect_fields::<4>(line, record, &values)?;
            endpoints = Some((
                Location::new(SOURCE_NAME, at_surface(lat_s, lon_s)),
                Location::new(TARGET_NAME, at_surface(lat_t, lon_t)),
            ));
        } else {
            let [latitude, longitude, altitude] = expect_fields::<3>(line, record, &values)?;
            relays.push(Location::new(
                record,
                GeoPosition {
                    latitude,
                    longitude,
                    altitude,
                },
            ));
        }
    }

    let (source, target) = endpoints.ok_or(DataError::MissingRoute)?;
    debug!(
        "parsed challenge with {} relay(s) and {} comment line(s)",
        relays.len(),
        comments.len()
    );

    Ok(ChallengeDetails {
        source,
        target,
        relays,
        comments,
    })
}

fn parse_number(line: usize, value: &str) -> Result<f64, DataError> {
    value.parse().map_err(|source| DataError::InvalidNumber {
        line,
        value: value.to_string(),
        source,
    })
}

fn expect_fields<const N: usize>(
    line: usize,
    record: &str,
    values: &[f64],
) -> Result<[f64; N], DataError> {
    values
        .try_into()
        .map_err(|_| DataError::MalformedRecord {
            line,
            record: record.to_string(),
            expected: N,
            found: values.len(),
        })
}

fn at_surface(latitude: f64, longitude: f64) -> GeoPosition {
    GeoPosition {
        latitude,
        longitude,
        altitude: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Locate;
    use std::io::Write;

    const SAMPLE: &str = "#SEED: 0.6038107015192509\n\
SAT0,-27.404, -52.596, 338.67\n\
SAT1,10.5,20.25,400\n\
\n\
ROUTE,-6.57,-78.40,10.43,85.49\n\
# trailing note\n";

    #[test]
    fn parses_relays_route_and_comments() {
        let details = parse(SAMPLE).expect("sample parses");

        assert_eq!(details.source.name(), SOURCE_NAME);
        assert_eq!(details.target.name(), TARGET_NAME);
        assert_eq!(details.source.geo().latitude, -6.57);
        assert_eq!(details.target.geo().longitude, 85.49);
        assert_eq!(details.target.geo().altitude, 0.0);

        let names: Vec<&str> = details.relays.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["SAT0", "SAT1"]);
        assert_eq!(details.relays[0].geo().longitude, -52.596);
        assert_eq!(details.relays[1].geo().altitude, 400.0);

        assert_eq!(
            details.comments,
            vec!["#SEED: 0.6038107015192509", "# trailing note"]
        );
    }

    #[test]
    fn later_route_replaces_earlier() {
        let details = parse("ROUTE,1,2,3,4\nROUTE,5,6,7,8").expect("parses");
        assert_eq!(details.source.geo().latitude, 5.0);
        assert_eq!(details.target.geo().longitude, 8.0);
        assert!(details.relays.is_empty());
    }

    #[test]
    fn rejects_missing_route() {
        let err = parse("SAT0,1,2,3").expect_err("no route");
        assert!(matches!(err, DataError::MissingRoute));
    }

    #[test]
    fn rejects_bad_numbers_with_line() {
        let err = parse("ROUTE,1,2,3,4\nSAT0,1,north,3").expect_err("bad number");
        match err {
            DataError::InvalidNumber { line, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(value, "north");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = parse("ROUTE,1,2,3").expect_err("short route");
        match err {
            DataError::MalformedRecord {
                line,
                record,
                expected,
                found,
            } => {
                assert_eq!((line, record.as_str(), expected, found), (1, "ROUTE", 4, 3));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse("ROUTE,1,2,3,4\nSAT0,1,2").is_err());
    }

    #[test]
    fn reads_challenge_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "\n{}\n", SAMPLE).expect("write sample");

        let raw = read_challenge(Some(file.path())).expect("read");
        assert!(raw.starts_with("#SEED"));

        let details = read_challenge_from_file(file.path()).expect("parse file");
        assert_eq!(details.relays.len(), 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_challenge(Some(Path::new("/definitely/not/here.txt")))
            .expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
