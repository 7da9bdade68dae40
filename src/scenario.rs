//! Line-oriented `.scn` scenario stream reader
//!
//! Each line is one of three record kinds (§6): `sensors`, `faultInjection`, or
//! `ambiguityGroup`. Parsing is line-local and deliberately simple, curly-brace bodies are
//! split on top-level commas by hand rather than pulled in with a regex crate, since braces
//! never nest within a single record.

use std::collections::BTreeSet;
use std::io::BufRead;

use crate::diagnose::Observation;
use crate::error::ScenarioError;

/// One decoded line of a `.scn` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioRecord {
    /// `sensors @<timestamp> { key = value, ... };`
    Sensors {
        /// Timestamp tag, kept verbatim (not interpreted as a duration by this crate)
        timestamp: String,
        /// Signal name to boolean value
        values: Observation,
    },
    /// `faultInjection @<timestamp> isInjection = true, fault = { gate, ... }, parameters = {};`
    ///
    /// Ground truth, consulted only by this crate's own tests, never by [`crate::diagnose`].
    FaultInjection {
        /// Timestamp tag
        timestamp: String,
        /// Names of the gates declared faulty
        gates: BTreeSet<String>,
    },
    /// `ambiguityGroup @<timestamp> size = k, minCardinality = m, diagnoses = { {...}, ... };`
    ///
    /// Ground truth, consulted only by this crate's own tests, never by [`crate::diagnose`].
    AmbiguityGroup {
        /// Timestamp tag
        timestamp: String,
        /// The declared set of minimal diagnoses
        diagnoses: BTreeSet<BTreeSet<String>>,
    },
}

/// Extract the `@<timestamp>` tag immediately following `keyword`, if present
fn parse_timestamp(line: &str, keyword: &str) -> Option<String> {
    let rest = line.strip_prefix(keyword)?.trim_start();
    let rest = rest.strip_prefix('@')?;
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

/// Return the substring strictly between the first `{` and its matching (non-nested) `}`
fn brace_body(line: &str) -> Option<&str> {
    let start = line.find('{')?;
    let end = line[start..].find('}')? + start;
    Some(&line[start + 1..end])
}

fn parse_sensors(line: &str) -> Result<ScenarioRecord, ScenarioError> {
    let timestamp = parse_timestamp(line, "sensors").unwrap_or_default();
    let body = brace_body(line).ok_or_else(|| ScenarioError::MalformedLine {
        line: line.to_string(),
    })?;
    let mut values = Observation::new();
    for pair in body.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').ok_or_else(|| ScenarioError::MalformedLine {
            line: line.to_string(),
        })?;
        let key = key.trim().to_string();
        let token = value.trim();
        let parsed = match token {
            "true" => true,
            "false" => false,
            _ => {
                return Err(ScenarioError::InvalidValue {
                    key,
                    token: token.to_string(),
                })
            }
        };
        values.insert(key, parsed);
    }
    Ok(ScenarioRecord::Sensors { timestamp, values })
}

/// Find the brace body following a given top-level key, e.g. `fault` in `fault = { ... }`
fn keyed_brace_body<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let key_pos = line.find(key)?;
    let after_key = &line[key_pos + key.len()..];
    let eq_pos = after_key.find('=')?;
    brace_body(&after_key[eq_pos..])
}

fn parse_fault_injection(line: &str) -> Result<ScenarioRecord, ScenarioError> {
    let timestamp = parse_timestamp(line, "faultInjection").unwrap_or_default();
    let body = keyed_brace_body(line, "fault").unwrap_or("");
    let mut gates = BTreeSet::new();
    for pair in body.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let name = pair.split('=').next().unwrap_or(pair).trim();
        if !name.is_empty() {
            gates.insert(name.to_string());
        }
    }
    Ok(ScenarioRecord::FaultInjection { timestamp, gates })
}

fn parse_ambiguity_group(line: &str) -> Result<ScenarioRecord, ScenarioError> {
    let timestamp = parse_timestamp(line, "ambiguityGroup").unwrap_or_default();
    let diagnoses_pos = line.find("diagnoses").ok_or_else(|| ScenarioError::MalformedLine {
        line: line.to_string(),
    })?;
    let rest = &line[diagnoses_pos..];
    let outer_start = rest.find('{').ok_or_else(|| ScenarioError::MalformedLine {
        line: line.to_string(),
    })?;
    let outer_end = rest.rfind('}').ok_or_else(|| ScenarioError::MalformedLine {
        line: line.to_string(),
    })?;
    let inner = &rest[outer_start + 1..outer_end];

    let mut diagnoses = BTreeSet::new();
    let mut depth = 0usize;
    let mut current_start = None;
    for (i, c) in inner.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    current_start = Some(i + 1);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = current_start.take() {
                        let gates: BTreeSet<String> = inner[s..i]
                            .split(',')
                            .map(|g| g.trim())
                            .filter(|g| !g.is_empty())
                            .map(|g| g.to_string())
                            .collect();
                        if !gates.is_empty() {
                            diagnoses.insert(gates);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(ScenarioRecord::AmbiguityGroup {
        timestamp,
        diagnoses,
    })
}

/// Parse a single `.scn` line, returning `None` for blank or unrecognized lines
pub fn parse_line(line: &str) -> Result<Option<ScenarioRecord>, ScenarioError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with("sensors") {
        return parse_sensors(line).map(Some);
    }
    if line.starts_with("faultInjection") {
        return parse_fault_injection(line).map(Some);
    }
    if line.starts_with("ambiguityGroup") {
        return parse_ambiguity_group(line).map(Some);
    }
    Ok(None)
}

/// Read every recognized record from a `.scn` stream, in file order
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ScenarioRecord>, ScenarioError> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| ScenarioError::MalformedLine {
            line: e.to_string(),
        })?;
        if let Some(record) = parse_line(&line)? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sensors() {
        let line = "sensors @1000 { i1 = true, i2 = false, o1 = true };";
        let record = parse_line(line).unwrap().unwrap();
        match record {
            ScenarioRecord::Sensors { timestamp, values } => {
                assert_eq!(timestamp, "1000");
                assert_eq!(values.get("i1"), Some(&true));
                assert_eq!(values.get("i2"), Some(&false));
                assert_eq!(values.get("o1"), Some(&true));
            }
            _ => panic!("expected Sensors"),
        }
    }

    #[test]
    fn test_parse_sensors_invalid_token() {
        let line = "sensors @1000 { i1 = maybe };";
        let err = parse_line(line).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_fault_injection() {
        let line = "faultInjection @2000 isInjection = true, fault = { gate5 = faulty, gate9 = faulty }, parameters = {};";
        let record = parse_line(line).unwrap().unwrap();
        match record {
            ScenarioRecord::FaultInjection { timestamp, gates } => {
                assert_eq!(timestamp, "2000");
                assert_eq!(
                    gates,
                    BTreeSet::from(["gate5".to_string(), "gate9".to_string()])
                );
            }
            _ => panic!("expected FaultInjection"),
        }
    }

    #[test]
    fn test_parse_ambiguity_group() {
        let line = "ambiguityGroup @7000 size = 2, minCardinality = 1, diagnoses = { { gate107 }, { gate97 } };";
        let record = parse_line(line).unwrap().unwrap();
        match record {
            ScenarioRecord::AmbiguityGroup { timestamp, diagnoses } => {
                assert_eq!(timestamp, "7000");
                assert_eq!(diagnoses.len(), 2);
                assert!(diagnoses.contains(&BTreeSet::from(["gate107".to_string()])));
                assert!(diagnoses.contains(&BTreeSet::from(["gate97".to_string()])));
            }
            _ => panic!("expected AmbiguityGroup"),
        }
    }

    #[test]
    fn test_parse_ambiguity_group_multi_fault() {
        let line = "ambiguityGroup @1 size = 1, minCardinality = 2, diagnoses = { { gate101, gate106 } };";
        let record = parse_line(line).unwrap().unwrap();
        match record {
            ScenarioRecord::AmbiguityGroup { diagnoses, .. } => {
                assert_eq!(
                    diagnoses,
                    BTreeSet::from([BTreeSet::from(["gate101".to_string(), "gate106".to_string()])])
                );
            }
            _ => panic!("expected AmbiguityGroup"),
        }
    }

    #[test]
    fn test_unrecognized_line_ignored() {
        assert_eq!(parse_line("# a comment").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
    }

    #[test]
    fn test_read_records_in_order() {
        let text = b"sensors @1 { i1 = true };\nfaultInjection @2 isInjection = true, fault = { gate1 = faulty }, parameters = {};\nsensors @3 { i1 = false };\n";
        let records = read_records(&text[..]).unwrap();
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0], ScenarioRecord::Sensors { .. }));
        assert!(matches!(records[1], ScenarioRecord::FaultInjection { .. }));
        assert!(matches!(records[2], ScenarioRecord::Sensors { .. }));
    }
}
