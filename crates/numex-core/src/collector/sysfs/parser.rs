//! Parsers for per-node sysfs memory files.
//!
//! These are pure functions that parse the content of a node's `meminfo`
//! and `numastat` files into structured data. They are designed to be
//! easily testable with string inputs.

use std::collections::HashMap;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A line with an unexpected field count or unit token; carries the
    /// raw line text.
    MalformedLine(String),
    /// A numeric token that does not parse as a base-10 float; carries the
    /// raw token.
    InvalidValue(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MalformedLine(line) => write!(f, "unexpected line format: {}", line),
            ParseError::InvalidValue(token) => write!(f, "invalid numeric value: {}", token),
        }
    }
}

impl std::error::Error for ParseError {}

/// One gauge sample parsed from a node's `meminfo` file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeminfoSample {
    /// Normalized field name, e.g. `Active_anon`.
    pub field: String,
    /// Node id taken from the line's own second field.
    pub node: String,
    /// Field value in bytes for `kB` lines, verbatim otherwise.
    pub value: f64,
}

/// Normalizes a raw meminfo field token into a metric-name form.
///
/// Strips one trailing colon and rewrites a single parenthesized group,
/// `Active(anon)` -> `Active_anon`. Names without parentheses pass through
/// unchanged, so the transform is idempotent. Handles exactly one
/// parenthesized group per name; meminfo never emits more.
pub fn normalize_field_name(raw: &str) -> String {
    let name = raw.strip_suffix(':').unwrap_or(raw);
    match (name.find('('), name.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            let mut normalized = String::with_capacity(name.len());
            normalized.push_str(&name[..open]);
            normalized.push('_');
            normalized.push_str(&name[open + 1..close]);
            normalized.push_str(&name[close + 1..]);
            normalized
        }
        _ => name.to_string(),
    }
}

/// Parses a node's `meminfo` content into gauge samples.
///
/// Lines have the shape `Node <id> <Field>: <value> [kB]`. Values with the
/// `kB` unit are converted to bytes; 4-field lines are transcribed as-is.
/// Any other shape fails the parse. Blank lines are skipped.
pub fn parse_node_meminfo(content: &str) -> Result<Vec<MeminfoSample>, ParseError> {
    let mut samples = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        let has_unit = match parts.len() {
            4 => false,
            5 if parts[4] == "kB" => true,
            _ => return Err(ParseError::MalformedLine(line.to_string())),
        };

        let mut value: f64 = parts[3]
            .parse()
            .map_err(|_| ParseError::InvalidValue(parts[3].to_string()))?;
        if has_unit {
            value *= 1024.0;
        }

        samples.push(MeminfoSample {
            field: normalize_field_name(parts[2]),
            node: parts[1].to_string(),
            value,
        });
    }

    Ok(samples)
}

/// Parses a node's `numastat` content into a counter map.
///
/// Lines have the shape `<field> <value>`; names are used verbatim and no
/// unit handling applies. The caller attaches the node id, since this file
/// does not repeat it per line. Blank lines are skipped.
pub fn parse_node_numastat(content: &str) -> Result<HashMap<String, f64>, ParseError> {
    let mut counters = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(ParseError::MalformedLine(line.to_string()));
        }

        let value: f64 = parts[1]
            .parse()
            .map_err(|_| ParseError::InvalidValue(parts[1].to_string()))?;
        counters.insert(parts[0].to_string(), value);
    }

    Ok(counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_name() {
        assert_eq!(normalize_field_name("MemFree:"), "MemFree");
        assert_eq!(normalize_field_name("MemTotal"), "MemTotal");
    }

    #[test]
    fn test_normalize_parenthesized_name() {
        assert_eq!(normalize_field_name("Active(anon):"), "Active_anon");
        assert_eq!(normalize_field_name("Inactive(file)"), "Inactive_file");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_field_name("Active(anon):");
        assert_eq!(normalize_field_name(&once), once);
        assert_eq!(normalize_field_name("HugePages_Total"), "HugePages_Total");
    }

    #[test]
    fn test_parse_meminfo_kb_line() {
        let samples = parse_node_meminfo("Node 0 MemTotal:       16308148 kB\n").unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].field, "MemTotal");
        assert_eq!(samples[0].node, "0");
        assert_eq!(samples[0].value, 16308148.0 * 1024.0);
    }

    #[test]
    fn test_parse_meminfo_unitless_line() {
        let samples = parse_node_meminfo("Node 0 HugePages_Total:     512\n").unwrap();
        assert_eq!(samples[0].field, "HugePages_Total");
        assert_eq!(samples[0].value, 512.0);
    }

    #[test]
    fn test_parse_meminfo_parenthesized_field() {
        let samples = parse_node_meminfo("Node 0 Active(anon):   1234 kB\n").unwrap();
        assert_eq!(samples[0].field, "Active_anon");
        assert_eq!(samples[0].value, 1234.0 * 1024.0);
    }

    #[test]
    fn test_parse_meminfo_node_id_from_line() {
        // The node id comes from the line text, not the file location.
        let samples = parse_node_meminfo("Node 3 MemFree: 100 kB\n").unwrap();
        assert_eq!(samples[0].node, "3");
    }

    #[test]
    fn test_parse_meminfo_blank_lines_skipped() {
        let content = "\nNode 0 MemFree: 100 kB\n   \n\nNode 0 MemUsed: 200 kB\n";
        let samples = parse_node_meminfo(content).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_parse_meminfo_bad_unit_token() {
        let err = parse_node_meminfo("Node 0 MemTotal: 100 MB\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedLine("Node 0 MemTotal: 100 MB".to_string())
        );
    }

    #[test]
    fn test_parse_meminfo_wrong_field_count() {
        // Too few fields.
        let err = parse_node_meminfo("Node 0 MemTotal:\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine(_)));

        // Six fields; the error carries the exact line text.
        let err = parse_node_meminfo("Node 0 MemTotal: 100 kB extra\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedLine("Node 0 MemTotal: 100 kB extra".to_string())
        );
    }

    #[test]
    fn test_parse_meminfo_invalid_value() {
        let err = parse_node_meminfo("Node 0 MemTotal: abc kB\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidValue("abc".to_string()));
    }

    #[test]
    fn test_parse_numastat() {
        let counters = parse_node_numastat(
            "numa_hit 193460335812\nnuma_miss 12624528\ninterleave_hit 63062\n",
        )
        .unwrap();
        assert_eq!(counters.len(), 3);
        assert_eq!(counters["numa_hit"], 193460335812.0);
        assert_eq!(counters["numa_miss"], 12624528.0);
    }

    #[test]
    fn test_parse_numastat_names_verbatim() {
        // No normalization and no unit conversion for this format.
        let counters = parse_node_numastat("local_node 42\n").unwrap();
        assert_eq!(counters["local_node"], 42.0);
    }

    #[test]
    fn test_parse_numastat_blank_lines_skipped() {
        let counters = parse_node_numastat("\nnuma_hit 1\n\n").unwrap();
        assert_eq!(counters.len(), 1);
    }

    #[test]
    fn test_parse_numastat_wrong_field_count() {
        let err = parse_node_numastat("numa_hit 1 2\n").unwrap_err();
        assert_eq!(err, ParseError::MalformedLine("numa_hit 1 2".to_string()));

        let err = parse_node_numastat("numa_hit\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine(_)));
    }

    #[test]
    fn test_parse_numastat_invalid_value() {
        let err = parse_node_numastat("numa_hit xyz\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidValue("xyz".to_string()));
    }
}
