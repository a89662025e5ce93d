use fnv::FnvBuildHasher;
use std::collections::HashMap;
use thiserror::Error;

use crate::ConvertError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParserError {
    #[error("Unknown syntax on line {line}: {fragment}")]
    UnknownFieldSyntax { line: u32, fragment: String },
}

/// classification of one trimmed input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineClass<'a> {
    Blank,
    Comment,
    Candidate(&'a str),
}

// Blank lines and ';' comments carry no record data and are never parsed
pub(crate) fn classify_line(line: &str) -> LineClass<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineClass::Blank
    } else if trimmed.starts_with(';') {
        LineClass::Comment
    } else {
        LineClass::Candidate(trimmed)
    }
}

/// One record from an Altium constraint file: a set of `key=value` fields.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConstraintRecord {
    fields: HashMap<String, String, FnvBuildHasher>,
}

impl ConstraintRecord {
    /// get a field value; a missing field reads as the empty string
    pub(crate) fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

pub(crate) struct ParserState<'a> {
    log_msgs: &'a mut Vec<ConvertError>,
    strict: bool,
}

impl<'a> ParserState<'a> {
    pub(crate) fn new(log_msgs: &'a mut Vec<ConvertError>, strict: bool) -> Self {
        Self { log_msgs, strict }
    }

    fn log_warning(&mut self, parse_error: ParserError) {
        self.log_msgs.push(ConvertError::ParserError {
            parser_error: parse_error,
        });
    }

    fn error_or_log(&mut self, err: ParserError) -> Result<(), ParserError> {
        if self.strict {
            Err(err)
        } else {
            self.log_warning(err);
            Ok(())
        }
    }
}

/// Parse the text of a constraint file into records.
///
/// Every line that is not blank and not a comment produces one record, even if
/// all of its fields turn out to be malformed - such a record simply has no
/// fields. Malformed fields are reported through `log_msgs` and skipped; with
/// `strict` parsing they abort instead.
pub(crate) fn parse_records(
    filedata: &str,
    log_msgs: &mut Vec<ConvertError>,
    strict: bool,
) -> Result<Vec<ConstraintRecord>, ParserError> {
    let mut parser = ParserState::new(log_msgs, strict);
    let mut records = Vec::new();
    let mut line_number: u32 = 0;
    for line in filedata.lines() {
        line_number += 1;
        match classify_line(line) {
            LineClass::Blank | LineClass::Comment => {}
            LineClass::Candidate(text) => {
                records.push(parse_record(text, line_number, &mut parser)?);
            }
        }
    }
    Ok(records)
}

// parse one record line: 'key=value' fields separated by '|'
fn parse_record(
    text: &str,
    line_number: u32,
    parser: &mut ParserState,
) -> Result<ConstraintRecord, ParserError> {
    let mut record = ConstraintRecord {
        fields: HashMap::default(),
    };
    // consecutive or trailing '|' produce empty fragments, which carry no data
    for fragment in text.split('|').filter(|fragment| !fragment.is_empty()) {
        let fragment = fragment.trim();
        let parts: Vec<&str> = fragment.split('=').filter(|part| !part.is_empty()).collect();
        if parts.len() != 2 {
            parser.error_or_log(ParserError::UnknownFieldSyntax {
                line: line_number,
                fragment: fragment.to_string(),
            })?;
            continue;
        }
        // a later duplicate key overwrites the earlier value within the record
        record
            .fields
            .insert(parts[0].trim().to_string(), parts[1].trim().to_string());
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> (Vec<ConstraintRecord>, Vec<ConvertError>) {
        let mut log_msgs = Vec::new();
        let records = parse_records(text, &mut log_msgs, false).unwrap();
        (records, log_msgs)
    }

    #[test]
    fn line_classification() {
        assert_eq!(classify_line(""), LineClass::Blank);
        assert_eq!(classify_line("   \t  "), LineClass::Blank);
        assert_eq!(classify_line("; a comment"), LineClass::Comment);
        assert_eq!(classify_line("   ;indented comment"), LineClass::Comment);
        assert_eq!(classify_line(" Record=Header "), LineClass::Candidate("Record=Header"));
    }

    #[test]
    fn parse_simple_record() {
        let (records, log_msgs) =
            parse_ok("Record=Constraint | TargetKind=Port | TargetId=CLK_50MHZ");
        assert!(log_msgs.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("Record"), "Constraint");
        assert_eq!(records[0].field("TargetKind"), "Port");
        assert_eq!(records[0].field("TargetId"), "CLK_50MHZ");
        assert_eq!(records[0].field("FPGA_PINNUM"), "");
    }

    #[test]
    fn blank_and_comment_lines_produce_nothing() {
        let (records, log_msgs) = parse_ok("\n; header comment\n   \n;;;\n");
        assert!(records.is_empty());
        assert!(log_msgs.is_empty());
    }

    #[test]
    fn duplicate_key_overwrites() {
        let (records, log_msgs) = parse_ok("TargetId=A | TargetId=B");
        assert!(log_msgs.is_empty());
        assert_eq!(records[0].field("TargetId"), "B");
    }

    #[test]
    fn empty_fragments_are_discarded() {
        let (records, log_msgs) = parse_ok("Record=Constraint||TargetKind=Port|");
        assert!(log_msgs.is_empty());
        assert_eq!(records[0].field("Record"), "Constraint");
        assert_eq!(records[0].field("TargetKind"), "Port");
    }

    #[test]
    fn consecutive_equals_signs_collapse() {
        // "A==B" splits into exactly two non-empty parts and is accepted
        let (records, log_msgs) = parse_ok("TargetId==CLK");
        assert!(log_msgs.is_empty());
        assert_eq!(records[0].field("TargetId"), "CLK");
    }

    #[test]
    fn malformed_fragment_is_skipped_with_warning() {
        let (records, log_msgs) =
            parse_ok("Record=Constraint | A=B=C | TargetKind=Port");
        assert_eq!(log_msgs.len(), 1);
        assert!(matches!(
            &log_msgs[0],
            ConvertError::ParserError {
                parser_error: ParserError::UnknownFieldSyntax { line: 1, fragment }
            } if fragment == "A=B=C"
        ));
        // the rest of the record is intact
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("Record"), "Constraint");
        assert_eq!(records[0].field("TargetKind"), "Port");
        assert_eq!(records[0].field("A"), "");
    }

    #[test]
    fn fragment_without_value_is_malformed() {
        let (records, log_msgs) = parse_ok("Record= | TargetKind=Port");
        assert_eq!(log_msgs.len(), 1);
        assert_eq!(records[0].field("Record"), "");
        assert_eq!(records[0].field("TargetKind"), "Port");
    }

    #[test]
    fn fragment_without_key_is_malformed() {
        let (_records, log_msgs) = parse_ok("=Port");
        assert_eq!(log_msgs.len(), 1);
    }

    #[test]
    fn whitespace_only_fragment_is_malformed() {
        let (records, log_msgs) = parse_ok("Record=Constraint | | TargetKind=Port");
        assert_eq!(log_msgs.len(), 1);
        assert!(matches!(
            &log_msgs[0],
            ConvertError::ParserError {
                parser_error: ParserError::UnknownFieldSyntax { fragment, .. }
            } if fragment.is_empty()
        ));
        assert_eq!(records[0].field("TargetKind"), "Port");
    }

    #[test]
    fn fully_malformed_line_yields_empty_record() {
        let (records, log_msgs) = parse_ok("not a record line");
        assert_eq!(log_msgs.len(), 1);
        // a record is still produced, it just has no fields
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("not"), "");
    }

    #[test]
    fn warning_carries_the_line_number() {
        let text = "Record=Header\n; comment\n\nRecord=Constraint | oops";
        let (_records, log_msgs) = parse_ok(text);
        assert_eq!(log_msgs.len(), 1);
        assert!(matches!(
            &log_msgs[0],
            ConvertError::ParserError {
                parser_error: ParserError::UnknownFieldSyntax { line: 4, .. }
            }
        ));
    }

    #[test]
    fn key_and_value_are_trimmed() {
        let (records, log_msgs) = parse_ok("  TargetId =  CLK  | TargetKind\t=\tPort ");
        assert!(log_msgs.is_empty());
        assert_eq!(records[0].field("TargetId"), "CLK");
        assert_eq!(records[0].field("TargetKind"), "Port");
    }

    #[test]
    fn strict_parsing_aborts_on_malformed_fragment() {
        let mut log_msgs = Vec::new();
        let result = parse_records("Record=Constraint | A=B=C", &mut log_msgs, true);
        assert!(matches!(
            result,
            Err(ParserError::UnknownFieldSyntax { line: 1, .. })
        ));
        assert!(log_msgs.is_empty());
    }

    #[test]
    fn warning_message_text() {
        let (_records, log_msgs) = parse_ok("A=B=C");
        assert_eq!(
            log_msgs[0].to_string(),
            "Parser error: Unknown syntax on line 1: A=B=C"
        );
    }
}
