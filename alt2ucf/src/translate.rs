//! Translation of parsed constraint records into UCF directives

use crate::parser::ConstraintRecord;
use crate::ucf::{UcfAttribute, UcfDirective, UcfFile};

/// renaming of Altium attribute names to their UCF counterparts
const TAG_TABLE: [(&str, UcfAttribute); 4] = [
    ("FPGA_PINNUM", UcfAttribute::Loc),
    ("FPGA_IOSTANDARD", UcfAttribute::IoStandard),
    ("FPGA_SLEW", UcfAttribute::Slew),
    ("FPGA_DRIVE", UcfAttribute::Drive),
];

/// IO standard names that Altium and the Xilinx toolchain spell differently.
/// Values that do not appear here pass through unchanged.
const IOSTANDARD_TRANSLATION: [(&str, &str); 7] = [
    ("LVDS", "LVDS_25"),
    ("HSTLI_18", "HSTL_I_18"),
    ("HSTLII_18", "HSTL_II_18"),
    ("HSTLIII_18", "HSTL_III_18"),
    ("DHSTL18I", "DIFF_HSTL_I_18"),
    ("DHSTL18II", "DIFF_HSTL_II_18"),
    ("DHSTL18III", "DIFF_HSTL_III_18"),
];

/// Convert parsed records into a `UcfFile`.
///
/// Only `Record=Constraint` / `TargetKind=Port` records contribute output;
/// everything else in the file describes other constraint kinds and is
/// dropped without comment.
pub(crate) fn translate(records: &[ConstraintRecord]) -> UcfFile {
    let mut ucf_file = UcfFile::new();
    for record in records {
        if record.field("Record") != "Constraint" || record.field("TargetKind") != "Port" {
            continue;
        }
        // per-attribute value lists, aligned with the expanded identifiers by position
        let value_lists: Vec<Vec<&str>> = TAG_TABLE
            .iter()
            .map(|(input_name, _)| split_value_list(record.field(input_name)))
            .collect();
        for (index, identifier) in expand_target_id(record.field("TargetId"))
            .into_iter()
            .enumerate()
        {
            let mut directive = UcfDirective::new(identifier);
            for ((_, attribute), values) in TAG_TABLE.iter().zip(&value_lists) {
                // a list shorter than the identifier count means the
                // remaining identifiers don't get this attribute
                if let Some(raw_value) = values.get(index) {
                    directive.set_attribute(*attribute, translate_value(*attribute, raw_value));
                }
            }
            ucf_file.directives.push(directive);
        }
    }
    ucf_file
}

// comma-separated attribute values; empty components are discarded
fn split_value_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .filter(|component| !component.is_empty())
        .collect()
}

fn translate_value(attribute: UcfAttribute, raw_value: &str) -> String {
    match attribute {
        UcfAttribute::IoStandard => {
            for (altium_name, xilinx_name) in &IOSTANDARD_TRANSLATION {
                if raw_value == *altium_name {
                    return (*xilinx_name).to_string();
                }
            }
            raw_value.to_string()
        }
        UcfAttribute::Loc => quote_value(raw_value),
        UcfAttribute::Slew | UcfAttribute::Drive => raw_value.to_string(),
    }
}

// LOC values are quoted in UCF syntax; values arriving already quoted stay as they are
fn quote_value(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') {
        value.to_string()
    } else {
        format!("\"{value}\"")
    }
}

#[derive(Debug, PartialEq, Eq)]
struct BusRange<'a> {
    base: &'a str,
    hi: u32,
    lo: u32,
}

/// Expand a `TargetId` into scalar signal names.
///
/// `DQ[3..0]` expands to `DQ<3>`, `DQ<2>`, `DQ<1>`, `DQ<0>`. Expansion always
/// steps downwards from the first index to the second, so a range whose first
/// index is smaller than the second produces no names at all. An identifier
/// without a recognizable range passes through unchanged.
pub(crate) fn expand_target_id(target_id: &str) -> Vec<String> {
    match find_bus_range(target_id) {
        Some(range) => (range.lo..=range.hi)
            .rev()
            .map(|index| format!("{}<{}>", range.base, index))
            .collect(),
        None => vec![target_id.to_string()],
    }
}

// Recognize a bus range `base[hi..lo]` inside the identifier. The base is a
// maximal run of non-whitespace characters, so the search looks at each
// whitespace-separated run in turn and takes the rightmost '[' in the run
// that starts a well-formed range suffix: the longest possible base wins.
fn find_bus_range(target_id: &str) -> Option<BusRange<'_>> {
    for run in target_id.split_whitespace() {
        for (pos, _) in run.char_indices().rev().filter(|&(_, c)| c == '[') {
            if pos == 0 {
                // the base may not be empty
                continue;
            }
            if let Some((hi, lo)) = parse_range_suffix(&run[pos..]) {
                return Some(BusRange {
                    base: &run[..pos],
                    hi,
                    lo,
                });
            }
        }
    }
    None
}

// parse "[<hi>..<lo>]" at the start of the text; trailing characters after ']' are allowed
fn parse_range_suffix(text: &str) -> Option<(u32, u32)> {
    let rest = text.strip_prefix('[')?;
    let (hi, rest) = parse_index(rest)?;
    let rest = rest.strip_prefix("..")?;
    let (lo, rest) = parse_index(rest)?;
    rest.starts_with(']').then_some((hi, lo))
}

// parse a decimal index at the start of the text, returning it and the remaining text
fn parse_index(text: &str) -> Option<(u32, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let value = text[..end].parse().ok()?;
    Some((value, &text[end..]))
}
