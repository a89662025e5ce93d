//! alt2ucf is a library that converts Altium Designer pin constraint files
//! into Xilinx UCF constraint files.
//!
//! An Altium `.Constraint` file stores one record per line as `|`-separated
//! `key=value` fields. The port constraint records are converted into UCF
//! `NET` directives: bus ranges like `DQ[3..0]` are expanded into the
//! individual signals `DQ<3>` .. `DQ<0>`, the Altium attribute names are
//! renamed to their UCF counterparts, and IO standard names that the two
//! toolchains spell differently are translated. All other record kinds are
//! skipped.
//!
//! ```rust
//! let input = "Record=Constraint | TargetKind=Port | TargetId=CLK | FPGA_PINNUM=A12";
//! let (ucf, log_msgs) = alt2ucf::load_from_string(input, false).unwrap();
//! assert!(log_msgs.is_empty());
//! assert_eq!(ucf.write_to_string(), "NET \"CLK\" LOC = \"A12\";\n");
//! ```

mod loader;
mod parser;
mod translate;
mod ucf;
mod writer;

pub use loader::default_output_filename;
pub use parser::ParserError;
pub use ucf::{DirectiveList, UcfAttribute, UcfDirective, UcfFile};

use std::path::{Path, PathBuf};
use thiserror::Error;
use writer::Writer;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// `FileOpenError`: An `IoError` that occurred while opening the input file
    #[error("Failed to load {filename}: {ioerror}")]
    FileOpenError {
        filename: PathBuf,
        ioerror: std::io::Error,
    },

    /// `FileReadError`: An `IoError` that occurred while reading from the input file
    #[error("Could not read from {filename}: {ioerror}")]
    FileReadError {
        filename: PathBuf,
        ioerror: std::io::Error,
    },

    /// `FileWriteError`: An `IoError` that occurred while writing the output file
    #[error("Could not write to {filename}: {ioerror}")]
    FileWriteError {
        filename: PathBuf,
        ioerror: std::io::Error,
    },

    /// `ParserError`: A constraint record could not be parsed
    #[error("Parser error: {parser_error}")]
    ParserError { parser_error: ParserError },
}

/**
Load an Altium constraint file and convert it to UCF

`log_msgs` in the returned pair receives all warnings generated during parsing;
a malformed `key=value` field is reported there and skipped, it never aborts
the conversion.

`strict` toggles strict parsing: if strict parsing is enabled, the warnings
become errors.

# Example
```
# use alt2ucf::ConvertError;
match alt2ucf::load("demo.Constraint", false) {
    Ok((ucf_file, log_msgs)) => { /* write it out */ }
    Err(error_message) => println!("{error_message}"),
}
```

# Errors

A `ConvertError` provides detailed information if the conversion fails.
 */
pub fn load<P: AsRef<Path>>(path: P, strict: bool) -> Result<(UcfFile, Vec<ConvertError>), ConvertError> {
    let filedata = loader::load(path.as_ref())?;
    load_impl(&filedata, strict)
}

/**
Convert Altium constraint data stored in a string

`constraint_data` contains the text of an Altium constraint file.

`strict` toggles strict parsing: if strict parsing is enabled, the warnings
become errors.

# Example

```rust
let text = r#"
; Pin constraints
Record=Constraint | TargetKind=Port | TargetId=DQ[1..0] | FPGA_PINNUM=C3,C4
"#;
let (ucf, log_msgs) = alt2ucf::load_from_string(text, true).unwrap();
assert_eq!(ucf.directives.len(), 2);
```

# Errors

A `ConvertError` provides detailed information if the conversion fails.
 */
pub fn load_from_string(
    constraint_data: &str,
    strict: bool,
) -> Result<(UcfFile, Vec<ConvertError>), ConvertError> {
    load_impl(constraint_data, strict)
}

fn load_impl(filedata: &str, strict: bool) -> Result<(UcfFile, Vec<ConvertError>), ConvertError> {
    let mut log_msgs = Vec::<ConvertError>::new();

    // build the records from the input lines
    let records = parser::parse_records(filedata, &mut log_msgs, strict)
        .map_err(|parser_error| ConvertError::ParserError { parser_error })?;

    // filter, expand and translate the records into NET directives
    let ucf_file = translate::translate(&records);

    Ok((ucf_file, log_msgs))
}

impl UcfFile {
    /// construct a string containing the whole UCF data of this `UcfFile` object
    #[must_use]
    pub fn write_to_string(&self) -> String {
        let mut writer = Writer::new();
        for directive in &self.directives {
            writer.add_directive(directive);
        }
        writer.finish()
    }

    /// write this `UcfFile` object to the given file
    /// the banner will be placed inside a `#` comment at the beginning of the file
    ///
    /// # Errors
    ///
    /// [`ConvertError::FileWriteError`] if writing the file fails.
    pub fn write<P: AsRef<Path>>(&self, path: P, banner: Option<&str>) -> Result<(), ConvertError> {
        let mut writer = Writer::new();
        if let Some(banner_text) = banner {
            writer.add_comment(banner_text);
        }
        for directive in &self.directives {
            writer.add_directive(directive);
        }

        std::fs::write(&path, writer.finish()).map_err(|ioerror| ConvertError::FileWriteError {
            filename: path.as_ref().to_path_buf(),
            ioerror,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_input_is_valid() {
        let (ucf, log_msgs) = load_from_string("", false).unwrap();
        assert!(ucf.directives.is_empty());
        assert!(log_msgs.is_empty());
        assert_eq!(ucf.write_to_string(), "");
    }

    #[test]
    fn comments_and_blank_lines_only() {
        let text = "\n; banner\n\n   \n;Record=Constraint | TargetKind=Port | TargetId=X\n";
        let (ucf, log_msgs) = load_from_string(text, false).unwrap();
        assert!(ucf.directives.is_empty());
        assert!(log_msgs.is_empty());
    }

    #[test]
    fn scalar_conversion() {
        let text = "Record=Constraint | TargetKind=Port | TargetId=CLK | \
                    FPGA_PINNUM=AB11 | FPGA_IOSTANDARD=LVDS | FPGA_SLEW=FAST | FPGA_DRIVE=12";
        let (ucf, log_msgs) = load_from_string(text, false).unwrap();
        assert!(log_msgs.is_empty());

        let output = ucf.write_to_string();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("NET \"CLK\" "));
        assert!(lines[0].ends_with(';'));
        assert!(lines[0].contains("LOC = \"AB11\""));
        assert!(lines[0].contains("IOSTANDARD = LVDS_25"));
        assert!(lines[0].contains("SLEW = FAST"));
        assert!(lines[0].contains("DRIVE = 12"));
    }

    #[test]
    fn malformed_field_does_not_abort() {
        let text = "Record=Constraint | TargetKind=Port | TargetId=CLK | A=B=C | FPGA_SLEW=FAST";
        let (ucf, log_msgs) = load_from_string(text, false).unwrap();
        assert_eq!(log_msgs.len(), 1);
        assert_eq!(ucf.write_to_string(), "NET \"CLK\" SLEW = FAST;\n");
    }

    #[test]
    fn strict_parsing_error() {
        let text = "Record=Constraint | TargetKind=Port | TargetId=CLK | A=B=C";
        let result = load_from_string(text, true);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(
            error,
            ConvertError::ParserError {
                parser_error: ParserError::UnknownFieldSyntax { .. }
            }
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();

        // create a file in a temp directory and load it
        let path = dir.path().join("test.Constraint");
        let text = "Record=Constraint | TargetKind=Port | TargetId=RESET_N | FPGA_PINNUM=C7\n";
        std::fs::write(&path, text).unwrap();

        let (ucf, log_msgs) = load(&path, false).unwrap();
        assert!(log_msgs.is_empty());
        assert_eq!(ucf.write_to_string(), "NET \"RESET_N\" LOC = \"C7\";\n");

        // try to load a file that does not exist
        let nonexistent_path = dir.path().join("nonexistent.Constraint");
        let result = load(&nonexistent_path, false);
        assert!(matches!(result, Err(ConvertError::FileOpenError { .. })));
    }

    #[test]
    fn write_nonexistent_path() {
        let (ucf, _) = load_from_string("", false).unwrap();
        let result = ucf.write("__NONEXISTENT__/__FILE__/__PATH__/test.ucf", None);
        assert!(matches!(result, Err(ConvertError::FileWriteError { .. })));
    }

    #[test]
    fn write_with_banner() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.ucf");

        let text = "Record=Constraint | TargetKind=Port | TargetId=CLK | FPGA_PINNUM=A12";
        let (ucf, _) = load_from_string(text, false).unwrap();
        ucf.write(&path, Some("generated by alt2ucf")).unwrap();

        let file_text = String::from_utf8(std::fs::read(&path).unwrap()).unwrap();
        assert!(file_text.starts_with("# generated by alt2ucf\n"));
        assert_eq!(
            file_text.strip_prefix("# generated by alt2ucf\n").unwrap(),
            ucf.write_to_string()
        );

        // without a banner the file contains only the directives
        ucf.write(&path, None).unwrap();
        let file_text = String::from_utf8(std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(file_text, ucf.write_to_string());
    }
}
