use crate::ConvertError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub(crate) fn load(path: &Path) -> Result<String, ConvertError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            return Err(ConvertError::FileOpenError {
                filename: path.to_path_buf(),
                ioerror: error,
            });
        }
    };

    let filedata = read_data(&mut file, path)?;
    Ok(decode_raw_bytes(&filedata))
}

fn read_data(file: &mut File, path: &Path) -> Result<Vec<u8>, ConvertError> {
    let mut buffer = Vec::new();
    match file.read_to_end(&mut buffer) {
        Ok(_) => Ok(buffer),
        Err(err) => Err(ConvertError::FileReadError {
            filename: path.to_path_buf(),
            ioerror: err,
        }),
    }
}

/* Altium runs on Windows, so a constraint file can reach us as UTF-8 with or
without a BOM, as UTF-16 in either endianness, or as Latin-1 from an old
installation. The first character of a constraint file is always basic ASCII,
which makes BOM-less UTF-16 detectable by the position of the nul byte in the
first code unit. */
fn decode_raw_bytes(filedata: &[u8]) -> String {
    if let Some(data) = filedata.strip_prefix(&[0xff, 0xfe]) {
        if let Some(converted) = decode_utf16(data, u16::from_le_bytes) {
            return converted;
        }
    } else if let Some(data) = filedata.strip_prefix(&[0xfe, 0xff]) {
        if let Some(converted) = decode_utf16(data, u16::from_be_bytes) {
            return converted;
        }
    } else if let Some(data) = filedata.strip_prefix(&[0xef, 0xbb, 0xbf]) {
        if let Ok(converted) = std::str::from_utf8(data) {
            return converted.to_string();
        }
    } else if (filedata.len() % 2 == 0) && filedata.len() > 1 {
        let conversion: Option<fn([u8; 2]) -> u16> = if filedata[0] == 0 && filedata[1] != 0 {
            Some(u16::from_be_bytes)
        } else if filedata[0] != 0 && filedata[1] == 0 {
            Some(u16::from_le_bytes)
        } else {
            None
        };
        if let Some(conversion) = conversion {
            if let Some(converted) = decode_utf16(filedata, conversion) {
                return converted;
            }
        }
    }

    /* try to handle the data as plain utf-8 */
    if let Ok(converted) = String::from_utf8(filedata.to_vec()) {
        return converted;
    }

    /* fall back to Latin-1, which accepts any byte sequence */
    filedata.iter().map(|&byte| byte as char).collect()
}

fn decode_utf16(data: &[u8], conversion: fn([u8; 2]) -> u16) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| conversion([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

/// Derive the conventional output filename for an input constraint file:
/// `board.Constraint` becomes `board.ucf`.
///
/// Every occurrence of `.Constraint` in the path is removed, ignoring case,
/// and `.ucf` is appended.
#[must_use]
pub fn default_output_filename(input: &Path) -> PathBuf {
    let name = input.to_string_lossy();
    let lowered = name.to_ascii_lowercase();
    let mut outname = String::with_capacity(name.len() + 4);
    let mut done = 0;
    let mut search = 0;
    while let Some(pos) = lowered[search..].find(".constraint") {
        outname.push_str(&name[done..search + pos]);
        done = search + pos + ".constraint".len();
        search = done;
    }
    outname.push_str(&name[done..]);
    outname.push_str(".ucf");
    PathBuf::from(outname)
}
