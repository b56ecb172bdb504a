//! Registry-export text format
//!
//! ```text
//! Windows Registry Editor Version 5.00
//!
//! [HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced]
//! "Hidden"=dword:00000002
//! "HideFileExt"=dword:00000001
//!
//! [HKEY_CURRENT_USER\Control Panel\Desktop]
//! "MenuShowDelay"="400"
//!
//! ```
//!
//! Files are written with CRLF line endings, UTF-16LE with a byte order mark
//! by default. [`decode`] accepts UTF-16LE, UTF-8 with or without BOM.

use super::snapshot::{Snapshot, SnapshotEntry};
use crate::config::{BackupEncoding, RawValue, ValueEncoding};
use crate::error::{Error, Result};
use crate::store::{Location, mask_dword};

/// Version header on the first line of every export file
pub const REG_HEADER: &str = "Windows Registry Editor Version 5.00";

const UTF16_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

// =============================================================================
// Rendering
// =============================================================================

/// Render a snapshot as export text
pub fn render(snapshot: &Snapshot) -> String {
    let mut lines = vec![REG_HEADER.to_string(), String::new()];
    for (key_path, entries) in snapshot.groups() {
        lines.push(format!("[{key_path}]"));
        for entry in entries {
            lines.push(render_entry(entry));
        }
        lines.push(String::new());
    }
    lines.join("\r\n")
}

fn render_entry(entry: &SnapshotEntry) -> String {
    let name = escape(&entry.location.name);
    match entry.encoding {
        ValueEncoding::Dword => match entry.value.as_integer() {
            Some(n) => format!("\"{name}\"=dword:{:08x}", mask_dword(n)),
            // Not representable as a dword; keep the raw text
            None => format!("\"{name}\"=\"{}\"", escape(&text_of(&entry.value))),
        },
        ValueEncoding::Text => format!("\"{name}\"=\"{}\"", escape(&text_of(&entry.value))),
    }
}

fn text_of(value: &RawValue) -> String {
    match value {
        RawValue::Integer(n) => n.to_string(),
        RawValue::Text(s) => s.clone(),
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Encode export text to file bytes
pub fn encode(text: &str, encoding: BackupEncoding) -> Vec<u8> {
    match encoding {
        BackupEncoding::Utf16Le => {
            let mut bytes = Vec::with_capacity(2 + text.len() * 2);
            bytes.extend_from_slice(&UTF16_BOM);
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            bytes
        }
        BackupEncoding::Utf8 => text.as_bytes().to_vec(),
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Decode file bytes to text, detecting the byte order mark
pub fn decode(bytes: &[u8]) -> Result<String> {
    if let Some(body) = bytes.strip_prefix(&UTF16_BOM) {
        if body.len() % 2 != 0 {
            return Err(Error::InvalidBackup("truncated UTF-16 data".into()));
        }
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16(&units).map_err(|e| Error::InvalidBackup(e.to_string()));
    }

    let body = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(body.to_vec()).map_err(|e| Error::InvalidBackup(e.to_string()))
}

/// Parse export text back into a snapshot
///
/// Supports the subset this crate writes: key headers, `dword:` values and
/// quoted strings. Comments (`;`) and blank lines are ignored.
///
/// # Errors
///
/// Returns `Error::InvalidBackup` for a missing header, key deletions, values
/// outside a key block, or malformed lines.
pub fn parse(text: &str) -> Result<Snapshot> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .enumerate();

    let header = lines
        .by_ref()
        .find(|(_, line)| !line.is_empty())
        .map(|(_, line)| line);
    if header != Some(REG_HEADER) {
        return Err(Error::InvalidBackup(format!(
            "expected header '{REG_HEADER}'"
        )));
    }

    let mut snapshot = Snapshot::new();
    let mut current_key: Option<String> = None;

    for (index, line) in lines {
        let line_no = index + 1;
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(key) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if key.starts_with('-') {
                return Err(Error::InvalidBackup(format!(
                    "line {line_no}: key deletion is not supported"
                )));
            }
            current_key = Some(key.to_string());
            continue;
        }

        let key = current_key.as_deref().ok_or_else(|| {
            Error::InvalidBackup(format!("line {line_no}: value outside a key block"))
        })?;
        let (name, rest) = parse_quoted(line)
            .ok_or_else(|| Error::InvalidBackup(format!("line {line_no}: malformed value name")))?;
        let data = rest
            .strip_prefix('=')
            .ok_or_else(|| Error::InvalidBackup(format!("line {line_no}: missing '='")))?;

        let (encoding, value) = if let Some(hex) = data.strip_prefix("dword:") {
            let n = u32::from_str_radix(hex, 16).map_err(|e| {
                Error::InvalidBackup(format!("line {line_no}: bad dword '{hex}': {e}"))
            })?;
            (ValueEncoding::Dword, RawValue::Integer(i64::from(n)))
        } else {
            let (text, trailing) = parse_quoted(data).ok_or_else(|| {
                Error::InvalidBackup(format!("line {line_no}: unsupported value '{data}'"))
            })?;
            if !trailing.trim().is_empty() {
                return Err(Error::InvalidBackup(format!(
                    "line {line_no}: trailing data after string"
                )));
            }
            (ValueEncoding::Text, RawValue::Text(text))
        };

        let location = Location::parse(key, name).map_err(|e| {
            Error::InvalidBackup(format!("line {line_no}: {e}"))
        })?;
        snapshot.push(location, encoding, value);
    }

    Ok(snapshot)
}

/// Split a leading `"..."` (with `\\` and `\"` escapes) from the rest
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                out.push(escaped);
            }
            '"' => return Some((out, &body[i + 1..])),
            c => out.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.push(
            Location::parse(
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced",
                "Hidden",
            )
            .unwrap(),
            ValueEncoding::Dword,
            RawValue::Integer(2),
        );
        snapshot.push(
            Location::parse(r"HKCU\Control Panel\Desktop", "MenuShowDelay").unwrap(),
            ValueEncoding::Text,
            RawValue::Text("400".into()),
        );
        snapshot
    }

    #[test]
    fn test_render_layout() {
        let text = render(&sample());
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(
            lines,
            [
                REG_HEADER,
                "",
                r"[HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced]",
                r#""Hidden"=dword:00000002"#,
                "",
                r"[HKEY_CURRENT_USER\Control Panel\Desktop]",
                r#""MenuShowDelay"="400""#,
                "",
            ]
        );
    }

    #[test]
    fn test_dword_is_masked_and_zero_padded() {
        let mut snapshot = Snapshot::new();
        snapshot.push(
            Location::parse(r"HKLM\SOFTWARE\Test", "Negative").unwrap(),
            ValueEncoding::Dword,
            RawValue::Integer(-1),
        );
        snapshot.push(
            Location::parse(r"HKLM\SOFTWARE\Test", "Small").unwrap(),
            ValueEncoding::Dword,
            RawValue::Integer(10),
        );

        let text = render(&snapshot);
        assert!(text.contains(r#""Negative"=dword:ffffffff"#));
        assert!(text.contains(r#""Small"=dword:0000000a"#));
    }

    #[test]
    fn test_utf16_bom_and_decode() {
        let text = render(&sample());
        let bytes = encode(&text, BackupEncoding::Utf16Le);

        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        assert_eq!(bytes[2], b'W');
        assert_eq!(bytes[3], 0);
        assert_eq!(decode(&bytes).unwrap(), text);

        let utf8 = encode(&text, BackupEncoding::Utf8);
        assert_eq!(decode(&utf8).unwrap(), text);
    }

    #[test]
    fn test_parse_rendered_text() {
        let parsed = parse(&render(&sample())).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_text_escaping() {
        let mut snapshot = Snapshot::new();
        snapshot.push(
            Location::parse(r"HKCU\Software\Test", "Path").unwrap(),
            ValueEncoding::Text,
            RawValue::Text(r#"C:\Tools\"quoted""#.into()),
        );

        let text = render(&snapshot);
        assert!(text.contains(r#""Path"="C:\\Tools\\\"quoted\"""#));
        assert_eq!(parse(&text).unwrap(), snapshot);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse("REGEDIT4\r\n").is_err());
        assert!(parse(&format!("{REG_HEADER}\n\"x\"=dword:1\n")).is_err());
        assert!(parse(&format!("{REG_HEADER}\n[-HKCU\\Software\\Gone]\n")).is_err());
        assert!(parse(&format!("{REG_HEADER}\n[HKCU\\Software]\n\"x\"=hex:01,02\n")).is_err());
    }

    #[test]
    fn test_parse_ignores_comments_and_lf_endings() {
        let text = format!(
            "{REG_HEADER}\n\n; saved by hand\n[HKCU\\Software\\Test]\n\"A\"=dword:00000001\n"
        );
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.entries()[0].value, RawValue::Integer(1));
    }
}
