//! Property list decoding (binary `bplist00` and XML)
//!
//! ## Binary layout
//! ```text
//! [magic "bplist00"][object table][offset table][trailer (32 bytes)]
//! ```
//! The trailer gives the offset size, object-ref size, object count, root
//! object index and offset-table position. Out-of-range offsets and
//! object-ref cycles are decoding errors.
//!
//! ## XML layout
//! `<plist>` with `<dict>`, `<array>`, `<string>`, `<integer>`, `<real>`,
//! `<true/>`, `<false/>`, `<date>` and `<data>`; any other element is an
//! error.
//!
//! Both forms are decoded by the `plist` crate and converted into
//! [`ManifestValue`].

use std::io::Cursor;
use std::time::SystemTime;

use tracing::trace;

use super::value::{Dictionary, ManifestValue};
use crate::common::magic::is_binary_plist;
use crate::error::{ExtractError, ExtractResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Property list serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlistFormat {
    Binary,
    Xml,
}

/// Sniff the serialization from the leading bytes
pub fn detect_format(data: &[u8]) -> Option<PlistFormat> {
    if is_binary_plist(data) {
        return Some(PlistFormat::Binary);
    }

    let body = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let start = body.iter().position(|b| !b.is_ascii_whitespace())?;
    let body = &body[start..];
    if body.starts_with(b"<?xml") || body.starts_with(b"<!DOCTYPE") || body.starts_with(b"<plist") {
        return Some(PlistFormat::Xml);
    }

    None
}

/// Decode a property list of either serialization
///
/// `source` names the plist in error messages (e.g. the entry path).
pub fn decode(source: &str, data: &[u8]) -> ExtractResult<ManifestValue> {
    let format = detect_format(data)
        .ok_or_else(|| ExtractError::malformed(source, "not a binary or XML property list"))?;
    trace!(source, ?format, bytes = data.len(), "Decoding property list");

    let value = match format {
        PlistFormat::Binary => plist::Value::from_reader(Cursor::new(data)),
        PlistFormat::Xml => plist::Value::from_reader_xml(Cursor::new(data)),
    }
    .map_err(|e| ExtractError::malformed(source, e))?;

    convert(source, value)
}

/// Decode a property list whose root must be a dictionary (Info.plist)
pub fn decode_dictionary(source: &str, data: &[u8]) -> ExtractResult<Dictionary> {
    match decode(source, data)? {
        ManifestValue::Dictionary(dict) => Ok(dict),
        _ => Err(ExtractError::malformed(source, "root object is not a dictionary")),
    }
}

fn convert(source: &str, value: plist::Value) -> ExtractResult<ManifestValue> {
    let converted = match value {
        plist::Value::String(s) => ManifestValue::String(s),
        plist::Value::Integer(i) => ManifestValue::Integer(
            i.as_signed()
                .map(i128::from)
                .or_else(|| i.as_unsigned().map(i128::from))
                .unwrap_or_default(),
        ),
        plist::Value::Real(r) => ManifestValue::Real(r),
        plist::Value::Boolean(b) => ManifestValue::Boolean(b),
        plist::Value::Date(d) => ManifestValue::Date(SystemTime::from(d)),
        plist::Value::Data(bytes) => ManifestValue::Data(bytes),
        plist::Value::Array(items) => ManifestValue::Array(
            items
                .into_iter()
                .map(|item| convert(source, item))
                .collect::<ExtractResult<_>>()?,
        ),
        plist::Value::Dictionary(dict) => {
            let mut out = Dictionary::new();
            for (key, value) in dict {
                out.insert(key, convert(source, value)?);
            }
            ManifestValue::Dictionary(out)
        }
        // Keyed-archiver references only; Info.plist never carries them
        plist::Value::Uid(uid) => ManifestValue::Integer(i128::from(uid.get())),
        other => {
            return Err(ExtractError::malformed(source, format!("unsupported property list node: {other:?}")));
        }
    };
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>com.test.app</string>
    <key>CFBundleVersion</key>
    <integer>42</integer>
    <key>Scale</key>
    <real>2.5</real>
    <key>LSRequiresIPhoneOS</key>
    <true/>
    <key>Blob</key>
    <data>AAEC</data>
    <key>Built</key>
    <date>2016-10-03T21:15:00Z</date>
    <key>UIDeviceFamily</key>
    <array>
        <integer>1</integer>
        <integer>2</integer>
    </array>
</dict>
</plist>"#;

    fn to_binary(xml: &str) -> Vec<u8> {
        let value = plist::Value::from_reader_xml(Cursor::new(xml.as_bytes())).unwrap();
        let mut buf = Vec::new();
        value.to_writer_binary(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(b"bplist00\x00"), Some(PlistFormat::Binary));
        assert_eq!(detect_format(XML.as_bytes()), Some(PlistFormat::Xml));
        assert_eq!(detect_format(b"\xEF\xBB\xBF  \n<plist version=\"1.0\"/>"), Some(PlistFormat::Xml));
        assert_eq!(detect_format(b"{\"json\": true}"), None);
        assert_eq!(detect_format(b""), None);
    }

    #[test]
    fn test_decode_xml() {
        let dict = decode_dictionary("Info.plist", XML.as_bytes()).unwrap();
        assert_eq!(dict.get("CFBundleIdentifier").and_then(ManifestValue::as_str), Some("com.test.app"));
        assert_eq!(dict.get("CFBundleVersion"), Some(&ManifestValue::Integer(42)));
        assert_eq!(dict.get("Scale"), Some(&ManifestValue::Real(2.5)));
        assert_eq!(dict.get("LSRequiresIPhoneOS"), Some(&ManifestValue::Boolean(true)));
        assert_eq!(dict.get("Blob"), Some(&ManifestValue::Data(vec![0, 1, 2])));
        assert!(matches!(dict.get("Built"), Some(ManifestValue::Date(_))));
        assert_eq!(dict.get("UIDeviceFamily").and_then(ManifestValue::as_array).map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_binary_matches_xml() {
        let from_xml = decode("Info.plist", XML.as_bytes()).unwrap();
        let from_binary = decode("Info.plist", &to_binary(XML)).unwrap();
        assert_eq!(from_xml, from_binary);
    }

    #[test]
    fn test_unknown_element_rejected() {
        let xml = r#"<?xml version="1.0"?><plist version="1.0"><dict><key>A</key><bogus>1</bogus></dict></plist>"#;
        let err = decode("Info.plist", xml.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }

    #[test]
    fn test_truncated_binary_rejected() {
        let binary = to_binary(XML);
        let err = decode("Info.plist", &binary[..20]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let mut binary = to_binary(XML);
        // Trailer: last 8 bytes are the offset-table offset
        let len = binary.len();
        binary[len - 8..].copy_from_slice(&u64::MAX.to_be_bytes());
        let err = decode("Info.plist", &binary).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }

    #[test]
    fn test_object_ref_cycle_rejected() {
        // One array object whose only element references itself
        let mut binary = b"bplist00".to_vec();
        binary.extend_from_slice(&[0xA1, 0x00]);
        binary.push(0x08);
        binary.extend_from_slice(&[0, 0, 0, 0, 0, 0, 1, 1]);
        binary.extend_from_slice(&1u64.to_be_bytes());
        binary.extend_from_slice(&0u64.to_be_bytes());
        binary.extend_from_slice(&10u64.to_be_bytes());

        let err = decode("Info.plist", &binary).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }

    #[test]
    fn test_non_dictionary_root() {
        let xml = r#"<?xml version="1.0"?><plist version="1.0"><array><string>a</string></array></plist>"#;
        assert!(decode("Info.plist", xml.as_bytes()).is_ok());
        let err = decode_dictionary("Info.plist", xml.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("not a dictionary"));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = decode("Info.plist", b"\x00\x01\x02garbage").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }

    #[test]
    fn test_real_version_text() {
        let xml = r#"<?xml version="1.0"?><plist version="1.0"><dict><key>CFBundleShortVersionString</key><real>1.0</real></dict></plist>"#;
        let dict = decode_dictionary("Info.plist", xml.as_bytes()).unwrap();
        assert_eq!(dict.first_text(&["CFBundleShortVersionString"]).as_deref(), Some("1.0"));
    }
}
