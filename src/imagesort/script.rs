//! Rename script generation.
//!
//! The script defines a `relocate` helper and moves every labelled image into
//! a directory named after its ID. Unlabelled images are left where they are.

use crate::capture::CaptureRecord;
use crate::error::{QrMagicError, QrResult};

/// Shell function emitted at the top of every script.
pub const RELOCATE_FN: &str = r#"relocate() { mkdir -p "$(dirname "$2")"; mv "$1" "$2";}"#;

/// Default file name of the generated script.
pub const SCRIPT_NAME: &str = "rename.sh";

/// Build the rename script for `records`.
pub fn renamer_script(records: &[CaptureRecord]) -> QrResult<String> {
    let mut script = vec![RELOCATE_FN.to_string()];

    for record in records.iter().filter(|r| r.has_id()) {
        let target = format!("{}/{}", record.id, record.filename);
        let words = ["relocate", record.filename.as_str(), target.as_str()];
        let line = shlex::try_join(words).map_err(|_| QrMagicError::Quote(target.clone()))?;
        script.push(line);
    }

    Ok(script.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, id: &str) -> CaptureRecord {
        CaptureRecord {
            id: id.into(),
            filename: filename.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_only_when_nothing_labelled() {
        let script = renamer_script(&[record("a.jpg", "")]).unwrap();
        assert_eq!(script, RELOCATE_FN);
    }

    #[test]
    fn test_lines_split_back_into_words() {
        let records = vec![
            record("IMG_0001.jpg", "KDM001"),
            record("IMG_0002.jpg", ""),
            record("my photo's.jpg", "KDM 002"),
        ];
        let script = renamer_script(&records).unwrap();
        let lines: Vec<_> = script.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RELOCATE_FN);

        assert_eq!(
            shlex::split(lines[1]).unwrap(),
            vec!["relocate", "IMG_0001.jpg", "KDM001/IMG_0001.jpg"]
        );
        assert_eq!(
            shlex::split(lines[2]).unwrap(),
            vec!["relocate", "my photo's.jpg", "KDM 002/my photo's.jpg"]
        );
    }

    #[test]
    fn test_nul_byte_is_rejected() {
        let err = renamer_script(&[record("bad\0.jpg", "X")]).unwrap_err();
        assert!(matches!(err, QrMagicError::Quote(_)));
    }
}
