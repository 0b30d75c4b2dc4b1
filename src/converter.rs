//! 转换入口：ALE 字节 + EDL 字节 -> 展开后的 EDL 文本。
//!
//! 界面层只调用这里的函数，所有硬错误都以 [`ConvertError`] 返回。

use std::path::Path;

use crate::ale_parser::{build_tape_track_map, parse_ale_table};
use crate::edl_generator::EventLineLayout;
use crate::edl_parser::split_edl;
use crate::track_expander::expand_document;
use crate::types::{ConversionReport, ConvertError, DuplicateTapePolicy};

pub const OUTPUT_NAME_SUFFIX: &str = "_AllAudioTracks";
pub const OUTPUT_EXTENSION: &str = "edl";
pub const FALLBACK_OUTPUT_NAME: &str = "AllAudioTracks.edl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionOptions {
    pub duplicate_policy: DuplicateTapePolicy,
    pub layout: EventLineLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub edl_text: String,
    pub report: ConversionReport,
}

pub fn decode_text(bytes: &[u8]) -> Result<String, ConvertError> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub fn convert_texts(
    ale_text: &str,
    edl_text: &str,
    options: &ConversionOptions,
) -> Result<ConversionOutput, ConvertError> {
    let table = parse_ale_table(ale_text)?;
    let map = build_tape_track_map(&table, options.duplicate_policy)?;

    let document = split_edl(edl_text);
    let expansion = expand_document(&document, &map, &options.layout);

    let report = ConversionReport {
        heading: table.heading.clone(),
        tapes_mapped: map.len(),
        rows_kept: table.kept_count(),
        rows_skipped: table.skipped_count(),
        blocks_expanded: expansion.expanded_count(),
        skipped_blocks: expansion
            .skipped()
            .map(|(line_num, reason)| (line_num, reason.clone()))
            .collect(),
        events_emitted: expansion.event_count(),
    };

    Ok(ConversionOutput {
        edl_text: expansion.render(),
        report,
    })
}

/// 完整的一次转换。先解码两个缓冲区，任何一步失败都不会产生部分输出。
pub fn convert(
    ale_bytes: &[u8],
    edl_bytes: &[u8],
    options: &ConversionOptions,
) -> Result<ConversionOutput, ConvertError> {
    let ale_text = decode_text(ale_bytes)?;
    let edl_text = decode_text(edl_bytes)?;
    let output = convert_texts(&ale_text, &edl_text, options)?;
    log::info!(
        "[Convert] {} tapes, {} of {} blocks expanded, {} events written.",
        output.report.tapes_mapped,
        output.report.blocks_expanded,
        output.report.blocks_total(),
        output.report.events_emitted
    );
    Ok(output)
}

/// 输出文件的建议名称：`<原 EDL 文件名>_AllAudioTracks.edl`。
pub fn suggest_output_file_name(edl_path: Option<&Path>) -> String {
    edl_path
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy())
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{stem}{OUTPUT_NAME_SUFFIX}.{OUTPUT_EXTENSION}"))
        .unwrap_or_else(|| FALLBACK_OUTPUT_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkipReason;
    use std::path::PathBuf;

    const ALE: &str = "Heading\nFIELD_DELIM\tTABS\nFPS\t25\n\n\
Column\nName\tTape\tTracks\tStart\tEnd\n\n\
Data\n\
clip1\tTAPE01\tV1 A1 A2\t01:00:00:00\t01:00:10:00\n\
short\trow\n\
clip2\tTAPE02\tV1 A1 A2 A3\t02:00:00:00\t02:00:10:00\n";

    const EDL: &str = "TITLE: SEQ\nFCM: NON-DROP FRAME\n\n\
000001  TAPE01  V  C  01:00:00:00 01:00:10:00 01:00:00:00 01:00:10:00\n\
* FROM CLIP NAME: clip1\n\
000002  TAPE01  A  C  01:00:00:00 01:00:10:00 01:00:00:00 01:00:10:00\n\
000003  TAPE02  V  C  02:00:00:00 02:00:10:00 01:00:10:00 01:00:20:00\n\
000004  TAPE03  V  D  025 02:00:00:00 02:00:10:00 01:00:20:00 01:00:30:00\n";

    #[test]
    fn test_convert_reports_kept_and_skipped() {
        let output = convert(ALE.as_bytes(), EDL.as_bytes(), &ConversionOptions::default()).unwrap();
        let report = &output.report;

        assert_eq!(report.tapes_mapped, 2);
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.heading.len(), 2);
        assert_eq!(report.blocks_total(), 4);
        assert_eq!(report.blocks_expanded, 2);
        assert_eq!(report.events_emitted, 5);
        assert_eq!(
            report.skipped_blocks,
            vec![
                (
                    6,
                    SkipReason::NonVideoEvent {
                        track_type: "A".into()
                    }
                ),
                (8, SkipReason::MalformedEventLine),
            ]
        );

        assert!(output.edl_text.starts_with("TITLE: SEQ\nFCM: NON-DROP FRAME\n\n000001  TAPE01"));
        assert_eq!(output.edl_text.lines().count(), 3 + 2 * 2 + 3);
    }

    #[test]
    fn test_missing_marker_aborts_conversion() {
        let ale = "Column\nName\tTape\tTracks\n";
        let result = convert(ale.as_bytes(), EDL.as_bytes(), &ConversionOptions::default());
        let err = result.unwrap_err();
        assert!(matches!(err, ConvertError::MissingDataMarker));
        assert_eq!(err.to_string(), "ALE format error: no Data marker");
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_error() {
        let bad = [0x44u8, 0x61, 0xff, 0x74, 0x61];
        assert!(matches!(
            convert(&bad, EDL.as_bytes(), &ConversionOptions::default()),
            Err(ConvertError::Decode(_))
        ));
        assert!(matches!(
            convert(ALE.as_bytes(), &bad, &ConversionOptions::default()),
            Err(ConvertError::Decode(_))
        ));
    }

    #[test]
    fn test_duplicate_policy_is_applied() {
        let ale = "Column\nName\tTape\tTracks\n\nData\na\tT\tA1\nb\tT\tA1 A2\n";
        let edl = "000001  T  V  C  a b c d\n";
        let options = ConversionOptions {
            duplicate_policy: DuplicateTapePolicy::Error,
            ..ConversionOptions::default()
        };
        assert!(matches!(
            convert(ale.as_bytes(), edl.as_bytes(), &options),
            Err(ConvertError::DuplicateTape(_))
        ));

        let output = convert(ale.as_bytes(), edl.as_bytes(), &ConversionOptions::default()).unwrap();
        assert_eq!(output.report.events_emitted, 2);
    }

    #[test]
    fn test_suggest_output_file_name() {
        let path = PathBuf::from("/projects/reel1/Sequence 01.edl");
        assert_eq!(
            suggest_output_file_name(Some(&path)),
            "Sequence 01_AllAudioTracks.edl"
        );
        assert_eq!(
            suggest_output_file_name(Some(Path::new("cut.v2.EDL"))),
            "cut.v2_AllAudioTracks.edl"
        );
        assert_eq!(suggest_output_file_name(None), "AllAudioTracks.edl");
    }
}
