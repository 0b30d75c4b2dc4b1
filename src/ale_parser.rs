//! ALE (Avid Log Exchange) 表格解析。
//!
//! 只关心 `Data` 段之前两行的列头，以及数据行里的 `Tape` / `Tracks` 两列。

use crate::types::{
    AleHeadingEntry, AleRow, AleTable, ConvertError, DuplicateTapePolicy, RowOutcome,
    RowSkipReason, TapeTrackMap,
};
use crate::utils::split_text_lines;
use once_cell::sync::Lazy;
use regex::Regex;

const HEADING_MARKER: &str = "Heading";
const COLUMN_MARKER: &str = "Column";
const DATA_MARKER: &str = "Data";
/// 列头和数据行都只保留前 5 个字段。
const MAX_COLUMNS: usize = 5;

pub const TAPE_COLUMN: &str = "Tape";
pub const TRACKS_COLUMN: &str = "Tracks";

static AUDIO_TRACK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"A\d+").expect("未能编译 AUDIO_TRACK_REGEX"));

fn split_fields(line: &str) -> Vec<String> {
    line.trim()
        .split('\t')
        .take(MAX_COLUMNS)
        .map(str::to_string)
        .collect()
}

/// 解析 `Heading` 到 `Column` 之间的键值行。只用于展示，不影响映射表。
fn parse_heading(lines: &[&str]) -> Vec<AleHeadingEntry> {
    let Some(start) = lines.iter().position(|l| l.trim() == HEADING_MARKER) else {
        return Vec::new();
    };

    lines[start + 1..]
        .iter()
        .map(|l| l.trim())
        .take_while(|l| *l != COLUMN_MARKER && *l != DATA_MARKER)
        .filter(|l| !l.is_empty())
        .map(|l| match l.split_once('\t') {
            Some((key, value)) => AleHeadingEntry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => AleHeadingEntry {
                key: l.to_string(),
                value: String::new(),
            },
        })
        .collect()
}

/// 把 ALE 文本解析成表格。
///
/// 列头取自 `Data` 行往上第二行。之后每个非空行都按制表符切分并截断到 5 个字段，
/// 字段数与列头一致的行被保留，其余行记为 `RowOutcome::Skipped`。
pub fn parse_ale_table(content: &str) -> Result<AleTable, ConvertError> {
    let lines = split_text_lines(content);

    let data_idx = lines
        .iter()
        .position(|l| l.trim() == DATA_MARKER)
        .ok_or(ConvertError::MissingDataMarker)?;
    let header_idx = data_idx
        .checked_sub(2)
        .ok_or(ConvertError::HeaderNotFound)?;

    let heading = parse_heading(&lines[..header_idx]);
    if let Some(delim) = heading.iter().find(|e| e.key == "FIELD_DELIM")
        && delim.value != "TABS"
    {
        log::warn!(
            "[ALE] FIELD_DELIM is '{}', but only tab-delimited tables are supported.",
            delim.value
        );
    }

    let header = split_fields(lines[header_idx]);

    let mut rows = Vec::new();
    for (offset, line) in lines[data_idx + 1..].iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_num = data_idx + 2 + offset;
        let fields = split_fields(line);
        if fields.len() == header.len() {
            rows.push(RowOutcome::Kept(AleRow { line_num, fields }));
        } else {
            let reason = RowSkipReason::FieldCountMismatch {
                expected: header.len(),
                found: fields.len(),
            };
            log::debug!("[ALE] Line {line_num}: skipping row ({reason}).");
            rows.push(RowOutcome::Skipped { line_num, reason });
        }
    }

    let table = AleTable {
        heading,
        header,
        rows,
    };
    log::info!(
        "[ALE] Parsed {} rows ({} skipped), columns: {:?}",
        table.kept_count(),
        table.skipped_count(),
        table.header
    );
    Ok(table)
}

/// 清理 `Tracks` 字段：先删掉所有 `V`，再按出现顺序提取 `A<数字>`。
pub fn clean_tracks(raw: &str) -> Vec<String> {
    let without_video = raw.replace('V', "");
    AUDIO_TRACK_REGEX
        .find_iter(&without_video)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 以 `Tape` 列为键、清理后的 `Tracks` 列为值构建映射表。
pub fn build_tape_track_map(
    table: &AleTable,
    policy: DuplicateTapePolicy,
) -> Result<TapeTrackMap, ConvertError> {
    let tape_idx = table.column_index(TAPE_COLUMN)?;
    let tracks_idx = table.column_index(TRACKS_COLUMN)?;

    let mut map = TapeTrackMap::new();
    for row in table.kept_rows() {
        let (Some(tape), Some(raw_tracks)) = (row.fields.get(tape_idx), row.fields.get(tracks_idx))
        else {
            continue;
        };
        let tracks = clean_tracks(raw_tracks);

        if map.contains_tape(tape) {
            match policy {
                DuplicateTapePolicy::FirstWins => {
                    log::warn!(
                        "[ALE] Line {}: tape '{}' already mapped, keeping the earlier row.",
                        row.line_num,
                        tape
                    );
                    continue;
                }
                DuplicateTapePolicy::LastWins => {
                    log::warn!(
                        "[ALE] Line {}: tape '{}' already mapped, replacing it with this row.",
                        row.line_num,
                        tape
                    );
                }
                DuplicateTapePolicy::Error => {
                    return Err(ConvertError::DuplicateTape(tape.clone()));
                }
            }
        }

        if tracks.is_empty() {
            log::debug!(
                "[ALE] Line {}: tape '{}' has no audio tracks ('{}').",
                row.line_num,
                tape,
                raw_tracks
            );
        }
        map.insert(tape.clone(), tracks);
    }

    log::info!("[ALE] Mapped {} tapes.", map.len());
    Ok(map)
}

/// 从 ALE 文本直接得到磁带 -> 音轨映射表。
pub fn extract_tape_tracks(
    content: &str,
    policy: DuplicateTapePolicy,
) -> Result<TapeTrackMap, ConvertError> {
    let table = parse_ale_table(content)?;
    build_tape_track_map(&table, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ALE: &str = "Heading\n\
FIELD_DELIM\tTABS\n\
VIDEO_FORMAT\t1080\n\
FPS\t25\n\
\n\
Column\n\
Name\tTape\tTracks\tStart\tEnd\tSource File\n\
\n\
Data\n\
clip1\tTAPE01\tV1 A1 A2\t01:00:00:00\t01:00:10:00\tclip1.mxf\n\
clip2\tTAPE02\tV1A1A2A3A4\t02:00:00:00\t02:00:10:00\tclip2.mxf\n\
clip3\tTAPE03\tV1\t03:00:00:00\t03:00:10:00\tclip3.mxf\n";

    fn tracks(map: &TapeTrackMap, tape: &str) -> Option<String> {
        map.tracks_for(tape).map(|t| t.join(" "))
    }

    #[test]
    fn test_extracts_tracks_per_tape() {
        let map = extract_tape_tracks(SAMPLE_ALE, DuplicateTapePolicy::default()).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(tracks(&map, "TAPE01").as_deref(), Some("A1 A2"));
        assert_eq!(tracks(&map, "TAPE02").as_deref(), Some("A1 A2 A3 A4"));
        assert_eq!(tracks(&map, "TAPE03").as_deref(), Some(""));
        assert_eq!(tracks(&map, "tape01"), None);
    }

    #[test]
    fn test_header_is_truncated_to_five_columns() {
        let table = parse_ale_table(SAMPLE_ALE).unwrap();
        assert_eq!(table.header, vec!["Name", "Tape", "Tracks", "Start", "End"]);
        assert!(table.kept_rows().all(|row| row.fields.len() == 5));
        assert_eq!(table.kept_rows().next().unwrap().line_num, 10);
    }

    #[test]
    fn test_heading_entries() {
        let table = parse_ale_table(SAMPLE_ALE).unwrap();
        assert_eq!(table.heading.len(), 3);
        assert_eq!(table.heading[2].key, "FPS");
        assert_eq!(table.heading[2].value, "25");
    }

    #[test]
    fn test_clean_tracks() {
        assert_eq!(clean_tracks("V1 A1 A2"), vec!["A1", "A2"]);
        assert_eq!(clean_tracks("V1 A2 A3"), vec!["A2", "A3"]);
        assert_eq!(clean_tracks("V1"), Vec::<String>::new());
        assert_eq!(clean_tracks("A1-4 A12"), vec!["A1", "A12"]);
        // 删除 V 之后才匹配
        assert_eq!(clean_tracks("AV3"), vec!["A3"]);
    }

    #[test]
    fn test_missing_data_marker() {
        let content = "Column\nName\tTape\tTracks\n\nclip\tT1\tA1\n";
        assert!(matches!(
            extract_tape_tracks(content, DuplicateTapePolicy::default()),
            Err(ConvertError::MissingDataMarker)
        ));
    }

    #[test]
    fn test_data_marker_too_close_to_top() {
        let content = "Name\tTape\tTracks\nData\nclip\tT1\tA1\n";
        assert!(matches!(
            parse_ale_table(content),
            Err(ConvertError::HeaderNotFound)
        ));
    }

    #[test]
    fn test_missing_column() {
        let content = "Column\nName\tReel\tTracks\n\nData\nclip\tT1\tA1\n";
        match extract_tape_tracks(content, DuplicateTapePolicy::default()) {
            Err(ConvertError::MissingColumn(name)) => assert_eq!(name, "Tape"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let content = "Column\nName\tTape\ttracks\n\nData\nclip\tT1\tA1\n";
        assert!(matches!(
            extract_tape_tracks(content, DuplicateTapePolicy::default()),
            Err(ConvertError::MissingColumn(name)) if name == "Tracks"
        ));
    }

    #[test]
    fn test_malformed_rows_do_not_abort() {
        let content = "Column\nName\tTape\tTracks\n\nData\n\
clip1\tT1\tA1 A2\n\
broken\tT2\n\
\n\
clip3\tT3\tV1 A1 A2 A3\textra\tmore\tignored\n";
        let table = parse_ale_table(content).unwrap();
        // 第三列后的字段被截断到 5 个，与 3 列的表头不一致
        assert_eq!(table.kept_count(), 1);
        assert_eq!(table.skipped_count(), 2);
        assert_eq!(
            table.rows[1],
            RowOutcome::Skipped {
                line_num: 6,
                reason: RowSkipReason::FieldCountMismatch {
                    expected: 3,
                    found: 2
                },
            }
        );

        let map = build_tape_track_map(&table, DuplicateTapePolicy::default()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(tracks(&map, "T1").as_deref(), Some("A1 A2"));
    }

    #[test]
    fn test_trailing_empty_fields_are_trimmed_away() {
        let content = "Column\nName\tTape\tTracks\tStart\n\nData\nclip\tT1\tA1\t\n";
        let table = parse_ale_table(content).unwrap();
        assert_eq!(table.kept_count(), 0);
        assert_eq!(table.skipped_count(), 1);
    }

    const DUPLICATE_ALE: &str =
        "Column\nName\tTape\tTracks\n\nData\nclip1\tT1\tA1\nclip2\tT1\tA1 A2 A3\n";

    #[test]
    fn test_duplicate_tape_last_wins_by_default() {
        let map = extract_tape_tracks(DUPLICATE_ALE, DuplicateTapePolicy::default()).unwrap();
        assert_eq!(tracks(&map, "T1").as_deref(), Some("A1 A2 A3"));
    }

    #[test]
    fn test_duplicate_tape_first_wins() {
        let map = extract_tape_tracks(DUPLICATE_ALE, DuplicateTapePolicy::FirstWins).unwrap();
        assert_eq!(tracks(&map, "T1").as_deref(), Some("A1"));
    }

    #[test]
    fn test_duplicate_tape_error() {
        assert!(matches!(
            extract_tape_tracks(DUPLICATE_ALE, DuplicateTapePolicy::Error),
            Err(ConvertError::DuplicateTape(tape)) if tape == "T1"
        ));
    }
}
