use std::collections::HashMap;
use std::fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;

/// 转换过程中会中止整个请求的错误。
/// 单行 / 单个事件块的问题不会出现在这里，它们以 `RowOutcome` / `BlockOutcome` 的形式被记录下来。
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("ALE format error: no Data marker")] // ALE 中没有 `Data` 行
    MissingDataMarker,
    #[error("ALE format error: header not found")] // `Data` 行之上不足两行
    HeaderNotFound,
    #[error("ALE format error: missing column '{0}'")] // 缺少 Tape 或 Tracks 列
    MissingColumn(String),
    #[error("ALE format error: tape '{0}' appears in more than one row")] // 仅在 DuplicateTapePolicy::Error 下出现
    DuplicateTape(String),
    #[error("Input is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// 磁带在映射表中不存在时使用的唯一音轨。
pub const FALLBACK_TRACK: &str = "A1";

/// 磁带名 -> 有序音轨标签列表 (`A1`, `A2` ...)。
/// 每次转换请求构建一次，之后只读。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapeTrackMap {
    tracks_by_tape: HashMap<String, Vec<String>>,
}

impl TapeTrackMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖一个磁带的音轨列表，返回被覆盖的旧值。
    pub fn insert(&mut self, tape: impl Into<String>, tracks: Vec<String>) -> Option<Vec<String>> {
        self.tracks_by_tape.insert(tape.into(), tracks)
    }

    pub fn contains_tape(&self, tape: &str) -> bool {
        self.tracks_by_tape.contains_key(tape)
    }

    pub fn tracks_for(&self, tape: &str) -> Option<&[String]> {
        self.tracks_by_tape.get(tape).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.tracks_by_tape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks_by_tape.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for TapeTrackMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            tracks_by_tape: iter.into_iter().collect(),
        }
    }
}

/// 同一个磁带在 ALE 中出现多次时的处理方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateTapePolicy {
    FirstWins,
    #[default]
    LastWins,
    Error,
}

impl DuplicateTapePolicy {
    pub const ALL: [DuplicateTapePolicy; 3] = [
        DuplicateTapePolicy::FirstWins,
        DuplicateTapePolicy::LastWins,
        DuplicateTapePolicy::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateTapePolicy::FirstWins => "FirstWins",
            DuplicateTapePolicy::LastWins => "LastWins",
            DuplicateTapePolicy::Error => "Error",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DuplicateTapePolicy::FirstWins => "Keep the first row",
            DuplicateTapePolicy::LastWins => "Keep the last row",
            DuplicateTapePolicy::Error => "Refuse to convert",
        }
    }
}

impl fmt::Display for DuplicateTapePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicateTapePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firstwins" | "first" => Ok(DuplicateTapePolicy::FirstWins),
            "lastwins" | "last" => Ok(DuplicateTapePolicy::LastWins),
            "error" => Ok(DuplicateTapePolicy::Error),
            other => Err(format!("unknown duplicate tape policy '{other}'")),
        }
    }
}

/// ALE `Heading` 段中的一个键值对，例如 `FPS	25`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AleHeadingEntry {
    pub key: String,
    pub value: String,
}

/// ALE 数据区中被接受的一行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AleRow {
    pub line_num: usize, // 1-based，指向原文件
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSkipReason {
    FieldCountMismatch { expected: usize, found: usize },
}

impl fmt::Display for RowSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSkipReason::FieldCountMismatch { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Kept(AleRow),
    Skipped {
        line_num: usize,
        reason: RowSkipReason,
    },
}

/// 解析后的 ALE 表。表头最多 5 列，行与表头列数一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AleTable {
    pub heading: Vec<AleHeadingEntry>,
    pub header: Vec<String>,
    pub rows: Vec<RowOutcome>,
}

impl AleTable {
    pub fn kept_rows(&self) -> impl Iterator<Item = &AleRow> {
        self.rows.iter().filter_map(|outcome| match outcome {
            RowOutcome::Kept(row) => Some(row),
            RowOutcome::Skipped { .. } => None,
        })
    }

    pub fn kept_count(&self) -> usize {
        self.kept_rows().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.rows.len() - self.kept_count()
    }

    /// 按列名（区分大小写）查找列下标。
    pub fn column_index(&self, name: &str) -> Result<usize, ConvertError> {
        self.header
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| ConvertError::MissingColumn(name.to_string()))
    }
}

/// 一个事件块：事件行加上紧随其后的所有非事件行（注释、定位点等）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBlock {
    pub line_num: usize, // 事件行在原文件中的行号，1-based
    pub lines: Vec<String>,
}

impl EventBlock {
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    pub fn trailing_lines(&self) -> &[String] {
        self.lines.get(1..).unwrap_or_default()
    }
}

/// 拆分后的 EDL：头部行 + 有序事件块。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdlDocument {
    pub header_lines: Vec<String>,
    pub blocks: Vec<EventBlock>,
}

/// 事件行的各个字段。时间码只是不透明的字符串，原样传递。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLine {
    pub event_number: String,
    pub tape: String,
    pub track_type: String,
    pub transition: String,
    pub source_in: String,
    pub source_out: String,
    pub record_in: String,
    pub record_out: String,
}

impl EventLine {
    pub fn is_video(&self) -> bool {
        self.track_type == "V"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MalformedEventLine,
    NonVideoEvent { track_type: String },
    NoAudioTracks { tape: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedEventLine => f.write_str("event line does not match the cut pattern"),
            SkipReason::NonVideoEvent { track_type } => {
                write!(f, "track type '{track_type}' is not video")
            }
            SkipReason::NoAudioTracks { tape } => {
                write!(f, "tape '{tape}' has no audio tracks in the ALE")
            }
        }
    }
}

/// 展开后输出的一个事件（首行已重新编号，尾随行原样复制）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedEvent {
    pub event_number: u32,
    pub track: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Expanded {
        line_num: usize,
        tape: String,
        events: Vec<ExpandedEvent>,
    },
    Skipped {
        line_num: usize,
        reason: SkipReason,
    },
}

impl BlockOutcome {
    pub fn is_expanded(&self) -> bool {
        matches!(self, BlockOutcome::Expanded { .. })
    }
}

/// 一次转换的统计信息，供界面显示与测试断言。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub heading: Vec<AleHeadingEntry>,
    pub tapes_mapped: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    pub blocks_expanded: usize,
    pub skipped_blocks: Vec<(usize, SkipReason)>,
    pub events_emitted: usize,
}

impl ConversionReport {
    pub fn blocks_total(&self) -> usize {
        self.blocks_expanded + self.skipped_blocks.len()
    }
}
