//! 输出 EDL 的生成。
//!
//! 事件行采用定宽排版，与导入端（Avid）的解析方式绑定，列宽集中在 [`EventLineLayout`] 中。

use crate::types::{EventLine, ExpandedEvent, FALLBACK_TRACK};

/// 主音轨 (`A1`) 在轨道列中写成 `A` 加一个空格。
pub const PRIMARY_TRACK_TOKEN: &str = "A ";

pub const DEFAULT_TAPE_WIDTH: usize = 129;

/// 事件行各列的宽度与间隔。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLineLayout {
    /// 事件号位数，不足补零
    pub event_number_width: usize,
    pub gap_after_event_number: usize,
    /// 磁带名左对齐的宽度，超长不截断
    pub tape_width: usize,
    pub gap_after_tape: usize,
    /// 轨道列左对齐的宽度，紧接着是转场代码
    pub track_width: usize,
    pub gap_after_transition: usize,
}

impl Default for EventLineLayout {
    fn default() -> Self {
        Self {
            event_number_width: 6,
            gap_after_event_number: 2,
            tape_width: DEFAULT_TAPE_WIDTH,
            gap_after_tape: 1,
            track_width: 7,
            gap_after_transition: 8,
        }
    }
}

impl EventLineLayout {
    pub fn with_tape_width(tape_width: usize) -> Self {
        Self {
            tape_width,
            ..Self::default()
        }
    }
}

/// 轨道列中实际写出的内容。
pub fn track_token(track: &str) -> &str {
    if track == FALLBACK_TRACK {
        PRIMARY_TRACK_TOKEN
    } else {
        track
    }
}

/// 生成一条带换行符的事件行。时间码原样写出。
pub fn format_event_line(
    event_number: u32,
    event: &EventLine,
    track: &str,
    layout: &EventLineLayout,
) -> String {
    format!(
        "{number:0number_width$}{pad:number_gap$}{tape:<tape_width$}{pad:tape_gap$}{track:<track_width$}{transition}{pad:transition_gap$}{} {} {} {}\n",
        event.source_in,
        event.source_out,
        event.record_in,
        event.record_out,
        number = event_number,
        pad = "",
        tape = event.tape,
        track = track_token(track),
        transition = event.transition,
        number_width = layout.event_number_width,
        number_gap = layout.gap_after_event_number,
        tape_width = layout.tape_width,
        tape_gap = layout.gap_after_tape,
        track_width = layout.track_width,
        transition_gap = layout.gap_after_transition,
    )
}

/// 拼接最终文本：头部行在前，事件按输出顺序在后，每行都以换行结尾。
pub fn render_edl<'a>(
    header_lines: &[String],
    events: impl IntoIterator<Item = &'a ExpandedEvent>,
) -> String {
    let mut output = String::new();
    for line in header_lines {
        output.push_str(line);
        output.push('\n');
    }
    for line in events.into_iter().flat_map(|event| event.lines.iter()) {
        output.push_str(line);
        if !line.ends_with('\n') {
            output.push('\n');
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> EventLine {
        EventLine {
            event_number: "000008".into(),
            tape: "TAPE01".into(),
            track_type: "V".into(),
            transition: "C".into(),
            source_in: "01:00:00:00".into(),
            source_out: "01:00:10:00".into(),
            record_in: "01:00:00:00".into(),
            record_out: "01:00:10:00".into(),
        }
    }

    const TIMECODES: &str = "01:00:00:00 01:00:10:00 01:00:00:00 01:00:10:00";

    #[test]
    fn test_primary_track_line() {
        let line = format_event_line(1, &sample_event(), "A1", &EventLineLayout::default());
        let expected = format!(
            "000001  TAPE01{} A      C        {TIMECODES}\n",
            " ".repeat(123)
        );
        assert_eq!(line, expected);
        assert_eq!(&line[145..146], "C");
        assert_eq!(line.len(), 202);
    }

    #[test]
    fn test_secondary_track_line() {
        let line = format_event_line(2, &sample_event(), "A2", &EventLineLayout::default());
        let expected = format!(
            "000002  TAPE01{} A2     C        {TIMECODES}\n",
            " ".repeat(123)
        );
        assert_eq!(line, expected);
    }

    #[test]
    fn test_wide_values_are_not_truncated() {
        let mut event = sample_event();
        event.tape = "T".repeat(140);
        let line = format_event_line(1234567, &event, "A123456789", &EventLineLayout::default());
        assert!(line.starts_with(&format!("1234567  {} A123456789C        ", event.tape)));
    }

    #[test]
    fn test_custom_tape_width() {
        let layout = EventLineLayout::with_tape_width(8);
        let line = format_event_line(3, &sample_event(), "A1", &layout);
        assert_eq!(line, format!("000003  TAPE01   A      C        {TIMECODES}\n"));
    }

    #[test]
    fn test_render_appends_missing_newlines() {
        let header = vec!["TITLE: X".to_string(), String::new()];
        let events = vec![ExpandedEvent {
            event_number: 1,
            track: "A1".into(),
            lines: vec!["000001 line\n".into(), "* comment".into()],
        }];
        assert_eq!(
            render_edl(&header, &events),
            "TITLE: X\n\n000001 line\n* comment\n"
        );
        assert_eq!(render_edl(&[], &[] as &[ExpandedEvent]), "");
    }
}
