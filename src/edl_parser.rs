//! EDL 文本拆分与事件行解析。

use crate::types::{EdlDocument, EventBlock, EventLine};
use crate::utils::split_text_lines;
use once_cell::sync::Lazy;
use regex::Regex;

/// 以 6 位事件号加空白开头的行即为事件行。
static EVENT_LINE_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}\s").expect("未能编译 EVENT_LINE_START_REGEX"));

/// 硬切事件行：`<事件号> <磁带> <轨道类型> C <源入点> <源出点> <录入点> <录出点>`
static EVENT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<number>\d{6})\s+(?P<tape>\S+)\s+(?P<track>\S+)\s+(?P<transition>C)\s+(?P<src_in>\S+)\s+(?P<src_out>\S+)\s+(?P<rec_in>\S+)\s+(?P<rec_out>\S+)",
    )
    .expect("未能编译 EVENT_LINE_REGEX")
});

pub fn is_event_line(line: &str) -> bool {
    EVENT_LINE_START_REGEX.is_match(line)
}

/// 把 EDL 文本拆成头部行和事件块。
///
/// 头部只取文件开头连续的非事件行；第一个事件行之后出现的非事件行都归入当前事件块。
pub fn split_edl(content: &str) -> EdlDocument {
    let lines = split_text_lines(content);

    let header_lines: Vec<String> = lines
        .iter()
        .take_while(|line| !is_event_line(line))
        .map(|line| line.to_string())
        .collect();

    let mut blocks: Vec<EventBlock> = Vec::new();
    let mut current: Option<EventBlock> = None;

    for (idx, line) in lines.iter().enumerate() {
        if is_event_line(line) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(EventBlock {
                line_num: idx + 1,
                lines: vec![line.to_string()],
            });
        } else if let Some(block) = current.as_mut() {
            block.lines.push(line.to_string());
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }

    log::debug!(
        "[EDL] {} header lines, {} event blocks.",
        header_lines.len(),
        blocks.len()
    );

    EdlDocument {
        header_lines,
        blocks,
    }
}

/// 解析事件行。转场不是 `C`（硬切）或字段不足的行返回 `None`。
pub fn parse_event_line(line: &str) -> Option<EventLine> {
    let caps = EVENT_LINE_REGEX.captures(line)?;
    let field = |name: &str| caps.name(name).map_or("", |m| m.as_str()).to_string();

    Some(EventLine {
        event_number: field("number"),
        tape: field("tape"),
        track_type: field("track"),
        transition: field("transition"),
        source_in: field("src_in"),
        source_out: field("src_out"),
        record_in: field("rec_in"),
        record_out: field("rec_out"),
    })
}
