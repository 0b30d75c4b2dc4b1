//! 把每个视频事件按磁带的音轨数量展开成多个音频事件。

use std::borrow::Cow;

use crate::edl_generator::{EventLineLayout, format_event_line, render_edl};
use crate::edl_parser::{parse_event_line, split_edl};
use crate::types::{
    BlockOutcome, EdlDocument, EventBlock, ExpandedEvent, FALLBACK_TRACK, SkipReason, TapeTrackMap,
};

/// 查找磁带的音轨列表，映射表中没有的磁带只有 `A1` 一条音轨。
pub fn resolve_tracks<'a>(map: &'a TapeTrackMap, tape: &str) -> Cow<'a, [String]> {
    match map.tracks_for(tape) {
        Some(tracks) => Cow::Borrowed(tracks),
        None => Cow::Owned(vec![FALLBACK_TRACK.to_string()]),
    }
}

/// 处理单个事件块。输出事件从 `next_event_number` 开始连续编号。
///
/// 首行解析失败、不是视频事件、或磁带没有任何音轨的块会被跳过，
/// 块内首行之后的所有行在每个输出事件中原样复制一份。
pub fn expand_block(
    block: &EventBlock,
    map: &TapeTrackMap,
    next_event_number: u32,
    layout: &EventLineLayout,
) -> BlockOutcome {
    let line_num = block.line_num;

    let Some(event) = parse_event_line(block.first_line()) else {
        return BlockOutcome::Skipped {
            line_num,
            reason: SkipReason::MalformedEventLine,
        };
    };
    if !event.is_video() {
        return BlockOutcome::Skipped {
            line_num,
            reason: SkipReason::NonVideoEvent {
                track_type: event.track_type,
            },
        };
    }

    let tracks = resolve_tracks(map, &event.tape);
    if tracks.is_empty() {
        return BlockOutcome::Skipped {
            line_num,
            reason: SkipReason::NoAudioTracks { tape: event.tape },
        };
    }

    let events = tracks
        .iter()
        .zip(next_event_number..)
        .map(|(track, event_number)| {
            let mut lines = Vec::with_capacity(block.lines.len());
            lines.push(format_event_line(event_number, &event, track, layout));
            lines.extend(block.trailing_lines().iter().cloned());
            ExpandedEvent {
                event_number,
                track: track.clone(),
                lines,
            }
        })
        .collect();

    BlockOutcome::Expanded {
        line_num,
        tape: event.tape,
        events,
    }
}

/// 折叠过程中携带的状态：下一个事件号与已处理块的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    pub next_event_number: u32,
    pub outcomes: Vec<BlockOutcome>,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self {
            next_event_number: 1,
            outcomes: Vec::new(),
        }
    }
}

impl ExpansionState {
    fn absorb(mut self, outcome: BlockOutcome) -> Self {
        match &outcome {
            BlockOutcome::Expanded { events, .. } => {
                self.next_event_number += events.len() as u32;
            }
            BlockOutcome::Skipped { line_num, reason } => {
                log::debug!("[Expand] Line {line_num}: block skipped, {reason}.");
            }
        }
        self.outcomes.push(outcome);
        self
    }
}

/// 展开结果：原样的头部行与每个事件块的处理结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub header_lines: Vec<String>,
    pub outcomes: Vec<BlockOutcome>,
}

impl Expansion {
    pub fn events(&self) -> impl Iterator<Item = &ExpandedEvent> {
        self.outcomes.iter().flat_map(|outcome| match outcome {
            BlockOutcome::Expanded { events, .. } => events.as_slice(),
            BlockOutcome::Skipped { .. } => &[],
        })
    }

    pub fn event_count(&self) -> usize {
        self.events().count()
    }

    pub fn expanded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_expanded()).count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (usize, &SkipReason)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BlockOutcome::Skipped { line_num, reason } => Some((*line_num, reason)),
            BlockOutcome::Expanded { .. } => None,
        })
    }

    pub fn render(&self) -> String {
        render_edl(&self.header_lines, self.events())
    }
}

pub fn expand_document(
    document: &EdlDocument,
    map: &TapeTrackMap,
    layout: &EventLineLayout,
) -> Expansion {
    let state = document
        .blocks
        .iter()
        .fold(ExpansionState::default(), |state, block| {
            let outcome = expand_block(block, map, state.next_event_number, layout);
            state.absorb(outcome)
        });

    let expansion = Expansion {
        header_lines: document.header_lines.clone(),
        outcomes: state.outcomes,
    };
    log::info!(
        "[Expand] {} of {} blocks expanded into {} events.",
        expansion.expanded_count(),
        document.blocks.len(),
        expansion.event_count()
    );
    expansion
}

/// 从 EDL 文本得到展开后的 EDL 文本。
pub fn expand_edl(content: &str, map: &TapeTrackMap, layout: &EventLineLayout) -> String {
    expand_document(&split_edl(content), map, layout).render()
}
