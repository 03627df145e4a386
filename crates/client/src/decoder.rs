//! Server-sent event frame decoder.
//!
//! Turns the raw text fragments produced by the transport into discrete
//! `StreamFrame`s, tolerant of arbitrary chunk boundaries. Pure state
//! machine: feed fragments in, collect frames out. Restartable only by
//! constructing a new decoder.

use toolstream_core::StreamFrame;

/// Frames are separated by a blank line in the byte stream.
const FRAME_SEPARATOR: &str = "\n\n";

/// Only payloads behind this prefix are meaningful frames.
const DATA_PREFIX: &str = "data: ";

/// Reserved payload signaling normal stream completion.
const DONE_SENTINEL: &str = "[DONE]";

/// Reserved payload prefix signaling an in-band stream error.
const ERROR_PREFIX: &str = "[ERROR:";

/// Incremental SSE decoder with an accumulation buffer.
///
/// After a sentinel (`Done` or `Error`) has been produced the decoder is
/// finished and ignores any further input.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
    finished: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a terminal sentinel has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append one raw fragment and return every frame it completes.
    ///
    /// The trailing piece after the last separator may be incomplete and is
    /// retained as the new buffer. End-of-input with a non-empty leftover
    /// that was never terminated by a sentinel is the transport's concern,
    /// not the decoder's — the leftover is simply never emitted.
    pub fn push(&mut self, fragment: &str) -> Vec<StreamFrame> {
        if self.finished {
            return Vec::new();
        }

        self.buffer.push_str(fragment);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find(FRAME_SEPARATOR) {
            let candidate: String = self.buffer.drain(..pos + FRAME_SEPARATOR.len()).collect();
            let candidate = &candidate[..pos];

            if candidate.trim().is_empty() {
                continue;
            }

            // Only data-prefixed candidates are meaningful.
            let Some(payload) = candidate.strip_prefix(DATA_PREFIX) else {
                continue;
            };

            if payload == DONE_SENTINEL {
                self.finished = true;
                frames.push(StreamFrame::Done);
                break;
            }

            if let Some(rest) = payload.strip_prefix(ERROR_PREFIX) {
                let message = rest.strip_suffix(']').unwrap_or(rest).to_string();
                self.finished = true;
                frames.push(StreamFrame::Error { message });
                break;
            }

            frames.push(StreamFrame::Content {
                text: payload.to_string(),
            });
        }

        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str) -> StreamFrame {
        StreamFrame::Content { text: text.into() }
    }

    #[test]
    fn single_frame() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("data: hello\n\n");
        assert_eq!(frames, vec![content("hello")]);
    }

    #[test]
    fn multiple_frames_in_one_fragment() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("data: one\n\ndata: two\n\ndata: three\n\n");
        assert_eq!(frames, vec![content("one"), content("two"), content("three")]);
    }

    #[test]
    fn frame_split_across_fragments() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push("data: hel").is_empty());
        assert!(decoder.push("lo wor").is_empty());
        let frames = decoder.push("ld\n\n");
        assert_eq!(frames, vec![content("hello world")]);
    }

    #[test]
    fn separator_split_across_fragments() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push("data: hello\n").is_empty());
        let frames = decoder.push("\ndata: next\n\n");
        assert_eq!(frames, vec![content("hello"), content("next")]);
    }

    #[test]
    fn done_sentinel_terminates() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("data: last\n\ndata: [DONE]\n\ndata: ignored\n\n");
        assert_eq!(frames, vec![content("last"), StreamFrame::Done]);
        assert!(decoder.is_finished());
        assert!(decoder.push("data: more\n\n").is_empty());
    }

    #[test]
    fn done_sentinel_split_mid_marker() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push("data: [DO").is_empty());
        let frames = decoder.push("NE]\n\n");
        assert_eq!(frames, vec![StreamFrame::Done]);
    }

    #[test]
    fn error_sentinel_carries_message() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("data: [ERROR:model overloaded]\n\n");
        assert_eq!(
            frames,
            vec![StreamFrame::Error {
                message: "model overloaded".into()
            }]
        );
        assert!(decoder.is_finished());
    }

    #[test]
    fn error_message_keeps_inner_brackets() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("data: [ERROR:bad [input] shape]\n\n");
        assert_eq!(
            frames,
            vec![StreamFrame::Error {
                message: "bad [input] shape".into()
            }]
        );
    }

    #[test]
    fn whitespace_only_candidates_are_discarded() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("   \n\n\n\ndata: real\n\n");
        assert_eq!(frames, vec![content("real")]);
    }

    #[test]
    fn non_data_candidates_are_ignored() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("event: ping\n\ndata: text\n\n: comment\n\n");
        assert_eq!(frames, vec![content("text")]);
    }

    #[test]
    fn unterminated_leftover_is_not_emitted() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("data: complete\n\ndata: dangling");
        assert_eq!(frames, vec![content("complete")]);
        assert!(!decoder.is_finished());
    }

    #[test]
    fn content_whitespace_is_preserved() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("data:  padded \n\n");
        assert_eq!(frames, vec![content(" padded ")]);
    }
}
