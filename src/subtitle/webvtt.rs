//! WebVTT cue parser
//!
//! Streams a subtitle document into timed cues. Only the parts needed to get
//! at the dialogue are understood: the `WEBVTT` header line, `STYLE`/`NOTE`
//! blocks (skipped whole), and `HH:MM:SS.mmm --> HH:MM:SS.mmm` timing lines
//! followed by text. Anything else is ignored.

/// One timed subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Text lines as they appear in the document
    pub lines: Vec<String>,
}

impl Cue {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Timing line anywhere in a line, used when skipping repeated headers.
pub fn contains_timing(line: &str) -> bool {
    regex!(r"\d\d:\d\d:\d\d\.\d{3}\s+-->\s+\d\d:\d\d:\d\d\.\d{3}").is_match(line)
}

/// Parse a timing line into (start, end) seconds.
///
/// Cue settings after the end time (`line:90%` etc) are allowed.
pub fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let caps = regex!(
        r"^(\d\d):(\d\d):(\d\d)\.(\d{3})\s+-->\s+(\d\d):(\d\d):(\d\d)\.(\d{3})"
    )
    .captures(line)?;
    let field = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
    let start = to_seconds(field(1), field(2), field(3), field(4));
    let end = to_seconds(field(5), field(6), field(7), field(8));
    Some((start, end))
}

fn to_seconds(hours: u32, minutes: u32, seconds: u32, millis: u32) -> f64 {
    (hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0
}

fn is_block_marker(line: &str) -> bool {
    line.starts_with("STYLE") || line.starts_with("NOTE")
}

/// Streaming cue parser over the lines of a document
pub struct CueParser<I: Iterator> {
    lines: std::iter::Peekable<I>,
}

impl<'a, I: Iterator<Item = &'a str>> CueParser<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines: lines.peekable(),
        }
    }

    // Skip up to (not including) the next blank line.
    fn skip_block(&mut self) {
        while let Some(line) = self.lines.peek() {
            if line.trim().is_empty() {
                break;
            }
            self.lines.next();
        }
    }
}

impl<'a, I: Iterator<Item = &'a str>> Iterator for CueParser<I> {
    type Item = Cue;

    fn next(&mut self) -> Option<Cue> {
        while let Some(line) = self.lines.next() {
            if line.starts_with("WEBVTT") {
                continue;
            }
            if is_block_marker(line) {
                self.skip_block();
                continue;
            }
            let Some((start, end)) = parse_timing(line) else {
                continue;
            };

            let mut text = Vec::new();
            while let Some(next) = self.lines.peek() {
                if next.trim().is_empty() {
                    break;
                }
                text.push(next.to_string());
                self.lines.next();
            }
            // Consume the blank separator(s).
            while self.lines.peek().is_some_and(|l| l.trim().is_empty()) {
                self.lines.next();
            }

            return Some(Cue {
                start,
                end,
                lines: text,
            });
        }
        None
    }
}

/// Parse all cues of a document.
pub fn parse_cues(document: &str) -> Vec<Cue> {
    CueParser::new(document.lines()).collect()
}

/// Render a document as plain text: one line per caption text line. The
/// header and timestamp map, blocks, timing lines and cue-setting lines are
/// dropped; `<i>`, `<b>`, `<u>` tags are removed.
pub fn to_plain_text(document: &str) -> String {
    let mut out = Vec::new();
    let mut skip = false;
    for line in document.lines() {
        if is_block_marker(line) {
            skip = true;
            continue;
        }
        if skip {
            if line.trim().is_empty() {
                skip = false;
            }
            continue;
        }
        if line.starts_with("WEBVTT")
            || line.starts_with("X-TIMESTAMP-MAP")
            || line.contains("line:")
            || contains_timing(line)
        {
            continue;
        }
        if !line.trim().is_empty() {
            out.push(regex!(r"</?(i|b|u)>").replace_all(line, "").into_owned());
        }
    }
    format!("{}\n", out.join("\n").trim())
}
