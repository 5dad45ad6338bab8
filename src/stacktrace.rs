//! Call stack capture for error descriptors.
//!
//! Frames are stored oldest first, so the frame closest to the capture point
//! is the last one. Trimming removes the contiguous run of frames at that end
//! which belong to this crate, leaving the caller's frame last.

use backtrace::{Backtrace, BacktraceFrame};
use serde::Serialize;

/// Module path that identifies this crate's own frames.
pub const INTERNAL_MODULE: &str = env!("CARGO_CRATE_NAME");

/// Module path of the stack capture facility. Its frames sit between the
/// capture point and this crate and are always dropped.
const CAPTURE_MODULE: &str = "backtrace";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colno: Option<u32>,
}

impl Frame {
    /// Build a frame from a demangled function name, deriving its module.
    pub fn from_function(function: impl Into<String>) -> Self {
        let function = function.into();
        Frame {
            module: module_of(&function),
            function: Some(function),
            ..Default::default()
        }
    }

    /// Whether this frame's module is `module` or nested under it.
    pub fn belongs_to(&self, module: &str) -> bool {
        self.module.as_deref().is_some_and(|m| {
            m.strip_prefix(module)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
        })
    }

    fn is_capture_machinery(&self) -> bool {
        self.module.is_none() || self.belongs_to(CAPTURE_MODULE)
    }

    /// One frame per resolved symbol; inlined callees come first.
    fn from_backtrace(frame: &BacktraceFrame) -> Vec<Frame> {
        let symbols = frame.symbols();
        if symbols.is_empty() {
            return vec![Frame::default()];
        }

        symbols
            .iter()
            .map(|symbol| {
                let mut out = match symbol.name() {
                    Some(name) => Frame::from_function(format!("{:#}", name)),
                    None => Frame::default(),
                };
                out.filename = symbol.filename().map(|p| p.display().to_string());
                out.lineno = symbol.lineno();
                out.colno = symbol.colno();
                out
            })
            .collect()
    }
}

/// Captured call stack, oldest frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StackTrace {
    pub frames: Vec<Frame>,
}

impl StackTrace {
    /// Capture the current call stack and trim the frames of
    /// `internal_module` that lead up to this call.
    pub fn capture(internal_module: &str) -> StackTrace {
        let backtrace = Backtrace::new();

        // Innermost first here; drop the capture facility before reversing.
        let mut frames: Vec<Frame> = backtrace
            .frames()
            .iter()
            .flat_map(Frame::from_backtrace)
            .skip_while(Frame::is_capture_machinery)
            .collect();
        frames.reverse();

        trim_internal_tail(&mut frames, internal_module);
        StackTrace { frames }
    }
}

/// Drop the contiguous run of `module` frames at the end of `frames`.
///
/// The first frame that does not belong to `module` is kept along with
/// everything before it. A non-empty trace never becomes empty: if every
/// frame belongs to `module`, the first one stays.
pub fn trim_internal_tail(frames: &mut Vec<Frame>, module: &str) {
    let mut threshold = frames.len().saturating_sub(1);
    while threshold > 0 && frames[threshold].belongs_to(module) {
        threshold -= 1;
    }
    frames.truncate(threshold + 1);
}

/// Module path of a demangled function name.
///
/// `a::b::f` → `a::b`, `<a::b::C<T> as d::E>::f` → `a::b`,
/// `a::b::f::{{closure}}` → `a::b::f`.
fn module_of(function: &str) -> Option<String> {
    let path = function.strip_prefix('<').unwrap_or(function);
    let path = path
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ");
    let end = path
        .find(|c: char| c == '<' || c == '>' || c == ' ')
        .unwrap_or(path.len());

    path[..end]
        .rsplit_once("::")
        .map(|(module, _)| module.to_owned())
        .filter(|module| !module.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(module: &str) -> Frame {
        Frame {
            module: Some(module.to_owned()),
            ..Default::default()
        }
    }

    fn modules(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(|f| f.module.as_deref().unwrap_or("?")).collect()
    }

    #[test]
    fn trims_internal_tail() {
        let mut frames = vec![
            frame("app"),
            frame("app::handler"),
            frame("sink::writer"),
            frame("sink::event"),
        ];
        trim_internal_tail(&mut frames, "sink");
        assert_eq!(modules(&frames), ["app", "app::handler"]);
    }

    #[test]
    fn internal_frames_away_from_the_tail_are_kept() {
        let mut frames = vec![frame("sink"), frame("sink"), frame("app"), frame("app")];
        trim_internal_tail(&mut frames, "sink");
        assert_eq!(modules(&frames), ["sink", "sink", "app", "app"]);

        let mut frames = vec![frame("app"), frame("sink"), frame("app"), frame("sink")];
        trim_internal_tail(&mut frames, "sink");
        assert_eq!(modules(&frames), ["app", "sink", "app"]);
    }

    #[test]
    fn fully_internal_trace_keeps_first_frame() {
        let mut frames = vec![frame("sink")];
        trim_internal_tail(&mut frames, "sink");
        assert_eq!(modules(&frames), ["sink"]);

        let mut frames = vec![frame("sink::a"), frame("sink::b"), frame("sink")];
        trim_internal_tail(&mut frames, "sink");
        assert_eq!(modules(&frames), ["sink::a"]);
    }

    #[test]
    fn empty_trace_stays_empty() {
        let mut frames = Vec::new();
        trim_internal_tail(&mut frames, "sink");
        assert!(frames.is_empty());
    }

    #[test]
    fn unresolved_frames_are_not_internal() {
        let mut frames = vec![frame("app"), Frame::default(), frame("sink")];
        trim_internal_tail(&mut frames, "sink");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], Frame::default());
    }

    #[test]
    fn belongs_to_matches_path_segments() {
        assert!(frame("sink").belongs_to("sink"));
        assert!(frame("sink::writer").belongs_to("sink"));
        assert!(!frame("sinker").belongs_to("sink"));
        assert!(!frame("app::sink").belongs_to("sink"));
        assert!(!Frame::default().belongs_to("sink"));
    }

    #[test]
    fn module_of_demangled_names() {
        let cases = [
            ("a::b::f", Some("a::b")),
            ("a::b::f::{{closure}}", Some("a::b::f")),
            ("<a::b::C<T> as d::E>::f", Some("a::b")),
            ("<&mut a::W as std::io::Write>::write", Some("a")),
            ("a::C<u8>::new", Some("a")),
            ("main", None),
            ("::f", None),
        ];
        for (function, module) in cases {
            assert_eq!(module_of(function).as_deref(), module, "{function}");
        }
    }

    #[test]
    fn capture_strips_own_frames() {
        let trace = StackTrace::capture("no_such_module");
        assert!(!trace.frames.is_empty());
        assert!(trace.frames.iter().all(|f| !f.belongs_to(CAPTURE_MODULE)));

        let trimmed = StackTrace::capture(INTERNAL_MODULE);
        assert!(!trimmed.frames.is_empty());
        assert!(trimmed.frames.len() < trace.frames.len());
    }
}
