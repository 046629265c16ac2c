//! Lexer mode stack
//!
//! The scanner picks its rules from the mode on top of this stack. Each frame
//! keeps its own flags, so an interpolation opened inside another
//! interpolation is closed by its own `}` and never by an outer one.

/// Sub-grammar the lexer is currently scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Ordinary code
    Default,
    /// Inside `'...'`
    SimpleString,
    /// Inside `"..."`, where `#{` opens an interpolation
    ComplexString,
    /// From `#` to the end of the line
    Comment,
}

/// Flags attached to a mode frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// The `Default` frame was pushed by `#{` and ends at its matching `}`
    InsideInterpolatedExpression,
}

#[derive(Debug, Clone)]
struct Frame {
    mode: Mode,
    flags: Vec<Flag>,
    /// Unclosed `{` seen in this frame
    braces: usize,
    /// String frames: the next segment has not produced its fragment yet
    segment_open: bool,
}

impl Frame {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            flags: Vec::new(),
            braces: 0,
            segment_open: matches!(mode, Mode::SimpleString | Mode::ComplexString),
        }
    }
}

/// Stack of lexer modes; never empty
#[derive(Debug, Clone)]
pub struct LexerState {
    frames: Vec<Frame>,
}

impl LexerState {
    /// A fresh stack holding a single `Default` frame
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(Mode::Default)],
        }
    }

    /// The active mode
    pub fn mode(&self) -> Mode {
        self.top().mode
    }

    pub fn push(&mut self, mode: Mode) {
        self.frames.push(Frame::new(mode));
    }

    /// Enter an interpolated expression from a double-quoted string
    ///
    /// The string frame underneath starts a new segment once the
    /// interpolation closes.
    pub fn push_interpolation(&mut self) {
        self.top_mut().segment_open = true;
        let mut frame = Frame::new(Mode::Default);
        frame.flags.push(Flag::InsideInterpolatedExpression);
        self.frames.push(frame);
    }

    /// Leave the active mode. The bottom `Default` frame is never popped.
    pub fn pop(&mut self) -> Option<Mode> {
        if self.frames.len() > 1 {
            self.frames.pop().map(|frame| frame.mode)
        } else {
            None
        }
    }

    /// Whether the active frame carries `flag`
    pub fn is_set(&self, flag: Flag) -> bool {
        self.top().flags.contains(&flag)
    }

    /// Whether any frame is an open string or interpolation
    pub fn in_string(&self) -> bool {
        self.frames
            .iter()
            .any(|frame| matches!(frame.mode, Mode::SimpleString | Mode::ComplexString))
    }

    /// Record a `{` in the active frame
    pub fn open_brace(&mut self) {
        self.top_mut().braces += 1;
    }

    /// Record a `}`; returns true when it closes the active interpolation
    pub fn close_brace(&mut self) -> bool {
        if self.top().braces > 0 {
            self.top_mut().braces -= 1;
            return false;
        }
        self.is_set(Flag::InsideInterpolatedExpression)
    }

    /// Whether the active string frame still owes a fragment for its segment
    pub fn segment_open(&self) -> bool {
        self.top().segment_open
    }

    pub fn set_segment_open(&mut self, open: bool) {
        self.top_mut().segment_open = open;
    }

    fn top(&self) -> &Frame {
        let last = self.frames.len() - 1;
        &self.frames[last]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}

impl Default for LexerState {
    fn default() -> Self {
        Self::new()
    }
}
