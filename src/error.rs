//! Crate-wide error value and the source-tagged trace it carries.
//!
//! The original tool this crate reverse-engineers threads a small fixed-depth
//! stack of `(reason, source)` pairs through every fallible call so that a
//! caller who wraps a callee's error can still see what actually went wrong
//! deeper down. We keep that shape (spec names it directly) but back it with
//! a plain owned array instead of hand-rolled push/pop bookkeeping over a
//! manually managed buffer.

use core::fmt;

const TRACE_DEPTH: usize = 8;

/// The reason a fallible operation failed.
///
/// `LeakDetected` is kept for taxonomy completeness even though this
/// implementation never constructs it: ownership here is plain RAII, so
/// there's nothing to leak-detect (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum ErrorReason {
  None,
  NullInput,
  AllocFail,
  LeakDetected,
  OutOfRange,
  OpenFail,
  IoFail,
  Syntax,
  Format,
  ImageShape,
  UnknownValue,
  AssertFail,
  CalleeFail,
  Other,
}
impl fmt::Display for ErrorReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::None => "none",
      Self::NullInput => "null input",
      Self::AllocFail => "allocation failed",
      Self::LeakDetected => "leak detected",
      Self::OutOfRange => "out of range",
      Self::OpenFail => "open failed",
      Self::IoFail => "I/O failed",
      Self::Syntax => "syntax error",
      Self::Format => "format error",
      Self::ImageShape => "unexpected image shape",
      Self::UnknownValue => "unknown value",
      Self::AssertFail => "internal assertion failed",
      Self::CalleeFail => "callee failed",
      Self::Other => "other error",
    };
    f.write_str(s)
  }
}

/// Which component raised an [`ErrorReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum ErrorSource {
  Global,
  Bitmap,
  Canvas,
  Locator,
  Ocr,
  Palettes,
  Thermal,
}
impl fmt::Display for ErrorSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Global => "global",
      Self::Bitmap => "bitmap",
      Self::Canvas => "canvas",
      Self::Locator => "locator",
      Self::Ocr => "ocr",
      Self::Palettes => "palettes",
      Self::Thermal => "thermal",
    };
    f.write_str(s)
  }
}

/// A crate error: a top `(reason, source)` frame plus a bounded trace of
/// frames it was wrapped from.
///
/// Pushing past [`TRACE_DEPTH`] silently drops the oldest frame rather than
/// growing — the depth is specified as fixed, not "as much as we need".
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ThermalError {
  reason: ErrorReason,
  source: ErrorSource,
  trace: [Option<(ErrorReason, ErrorSource)>; TRACE_DEPTH],
  trace_len: usize,
}
impl ThermalError {
  /// Builds a fresh error with an empty trace.
  #[inline]
  #[must_use]
  pub const fn new(reason: ErrorReason, source: ErrorSource) -> Self {
    Self { reason, source, trace: [None; TRACE_DEPTH], trace_len: 0 }
  }

  /// The `NONE` / success sentinel: `(None, Global)` with an empty trace.
  #[inline]
  #[must_use]
  pub const fn none() -> Self {
    Self::new(ErrorReason::None, ErrorSource::Global)
  }

  /// The current top reason.
  #[inline]
  #[must_use]
  pub const fn reason(&self) -> ErrorReason {
    self.reason
  }

  /// The current top source.
  #[inline]
  #[must_use]
  pub const fn source_tag(&self) -> ErrorSource {
    self.source
  }

  /// Pushes the current top frame onto the trace and installs a new top
  /// frame. Used by a caller wrapping a callee's error: the callee's
  /// `(reason, source)` survives in the trace even though the caller's own
  /// new frame becomes the top.
  #[inline]
  pub fn push(&mut self, reason: ErrorReason, source: ErrorSource) {
    if self.trace_len < TRACE_DEPTH {
      self.trace[self.trace_len] = Some((self.reason, self.source));
      self.trace_len += 1;
    } else {
      self.trace.copy_within(1.., 0);
      self.trace[TRACE_DEPTH - 1] = Some((self.reason, self.source));
    }
    self.reason = reason;
    self.source = source;
  }

  /// Removes and returns the most recently pushed trace frame, if any.
  #[inline]
  pub fn pop(&mut self) -> Option<(ErrorReason, ErrorSource)> {
    if self.trace_len == 0 {
      None
    } else {
      self.trace_len -= 1;
      self.trace[self.trace_len].take()
    }
  }

  /// Looks at the most recently pushed trace frame without removing it.
  #[inline]
  #[must_use]
  pub fn peek(&self) -> Option<(ErrorReason, ErrorSource)> {
    if self.trace_len == 0 {
      None
    } else {
      self.trace[self.trace_len - 1]
    }
  }

  /// The oldest (first pushed, i.e. deepest/original) trace frame, if any.
  #[inline]
  #[must_use]
  pub fn first(&self) -> Option<(ErrorReason, ErrorSource)> {
    self.trace[0]
  }

  /// Wraps `callee`, pushing its `(reason, source)` into the trace and
  /// reporting `CalleeFail` from `wrapper_source` as the new top frame.
  #[inline]
  #[must_use]
  pub fn wrap(mut callee: Self, wrapper_source: ErrorSource) -> Self {
    callee.push(ErrorReason::CalleeFail, wrapper_source);
    callee
  }
}
impl fmt::Debug for ThermalError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ThermalError({}@{}", self.reason, self.source)?;
    for frame in self.trace.iter().rev().flatten() {
      write!(f, " <- {}@{}", frame.0, frame.1)?;
    }
    write!(f, ")")
  }
}
impl fmt::Display for ThermalError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} in {}", self.reason, self.source)?;
    for frame in self.trace.iter().rev().flatten() {
      write!(f, "; caused by {} in {}", frame.0, frame.1)?;
    }
    Ok(())
  }
}
#[cfg(feature = "std")]
impl std::error::Error for ThermalError {}

/// Shorthand for `Result<T, ThermalError>`.
pub type ThermalResult<T> = Result<T, ThermalError>;
