use crate::types::Segment;
use crate::PathError;

/// Split a raw path into segments.
///
/// Segments are separated by `.`. A `[` starts a bracket literal whose
/// content up to the next `]` is one segment, taken verbatim, so keys may
/// contain `.` or `/`. A literal may follow a bare segment directly
/// (`a[b.c]` is `a`, `b.c`).
pub fn parse_segments(raw: &str) -> Result<Vec<Segment>, PathError> {
    if raw.is_empty() {
        return Err(PathError::parse(raw, "empty path"));
    }

    let bytes = raw.as_bytes();
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut start = 0;
    // The previous token was a bracket literal that already pushed itself.
    let mut closed = false;

    while pos < bytes.len() {
        match bytes[pos] {
            b'.' => {
                if !closed {
                    segments.push(raw[start..pos].to_string());
                }
                closed = false;
                pos += 1;
                start = pos;
            }
            b'[' => {
                if !closed && pos > start {
                    segments.push(raw[start..pos].to_string());
                }
                let close = raw[pos + 1..]
                    .find(']')
                    .map(|offset| pos + 1 + offset)
                    .ok_or_else(|| PathError::parse(raw, "unterminated '['"))?;
                segments.push(raw[pos + 1..close].to_string());
                pos = close + 1;
                start = pos;
                closed = true;
            }
            _ => {
                if closed {
                    return Err(PathError::parse(raw, "expected '.' or '[' after ']'"));
                }
                pos += 1;
            }
        }
    }

    if !closed {
        segments.push(raw[start..].to_string());
    }
    Ok(segments)
}

/// Render segments back into a raw path, bracketing the ones a bare
/// segment cannot express.
pub fn format_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        if needs_brackets(segment) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            out.push_str(segment);
        }
    }
    out
}

fn needs_brackets(segment: &str) -> bool {
    segment.is_empty() || segment.contains(['.', '[', ']'])
}
