/// Marker call wrapped around the expressions that should be treated as fixed literals.
pub const DEFAULT_CONSTANT_MARKER: &str = "constant";

/// Strips a marker call (ie: `constant(EXPR)`) from a circuit source, leaving the wrapped
/// expression untouched.
///
/// The argument is delimited by counting parentheses, so `constant(pow(2, 3))` gives `pow(2, 3)`
/// and markers nested inside an argument are stripped as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantRewriter {
    marker: String,
}

impl ConstantRewriter {
    /// `ConstantRewriter` factory
    pub fn new<T: Into<String>>(marker: T) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Name of the marker call stripped by this rewriter
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Return a copy of `source` where every marker call is replaced by its argument.
    ///
    /// The source is read once, the depth of the parenthesis opened by each pending marker call
    /// is kept on a stack so its closing `)` can be dropped. A marker call with no balancing `)`
    /// is kept as is, the markers that follow it are still stripped.
    pub fn rewrite(&self, source: &str) -> String {
        if self.marker.is_empty() {
            return source.to_string();
        }

        let call = format!("{}(", self.marker);
        let mut rewritten = String::with_capacity(source.len());
        let mut pending_calls: Vec<PendingCall> = vec![];
        let mut depth = 0_usize;
        let mut previous: Option<char> = None;
        let mut remaining = source;

        while let Some(c) = remaining.chars().next() {
            if remaining.starts_with(&call) && !previous.is_some_and(is_identifier_char) {
                depth += 1;
                pending_calls.push(PendingCall {
                    depth,
                    output_offset: rewritten.len(),
                });
                remaining = &remaining[call.len()..];
                previous = Some('(');
                continue;
            }

            let closes_pending_call = c == ')'
                && pending_calls
                    .last()
                    .is_some_and(|pending| pending.depth == depth);
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
            if closes_pending_call {
                pending_calls.pop();
            } else {
                rewritten.push(c);
            }
            previous = Some(c);
            remaining = &remaining[c.len_utf8()..];
        }

        restore_unterminated_calls(rewritten, &pending_calls, &call)
    }
}

impl Default for ConstantRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_CONSTANT_MARKER)
    }
}

/// A marker call whose closing parenthesis has not been found yet.
struct PendingCall {
    /// Parenthesis depth once the call is opened
    depth: usize,
    /// Offset in the rewritten text where the marker call was dropped
    output_offset: usize,
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Put back the marker calls never closed, `pending_calls` is ordered by offset.
fn restore_unterminated_calls(
    rewritten: String,
    pending_calls: &[PendingCall],
    call: &str,
) -> String {
    if pending_calls.is_empty() {
        return rewritten;
    }

    let mut restored = String::with_capacity(rewritten.len() + pending_calls.len() * call.len());
    let mut copied = 0;
    for pending in pending_calls {
        restored.push_str(&rewritten[copied..pending.output_offset]);
        restored.push_str(call);
        copied = pending.output_offset;
    }
    restored.push_str(&rewritten[copied..]);

    restored
}
