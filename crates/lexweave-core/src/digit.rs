#![forbid(unsafe_code)]

//! Numeric-run heuristic.
//!
//! Rule sets with digit highlighting enabled test each pending run with this
//! small state machine before consulting the keyword map. The scanner
//! recognizes decimal runs, `0x` hex runs, and trailing numeric suffixes;
//! `.` and `-` pass through because grammars typically tokenize those with
//! separate sequence rules rather than as part of the digit run.

/// Whether a run qualifies as a numeric literal.
///
/// Accepts: digits, `x`/`X` immediately after a leading `0` switching to hex
/// mode, `a`-`f` in hex mode, and suffix letters `d f l e` (either case) once
/// at least one digit has been seen. Any other character disqualifies the
/// whole run. Empty and digit-free runs do not qualify.
pub fn is_digit_run(run: &[char]) -> bool {
    let mut seen_digit = false;
    let mut hex = false;

    for (index, &ch) in run.iter().enumerate() {
        match ch {
            '0'..='9' => seen_digit = true,
            'x' | 'X' if index == 1 && run[0] == '0' && !hex => hex = true,
            'a'..='f' | 'A'..='F' if hex => seen_digit = true,
            'd' | 'D' | 'f' | 'F' | 'l' | 'L' | 'e' | 'E' if seen_digit => {}
            '.' | '-' => {}
            _ => return false,
        }
    }

    seen_digit
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
