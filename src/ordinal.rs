//! English ordinal formatting for user-facing controller messages
//! ("3rd replica failed to join", "retrying the 2nd rollout step")

/// Append the English ordinal suffix to the decimal representation of `n`.
///
/// Numbers whose last two digits are 11, 12 or 13 take "th"; otherwise the
/// suffix keys off the last digit. Negative numbers keep their sign and
/// take the suffix of their magnitude. Pure and total.
pub fn ordinalize(n: i64) -> String {
    let magnitude = n.unsigned_abs();
    let suffix = match magnitude % 100 {
        11 | 12 | 13 => "th",
        _ => match magnitude % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{}", n, suffix)
}
