//! Number to string conversion following the language's formatting rules.

/// Formats a number the way the evaluated language prints it.
///
/// Uses the shortest round-tripping digit sequence (computed by `ryu`) and
/// switches to exponent notation for magnitudes of `1e21` and above or below
/// `1e-6`.
///
/// # Examples
///
/// ```
/// use core_types::format_number;
///
/// assert_eq!(format_number(3.0), "3");
/// assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
/// assert_eq!(format_number(1e21), "1e+21");
/// assert_eq!(format_number(f64::NAN), "NaN");
/// ```
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let mut buffer = ryu::Buffer::new();
    let repr = buffer.format_finite(n.abs());
    let (digits, point) = decompose(repr);
    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }

    let k = digits.len() as i32;
    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((point - k) as usize));
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        out.push_str(&digits);
    } else {
        let exp = point - 1;
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&exp.abs().to_string());
    }
    out
}

/// Splits a `ryu` rendering into significant digits and the decimal point
/// position relative to the first digit.
fn decompose(repr: &str) -> (String, i32) {
    let (mantissa, exp) = match repr.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (repr, 0),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut digits: String = format!("{}{}", int, frac);
    let mut point = int.len() as i32 + exp;

    let leading = digits.len() - digits.trim_start_matches('0').len();
    digits.drain(..leading);
    point -= leading as i32;

    let trimmed = digits.trim_end_matches('0').len();
    digits.truncate(trimmed);
    (digits, point)
}
