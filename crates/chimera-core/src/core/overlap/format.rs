//! Text rendering of report numbers.
//!
//! Reports are compared byte-for-byte against historical output, so these
//! helpers reproduce `printf`-style `%g` and shortest round-trip float output.

/// Renders `x` the way `printf("%.{precision}g")` does.
pub fn format_general(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, x);
    let (mantissa, exponent) = split_exponent(&scientific);

    if exponent >= -4 && exponent < precision as i32 {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, x))
    } else {
        format!("{}e{}", strip_trailing_zeros(mantissa), exponent_suffix(exponent))
    }
}

/// Overlap values: seven significant digits.
pub fn format_overlap(x: f64) -> String {
    normalize_small(format_general(x, 7))
}

/// Integration errors: two significant digits.
pub fn format_error(x: f64) -> String {
    normalize_small(format_general(x, 2))
}

fn normalize_small(s: String) -> String {
    if s == "0.0001" { "1e-04".to_string() } else { s }
}

/// Shortest decimal that reads back to the same `f64`, with a `.0` suffix on
/// integral values and exponent notation outside `[1e-4, 1e16)`.
pub fn format_shortest(x: f64) -> String {
    if !x.is_finite() {
        return format_general(x, 1);
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{:e}", x);
    let (mantissa, exponent) = split_exponent(&scientific);
    if (-4..16).contains(&exponent) {
        let plain = format!("{}", x);
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        format!("{}e{}", mantissa, exponent_suffix(exponent))
    }
}

fn split_exponent(s: &str) -> (&str, i32) {
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

fn exponent_suffix(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{:02}", sign, exponent.abs())
}

fn strip_trailing_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_format_matches_printf_g() {
        assert_eq!(format_general(0.123456789, 7), "0.1234568");
        assert_eq!(format_general(1.0, 7), "1");
        assert_eq!(format_general(0.5, 2), "0.5");
        assert_eq!(format_general(123456789.0, 7), "1.234568e+08");
        assert_eq!(format_general(0.00001234, 2), "1.2e-05");
        assert_eq!(format_general(0.000123, 2), "0.00012");
        assert_eq!(format_general(9.99999999, 7), "10");
        assert_eq!(format_general(0.0, 7), "0");
        assert_eq!(format_general(-2.5, 2), "-2.5");
    }

    #[test]
    fn values_rounding_to_one_ten_thousandth_render_as_exponent() {
        assert_eq!(format_overlap(0.0001), "1e-04");
        assert_eq!(format_overlap(0.0000999999999), "1e-04");
        assert_eq!(format_error(0.0001), "1e-04");
        assert_eq!(format_error(0.000104), "1e-04");
    }

    #[test]
    fn neighbouring_values_are_not_normalized() {
        assert_eq!(format_overlap(0.0001000001), "0.0001000001");
        assert_eq!(format_overlap(0.00009999), "9.999e-05");
        assert_eq!(format_error(0.00011), "0.00011");
    }

    #[test]
    fn shortest_format_round_trips() {
        assert_eq!(format_shortest(3.0), "3.0");
        assert_eq!(format_shortest(12.345), "12.345");
        assert_eq!(format_shortest(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_shortest(0.00001), "1e-05");
        assert_eq!(format_shortest(1.5e-7), "1.5e-07");
        assert_eq!(format_shortest(0.0), "0.0");
        for x in [1.0 / 3.0, 19.999999999, 4.123456789012345] {
            assert_eq!(format_shortest(x).parse::<f64>().unwrap(), x);
        }
    }
}
