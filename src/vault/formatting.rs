//! Display helpers for decrypted entry fields.
//!
//! Pure string functions, no side effects.  Hosts use them when showing
//! card numbers and phone numbers.

/// Format a card number in blocks of four digits separated by spaces.
///
/// Non-digit characters are dropped first.
pub fn format_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hide everything except the last four digits of a card number.
pub fn mask_card_number(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 4 {
        return digits;
    }
    format!("\u{2022}\u{2022}\u{2022}\u{2022} {}", &digits[digits.len() - 4..])
}

/// Format a phone number for display.
///
/// - 10 digits: `(XXX) XXX-XXXX`
/// - 11 digits starting with `1`: `+1 (XXX) XXX-XXXX`
/// - more than 10 digits: `+CC (XXX) XXX-XXXX` with the extra leading
///   digits as the country code
/// - anything else is returned unchanged
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let n = digits.len();

    if n == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else if n == 11 && digits.starts_with('1') {
        format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
    } else if n > 10 {
        let (cc, rest) = digits.split_at(n - 10);
        format!("+{cc} ({}) {}-{}", &rest[..3], &rest[3..6], &rest[6..])
    } else {
        phone.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_numbers_are_grouped() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("4111-1111-1111-1"), "4111 1111 1111 1");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn card_numbers_are_masked() {
        assert_eq!(mask_card_number("4111 1111 1111 1234"), "\u{2022}\u{2022}\u{2022}\u{2022} 1234");
        assert_eq!(mask_card_number("123"), "123");
    }

    #[test]
    fn phone_numbers() {
        assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone_number("1-555-123-4567"), "+1 (555) 123-4567");
        assert_eq!(format_phone_number("+44 20 7946 0958"), "+44 (207) 946-0958");
        assert_eq!(format_phone_number("12345"), "12345");
    }
}
