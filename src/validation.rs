use once_cell::sync::Lazy;
use regex::Regex;

pub fn is_ascii_no_spaces(username: &str) -> Result<(), String> {
    match !username.is_empty()
        && username.chars().all(|c| c.is_ascii() && !c.is_whitespace())
    {
        true => Ok(()),
        false => Err("should be an ascii string without spaces".to_string()),
    }
}

/// Checks the shape of an email address. Matching is case-insensitive.
pub fn is_valid_email(string: &str) -> Result<(), String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
        r#"^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$"#
    ).unwrap()
    });
    match RE.is_match(&string.to_ascii_lowercase()) {
        true => Ok(()),
        false => Err("invalid email".to_string()),
    }
}

pub fn is_student_number(string: &str) -> Result<(), String> {
    match !string.is_empty() && string.chars().all(|c| c.is_ascii_digit()) {
        true => Ok(()),
        false => Err("student numbers are made of digits".to_string()),
    }
}

#[cfg(test)]
#[test]
fn test_email() {
    assert!(is_valid_email("hello@example.com").is_ok());
    assert!(is_valid_email("Data8@SFU.ca").is_ok());
    assert!(is_valid_email("not an email").is_err());
    assert!(is_valid_email("trailing@example.com and more").is_err());
}

#[cfg(test)]
#[test]
fn test_student_number() {
    assert!(is_student_number("300913643").is_ok());
    assert!(is_student_number("30091364a").is_err());
    assert!(is_student_number("").is_err());
}

#[cfg(test)]
#[test]
fn test_username() {
    assert!(is_ascii_no_spaces("ada_l").is_ok());
    assert!(is_ascii_no_spaces("ada l").is_err());
    assert!(is_ascii_no_spaces("").is_err());
}
