use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").unwrap();
    static ref URI_PASSWORD_REGEX: Regex = Regex::new(r"(?i)(postgres(?:ql)?://[^:/@\s]+):[^@\s]+@").unwrap();
}

/// Masks e-mail addresses and credentials embedded in connection strings.
pub fn mask_pii(input: &str) -> String {
    let without_passwords = URI_PASSWORD_REGEX.replace_all(input, "$1:***@");
    EMAIL_REGEX.replace_all(&without_passwords, "***@***.***").to_string()
}
