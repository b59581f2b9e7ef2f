//! Semantic formats (`/format` option).
//!
//! A format either narrows the values a type accepts (`date-time`, `i16`,
//! `ipv4-addr`) or selects how a Binary value is written as text in the JSON
//! profiles (`x`, `ipv4-addr`, `ipv6-addr`, `eui`).

use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, NaiveDate};
use regex::Regex;

use crate::type_def::BaseKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    DateTime,
    Date,
    Time,
    Email,
    IdnEmail,
    Hostname,
    IdnHostname,
    Ipv4,
    Ipv6,
    Uri,
    UriReference,
    Iri,
    IriReference,
    UriTemplate,
    JsonPointer,
    RelativeJsonPointer,
    Regex,
    I8,
    I16,
    I32,
    /// `u<n>`: unsigned integer or bit field of n bits.
    Unsigned(u32),
    Eui,
    Ipv4Addr,
    Ipv6Addr,
    /// Binary written as lowercase hex.
    Hex,
    Ipv4Net,
    Ipv6Net,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "date-time" => Self::DateTime,
            "date" => Self::Date,
            "time" => Self::Time,
            "email" => Self::Email,
            "idn-email" => Self::IdnEmail,
            "hostname" => Self::Hostname,
            "idn-hostname" => Self::IdnHostname,
            "ipv4" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            "uri" => Self::Uri,
            "uri-reference" => Self::UriReference,
            "iri" => Self::Iri,
            "iri-reference" => Self::IriReference,
            "uri-template" => Self::UriTemplate,
            "json-pointer" => Self::JsonPointer,
            "relative-json-pointer" => Self::RelativeJsonPointer,
            "regex" => Self::Regex,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "eui" => Self::Eui,
            "ipv4-addr" => Self::Ipv4Addr,
            "ipv6-addr" => Self::Ipv6Addr,
            "x" => Self::Hex,
            "ipv4-net" => Self::Ipv4Net,
            "ipv6-net" => Self::Ipv6Net,
            other => {
                let digits = other.strip_prefix('u')?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                match digits.parse() {
                    Ok(n) if n > 0 => Self::Unsigned(n),
                    _ => return None,
                }
            }
        })
    }

    pub fn as_str(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Time => "time",
            Self::Email => "email",
            Self::IdnEmail => "idn-email",
            Self::Hostname => "hostname",
            Self::IdnHostname => "idn-hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Uri => "uri",
            Self::UriReference => "uri-reference",
            Self::Iri => "iri",
            Self::IriReference => "iri-reference",
            Self::UriTemplate => "uri-template",
            Self::JsonPointer => "json-pointer",
            Self::RelativeJsonPointer => "relative-json-pointer",
            Self::Regex => "regex",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::Unsigned(n) => return Cow::Owned(format!("u{n}")),
            Self::Eui => "eui",
            Self::Ipv4Addr => "ipv4-addr",
            Self::Ipv6Addr => "ipv6-addr",
            Self::Hex => "x",
            Self::Ipv4Net => "ipv4-net",
            Self::Ipv6Net => "ipv6-net",
        })
    }

    pub fn applies_to(&self, kind: BaseKind) -> bool {
        match self {
            Self::I8 | Self::I16 | Self::I32 => kind == BaseKind::Integer,
            Self::Unsigned(_) => matches!(kind, BaseKind::Integer | BaseKind::Binary),
            Self::Eui | Self::Ipv4Addr | Self::Ipv6Addr | Self::Hex => kind == BaseKind::Binary,
            Self::Ipv4Net | Self::Ipv6Net => kind == BaseKind::Array,
            _ => kind == BaseKind::String,
        }
    }

    pub fn check_str(&self, s: &str) -> bool {
        match self {
            Self::DateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            Self::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() && s.len() == 10,
            Self::Time => DateTime::parse_from_rfc3339(&format!("1970-01-01T{s}")).is_ok(),
            Self::Email => is_email(s, false),
            Self::IdnEmail => is_email(s, true),
            Self::Hostname => is_hostname(s, false),
            Self::IdnHostname => is_hostname(s, true),
            Self::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Self::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            Self::Uri => is_uri(s, false),
            Self::Iri => is_uri(s, true),
            Self::UriReference => is_uri(s, false) || is_relative_ref(s, false),
            Self::IriReference => is_uri(s, true) || is_relative_ref(s, true),
            Self::UriTemplate => is_uri_template(s),
            Self::JsonPointer => is_json_pointer(s),
            Self::RelativeJsonPointer => is_relative_json_pointer(s),
            Self::Regex => Regex::new(s).is_ok(),
            _ => true,
        }
    }

    pub fn check_int(&self, n: i64) -> bool {
        match self {
            Self::I8 => i8::try_from(n).is_ok(),
            Self::I16 => i16::try_from(n).is_ok(),
            Self::I32 => i32::try_from(n).is_ok(),
            Self::Unsigned(bits) => n >= 0 && (*bits >= 63 || n < (1i64 << bits)),
            _ => true,
        }
    }

    pub fn check_bytes(&self, b: &[u8]) -> bool {
        match self {
            Self::Eui => b.len() == 6 || b.len() == 8,
            Self::Ipv4Addr => b.len() == 4,
            Self::Ipv6Addr => b.len() == 16,
            Self::Unsigned(bits) => b.len() == (*bits as usize).div_ceil(8),
            _ => true,
        }
    }

    /// Address width in octets of the network formats.
    pub(crate) fn net_width(&self) -> Option<(usize, i64)> {
        match self {
            Self::Ipv4Net => Some((4, 32)),
            Self::Ipv6Net => Some((16, 128)),
            _ => None,
        }
    }
}

/// Text form of Binary values in the JSON profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryText {
    #[default]
    Base64Url,
    Hex,
    Ipv4,
    Ipv6,
    Eui,
}

impl BinaryText {
    pub fn for_format(format: Option<&str>) -> Self {
        match format.and_then(Format::parse) {
            Some(Format::Hex) => Self::Hex,
            Some(Format::Ipv4Addr) => Self::Ipv4,
            Some(Format::Ipv6Addr) => Self::Ipv6,
            Some(Format::Eui) => Self::Eui,
            _ => Self::Base64Url,
        }
    }

    /// `None` when the bytes have no text form in this representation.
    pub fn encode(&self, b: &[u8]) -> Option<String> {
        match self {
            Self::Base64Url => Some(URL_SAFE_NO_PAD.encode(b)),
            Self::Hex => Some(b.iter().map(|x| format!("{x:02x}")).collect()),
            Self::Ipv4 => <[u8; 4]>::try_from(b).ok().map(|a| Ipv4Addr::from(a).to_string()),
            Self::Ipv6 => <[u8; 16]>::try_from(b).ok().map(|a| Ipv6Addr::from(a).to_string()),
            Self::Eui => (b.len() == 6 || b.len() == 8).then(|| {
                b.iter()
                    .map(|x| format!("{x:02x}"))
                    .collect::<Vec<_>>()
                    .join(":")
            }),
        }
    }

    pub fn decode(&self, s: &str) -> Option<Vec<u8>> {
        match self {
            Self::Base64Url => URL_SAFE_NO_PAD.decode(s.trim_end_matches('=')).ok(),
            Self::Hex => decode_hex(s),
            Self::Ipv4 => s.parse::<Ipv4Addr>().ok().map(|a| a.octets().to_vec()),
            Self::Ipv6 => s.parse::<Ipv6Addr>().ok().map(|a| a.octets().to_vec()),
            Self::Eui => {
                let hex: String = s.split([':', '-']).collect();
                let bytes = decode_hex(&hex)?;
                (bytes.len() == 6 || bytes.len() == 8).then_some(bytes)
            }
        }
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str, s: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}

fn is_email(s: &str, international: bool) -> bool {
    static ASCII: OnceLock<Option<Regex>> = OnceLock::new();
    static INTL: OnceLock<Option<Regex>> = OnceLock::new();
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    let local_ok = if international {
        cached(&INTL, r"^[^\s@]+$", local)
    } else {
        cached(
            &ASCII,
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$",
            local,
        )
    };
    local_ok && is_hostname(domain, international)
}

fn is_hostname(s: &str, international: bool) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| {
                c.is_ascii_alphanumeric() || c == '-' || (international && !c.is_ascii())
            })
    })
}

fn is_uri(s: &str, international: bool) -> bool {
    static URI: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&URI, r"^[A-Za-z][A-Za-z0-9+.-]*:[^\s]*$", s) && (international || s.is_ascii())
}

fn is_relative_ref(s: &str, international: bool) -> bool {
    !s.chars().any(char::is_whitespace) && (international || s.is_ascii())
}

fn is_uri_template(s: &str) -> bool {
    let mut open = false;
    for c in s.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            _ => {}
        }
    }
    !open
}

fn is_json_pointer(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if !s.starts_with('/') {
        return false;
    }
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return false;
        }
    }
    true
}

fn is_relative_json_pointer(s: &str) -> bool {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || (digits > 1 && s.starts_with('0')) {
        return false;
    }
    let rest = &s[digits..];
    rest == "#" || is_json_pointer(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_name() {
        assert_eq!(Format::parse("date-time"), Some(Format::DateTime));
        assert_eq!(Format::parse("u12"), Some(Format::Unsigned(12)));
        assert_eq!(Format::parse("u"), None);
        assert_eq!(Format::parse("u0"), None);
        assert_eq!(Format::parse("nope"), None);
        assert_eq!(Format::Unsigned(12).as_str(), "u12");
    }

    #[test]
    fn applicability() {
        assert!(Format::DateTime.applies_to(BaseKind::String));
        assert!(!Format::DateTime.applies_to(BaseKind::Integer));
        assert!(Format::Unsigned(8).applies_to(BaseKind::Binary));
        assert!(Format::Ipv4Net.applies_to(BaseKind::Array));
        assert!(!Format::Hex.applies_to(BaseKind::String));
    }

    #[test]
    fn string_formats() {
        assert!(Format::DateTime.check_str("2024-02-29T12:00:00Z"));
        assert!(!Format::DateTime.check_str("2024-02-30T12:00:00Z"));
        assert!(Format::Date.check_str("2023-12-31"));
        assert!(!Format::Date.check_str("2023-13-01"));
        assert!(Format::Time.check_str("23:59:01.5+02:00"));
        assert!(!Format::Time.check_str("25:00:00Z"));
        assert!(Format::Email.check_str("a.b@example.com"));
        assert!(!Format::Email.check_str("a b@example.com"));
        assert!(Format::Hostname.check_str("www.example.com."));
        assert!(!Format::Hostname.check_str("-bad.example"));
        assert!(Format::IdnHostname.check_str("bücher.example"));
        assert!(Format::Ipv4.check_str("10.0.0.1"));
        assert!(!Format::Ipv4.check_str("10.0.0.256"));
        assert!(Format::Ipv6.check_str("::1"));
        assert!(Format::Uri.check_str("https://example.com/a?b"));
        assert!(!Format::Uri.check_str("/relative"));
        assert!(Format::UriReference.check_str("/relative"));
        assert!(Format::UriTemplate.check_str("/users/{id}"));
        assert!(!Format::UriTemplate.check_str("/users/{id"));
        assert!(Format::JsonPointer.check_str("/a~1b/0"));
        assert!(!Format::JsonPointer.check_str("/a~2"));
        assert!(Format::RelativeJsonPointer.check_str("1/a"));
        assert!(Format::RelativeJsonPointer.check_str("0#"));
        assert!(!Format::RelativeJsonPointer.check_str("01"));
        assert!(Format::Regex.check_str("^a+$"));
        assert!(!Format::Regex.check_str("(a"));
    }

    #[test]
    fn integer_and_binary_formats() {
        assert!(Format::I8.check_int(-128));
        assert!(!Format::I8.check_int(128));
        assert!(Format::Unsigned(4).check_int(15));
        assert!(!Format::Unsigned(4).check_int(16));
        assert!(!Format::Unsigned(4).check_int(-1));
        assert!(Format::Unsigned(64).check_int(i64::MAX));
        assert!(Format::Eui.check_bytes(&[0; 6]));
        assert!(!Format::Ipv4Addr.check_bytes(&[0; 5]));
        assert!(Format::Unsigned(12).check_bytes(&[0, 0]));
    }

    #[test]
    fn binary_text_forms() {
        let addr = [192, 168, 0, 1];
        assert_eq!(BinaryText::Ipv4.encode(&addr).as_deref(), Some("192.168.0.1"));
        assert_eq!(BinaryText::Ipv4.decode("192.168.0.1"), Some(addr.to_vec()));
        assert_eq!(BinaryText::Ipv4.encode(&[1, 2]), None);
        assert_eq!(BinaryText::Hex.encode(&[0xab, 0x01]).as_deref(), Some("ab01"));
        assert_eq!(BinaryText::Hex.decode("AB01"), Some(vec![0xab, 0x01]));
        assert_eq!(BinaryText::Hex.decode("abc"), None);
        let mac = [0, 0x1b, 0x63, 0x84, 0x45, 0xe6];
        assert_eq!(
            BinaryText::Eui.encode(&mac).as_deref(),
            Some("00:1b:63:84:45:e6")
        );
        assert_eq!(BinaryText::Eui.decode("00-1B-63-84-45-E6"), Some(mac.to_vec()));
        assert_eq!(BinaryText::Base64Url.decode("-_8"), Some(vec![0xfb, 0xff]));
        assert_eq!(BinaryText::for_format(Some("x")), BinaryText::Hex);
        assert_eq!(BinaryText::for_format(None), BinaryText::Base64Url);
    }

    #[test]
    fn eui_text_needs_six_or_eight_octets() {
        assert!(BinaryText::Eui.encode(&[0; 8]).is_some());
        for len in [0, 5, 7, 16] {
            let bytes = vec![0xaa; len];
            assert_eq!(BinaryText::Eui.encode(&bytes), None, "{len}");
        }
        assert_eq!(BinaryText::Eui.decode("aa:aa:aa:aa:aa"), None);
    }
}
