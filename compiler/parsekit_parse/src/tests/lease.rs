#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{Error, PResult, Parser};
use chrono::{NaiveDate, NaiveDateTime};
use parsekit_lexer::test_helpers::ChunkedReader;
use parsekit_lexer::{
    lexeme_str, FromLexeme, Lexer, Scanner, Token, TokenKind, TransitionTable, ValueError,
};
use pretty_assertions::assert_eq;
use std::net::Ipv4Addr;
use std::path::PathBuf;

const NUMBER: TokenKind = TokenKind::class(0);
const IP: TokenKind = TokenKind::class(1);
const DATE_TIME: TokenKind = TokenKind::class(2);
const IDENT: TokenKind = TokenKind::class(3);
const STRING: TokenKind = TokenKind::class(4);
const OPTION: TokenKind = TokenKind::class(5);

/// Numbers, IPv4 addresses and date-times share their leading digits.
const NUMERALS: &str = r"
numeral  \s   final
numeral  ;    final
numeral  .    ip
numeral  /    date
numeral  0-9  numeral

date     \s   time
date     /    date
date     0-9  date

time     :    time
time     ;    final
time     0-9  time

ip       :    ip
ip       \s   final
ip       ;    final
ip       .    ip
ip       0-9  ip
";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Lease {
    interface: String,
    fixed_address: Option<Ipv4Addr>,
    expire: Option<NaiveDateTime>,
}

/// Expiration stamp, written `2023/11/03 11:27:26`.
struct Expiry(NaiveDateTime);

impl FromLexeme for Expiry {
    fn from_lexeme(lexeme: &[u8]) -> Result<Self, ValueError> {
        NaiveDateTime::parse_from_str(lexeme_str(lexeme)?, "%Y/%m/%d %H:%M:%S")
            .map(Expiry)
            .map_err(|e| ValueError::invalid("date and time", lexeme, e))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Number(i64),
    Text(String),
    Addr(Ipv4Addr),
    Time(NaiveDateTime),
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Ipv4Addr> for Value {
    fn from(a: Ipv4Addr) -> Self {
        Value::Addr(a)
    }
}

impl From<Expiry> for Value {
    fn from(e: Expiry) -> Self {
        Value::Time(e.0)
    }
}

struct LeaseLexer {
    numerals: TransitionTable,
    /// Lex `option` as [`OPTION`] rather than a plain identifier.
    option_keyword: bool,
}

impl LeaseLexer {
    fn new() -> Self {
        LeaseLexer {
            numerals: TransitionTable::from_spec(NUMERALS).expect("numeral table compiles"),
            option_keyword: false,
        }
    }

    fn with_option_keyword() -> Self {
        LeaseLexer {
            option_keyword: true,
            ..LeaseLexer::new()
        }
    }

    fn numeral(&self, sc: &mut Scanner) -> Token<Value> {
        let (state, n) = sc.scan_with_table(&self.numerals);
        sc.advance_by(n);
        match self.numerals.state_name(state) {
            Some("numeral") => Token::auto::<i64>(NUMBER, sc),
            Some("ip") => Token::auto::<Ipv4Addr>(IP, sc),
            Some("time") => Token::auto::<Expiry>(DATE_TIME, sc),
            _ => Token::error(ValueError::invalid(
                "numeral",
                sc.cursor(),
                "incomplete literal",
            )),
        }
    }
}

impl Lexer<Value> for LeaseLexer {
    fn lex(&mut self, sc: &mut Scanner) -> Token<Value> {
        let Some(c) = sc.peek() else {
            return Token::eof();
        };
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                sc.advance();
                Token::ignore()
            }
            '{' | '}' | ';' => {
                sc.advance();
                Token::new(c)
            }
            '"' => {
                let n = sc.lex_string();
                sc.advance_by(n);
                Token::auto::<String>(STRING, sc)
            }
            '0'..='9' => self.numeral(sc),
            _ => match sc.lex_ident() {
                0 => {
                    sc.advance();
                    Token::error(ValueError::invalid("character", sc.cursor(), "unexpected"))
                }
                n => {
                    // Interface names such as `eth1` carry trailing digits.
                    sc.advance_by(n);
                    while sc
                        .peek()
                        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                    {
                        sc.advance();
                    }
                    if self.option_keyword && sc.cursor() == b"option" {
                        Token::new(OPTION)
                    } else {
                        Token::new(IDENT)
                    }
                }
            },
        }
    }
}

type LeaseParser = Parser<Vec<Lease>, Value>;

fn lease(p: &mut LeaseParser) -> PResult {
    p.expect(IDENT, "lease")?;
    p.expect('{', "opening bracket")?;
    let mut lease = Lease::default();
    while p.more() {
        if p.matches(&[TokenKind::from('}')])? {
            p.value.push(lease);
            return Ok(());
        }
        p.expect(IDENT, "option")?;
        let option = p.lit().to_owned();
        match option.as_str() {
            "interface" => {
                p.expect(STRING, "interface")?;
                if let Some(Value::Text(name)) = p.token_value() {
                    lease.interface = name.clone();
                }
            }
            "fixed-address" => {
                p.expect(IP, "IP address")?;
                if let Some(&Value::Addr(addr)) = p.token_value() {
                    lease.fixed_address = Some(addr);
                }
            }
            "expire" => {
                p.expect(NUMBER, "number")?;
                p.expect(DATE_TIME, "date and time of expiration")?;
                if let Some(&Value::Time(at)) = p.token_value() {
                    lease.expire = Some(at);
                }
            }
            _ => {
                while !p.matches(&[TokenKind::from(';')])? {
                    if !p.more() {
                        return Err(p.errf(format_args!("unterminated option {option:?}")));
                    }
                    p.skip()?;
                }
                continue;
            }
        }
        p.expect(';', ";")?;
    }
    Err(p.errf("missing closing bracket"))
}

fn leases(p: &mut LeaseParser) {
    while p.more() {
        if p.synchronize(lease).is_err() {
            break;
        }
    }
}

/// `lease { option <name> <value>; ... }` records, with `option` as a
/// keyword.
fn option_lease(p: &mut LeaseParser) -> PResult {
    p.expect(IDENT, "lease")?;
    p.expect('{', "opening bracket")?;
    let mut lease = Lease::default();
    while !p.matches(&[TokenKind::from('}')])? {
        if !p.more() {
            return Err(p.errf("missing closing bracket"));
        }
        p.expect(OPTION, "the option keyword")?;
        p.expect(IDENT, "an option name")?;
        let name = p.lit().to_owned();
        match name.as_str() {
            "interface" => {
                p.expect(STRING, "interface")?;
                if let Some(Value::Text(text)) = p.token_value() {
                    lease.interface = text.clone();
                }
            }
            "fixed-address" => {
                p.expect(IP, "IP address")?;
                if let Some(&Value::Addr(addr)) = p.token_value() {
                    lease.fixed_address = Some(addr);
                }
            }
            "expire" => {
                p.expect(DATE_TIME, "date and time of expiration")?;
                if let Some(&Value::Time(at)) = p.token_value() {
                    lease.expire = Some(at);
                }
            }
            _ => return Err(p.errf(format_args!("unknown option {name:?}"))),
        }
        p.expect(';', ";")?;
    }
    p.value.push(lease);
    Ok(())
}

fn parse_option_leases(text: &str) -> (Vec<Lease>, Vec<String>) {
    let mut p = Parser::builder()
        .read_string(text)
        .lexer(LeaseLexer::with_option_keyword())
        .synchronize_at(["lease"])
        .build::<Vec<Lease>>()
        .expect("valid configuration");
    while p.more() {
        if p.synchronize(option_lease).is_err() {
            break;
        }
    }
    let (value, result) = p.finish();
    let errors = match result {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };
    (value, errors)
}

fn builder() -> crate::ParserBuilder<Value> {
    Parser::builder().lexer(LeaseLexer::new()).synchronize_at(["lease"])
}

fn parse(mut p: LeaseParser) -> (Vec<Lease>, Vec<String>) {
    leases(&mut p);
    let (value, result) = p.finish();
    let errors = match result {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };
    (value, errors)
}

fn parse_text(text: &str) -> (Vec<Lease>, Vec<String>) {
    parse(builder().read_string(text).build().expect("valid configuration"))
}

fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|d| d.and_hms_opt(time.0, time.1, time.2))
        .expect("valid timestamp")
}

fn eth(n: u8) -> Lease {
    Lease {
        interface: format!("eth{n}"),
        ..Lease::default()
    }
}

const LEASE: &str = r#"lease {
  interface "eth0";
  fixed-address 10.67.21.85;
  option subnet-mask 255.255.255.0;
  option domain-name "corp.example";
  expire 5 2023/11/03 11:27:26;
}
"#;

// === Well-Formed Input ===

#[test]
fn parses_lease() {
    let (leases, errors) = parse_text(LEASE);
    assert_eq!(errors, Vec::<String>::new());
    assert_eq!(
        leases,
        vec![Lease {
            interface: "eth0".to_owned(),
            fixed_address: Some(Ipv4Addr::new(10, 67, 21, 85)),
            expire: Some(at((2023, 11, 3), (11, 27, 26))),
        }]
    );
}

#[test]
fn streamed_input_parses_the_same() {
    let text = LEASE.repeat(200);
    let whole = parse_text(&text);
    let streamed = parse(
        builder()
            .read_from(ChunkedReader::new(text, 5))
            .build()
            .expect("valid configuration"),
    );
    assert_eq!(whole, streamed);
    assert_eq!(streamed.0.len(), 200);
}

#[test]
fn parsing_is_deterministic() {
    let text = format!("{LEASE}lease {{ interface eth9; }}\n{LEASE}");
    let first = parse_text(&text);
    let second = parse_text(&text);
    assert_eq!(first, second);
    assert_eq!(first.0.len(), 2);
    assert_eq!(first.1.len(), 1);
}

#[test]
fn single_line_option_lease() {
    let (leases, errors) = parse_option_leases(
        r#"lease { option interface "eth0"; option fixed-address 10.67.21.85; option expire 2023/11/03 11:27:26; }"#,
    );
    assert_eq!(errors, Vec::<String>::new());
    assert_eq!(
        leases,
        vec![Lease {
            interface: "eth0".to_owned(),
            fixed_address: Some(Ipv4Addr::new(10, 67, 21, 85)),
            expire: Some(at((2023, 11, 3), (11, 27, 26))),
        }]
    );
}

// === Recovery ===

#[test]
fn misspelled_option_keyword_names_its_line() {
    let (leases, errors) = parse_option_leases(
        r#"lease {
  option interface "eth0";
  opton fixed-address 10.67.21.85;
  option expire 2023/11/03 11:27:26;
}
lease { option interface "eth1"; }
"#,
    );
    assert_eq!(
        errors,
        [r#"at <input>:3:3: expected the option keyword, got "opton" instead"#]
    );
    assert_eq!(leases, vec![eth(1)]);
}


const MALFORMED: &str = r#"lease {
  interface "eth0";
  fixed-address 10.67.21.85;
}
lease {
  interface eth1;
}
lease {
  fixed-address 10.67.21.86;
  expire 5 2023/13/03 11:27:26;
}
lease {
  interface "eth3";
}
lease
  interface "eth4";
}
lease {
  interface "eth5";
}
"#;

#[test]
fn every_malformed_record_is_reported() {
    let (leases, errors) = parse_text(MALFORMED);
    assert_eq!(
        leases,
        vec![
            Lease {
                fixed_address: Some(Ipv4Addr::new(10, 67, 21, 85)),
                ..eth(0)
            },
            eth(3),
            eth(5),
        ]
    );
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0], r#"at <input>:6:13: expected interface, got "eth1" instead"#);
    assert!(
        errors[1].starts_with(
            r#"at <input>:10:12: expected date and time of expiration, got "2023/13/03 11:27:26" instead: invalid date and time"#
        ),
        "{}",
        errors[1]
    );
    assert_eq!(
        errors[2],
        r#"at <input>:16:3: expected opening bracket, got "interface" instead"#
    );
}

#[test]
fn errors_are_joined_in_order() {
    let mut p = builder().read_string(MALFORMED).build().expect("valid configuration");
    leases(&mut p);
    let (_, result) = p.finish();
    let errors = result.expect_err("malformed input");
    let joined = errors.to_string();
    assert_eq!(joined.lines().count(), 3);
    assert!(joined.starts_with("at <input>:6:13: "));
}

#[test]
fn truncated_record_reports_missing_bracket() {
    let (leases, errors) = parse_text("lease {\n  interface \"eth0\";\n");
    assert!(leases.is_empty());
    assert_eq!(errors, [r#"at <input>:3:1: missing closing bracket"#]);
}

// === Files ===

/// Fresh scratch file path for this test process.
fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("parsekit-{}-{name}", std::process::id()))
}

#[test]
fn files_form_one_stream() {
    let first = scratch("first.leases");
    let second = scratch("second.leases");
    std::fs::write(&first, LEASE).expect("write first file");
    std::fs::write(&second, "lease {\n  interface eth1;\n}\n").expect("write second file");

    let (leases, errors) = parse(
        builder()
            .read_files([&first, &second])
            .build()
            .expect("valid configuration"),
    );

    assert_eq!(leases.len(), 1);
    assert_eq!(
        errors,
        [format!(
            r#"at {}:2:13: expected interface, got "eth1" instead"#,
            second.display()
        )]
    );
    let _ = std::fs::remove_file(first);
    let _ = std::fs::remove_file(second);
}

#[test]
fn missing_file_is_a_source_error() {
    let mut p = builder()
        .read_file(scratch("does-not-exist.leases"))
        .build::<Vec<Lease>>()
        .expect("valid configuration");
    assert!(!p.more());
    let (leases, result) = p.finish();
    assert!(leases.is_empty());
    let errors = result.expect_err("missing file");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.iter().next(), Some(Error::Source(_))));
    assert!(errors.to_string().starts_with("cannot read input: "));
}
