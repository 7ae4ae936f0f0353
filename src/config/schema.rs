use std::path::Path;
use toml::{Table, Value};

/// Top-level sections of `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    YouTube,
    Aws,
    MTurk,
    Survey,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::YouTube, Section::Aws, Section::MTurk, Section::Survey];

    /// Table name as it appears in the config file.
    pub fn name(self) -> &'static str {
        match self {
            Section::YouTube => "YOUTUBE",
            Section::Aws => "AWS",
            Section::MTurk => "MTURK",
            Section::Survey => "SURVEY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// Missing key or empty string.
    Unset,
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// Text naming a file that must exist.
    File,
    Integer,
    Float,
}

impl ValueKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ValueKind::Text | ValueKind::File => value.is_str(),
            ValueKind::Integer => value.is_integer(),
            ValueKind::Float => value.is_float() || value.is_integer(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::File => "file path",
            ValueKind::Integer => "integer",
            ValueKind::Float => "number",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub section: Section,
    pub option: &'static str,
    pub default: DefaultValue,
    /// Whether leaving the option at its default counts as filled out.
    pub default_ok: bool,
    pub kind: ValueKind,
}

const fn opt(
    section: Section,
    option: &'static str,
    default: DefaultValue,
    default_ok: bool,
    kind: ValueKind,
) -> OptionSpec {
    OptionSpec { section, option, default, default_ok, kind }
}

pub static SCHEMA: &[OptionSpec] = &[
    opt(Section::YouTube, "OAUTH_CLIENT_SECRETS_FILE", DefaultValue::Unset, false, ValueKind::File),
    opt(Section::Aws, "ACCESS_KEY_ID", DefaultValue::Unset, false, ValueKind::Text),
    opt(Section::Aws, "SECRET_ACCESS_KEY", DefaultValue::Unset, false, ValueKind::Text),
    opt(Section::MTurk, "TITLE", DefaultValue::Unset, false, ValueKind::Text),
    opt(Section::MTurk, "DESCRIPTION", DefaultValue::Unset, false, ValueKind::Text),
    opt(Section::MTurk, "KEYWORDS", DefaultValue::Unset, false, ValueKind::Text),
    opt(Section::MTurk, "REWARD", DefaultValue::Float(0.0), false, ValueKind::Float),
    opt(Section::MTurk, "MAX_ASSIGNMENTS", DefaultValue::Integer(100), true, ValueKind::Integer),
    opt(Section::MTurk, "LIFETIME_SECONDS", DefaultValue::Integer(604_800), true, ValueKind::Integer),
    opt(Section::MTurk, "ASSIGNMENT_DURATION_SECONDS", DefaultValue::Integer(3600), true, ValueKind::Integer),
    opt(Section::MTurk, "AUTO_APPROVAL_SECONDS", DefaultValue::Integer(259_200), true, ValueKind::Integer),
    opt(Section::Survey, "SURVEY_VIDEOS", DefaultValue::Integer(5), true, ValueKind::Integer),
    opt(Section::Survey, "SURVEY_PLAYLIST", DefaultValue::Unset, false, ValueKind::Text),
    opt(Section::Survey, "QUALIFICATION_VIDEOS", DefaultValue::Integer(5), true, ValueKind::Integer),
    opt(Section::Survey, "QUALIFICATION_PLAYLIST", DefaultValue::Unset, false, ValueKind::Text),
];

pub fn lookup(section: &str, option: &str) -> Option<&'static OptionSpec> {
    SCHEMA
        .iter()
        .find(|spec| spec.section.name() == section && spec.option == option)
}

pub fn options_in(section: Section) -> impl Iterator<Item = &'static OptionSpec> {
    SCHEMA.iter().filter(move |spec| spec.section == section)
}

/// Value of `section.option` in a raw config table, if present.
pub fn value_of<'a>(table: &'a Table, spec: &OptionSpec) -> Option<&'a Value> {
    table
        .get(spec.section.name())
        .and_then(Value::as_table)
        .and_then(|section| section.get(spec.option))
}

/// Whether `value` equals the option's schema default. Integers and floats
/// compare numerically.
pub fn is_default(spec: &OptionSpec, value: Option<&Value>) -> bool {
    match (spec.default, value) {
        (DefaultValue::Unset, None) => true,
        (DefaultValue::Unset, Some(Value::String(s))) => s.is_empty(),
        (DefaultValue::Unset, Some(_)) => false,
        (_, None) => true,
        (DefaultValue::Integer(d), Some(Value::Integer(v))) => *v == d,
        (DefaultValue::Integer(d), Some(Value::Float(v))) => *v == d as f64,
        (DefaultValue::Float(d), Some(Value::Float(v))) => *v == d,
        (DefaultValue::Float(d), Some(Value::Integer(v))) => *v as f64 == d,
        (_, Some(_)) => false,
    }
}

/// An option is complete when it has been changed from its default, or when
/// its default is an acceptable final value.
pub fn option_complete(spec: &OptionSpec, value: Option<&Value>) -> bool {
    !is_default(spec, value) || spec.default_ok
}

pub fn section_complete(table: &Table, section: Section) -> bool {
    options_in(section).all(|spec| option_complete(spec, value_of(table, spec)))
}

pub fn config_complete(table: &Table) -> bool {
    Section::ALL.into_iter().all(|section| section_complete(table, section))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStatus {
    /// Changed from the default.
    Complete,
    /// Left at a default that is acceptable.
    Default,
    Incomplete,
}

impl OptionStatus {
    pub fn is_complete(self) -> bool {
        !matches!(self, OptionStatus::Incomplete)
    }
}

/// Problems that don't change completeness but are worth showing the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionProblem {
    NotAFile,
    WrongType { expected: &'static str },
}

pub fn option_status(spec: &OptionSpec, value: Option<&Value>) -> OptionStatus {
    if !is_default(spec, value) {
        OptionStatus::Complete
    } else if spec.default_ok {
        OptionStatus::Default
    } else {
        OptionStatus::Incomplete
    }
}

pub fn option_problem(spec: &OptionSpec, value: Option<&Value>) -> Option<OptionProblem> {
    let value = value?;
    if !spec.kind.accepts(value) {
        return Some(OptionProblem::WrongType { expected: spec.kind.label() });
    }
    if spec.kind == ValueKind::File {
        let path = value.as_str().unwrap_or_default();
        if !Path::new(path).is_file() {
            return Some(OptionProblem::NotAFile);
        }
    }
    None
}

/// Keys present in the table that the schema doesn't know about, as
/// `SECTION` or `SECTION.OPTION`.
pub fn unknown_keys(table: &Table) -> Vec<String> {
    let mut unknown = Vec::new();
    for (section, body) in table {
        if Section::from_name(section).is_none() {
            unknown.push(section.clone());
            continue;
        }
        if let Some(options) = body.as_table() {
            for option in options.keys() {
                if lookup(section, option).is_none() {
                    unknown.push(format!("{}.{}", section, option));
                }
            }
        }
    }
    unknown
}

/// A config file with every option at its default, written when none exists.
pub fn template() -> String {
    let mut out = String::new();
    for section in Section::ALL {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", section.name()));
        for spec in options_in(section) {
            let value = match spec.default {
                DefaultValue::Unset => "\"\"".to_string(),
                DefaultValue::Integer(v) => v.to_string(),
                DefaultValue::Float(v) => format!("{:.1}", v),
            };
            out.push_str(&format!("{} = {}\n", spec.option, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> Table {
        src.parse().unwrap()
    }

    #[test]
    fn test_required_option_at_default_is_incomplete() {
        let spec = lookup("MTURK", "REWARD").unwrap();
        assert!(!option_complete(spec, Some(&Value::Float(0.0))));
        assert!(!option_complete(spec, None));
        assert!(option_complete(spec, Some(&Value::Float(0.25))));
    }

    #[test]
    fn test_acceptable_default_is_complete() {
        let spec = lookup("MTURK", "MAX_ASSIGNMENTS").unwrap();
        assert!(option_complete(spec, Some(&Value::Integer(100))));
        assert_eq!(option_status(spec, Some(&Value::Integer(100))), OptionStatus::Default);
        assert_eq!(option_status(spec, Some(&Value::Integer(9))), OptionStatus::Complete);
    }

    #[test]
    fn test_unset_matches_missing_and_empty() {
        let spec = lookup("MTURK", "TITLE").unwrap();
        assert!(is_default(spec, None));
        assert!(is_default(spec, Some(&Value::String(String::new()))));
        assert!(!is_default(spec, Some(&Value::String("Rate surgery videos".into()))));
    }

    #[test]
    fn test_numeric_defaults_compare_across_types() {
        let reward = lookup("MTURK", "REWARD").unwrap();
        assert!(is_default(reward, Some(&Value::Integer(0))));
        let videos = lookup("SURVEY", "SURVEY_VIDEOS").unwrap();
        assert!(is_default(videos, Some(&Value::Float(5.0))));
    }

    #[test]
    fn test_section_completeness() {
        let t = table(
            r#"
            [AWS]
            ACCESS_KEY_ID = "AKIA"
            SECRET_ACCESS_KEY = ""
            "#,
        );
        assert!(!section_complete(&t, Section::Aws));
        assert!(!config_complete(&t));

        let t = table(
            r#"
            [AWS]
            ACCESS_KEY_ID = "AKIA"
            SECRET_ACCESS_KEY = "secret"
            "#,
        );
        assert!(section_complete(&t, Section::Aws));
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let spec = lookup("MTURK", "MAX_ASSIGNMENTS").unwrap();
        let problem = option_problem(spec, Some(&Value::String("lots".into())));
        assert_eq!(problem, Some(OptionProblem::WrongType { expected: "integer" }));
    }

    #[test]
    fn test_missing_secrets_file_is_reported() {
        let spec = lookup("YOUTUBE", "OAUTH_CLIENT_SECRETS_FILE").unwrap();
        let problem = option_problem(spec, Some(&Value::String("/no/such/file.json".into())));
        assert_eq!(problem, Some(OptionProblem::NotAFile));
    }

    #[test]
    fn test_unknown_keys() {
        let t = table(
            r#"
            [MTURK]
            TITLE = "x"
            COLOUR = "blue"
            [EXTRA]
            A = 1
            "#,
        );
        let mut unknown = unknown_keys(&t);
        unknown.sort();
        assert_eq!(unknown, vec!["EXTRA".to_string(), "MTURK.COLOUR".to_string()]);
    }

    #[test]
    fn test_template_parses_and_is_incomplete() {
        let t = table(&template());
        assert!(unknown_keys(&t).is_empty());
        assert!(!config_complete(&t));
        assert!(!section_complete(&t, Section::YouTube));
        for spec in SCHEMA {
            assert!(is_default(spec, value_of(&t, spec)), "{} not at default", spec.option);
        }
    }
}
