use super::schema::{self, OptionProblem, OptionStatus, Section};
use crossterm::style::Stylize;
use std::fmt;
use toml::{Table, Value};

#[derive(Debug, Clone)]
pub struct OptionReport {
    pub option: &'static str,
    pub value: Option<String>,
    pub status: OptionStatus,
    pub problem: Option<OptionProblem>,
}

#[derive(Debug, Clone)]
pub struct SectionReport {
    pub section: Section,
    pub options: Vec<OptionReport>,
}

impl SectionReport {
    pub fn is_complete(&self) -> bool {
        self.options.iter().all(|o| o.status.is_complete())
    }
}

/// Per-option status of a config table, in schema order.
#[derive(Debug, Clone)]
pub struct ConfigReport {
    pub sections: Vec<SectionReport>,
    pub unknown: Vec<String>,
}

impl ConfigReport {
    pub fn evaluate(table: &Table) -> Self {
        let sections = Section::ALL
            .into_iter()
            .map(|section| SectionReport {
                section,
                options: schema::options_in(section)
                    .map(|spec| {
                        let value = schema::value_of(table, spec);
                        OptionReport {
                            option: spec.option,
                            value: value.map(display_value),
                            status: schema::option_status(spec, value),
                            problem: schema::option_problem(spec, value),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            sections,
            unknown: schema::unknown_keys(table),
        }
    }

    pub fn section(&self, section: Section) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.section == section)
    }

    pub fn is_complete(&self) -> bool {
        self.sections.iter().all(SectionReport::is_complete)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "{}:", section.section.name())?;
            for opt in &section.options {
                let value = opt.value.as_deref().unwrap_or("");
                let status = match (&opt.problem, opt.status) {
                    (Some(OptionProblem::NotAFile), _) => {
                        format!("[{}]", "NOT A VALID PATH".red())
                    }
                    (Some(OptionProblem::WrongType { expected }), _) => {
                        format!("[{}] - {}", format!("EXPECTED {}", expected.to_uppercase()).red(), value)
                    }
                    (None, OptionStatus::Incomplete) => format!("[{}]", "INCOMPLETE".red()),
                    (None, OptionStatus::Default) => format!("({}) - {}", "default".yellow(), value),
                    (None, OptionStatus::Complete) => format!("({}) - {}", "complete".green(), value),
                };
                writeln!(f, "  {}: {}", opt.option, status)?;
            }
        }

        for key in &self.unknown {
            writeln!(f, "{} unknown option {} is ignored", "warning:".yellow(), key)?;
        }

        if !self.is_complete() {
            write!(f, "\nINCOMPLETE options in the config file, please fill out this file")?;
        }
        Ok(())
    }
}
