//! Report builder - appends sections in order
//!
//! Each primitive appends exactly one section, except `table` and `list`,
//! which append nothing for empty input, and `report`, which inspects the
//! shape of a value and emits whatever fits.

use serde_json::Value;

use crate::resource::scalar_string;

use super::section::{MessageLevel, Section};

/// Ordered section collector for one analysis run.
#[derive(Debug, Default)]
pub struct Report {
    sections: Vec<Section>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a heading
    pub fn heading(&mut self, text: impl Into<String>, level: u8) {
        self.sections.push(Section::Heading {
            text: text.into(),
            level,
        });
    }

    /// Append a text block
    pub fn text(&mut self, content: impl Into<String>) {
        self.sections.push(Section::Text {
            content: content.into(),
        });
    }

    /// Append a leveled message
    pub fn message(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.sections.push(Section::Message {
            level,
            text: text.into(),
        });
    }

    /// Append an info message
    pub fn info(&mut self, text: impl Into<String>) {
        self.message(MessageLevel::Info, text);
    }

    /// Append a warning message
    pub fn warning(&mut self, text: impl Into<String>) {
        self.message(MessageLevel::Warning, text);
    }

    /// Append an error message
    pub fn error(&mut self, text: impl Into<String>) {
        self.message(MessageLevel::Error, text);
    }

    /// Append a table; appends nothing when `rows` is empty
    pub fn table(&mut self, headers: Vec<String>, rows: Vec<Vec<String>>) {
        if rows.is_empty() {
            return;
        }
        self.sections.push(Section::Table { headers, rows });
    }

    /// Append a list; appends nothing when `items` is empty
    pub fn list(&mut self, items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        self.sections.push(Section::List { items });
    }

    /// Append a code block
    pub fn code(&mut self, content: impl Into<String>, language: Option<String>) {
        self.sections.push(Section::Code {
            content: content.into(),
            language,
        });
    }

    /// Append whatever fits the shape of `value`, optionally preceded by
    /// a level-2 heading from `title`:
    ///
    /// - a mapping becomes a list of `"key: value"` strings
    /// - a sequence of mappings becomes a table with the first element's
    ///   keys as headers
    /// - a sequence of scalars becomes a list of their string forms
    /// - any other scalar becomes a text section
    pub fn report(&mut self, value: &Value, title: Option<&str>) {
        if let Some(title) = title {
            self.heading(title, 2);
        }
        match value {
            Value::Object(map) => {
                let items = map
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, scalar_string(value)))
                    .collect();
                self.list(items);
            }
            Value::Array(elements) => match elements.first() {
                Some(Value::Object(first)) => {
                    let headers: Vec<String> = first.keys().cloned().collect();
                    let rows = elements
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|row| {
                            headers
                                .iter()
                                .map(|h| row.get(h).map(scalar_string).unwrap_or_default())
                                .collect()
                        })
                        .collect();
                    self.table(headers, rows);
                }
                Some(_) => {
                    self.list(elements.iter().map(scalar_string).collect());
                }
                None => {}
            },
            scalar => self.text(scalar_string(scalar)),
        }
    }

    /// Number of sections appended so far
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Hand the ordered section sequence to the caller
    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_order() {
        let mut report = Report::new();
        report.heading("Overview", 1);
        report.text("all good");
        report.info("checked");
        report.code("SELECT 1", Some("sql".into()));

        let sections = report.into_sections();
        assert_eq!(sections.len(), 4);
        assert!(matches!(sections[0], Section::Heading { level: 1, .. }));
        assert!(matches!(sections[3], Section::Code { .. }));
    }

    #[test]
    fn test_empty_table_and_list_append_nothing() {
        let mut report = Report::new();
        report.table(vec!["Name".into(), "Value".into()], vec![]);
        report.list(vec![]);
        assert!(report.is_empty());

        report.table(
            vec!["Name".into(), "Value".into()],
            vec![
                vec!["foo".into(), "1".into()],
                vec!["bar".into(), "2".into()],
            ],
        );
        let sections = report.into_sections();
        assert_eq!(sections.len(), 1);
        assert!(matches!(&sections[0], Section::Table { rows, .. } if rows.len() == 2));
    }

    #[test]
    fn test_report_mapping() {
        let mut report = Report::new();
        report.report(&json!({"count": 5, "name": "test"}), Some("Test Report"));

        let sections = report.into_sections();
        assert_eq!(sections.len(), 2);
        assert!(matches!(&sections[0], Section::Heading { text, level: 2 } if text == "Test Report"));
        match &sections[1] {
            Section::List { items } => {
                assert!(items.iter().any(|i| i.contains("count")));
                assert!(items.contains(&"count: 5".to_string()));
                assert!(items.contains(&"name: test".to_string()));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_report_sequence_of_mappings() {
        let mut report = Report::new();
        report.report(
            &json!([{"name": "foo", "value": 1}, {"name": "bar", "value": 2}]),
            Some("Items"),
        );

        let sections = report.into_sections();
        assert_eq!(sections.len(), 2);
        match &sections[1] {
            Section::Table { headers, rows } => {
                assert_eq!(headers, &vec!["name".to_string(), "value".to_string()]);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0], vec!["foo".to_string(), "1".to_string()]);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_report_sequence_of_scalars() {
        let mut report = Report::new();
        report.report(&json!([1, 2, 3]), None);

        let sections = report.into_sections();
        assert_eq!(sections.len(), 1);
        assert!(matches!(
            &sections[0],
            Section::List { items } if items == &vec!["1".to_string(), "2".to_string(), "3".to_string()]
        ));
    }

    #[test]
    fn test_report_scalar() {
        let mut report = Report::new();
        report.report(&json!(42), None);

        let sections = report.into_sections();
        assert_eq!(
            sections,
            vec![Section::Text { content: "42".into() }]
        );
    }
}
