//! Display grouping of fields into sections.

use crate::types::FormField;

/// Section for fields that name none
pub const DEFAULT_SECTION: &str = "General Information";

/// A run of fields rendered under one heading
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    /// Heading text
    pub name: &'a str,
    /// Fields in schema order
    pub fields: Vec<&'a FormField>,
}

/// Partition fields by section
///
/// Sections appear in the order their first field appears; fields keep
/// schema order within a section. A blank section name falls into
/// [`DEFAULT_SECTION`].
#[must_use]
pub fn group_by_section(fields: &[FormField]) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();

    for field in fields {
        let name = field
            .section
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SECTION);

        match sections.iter_mut().find(|s| s.name == name) {
            Some(section) => section.fields.push(field),
            None => sections.push(Section {
                name,
                fields: vec![field],
            }),
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldId, FieldType};

    fn field(id: &str, section: Option<&str>) -> FormField {
        let mut field = FormField::new(FieldId::from(id), FieldType::Text, 0);
        field.section = section.map(str::to_string);
        field
    }

    #[test]
    fn sections_in_first_seen_order() {
        let fields = vec![
            field("f1", Some("Contact")),
            field("f2", None),
            field("f3", Some("Contact")),
            field("f4", Some("")),
            field("f5", Some("Dietary")),
        ];

        let sections = group_by_section(&fields);

        let shape: Vec<(&str, Vec<&str>)> = sections
            .iter()
            .map(|s| (s.name, s.fields.iter().map(|f| f.id.as_str()).collect()))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("Contact", vec!["f1", "f3"]),
                (DEFAULT_SECTION, vec!["f2", "f4"]),
                ("Dietary", vec!["f5"]),
            ]
        );
    }

    #[test]
    fn empty_form_has_no_sections() {
        assert!(group_by_section(&[]).is_empty());
    }
}
