//! Details form rules: modes, required fields and add-mode defaults.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult, FieldError};
use crate::domain::node::{NodeType, NodeUpdate};

/// Attribute values offered by the form.
pub const HIERARCHY_ATTRIBUTES: [&str; 3] = ["Manufacturer", "Brand", "Model"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    View,
    Edit,
    Add,
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormMode::View => "view",
            FormMode::Edit => "edit",
            FormMode::Add => "add",
        };
        f.write_str(s)
    }
}

impl FromStr for FormMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "view" => Ok(FormMode::View),
            "edit" => Ok(FormMode::Edit),
            "add" => Ok(FormMode::Add),
            other => Err(format!("unknown form mode: {other}")),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Level named by an offered attribute, case-insensitive.
fn attribute_type(attribute: &str) -> Option<NodeType> {
    HIERARCHY_ATTRIBUTES
        .iter()
        .find(|a| a.eq_ignore_ascii_case(attribute.trim()))
        .and_then(|a| a.parse().ok())
}

/// Check the required fields of a submitted payload.
///
/// Returns the level named by `hierarchyAttribute`.
/// View mode never submits, so it is rejected outright.
pub fn validate(payload: &NodeUpdate, mode: FormMode) -> DomainResult<NodeType> {
    if mode == FormMode::View {
        return Err(DomainError::ReadOnly);
    }

    let mut errors = Vec::new();
    let attribute = payload.hierarchy_attribute.as_deref().unwrap_or_default();
    let level = attribute_type(attribute);
    if attribute.trim().is_empty() {
        errors.push(FieldError {
            field: "hierarchyAttribute",
            message: "Hierarchy Attribute is required".into(),
        });
    } else if level.is_none() {
        errors.push(FieldError {
            field: "hierarchyAttribute",
            message: format!(
                "Hierarchy Attribute must be one of {}",
                HIERARCHY_ATTRIBUTES.join(", ")
            ),
        });
    }
    if is_blank(&payload.code) {
        errors.push(FieldError {
            field: "code",
            message: "Hierarchy Code is required".into(),
        });
    }
    if is_blank(&payload.description) {
        errors.push(FieldError {
            field: "description",
            message: "Description is required".into(),
        });
    }

    match level {
        Some(level) if errors.is_empty() => Ok(level),
        _ => Err(DomainError::InvalidForm(errors)),
    }
}

/// Fill what an empty add form starts with: active, effective today.
pub fn apply_add_defaults(mut payload: NodeUpdate, today: NaiveDate) -> NodeUpdate {
    payload.is_active.get_or_insert(true);
    payload.effective_date.get_or_insert(today);
    payload
}
