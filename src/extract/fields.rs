use serde::Serialize;

use super::error::ExtractError;
use super::table::LogicalRow;

pub const ACTIONS_HEADER: &str = "Actions";

/// The columns an action table must carry. Any other columns are ignored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColumnRole {
    Action,
    Description,
    AccessLevel,
    ResourceTypes,
    ConditionKeys,
    DependentActions,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 6] = [
        Self::Action,
        Self::Description,
        Self::AccessLevel,
        Self::ResourceTypes,
        Self::ConditionKeys,
        Self::DependentActions,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Self::Action => ACTIONS_HEADER,
            Self::Description => "Description",
            Self::AccessLevel => "Access level",
            Self::ResourceTypes => "Resource types (*required)",
            Self::ConditionKeys => "Condition keys",
            Self::DependentActions => "Dependent actions",
        }
    }
}

/// Column positions for every [`ColumnRole`], resolved once per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [usize; 6],
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self, ExtractError> {
        let mut positions = [0_usize; 6];
        for (slot, role) in positions.iter_mut().zip(ColumnRole::ALL) {
            *slot = headers
                .iter()
                .position(|header| header == role.header())
                .ok_or(ExtractError::FieldMissing { column: role })?;
        }
        Ok(Self { positions })
    }

    pub fn position(&self, role: ColumnRole) -> usize {
        self.positions[role as usize]
    }

    fn field<'a>(&self, row: &'a LogicalRow, role: ColumnRole) -> Result<&'a str, ExtractError> {
        row.values()
            .get(self.position(role))
            .map(String::as_str)
            .ok_or(ExtractError::FieldMissing { column: role })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub name: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAction {
    pub action_name: String,
    pub description: String,
    pub access_level: String,
    pub permission_only: bool,
    pub resources: Vec<ResourceRef>,
    pub condition_keys: Vec<String>,
    pub dependent_actions: Vec<String>,
}

pub fn normalize(row: &LogicalRow, columns: &ColumnMap) -> Result<NormalizedAction, ExtractError> {
    let (action_name, permission_only) = split_action_field(columns.field(row, ColumnRole::Action)?);
    if action_name.is_empty() {
        return Err(ExtractError::ActionMissing);
    }

    Ok(NormalizedAction {
        action_name,
        permission_only,
        description: collapse_whitespace(columns.field(row, ColumnRole::Description)?),
        access_level: columns.field(row, ColumnRole::AccessLevel)?.to_string(),
        resources: columns
            .field(row, ColumnRole::ResourceTypes)?
            .split_whitespace()
            .map(parse_resource_token)
            .collect(),
        condition_keys: split_tokens(columns.field(row, ColumnRole::ConditionKeys)?),
        dependent_actions: split_tokens(columns.field(row, ColumnRole::DependentActions)?),
    })
}

/// `"s3:GetObject [permission only]"` -> `("s3:GetObject", true)`.
pub fn split_action_field(text: &str) -> (String, bool) {
    let mut tokens = text.split_whitespace();
    let name = tokens.next().unwrap_or_default().to_string();
    (name, tokens.next().is_some())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn parse_resource_token(token: &str) -> ResourceRef {
    ResourceRef {
        name: token.trim_matches('*').to_string(),
        required: token.ends_with('*'),
    }
}

fn split_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(ToOwned::to_owned).collect()
}
