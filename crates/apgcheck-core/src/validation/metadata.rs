//! Typed view of `metadata.json`.

use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Value;

use super::schema::FieldKind;
use super::schema::FormatVersion;

/// Parsed `metadata.json`.
///
/// Every field is optional at the parsing stage so that absent keys can be
/// reported together by [`missing_fields`](Self::missing_fields). A value of
/// the wrong JSON type is still a parse error. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageMetadata {
    /// Package name.
    pub name: Option<String>,
    /// Package version string, kept verbatim.
    pub version: Option<String>,
    /// One-line description.
    pub description: Option<String>,
    /// Maintainer contact.
    pub maintainer: Option<String>,
    /// Project homepage.
    pub homepage: Option<String>,
    /// Package type (format 2).
    #[serde(rename = "type")]
    pub package_type: Option<String>,
    /// Runtime dependencies.
    pub dependencies: Option<Vec<String>>,
    /// Conflicting packages.
    pub conflicts: Option<Vec<String>>,
    /// Virtual packages provided.
    pub provides: Option<Vec<String>>,
    /// Packages replaced.
    pub replaces: Option<Vec<String>>,
    /// Free-form tags (format 2).
    pub tags: Option<Vec<String>>,
    /// Configuration files (format 2).
    pub conf: Option<Vec<String>>,
    /// Target architecture.
    pub architecture: Option<String>,
    /// License identifier.
    pub license: Option<String>,
}

/// Borrowed value of one metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// String field.
    Scalar(Option<&'a str>),
    /// List-of-strings field.
    List(Option<&'a [String]>),
}

impl FieldValue<'_> {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Scalar(_) => FieldKind::Scalar,
            Self::List(_) => FieldKind::List,
        }
    }

    /// Returns `true` if the value counts as missing.
    ///
    /// Empty strings are missing, empty lists are not.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_none_or(str::is_empty),
            Self::List(value) => value.is_none(),
        }
    }
}

impl PackageMetadata {
    /// Parses `metadata.json` bytes.
    ///
    /// A `null` document is an empty record, so every required field is
    /// reported missing. Arrays and bare values are rejected.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON, an array or scalar
    /// root, or a field of the wrong type.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            return Err(serde_json::Error::custom(format!(
                "metadata root must be a JSON object, found {}",
                json_type(&value)
            )));
        }
        serde_json::from_value(value)
    }

    /// Looks up a field by its JSON key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "name" => FieldValue::Scalar(self.name.as_deref()),
            "version" => FieldValue::Scalar(self.version.as_deref()),
            "description" => FieldValue::Scalar(self.description.as_deref()),
            "maintainer" => FieldValue::Scalar(self.maintainer.as_deref()),
            "homepage" => FieldValue::Scalar(self.homepage.as_deref()),
            "type" => FieldValue::Scalar(self.package_type.as_deref()),
            "architecture" => FieldValue::Scalar(self.architecture.as_deref()),
            "license" => FieldValue::Scalar(self.license.as_deref()),
            "dependencies" => FieldValue::List(self.dependencies.as_deref()),
            "conflicts" => FieldValue::List(self.conflicts.as_deref()),
            "provides" => FieldValue::List(self.provides.as_deref()),
            "replaces" => FieldValue::List(self.replaces.as_deref()),
            "tags" => FieldValue::List(self.tags.as_deref()),
            "conf" => FieldValue::List(self.conf.as_deref()),
            _ => return None,
        };
        Some(value)
    }

    /// Returns every required field of `version` that is missing, in
    /// descriptor order.
    #[must_use]
    pub fn missing_fields(&self, version: FormatVersion) -> Vec<&'static str> {
        version
            .required_fields()
            .filter(|required| {
                self.field(required.name)
                    .is_none_or(|value| value.kind() != required.kind || value.is_missing())
            })
            .map(|required| required.name)
            .collect()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
