//! Event type configuration model and lint findings.
//!
//! The input side ([`EventType`] and its parts) mirrors the JSON the broker
//! returns for an event type. Every field except `name` may be missing, and
//! `authorization`/`schema` treat any JSON-falsy value as "not configured".
//! Fields no rule reads accept any JSON type; a value of the wrong type is
//! read as unset. A `schema` that is truthy but not an object counts as a
//! schema block without a body.
//!
//! The output side ([`Issue`], [`ValidationResult`]) is the wire contract
//! with the UI, which keys its behaviour off the numeric [`IssueType`] code.

use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base URL of the broker user manual.
const MANUAL: &str = "https://nakadi.io/manual.html";

/// Base URL of the REST API guidelines the naming and category rules follow.
const GUIDELINES: &str = "http://zalando.github.io/restful-api-guidelines/";

// ============================================================================
// Input model
// ============================================================================

/// A single access-control entry, e.g. `{"data_type": "user", "value": "jdoe"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationAttribute {
    #[serde(default, deserialize_with = "lenient")]
    pub data_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub value: String,
}

impl AuthorizationAttribute {
    /// Value granting access to anyone holding a valid token.
    pub const WILDCARD: &'static str = "*";

    /// Returns `true` if this entry is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.value == Self::WILDCARD
    }
}

/// Access-control lists attached to an event type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(default, deserialize_with = "null_as_default")]
    pub admins: Vec<AuthorizationAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub writers: Vec<AuthorizationAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub readers: Vec<AuthorizationAttribute>,
}

/// Schema block of an event type.
///
/// `schema` holds the raw JSON value rather than a `String` so that a
/// schema body of the wrong JSON type can be reported as empty instead of
/// failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTypeSchema {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl EventTypeSchema {
    /// Returns the JSON-encoded schema body if it is a string.
    pub fn body(&self) -> Option<&str> {
        self.schema.as_ref().and_then(Value::as_str)
    }
}

/// An event type definition as submitted by a user or returned by the broker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    pub name: String,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub owning_application: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_strategy: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub partition_key_fields: Vec<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub enrichment_strategies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering_key_fields: Option<Vec<String>>,

    #[serde(default, deserialize_with = "falsy_as_none")]
    pub authorization: Option<Authorization>,

    #[serde(default, deserialize_with = "schema_block")]
    pub schema: Option<EventTypeSchema>,
}

impl EventType {
    /// Creates an event type with only a name; everything else unconfigured.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn partition_strategy(&self) -> Option<&str> {
        self.partition_strategy.as_deref()
    }

    pub fn compatibility_mode(&self) -> Option<&str> {
        self.compatibility_mode.as_deref()
    }
}

/// JSON truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn falsy_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !is_truthy(&value) {
        return Ok(None);
    }
    T::deserialize(value).map(Some).map_err(de::Error::custom)
}

/// A truthy non-object `schema` is kept as a block with no body.
fn schema_block<'de, D>(deserializer: D) -> Result<Option<EventTypeSchema>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => EventTypeSchema::deserialize(value)
            .map(Some)
            .map_err(de::Error::custom),
        other if is_truthy(&other) => Ok(Some(EventTypeSchema::default())),
        _ => Ok(None),
    }
}

/// Reads `T` if the value has the right shape, otherwise `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Findings
// ============================================================================

/// The rule group an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueGroup {
    Security,
    Schema,
    Misc,
}

impl fmt::Display for IssueGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Security => write!(f, "security"),
            Self::Schema => write!(f, "schema"),
            Self::Misc => write!(f, "misc"),
        }
    }
}

/// Stable issue codes, grouped by hundreds.
///
/// These values are a wire contract: never renumber or reuse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum IssueType {
    SecurityNotSet = 100,
    SecurityAdminsNotSet = 101,
    SecurityWritersNotSet = 102,
    SecurityReadersNotSet = 104,

    SchemaIsEmpty = 200,
    SchemaNotAJson = 201,
    SchemaHasNoProperties = 202,
    SchemaCombined = 203,

    MiscUndefinedCategory = 300,
    MiscDataNotHash = 301,
    MiscSchemaNotCompatible = 302,
    MiscNameIsNotLowercase = 303,
    MiscNameContainsVersion = 304,
    MiscAudienceNotSet = 305,
    MiscOrderingKeyFieldsNotSet = 306,
}

impl IssueType {
    /// Every issue type, in code order.
    pub const ALL: [IssueType; 15] = [
        Self::SecurityNotSet,
        Self::SecurityAdminsNotSet,
        Self::SecurityWritersNotSet,
        Self::SecurityReadersNotSet,
        Self::SchemaIsEmpty,
        Self::SchemaNotAJson,
        Self::SchemaHasNoProperties,
        Self::SchemaCombined,
        Self::MiscUndefinedCategory,
        Self::MiscDataNotHash,
        Self::MiscSchemaNotCompatible,
        Self::MiscNameIsNotLowercase,
        Self::MiscNameContainsVersion,
        Self::MiscAudienceNotSet,
        Self::MiscOrderingKeyFieldsNotSet,
    ];

    /// Numeric code sent to the UI.
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Looks up an issue type by its numeric code.
    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    /// Upper-snake-case constant name, e.g. `SECURITY_NOT_SET`.
    pub fn code_name(self) -> &'static str {
        match self {
            Self::SecurityNotSet => "SECURITY_NOT_SET",
            Self::SecurityAdminsNotSet => "SECURITY_ADMINS_NOT_SET",
            Self::SecurityWritersNotSet => "SECURITY_WRITERS_NOT_SET",
            Self::SecurityReadersNotSet => "SECURITY_READERS_NOT_SET",
            Self::SchemaIsEmpty => "SCHEMA_IS_EMPTY",
            Self::SchemaNotAJson => "SCHEMA_NOT_A_JSON",
            Self::SchemaHasNoProperties => "SCHEMA_HAS_NO_PROPERTIES",
            Self::SchemaCombined => "SCHEMA_COMBINED",
            Self::MiscUndefinedCategory => "MISC_UNDEFINED_CATEGORY",
            Self::MiscDataNotHash => "MISC_DATA_NOT_HASH",
            Self::MiscSchemaNotCompatible => "MISC_SCHEMA_NOT_COMPATIBLE",
            Self::MiscNameIsNotLowercase => "MISC_NAME_IS_NOT_LOWERCASE",
            Self::MiscNameContainsVersion => "MISC_NAME_CONTAINS_VERSION",
            Self::MiscAudienceNotSet => "MISC_AUDIENCE_NOT_SET",
            Self::MiscOrderingKeyFieldsNotSet => "MISC_ORDERING_KEY_FIELDS_NOT_SET",
        }
    }

    pub fn group(self) -> IssueGroup {
        match self.id() / 100 {
            1 => IssueGroup::Security,
            2 => IssueGroup::Schema,
            _ => IssueGroup::Misc,
        }
    }

    /// Severity used unless a rule computes its own.
    pub fn default_severity(self) -> u8 {
        match self {
            Self::SecurityNotSet => 100,
            Self::SecurityAdminsNotSet => 60,
            Self::SecurityWritersNotSet => 40,
            // Not having a readers list is reported for visibility only.
            Self::SecurityReadersNotSet => 0,
            Self::SchemaIsEmpty | Self::SchemaNotAJson | Self::SchemaHasNoProperties => 100,
            Self::SchemaCombined => 10,
            Self::MiscUndefinedCategory | Self::MiscDataNotHash => 20,
            Self::MiscSchemaNotCompatible => 30,
            Self::MiscNameIsNotLowercase | Self::MiscNameContainsVersion => 10,
            Self::MiscAudienceNotSet | Self::MiscOrderingKeyFieldsNotSet => 20,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::SecurityNotSet => "No authorization configured",
            Self::SecurityAdminsNotSet => {
                "Anyone can change or delete this event type configuration"
            }
            Self::SecurityWritersNotSet => "Anyone can publish events to this event type",
            Self::SecurityReadersNotSet => "Anyone can consume events from this event type",
            Self::SchemaIsEmpty => "No schema or empty schema configured",
            Self::SchemaNotAJson => "The schema is not in a valid JSON format",
            Self::SchemaHasNoProperties => "The schema does not describe any properties",
            Self::SchemaCombined => "The schema is too complex",
            Self::MiscUndefinedCategory => "Ensure Events conform to a well-known Event Category",
            Self::MiscDataNotHash => "Use the hash partition strategy for Data Change Events",
            Self::MiscSchemaNotCompatible => " Use compatible for compatibility_mode",
            Self::MiscNameIsNotLowercase => "Event type name contains uppercase symbols",
            Self::MiscNameContainsVersion => "Avoid Versioning",
            Self::MiscAudienceNotSet => "No audience configured",
            Self::MiscOrderingKeyFieldsNotSet => "No ordering key fields configured",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::SecurityNotSet => {
                "This event type is not secured with authorization. Everyone with a valid access \
                 token can modify your event type configuration and access your data. Please \
                 update your event type configuration and configure proper access rights."
            }
            Self::SecurityAdminsNotSet => {
                "There are no entries in the admins list of this event type. Everyone with a \
                 valid access token can modify your event type configuration and access your \
                 data.\nPlease update your event type configuration and configure proper access \
                 rights."
            }
            Self::SecurityWritersNotSet => {
                "There are no entries in the list of writers of this event type. Everyone with a \
                 valid access token can publish events to this event type. This could cause data \
                 integrity problems for the consumers or malicious data could be injected.\n\
                 Please update your event type configuration and configure proper access rights."
            }
            Self::SecurityReadersNotSet => {
                "There are no entries in the list of readers of this event type. Everyone with a \
                 valid access token can consume events from this event type and can access \
                 potentially confidential data.\nPlease update your event type configuration and \
                 configure proper access rights."
            }
            Self::SchemaIsEmpty => "Please create a proper schema with a list of properties.",
            Self::SchemaNotAJson => "Please update the schema with a valid JSON.",
            Self::SchemaHasNoProperties => {
                "Please update the schema with event property descriptions"
            }
            Self::SchemaCombined => {
                "Please update the schema without usage of disjunctive formats \
                 (anyOf,oneOf,allOf,not). It is easier to understand, and helps the services as \
                 the data lake to flatten the data of an event."
            }
            Self::MiscUndefinedCategory => {
                "The \"undefined\" category should not be used in production,it can be used only \
                 for development or in some rare exceptional use-cases. Please recreate the event \
                 type and use \"business\" or \"data\" category."
            }
            Self::MiscDataNotHash => {
                "This ensures data changes arrive at the same partition for a given entity and \
                 can be consumed effectively by clients. Please update the event type and set \
                 \"hash\" partition strategy."
            }
            Self::MiscSchemaNotCompatible => {
                "Changes to events must be based around making additive and backward compatible \
                 changes. Please update the event type and change compatibility_mode to \
                 \"compatible\"."
            }
            Self::MiscNameIsNotLowercase => {
                "Event type names should be lowercase words and numbers, using hyphens, \
                 underscores or periods as separators. Please re-create or clone the event type \
                 with the better name."
            }
            Self::MiscNameContainsVersion => {
                "When changing your event schema, do so in a compatible way and avoid generating \
                 additional event types. Please re-create or clone the event type with a \
                 compliant name and use the schema evolution."
            }
            Self::MiscAudienceNotSet => {
                "The audience tells consumers who is expected to read this event type. Please \
                 update the event type and set the audience, e.g. \"component-internal\" or \
                 \"company-internal\"."
            }
            Self::MiscOrderingKeyFieldsNotSet => {
                "Without ordering key fields consumers cannot restore the order of events for a \
                 given entity. Please update the event type and set the ordering_key_fields."
            }
        }
    }

    /// Documentation link, if the rule has one.
    pub fn link(self) -> Option<String> {
        match self {
            Self::SecurityNotSet
            | Self::SecurityAdminsNotSet
            | Self::SecurityWritersNotSet
            | Self::SecurityReadersNotSet => Some(format!("{MANUAL}#using_authorization")),
            Self::SchemaIsEmpty => Some(format!("{GUIDELINES}#210")),
            Self::SchemaNotAJson | Self::SchemaHasNoProperties | Self::SchemaCombined => None,
            Self::MiscUndefinedCategory => Some(format!("{GUIDELINES}#198")),
            Self::MiscDataNotHash => Some(format!("{GUIDELINES}#204")),
            Self::MiscSchemaNotCompatible => Some(format!("{GUIDELINES}#209")),
            Self::MiscNameIsNotLowercase => Some(format!("{GUIDELINES}#213")),
            Self::MiscNameContainsVersion => Some(format!("{GUIDELINES}#113")),
            Self::MiscAudienceNotSet | Self::MiscOrderingKeyFieldsNotSet => {
                Some(format!("{MANUAL}#using_event-types"))
            }
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.id())
    }
}

impl Serialize for IssueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.id())
    }
}

impl<'de> Deserialize<'de> for IssueType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = u16::deserialize(deserializer)?;
        Self::from_id(id).ok_or_else(|| de::Error::custom(format!("unknown issue id {id}")))
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub group: IssueGroup,
    pub severity: u8,
}

impl Issue {
    /// Builds an issue from its type's fixed texts with the given severity.
    pub fn new(issue_type: IssueType, severity: u8) -> Self {
        Self {
            id: issue_type,
            title: issue_type.title().to_string(),
            message: issue_type.message().to_string(),
            link: issue_type.link(),
            group: issue_type.group(),
            severity,
        }
    }
}

impl From<IssueType> for Issue {
    fn from(issue_type: IssueType) -> Self {
        Self::new(issue_type, issue_type.default_severity())
    }
}

/// Result of linting one event type.
///
/// `issues` is in rule evaluation order, not sorted by severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub name: String,
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            issues: Vec::new(),
        }
    }

    /// Returns the issue with the given type, if present.
    pub fn issue(&self, issue_type: IssueType) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == issue_type)
    }

    pub fn has_issue(&self, issue_type: IssueType) -> bool {
        self.issue(issue_type).is_some()
    }

    /// Numeric codes of all issues, in emission order.
    pub fn ids(&self) -> Vec<u16> {
        self.issues.iter().map(|issue| issue.id.id()).collect()
    }

    /// Issues belonging to one group, in emission order.
    pub fn issues_in(&self, group: IssueGroup) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.group == group)
    }

    pub fn max_severity(&self) -> Option<u8> {
        self.issues.iter().map(|issue| issue.severity).max()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
