use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(PersonId);
id_newtype!(PublicationId);
id_newtype!(DeclarationId);
id_newtype!(QuotationId);

/// The entity type currently driving the master/detail relationship between lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Master {
    #[default]
    None,
    Persons,
    Publications,
    Declarations,
    Quotations,
}

impl Master {
    pub const ALL: [Master; 5] = [
        Master::None,
        Master::Persons,
        Master::Publications,
        Master::Declarations,
        Master::Quotations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Master::None => "NONE",
            Master::Persons => "PERSONS",
            Master::Publications => "PUBLICATIONS",
            Master::Declarations => "DECLARATIONS",
            Master::Quotations => "QUOTATIONS",
        }
    }
}

impl fmt::Display for Master {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown master '{0}'")]
pub struct UnknownMaster(pub String);

impl FromStr for Master {
    type Err = UnknownMaster;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Master::ALL
            .into_iter()
            .find(|master| master.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownMaster(trimmed.to_string()))
    }
}

/// The server reports boolean columns either as JSON booleans or as 0/1 integers.
mod flag {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawFlag>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawFlag::Bool(value)) => value,
            Some(RawFlag::Int(value)) => value != 0,
            None => false,
        })
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(*value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Person {
    #[serde(rename = "ID")]
    pub id: PersonId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub rating: i32,
    #[serde(default, with = "flag")]
    pub checked: bool,
    #[serde(default, with = "flag")]
    pub published: bool,
    #[serde(default, with = "flag")]
    pub linked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Publication {
    #[serde(rename = "ID")]
    pub id: PublicationId,
    pub title: String,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub publication_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,
    #[serde(default, with = "flag")]
    pub peer_reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issn_isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed: Option<String>,
    #[serde(default, with = "flag")]
    pub linked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Declaration {
    #[serde(rename = "ID")]
    pub id: DeclarationId,
    #[serde(default)]
    pub r#type: Option<String>,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signatories: Option<String>,
    #[serde(default)]
    pub signatory_count: Option<String>,
    #[serde(default, with = "flag")]
    pub linked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Quotation {
    #[serde(rename = "ID")]
    pub id: QuotationId,
    #[serde(default)]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub author: Option<String>,
    pub text: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, with = "flag")]
    pub linked: bool,
}
