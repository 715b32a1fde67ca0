use std::fmt::{self, Formatter};

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};

/// Represents a Jira issue key like for instance `AB-1`
/// This struct is typically known as a "value object" in other programming languages.
#[derive(Debug, Serialize, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Clone)]
pub struct IssueKey {
    #[serde(rename = "key")]
    pub value: String,
}

impl IssueKey {
    ///
    /// # Panics
    /// If the supplied value is empty
    #[must_use]
    pub fn new(input: &str) -> Self {
        assert!(!input.trim().is_empty(), "IssueKey may not be empty!");
        IssueKey {
            value: input.trim().to_uppercase(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<&str> for IssueKey {
    fn from(value: &str) -> Self {
        IssueKey::new(value)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<'de> Deserialize<'de> for IssueKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IssueKeyVisitor;

        impl<'de> Visitor<'de> for IssueKeyVisitor {
            type Value = IssueKey;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("an issue key string or a map with a key field")
            }

            fn visit_str<E>(self, value: &str) -> Result<IssueKey, E>
            where
                E: de::Error,
            {
                if value.trim().is_empty() {
                    return Err(E::invalid_value(de::Unexpected::Str(value), &self));
                }
                Ok(IssueKey {
                    value: value.to_string(),
                })
            }

            fn visit_map<M>(self, mut map: M) -> Result<IssueKey, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                let mut value: Option<String> = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "key" {
                        if value.is_some() {
                            return Err(de::Error::duplicate_field("key"));
                        }
                        value = Some(map.next_value()?);
                    } else {
                        let _: de::IgnoredAny = map.next_value()?;
                    }
                }
                let value = value.ok_or_else(|| de::Error::missing_field("key"))?;
                self.visit_str(&value)
            }
        }

        deserializer.deserialize_any(IssueKeyVisitor)
    }
}

/// Identity of a workflow status.
///
/// The board configuration endpoint and the issue endpoints do not agree on whether
/// a status id is a JSON string or a number, hence both are accepted and kept as text.
#[derive(Debug, Serialize, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Clone)]
pub struct StatusId(pub String);

impl StatusId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatusId {
    fn from(value: &str) -> Self {
        StatusId(value.to_string())
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StatusId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StatusIdVisitor;

        impl Visitor<'_> for StatusIdVisitor {
            type Value = StatusId;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("a status id as string or integer")
            }

            fn visit_str<E>(self, value: &str) -> Result<StatusId, E>
            where
                E: de::Error,
            {
                Ok(StatusId(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<StatusId, E>
            where
                E: de::Error,
            {
                Ok(StatusId(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<StatusId, E>
            where
                E: de::Error,
            {
                Ok(StatusId(value.to_string()))
            }
        }

        deserializer.deserialize_any(StatusIdVisitor)
    }
}
