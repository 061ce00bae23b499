use super::*;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Clone)]
#[serde(untagged)]
pub enum Id {
    #[display("null")]
    Null,
    Number(u64),
    String(String),
}

impl Id {
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.parse().ok(),
            Self::Null => None,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Message {
    Request {
        id: Id,
        method: String,
        params: Value,
    },
    Response {
        id: Id,
        result: Option<Value>,
        error: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none", rename = "reject-reason")]
        reject_reason: Option<String>,
    },
    Notification {
        method: String,
        params: Value,
    },
}

impl Message {
    pub fn request(id: u64, method: &str, params: Value) -> Self {
        Self::Request {
            id: Id::Number(id),
            method: method.into(),
            params,
        }
    }

    /// Serialized without the trailing newline.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<Id>,
    method: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Value,
    #[serde(default, rename = "reject-reason")]
    reject_reason: Option<String>,
}

/// Lines carrying a `method` are requests when they have a non-null id and
/// notifications otherwise. Everything else must look like a response.
impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        let is_response = value.get("method").is_none()
            && ["result", "error", "reject-reason"]
                .iter()
                .any(|key| value.get(key).is_some());

        let envelope = serde_json::from_value::<Envelope>(value).map_err(de::Error::custom)?;

        let some = |value: Value| (!value.is_null()).then_some(value);

        match (envelope.method, envelope.id) {
            (Some(method), None | Some(Id::Null)) => Ok(Self::Notification {
                method,
                params: envelope.params,
            }),
            (Some(method), Some(id)) => Ok(Self::Request {
                id,
                method,
                params: envelope.params,
            }),
            (None, id) if is_response => Ok(Self::Response {
                id: id.unwrap_or(Id::Null),
                result: some(envelope.result),
                error: some(envelope.error),
                reject_reason: envelope.reject_reason,
            }),
            (None, _) => Err(de::Error::custom("unknown message format")),
        }
    }
}
