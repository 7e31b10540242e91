//! Client platform tags and user-agent detection

use axum::http::{HeaderMap, header::USER_AGENT};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use utoipa::openapi::RefOr;
use utoipa::openapi::schema::{ObjectBuilder, Schema, SchemaType};

/// Proxy client application that decides the artifact format
///
/// The known tags are recognised case-insensitively. Any other tag is kept
/// verbatim in [`Platform::Other`] and left for the artifact producer to
/// interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// Quantumult X
    QX,
    /// Surge
    Surge,
    /// Loon
    Loon,
    /// Clash and Clash-compatible clients (Stash, Shadowrocket)
    Clash,
    /// Internal JSON representation
    #[default]
    Json,
    /// A target tag with no built-in meaning, e.g. `URI` or `Stash`
    Other(String),
}

impl Platform {
    /// Wire tag for this platform
    pub fn as_str(&self) -> &str {
        match self {
            Platform::QX => "QX",
            Platform::Surge => "Surge",
            Platform::Loon => "Loon",
            Platform::Clash => "Clash",
            Platform::Json => "JSON",
            Platform::Other(tag) => tag,
        }
    }

    /// Map a `target` query value onto a platform
    pub fn from_target(target: &str) -> Self {
        match target.to_ascii_lowercase().as_str() {
            "qx" => Platform::QX,
            "surge" => Platform::Surge,
            "loon" => Platform::Loon,
            "clash" => Platform::Clash,
            "json" => Platform::Json,
            _ => Platform::Other(target.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Platform::from_target(s))
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Platform::from_target(&tag))
    }
}

impl<'s> utoipa::ToSchema<'s> for Platform {
    fn schema() -> (&'s str, RefOr<Schema>) {
        (
            "Platform",
            RefOr::T(Schema::Object(
                ObjectBuilder::new()
                    .schema_type(SchemaType::String)
                    .description(Some(
                        "Client platform tag: QX, Surge, Loon, Clash, JSON or any producer-specific tag",
                    ))
                    .example(Some(serde_json::json!("Clash")))
                    .build(),
            )),
        )
    }
}

/// Guess the client platform from request headers
///
/// Rules are checked in priority order against the `User-Agent` value. Returns
/// `None` when no rule matches or the header is missing.
pub fn detect(headers: &HeaderMap) -> Option<Platform> {
    let ua = headers.get(USER_AGENT)?.to_str().ok()?;

    if ua.contains("Quantumult%20X") {
        Some(Platform::QX)
    } else if ua.contains("Surge") {
        Some(Platform::Surge)
    } else if ua.contains("Decar") || ua.contains("Loon") {
        Some(Platform::Loon)
    } else if ua.contains("Stash") || ua.contains("Shadowrocket") {
        Some(Platform::Clash)
    } else {
        None
    }
}
