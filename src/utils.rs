use std::{fmt::Display, str::FromStr};

use axum::http::{HeaderMap, HeaderValue};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

/// Format used by `<input type="datetime-local">`.
pub const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

/// Blank form fields count as unset.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

pub fn parse_datetime_local(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_LOCAL)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

pub fn format_datetime_local(value: &NaiveDateTime) -> String {
    value.format(DATETIME_LOCAL).to_string()
}

/// Tells htmx to do a full navigation instead of swapping the response in.
pub fn hx_redirect(to: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("HX-Redirect", HeaderValue::from_static(to));
    headers
}

/// Default picture for a volunteer who has not chosen one.
pub fn default_avatar_url(first_name: &str, last_name: &str) -> String {
    let name = format!("{}+{}", first_name.trim(), last_name.trim())
        .replace(char::is_whitespace, "+");
    format!("https://ui-avatars.com/api/?name={name}&background=random")
}
