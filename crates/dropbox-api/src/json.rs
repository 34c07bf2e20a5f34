//! Lenient decoders for request body fields.

use serde::{Deserialize, Deserializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
  Int(i64),
  Text(String),
}

/// Accept an integer id written either as a JSON number or as a numeric
/// string, so `5` and `"5"` both decode to `Some(5)`. `null` decodes to
/// `None`; pair with `#[serde(default)]` for absent fields.
pub fn lenient_id<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<IdRepr>::deserialize(de)? {
    None => Ok(None),
    Some(IdRepr::Int(id)) => Ok(Some(id)),
    Some(IdRepr::Text(s)) => s
      .trim()
      .parse()
      .map(Some)
      .map_err(|_| D::Error::custom(format!("expected an integer id, got {s:?}"))),
  }
}
