use serde::de::DeserializeOwned;

use crate::error::DenormalizeError;
use crate::record::Record;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

/// Hand a denormalized record to an ordinary serde type. Every field has
/// already been coerced, so failures here are shape mismatches between the
/// record and `T` (a missing field, an enum tag, a narrower integer).
pub fn from_record_with_path<T: DeserializeOwned>(record: &Record) -> Result<T, DenormalizeError> {
    let json = serde_json::to_value(record).map_err(|e| DenormalizeError::Deserialize {
        path: String::new(),
        message: e.to_string(),
    })?;
    serde_path_to_error::deserialize::<_, T>(json).map_err(|err| DenormalizeError::Deserialize {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
