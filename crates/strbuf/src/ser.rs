use serde::{Serialize, Serializer};

use crate::StringBuffer;

/// Serializes the written bytes, without the terminator.
impl Serialize for StringBuffer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}
