use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Which side of the dialogue with the generation service sent a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}
