use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Stored member row including the password hash. Never serialized out.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
