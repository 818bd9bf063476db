use serde::{Deserialize, Serialize};

/// Account rank. Admins get the back-office mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Member,
    Admin,
}

/// A registered account. The id doubles as the store key (`users/{id}`),
/// so it is not serialized into the node itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub id: String,
    pub email: String,
    pub password: String,
    pub approved: bool,
    pub points: u32,
    pub rank: Rank,
}

impl User {
    /// A freshly registered account: unapproved, zero points, member rank.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            password: password.into(),
            approved: false,
            points: 0,
            rank: Rank::Member,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.rank == Rank::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Rank::Admin).unwrap(), "admin");
        assert_eq!(serde_json::to_value(Rank::Member).unwrap(), "member");
    }

    #[test]
    fn id_stays_out_of_the_stored_node() {
        let user = User::new("alice", "alice@example.com", "hunter42");
        let node = serde_json::to_value(&user).unwrap();
        assert!(node.get("id").is_none());
        assert_eq!(node["points"], 0);
        assert_eq!(node["approved"], false);
    }
}
