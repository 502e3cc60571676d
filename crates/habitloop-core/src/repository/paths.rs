//! Document store paths owned by a signed-in user.

pub const USERS_COLLECTION: &str = "users";
pub const HABITS_COLLECTION: &str = "habits";

pub fn user_document(uid: &str) -> String {
    format!("{USERS_COLLECTION}/{uid}")
}

pub fn habits_collection(uid: &str) -> String {
    format!("{USERS_COLLECTION}/{uid}/{HABITS_COLLECTION}")
}

pub fn habit_document(uid: &str, habit_id: &str) -> String {
    format!("{}/{habit_id}", habits_collection(uid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(user_document("u1"), "users/u1");
        assert_eq!(habits_collection("u1"), "users/u1/habits");
        assert_eq!(habit_document("u1", "h9"), "users/u1/habits/h9");
    }
}
