pub const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    username TEXT,
    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now()
);
"#;

pub const INSERT_ONE: &str = r#"
INSERT INTO users (username)
VALUES ($1)
RETURNING id;
"#;

pub const SELECT_MANY: &str = r#"
SELECT id, username, created_at
FROM users
ORDER BY created_at DESC
LIMIT $1;
"#;

// Test and reset utility; not reachable over HTTP.
pub const DELETE_MANY: &str = r#"
DELETE FROM users;
"#;
