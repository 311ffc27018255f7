pub const SCHEMA: &str = r#"
-- Single-use signing challenges, one live row per wallet address
CREATE TABLE IF NOT EXISTS auth_nonces (
    address TEXT PRIMARY KEY,
    nonce TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- Content items; versioning lives in the content system, not here
CREATE TABLE IF NOT EXISTS seeds (
    seed_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author_address TEXT,          -- NULL = no recognized author yet
    created_at TEXT DEFAULT (datetime('now'))
);

-- Claimable handles; owner_address is set exactly once, by the claim flow
CREATE TABLE IF NOT EXISTS hashnames (
    hashname_id INTEGER PRIMARY KEY AUTOINCREMENT,
    handle TEXT NOT NULL UNIQUE,  -- canonical form: '#'-prefixed, lowercase
    owner_address TEXT,           -- NULL = unclaimed
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Attachment proposals; at most one pending row per (seed, hashname) pair,
-- enforced by the workflow rather than a constraint
CREATE TABLE IF NOT EXISTS attachment_requests (
    request_id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_id INTEGER NOT NULL REFERENCES seeds(seed_id) ON DELETE CASCADE,
    hashname_id INTEGER NOT NULL REFERENCES hashnames(hashname_id) ON DELETE CASCADE,
    requester_address TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT DEFAULT (datetime('now')),
    resolved_at TEXT,
    decision_note TEXT
);

-- Approved associations; the pair is the natural key and inserts are
-- INSERT OR IGNORE, so duplicate approval is not an error
CREATE TABLE IF NOT EXISTS attachments (
    seed_id INTEGER NOT NULL REFERENCES seeds(seed_id) ON DELETE CASCADE,
    hashname_id INTEGER NOT NULL REFERENCES hashnames(hashname_id) ON DELETE CASCADE,
    attached_by_address TEXT NOT NULL,
    attached_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (seed_id, hashname_id)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_requests_pair ON attachment_requests(seed_id, hashname_id);
CREATE INDEX IF NOT EXISTS idx_requests_hashname_status ON attachment_requests(hashname_id, status);
CREATE INDEX IF NOT EXISTS idx_attachments_hashname ON attachments(hashname_id);
"#;
