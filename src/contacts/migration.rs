pub fn create_contacts_tables_migration() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        type TEXT,
        status TEXT NOT NULL DEFAULT 'Lead',
        tags TEXT DEFAULT '[]',
        comments TEXT,
        score DOUBLE PRECISION,
        provider TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    );

    CREATE INDEX IF NOT EXISTS idx_contacts_user ON contacts(user_id);
    CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email);
    CREATE INDEX IF NOT EXISTS idx_contacts_status ON contacts(status);

    CREATE TABLE IF NOT EXISTS contact_interactions (
        id UUID PRIMARY KEY,
        contact_id UUID NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        occurred_at TIMESTAMPTZ NOT NULL,
        duration BIGINT,
        score DOUBLE PRECISION,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_contact_interactions_contact
        ON contact_interactions(contact_id, occurred_at DESC);
    "#
}
