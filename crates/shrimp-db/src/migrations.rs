use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (ledger, settings, cooldowns)");
        conn.execute_batch(
            "
            CREATE TABLE accounts (
                channel     TEXT NOT NULL,
                username    TEXT NOT NULL,
                points      INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (channel, username)
            );

            CREATE INDEX idx_accounts_leaderboard
                ON accounts(channel, points DESC);

            CREATE TABLE channel_settings (
                channel         TEXT PRIMARY KEY,
                currency_name   TEXT NOT NULL,
                reward_amount   INTEGER NOT NULL
            );

            CREATE TABLE rob_cooldowns (
                channel     TEXT NOT NULL,
                robber      TEXT NOT NULL,
                victim      TEXT NOT NULL,
                robbed_at   INTEGER NOT NULL,
                PRIMARY KEY (channel, robber, victim)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (inventory, polls, bets)");
        conn.execute_batch(
            "
            CREATE TABLE inventory (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                channel     TEXT NOT NULL,
                username    TEXT NOT NULL,
                item        TEXT NOT NULL,
                rarity      TEXT NOT NULL,
                obtained_at INTEGER NOT NULL
            );

            CREATE INDEX idx_inventory_owner
                ON inventory(channel, username, obtained_at);

            CREATE TABLE polls (
                channel     TEXT PRIMARY KEY,
                question    TEXT NOT NULL,
                options     TEXT NOT NULL
            );

            CREATE TABLE bets (
                channel     TEXT NOT NULL,
                username    TEXT NOT NULL,
                answer      TEXT NOT NULL,
                amount      INTEGER NOT NULL,
                PRIMARY KEY (channel, username)
            );

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
