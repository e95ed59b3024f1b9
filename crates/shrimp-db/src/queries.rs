use crate::Database;
use crate::models::{BalanceOverflow, BetOutcome, CrateOutcome, PayupOutcome, RobOutcome};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use shrimp_types::models::{ChannelSettings, InventoryItem, LeaderboardEntry, Poll};

impl Database {
    // -- Ledger --

    pub fn get_balance(&self, channel: &str, user: &str) -> Result<i64> {
        self.with_conn(|conn| query_balance(conn, channel, user))
    }

    /// Adds `delta` (which may be negative) and returns the new balance.
    /// The account is created on first use.
    pub fn apply_delta(&self, channel: &str, user: &str, delta: i64) -> Result<i64> {
        self.with_tx(|conn| credit(conn, channel, user, delta))
    }

    /// Subtracts `amount` only if the balance covers it. `None` means the
    /// balance was too low and nothing changed.
    pub fn try_debit(&self, channel: &str, user: &str, amount: i64) -> Result<Option<i64>> {
        self.with_tx(|conn| debit(conn, channel, user, amount))
    }

    /// Takes the wager and pays out in one transaction.
    pub fn settle_wager(
        &self,
        channel: &str,
        user: &str,
        wager: i64,
        payout: i64,
    ) -> Result<Option<i64>> {
        self.with_tx(|conn| {
            if debit(conn, channel, user, wager)?.is_none() {
                return Ok(None);
            }
            credit(conn, channel, user, payout).map(Some)
        })
    }

    /// Credits `amount` to every user. Returns how many accounts were touched.
    pub fn credit_many(&self, channel: &str, users: &[String], amount: i64) -> Result<usize> {
        if users.is_empty() {
            return Ok(0);
        }

        self.with_tx(|conn| {
            for user in users {
                credit(conn, channel, user, amount)?;
            }
            Ok(users.len())
        })
    }

    pub fn leaderboard(&self, channel: &str, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, points FROM accounts
                 WHERE channel = ?1
                 ORDER BY points DESC, username ASC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![channel, limit], |row| {
                    Ok(LeaderboardEntry {
                        user: row.get(0)?,
                        points: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Settings --

    /// Returns the channel's settings, creating the default row on first use.
    pub fn get_settings(&self, channel: &str) -> Result<ChannelSettings> {
        self.with_tx(|conn| {
            ensure_settings(conn, channel)?;
            query_settings(conn, channel)
        })
    }

    pub fn set_currency_name(&self, channel: &str, name: &str) -> Result<ChannelSettings> {
        self.with_tx(|conn| {
            ensure_settings(conn, channel)?;
            conn.execute(
                "UPDATE channel_settings SET currency_name = ?2 WHERE channel = ?1",
                (channel, name),
            )?;
            query_settings(conn, channel)
        })
    }

    pub fn set_reward_amount(&self, channel: &str, amount: i64) -> Result<ChannelSettings> {
        self.with_tx(|conn| {
            ensure_settings(conn, channel)?;
            conn.execute(
                "UPDATE channel_settings SET reward_amount = ?2 WHERE channel = ?1",
                rusqlite::params![channel, amount],
            )?;
            query_settings(conn, channel)
        })
    }

    // -- Robbery --

    /// Cooldown check, balance check and transfer as one transaction.
    /// `pick_amount` receives the victim's (positive) balance and returns the
    /// amount to steal; it is clamped to `1..=balance`.
    pub fn rob<F>(
        &self,
        channel: &str,
        robber: &str,
        victim: &str,
        now: i64,
        cooldown_secs: i64,
        pick_amount: F,
    ) -> Result<RobOutcome>
    where
        F: FnOnce(i64) -> i64,
    {
        self.with_tx(|conn| {
            let last: Option<i64> = conn
                .query_row(
                    "SELECT robbed_at FROM rob_cooldowns
                     WHERE channel = ?1 AND robber = ?2 AND victim = ?3",
                    (channel, robber, victim),
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(robbed_at) = last {
                let elapsed = now - robbed_at;
                if elapsed < cooldown_secs {
                    return Ok(RobOutcome::Cooldown {
                        remaining_secs: cooldown_secs - elapsed,
                    });
                }
            }

            let victim_before = query_balance(conn, channel, victim)?;
            if victim_before <= 0 {
                return Ok(RobOutcome::VictimBroke);
            }

            let amount = pick_amount(victim_before).clamp(1, victim_before);
            let victim_balance = debit(conn, channel, victim, amount)?
                .ok_or_else(|| anyhow!("victim {} balance moved inside transaction", victim))?;
            let robber_balance = credit(conn, channel, robber, amount)?;

            conn.execute(
                "INSERT INTO rob_cooldowns (channel, robber, victim, robbed_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(channel, robber, victim) DO UPDATE SET robbed_at = excluded.robbed_at",
                rusqlite::params![channel, robber, victim, now],
            )?;

            Ok(RobOutcome::Stolen {
                amount,
                robber_balance,
                victim_balance,
            })
        })
    }

    /// Deletes cooldown rows that can no longer block anyone.
    pub fn prune_cooldowns(&self, older_than: i64) -> Result<usize> {
        self.with_tx(|conn| {
            let removed = conn.execute(
                "DELETE FROM rob_cooldowns WHERE robbed_at < ?1",
                [older_than],
            )?;
            Ok(removed)
        })
    }

    // -- Inventory --

    /// Charges `cost` and records the item in the same transaction.
    pub fn open_crate(
        &self,
        channel: &str,
        user: &str,
        cost: i64,
        item: &str,
        rarity: &str,
        now: i64,
    ) -> Result<CrateOutcome> {
        self.with_tx(|conn| {
            let Some(balance) = debit(conn, channel, user, cost)? else {
                return Ok(CrateOutcome::InsufficientFunds {
                    balance: query_balance(conn, channel, user)?,
                });
            };

            conn.execute(
                "INSERT INTO inventory (channel, username, item, rarity, obtained_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![channel, user, item, rarity, now],
            )?;

            Ok(CrateOutcome::Opened { balance })
        })
    }

    /// Newest first.
    pub fn get_inventory(&self, channel: &str, user: &str) -> Result<Vec<InventoryItem>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT item, rarity, obtained_at FROM inventory
                 WHERE channel = ?1 AND username = ?2
                 ORDER BY obtained_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map((channel, user), |row| {
                    Ok(InventoryItem {
                        item: row.get(0)?,
                        rarity: row.get(1)?,
                        obtained_at: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Prediction market --

    /// Replaces the channel's poll. Outstanding bets are refunded and cleared;
    /// returns how many were refunded.
    pub fn start_poll(&self, channel: &str, poll: &Poll) -> Result<usize> {
        let options = serde_json::to_string(&poll.options)?;

        self.with_tx(|conn| {
            let refunded = refund_bets(conn, channel)?;

            conn.execute(
                "INSERT INTO polls (channel, question, options) VALUES (?1, ?2, ?3)
                 ON CONFLICT(channel) DO UPDATE SET question = excluded.question, options = excluded.options",
                (channel, &poll.question, &options),
            )?;

            Ok(refunded)
        })
    }

    pub fn get_poll(&self, channel: &str) -> Result<Option<Poll>> {
        self.with_conn(|conn| query_poll(conn, channel))
    }

    /// One outstanding bet per user: a new bet refunds and replaces the old one.
    pub fn place_bet(
        &self,
        channel: &str,
        user: &str,
        answer: &str,
        amount: i64,
    ) -> Result<BetOutcome> {
        self.with_tx(|conn| {
            let Some(poll) = query_poll(conn, channel)? else {
                return Ok(BetOutcome::NoPoll);
            };
            let Some(answer) = poll.find_option(answer).map(str::to_string) else {
                return Ok(BetOutcome::UnknownAnswer { options: poll.options });
            };

            let replaced: Option<i64> = conn
                .query_row(
                    "SELECT amount FROM bets WHERE channel = ?1 AND username = ?2",
                    (channel, user),
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(stake) = replaced {
                credit(conn, channel, user, stake)?;
            }

            let Some(balance) = debit(conn, channel, user, amount)? else {
                // Undo the refund so the old bet stays exactly as it was.
                if let Some(stake) = replaced {
                    credit(conn, channel, user, -stake)?;
                }
                return Ok(BetOutcome::InsufficientFunds {
                    balance: query_balance(conn, channel, user)?,
                });
            };

            conn.execute(
                "INSERT INTO bets (channel, username, answer, amount) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(channel, username) DO UPDATE SET answer = excluded.answer, amount = excluded.amount",
                rusqlite::params![channel, user, &answer, amount],
            )?;

            Ok(BetOutcome::Placed {
                answer,
                balance,
                replaced,
            })
        })
    }

    /// Pays double to every bettor on `answer`, then closes the poll.
    pub fn payup(&self, channel: &str, answer: &str) -> Result<PayupOutcome> {
        self.with_tx(|conn| {
            let Some(poll) = query_poll(conn, channel)? else {
                return Ok(PayupOutcome::NoPoll);
            };
            let Some(answer) = poll.find_option(answer).map(str::to_string) else {
                return Ok(PayupOutcome::UnknownAnswer { options: poll.options });
            };

            let bets: Vec<(String, i64)> = {
                let mut stmt = conn.prepare(
                    "SELECT username, amount FROM bets
                     WHERE channel = ?1 AND answer = ?2
                     ORDER BY amount DESC, username ASC",
                )?;
                stmt.query_map((channel, &answer), |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };

            let mut winners = Vec::with_capacity(bets.len());
            for (user, stake) in bets {
                let prize = stake
                    .checked_mul(2)
                    .ok_or_else(|| anyhow!("payout overflow for {}", user))?;
                credit(conn, channel, &user, prize)?;
                winners.push((user, prize));
            }

            conn.execute("DELETE FROM bets WHERE channel = ?1", [channel])?;
            conn.execute("DELETE FROM polls WHERE channel = ?1", [channel])?;

            Ok(PayupOutcome::Settled { answer, winners })
        })
    }
}

fn query_balance(conn: &Connection, channel: &str, user: &str) -> Result<i64> {
    let points: Option<i64> = conn
        .query_row(
            "SELECT points FROM accounts WHERE channel = ?1 AND username = ?2",
            (channel, user),
            |row| row.get(0),
        )
        .optional()?;

    Ok(points.unwrap_or(0))
}

/// Fails with [`BalanceOverflow`] instead of letting SQLite widen the sum
/// to REAL.
fn credit(conn: &Connection, channel: &str, user: &str, delta: i64) -> Result<i64> {
    if query_balance(conn, channel, user)?.checked_add(delta).is_none() {
        return Err(BalanceOverflow {
            user: user.to_string(),
        }
        .into());
    }

    let points = conn.query_row(
        "INSERT INTO accounts (channel, username, points) VALUES (?1, ?2, ?3)
         ON CONFLICT(channel, username) DO UPDATE SET points = points + excluded.points
         RETURNING points",
        rusqlite::params![channel, user, delta],
        |row| row.get(0),
    )?;

    Ok(points)
}

/// Single conditional UPDATE; the returned row count decides sufficiency.
fn debit(conn: &Connection, channel: &str, user: &str, amount: i64) -> Result<Option<i64>> {
    conn.query_row(
        "UPDATE accounts SET points = points - ?3
         WHERE channel = ?1 AND username = ?2 AND points >= ?3
         RETURNING points",
        rusqlite::params![channel, user, amount],
        |row| row.get(0),
    )
    .optional()
}

fn ensure_settings(conn: &Connection, channel: &str) -> Result<()> {
    let defaults = ChannelSettings::with_defaults(channel);
    conn.execute(
        "INSERT OR IGNORE INTO channel_settings (channel, currency_name, reward_amount)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![channel, defaults.currency_name, defaults.reward_amount],
    )?;
    Ok(())
}

fn query_settings(conn: &Connection, channel: &str) -> Result<ChannelSettings> {
    let settings = conn.query_row(
        "SELECT channel, currency_name, reward_amount FROM channel_settings WHERE channel = ?1",
        [channel],
        |row| {
            Ok(ChannelSettings {
                channel: row.get(0)?,
                currency_name: row.get(1)?,
                reward_amount: row.get(2)?,
            })
        },
    )?;

    Ok(settings)
}

fn query_poll(conn: &Connection, channel: &str) -> Result<Option<Poll>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT question, options FROM polls WHERE channel = ?1",
            [channel],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    row.map(|(question, options)| -> Result<Poll> {
        Ok(Poll {
            question,
            options: serde_json::from_str(&options)?,
        })
    })
    .transpose()
}

fn refund_bets(conn: &Connection, channel: &str) -> Result<usize> {
    let bets: Vec<(String, i64)> = {
        let mut stmt = conn.prepare("SELECT username, amount FROM bets WHERE channel = ?1")?;
        stmt.query_map([channel], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?
    };

    for (user, stake) in &bets {
        credit(conn, channel, user, *stake)?;
    }
    conn.execute("DELETE FROM bets WHERE channel = ?1", [channel])?;

    Ok(bets.len())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn add_then_points() {
        let db = db();
        assert_eq!(db.get_balance("chan", "alice").unwrap(), 0);
        assert_eq!(db.apply_delta("chan", "alice", 25).unwrap(), 25);
        assert_eq!(db.apply_delta("chan", "alice", 17).unwrap(), 42);
        assert_eq!(db.get_balance("chan", "alice").unwrap(), 42);

        // Balances are per channel
        assert_eq!(db.get_balance("other", "alice").unwrap(), 0);
    }

    #[test]
    fn credit_past_max_is_rejected() {
        let db = db();
        db.apply_delta("chan", "rich", i64::MAX).unwrap();

        let err = db.apply_delta("chan", "rich", 1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BalanceOverflow>(),
            Some(&BalanceOverflow { user: "rich".into() })
        );
        assert_eq!(db.get_balance("chan", "rich").unwrap(), i64::MAX);

        // A batch rolls back as a whole
        let users = vec!["poor".to_string(), "rich".to_string()];
        assert!(db.credit_many("chan", &users, 5).is_err());
        assert_eq!(db.get_balance("chan", "poor").unwrap(), 0);
    }

    #[test]
    fn debit_is_conditional() {
        let db = db();
        db.apply_delta("chan", "bob", 30).unwrap();

        assert_eq!(db.try_debit("chan", "bob", 31).unwrap(), None);
        assert_eq!(db.get_balance("chan", "bob").unwrap(), 30);
        assert_eq!(db.try_debit("chan", "bob", 30).unwrap(), Some(0));
        assert_eq!(db.try_debit("chan", "ghost", 1).unwrap(), None);
    }

    #[test]
    fn settle_wager_applies_net_delta() {
        let db = db();
        db.apply_delta("chan", "carol", 100).unwrap();

        // 2x on a 50 wager
        assert_eq!(db.settle_wager("chan", "carol", 50, 100).unwrap(), Some(150));
        // total loss
        assert_eq!(db.settle_wager("chan", "carol", 150, 0).unwrap(), Some(0));
        // nothing left to wager
        assert_eq!(db.settle_wager("chan", "carol", 1, 2).unwrap(), None);
        assert_eq!(db.get_balance("chan", "carol").unwrap(), 0);
    }

    #[test]
    fn credit_many_touches_every_user() {
        let db = db();
        let users = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(db.credit_many("chan", &users, 5).unwrap(), 3);
        assert_eq!(db.credit_many("chan", &users[..1], 5).unwrap(), 1);
        assert_eq!(db.get_balance("chan", "a").unwrap(), 10);
        assert_eq!(db.get_balance("chan", "c").unwrap(), 5);
        assert_eq!(db.credit_many("chan", &[], 5).unwrap(), 0);
    }

    #[test]
    fn leaderboard_sorted_and_truncated() {
        let db = db();
        assert!(db.leaderboard("chan", 10).unwrap().is_empty());

        db.apply_delta("chan", "low", 1).unwrap();
        db.apply_delta("chan", "high", 300).unwrap();
        db.apply_delta("chan", "mid", 20).unwrap();
        db.apply_delta("chan", "tied", 20).unwrap();
        db.apply_delta("elsewhere", "whale", 9000).unwrap();

        let board = db.leaderboard("chan", 3).unwrap();
        let names: Vec<&str> = board.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "tied"]);
        assert!(board.windows(2).all(|w| w[0].points >= w[1].points));
    }

    #[test]
    fn settings_default_then_update() {
        let db = db();
        let settings = db.get_settings("chan").unwrap();
        assert_eq!(settings, ChannelSettings::with_defaults("chan"));

        db.set_currency_name("chan", "krill").unwrap();
        let settings = db.set_reward_amount("chan", 25).unwrap();
        assert_eq!(settings.currency_name, "krill");
        assert_eq!(settings.reward_amount, 25);
        assert_eq!(db.get_settings("chan").unwrap(), settings);
    }

    #[test]
    fn rob_respects_cooldown() {
        let db = db();
        db.apply_delta("chan", "victim", 100).unwrap();

        let first = db.rob("chan", "robber", "victim", 1_000, 300, |b| b / 4).unwrap();
        assert_eq!(
            first,
            RobOutcome::Stolen { amount: 25, robber_balance: 25, victim_balance: 75 }
        );

        let second = db.rob("chan", "robber", "victim", 1_100, 300, |b| b / 4).unwrap();
        assert_eq!(second, RobOutcome::Cooldown { remaining_secs: 200 });
        assert_eq!(db.get_balance("chan", "victim").unwrap(), 75);

        let third = db.rob("chan", "robber", "victim", 1_300, 300, |b| b / 4).unwrap();
        assert!(matches!(third, RobOutcome::Stolen { amount: 18, .. }));
    }

    #[test]
    fn rob_broke_victim_and_clamping() {
        let db = db();
        assert_eq!(
            db.rob("chan", "robber", "nobody", 0, 300, |_| 5).unwrap(),
            RobOutcome::VictimBroke
        );

        db.apply_delta("chan", "poor", 3).unwrap();
        let outcome = db.rob("chan", "robber", "poor", 0, 300, |_| 0).unwrap();
        assert!(matches!(outcome, RobOutcome::Stolen { amount: 1, victim_balance: 2, .. }));

        db.apply_delta("chan", "rich", 10).unwrap();
        let outcome = db.rob("chan", "robber", "rich", 0, 300, |_| 1_000).unwrap();
        assert!(matches!(outcome, RobOutcome::Stolen { amount: 10, victim_balance: 0, .. }));
    }

    #[test]
    fn prune_removes_only_expired_cooldowns() {
        let db = db();
        db.apply_delta("chan", "v1", 10).unwrap();
        db.apply_delta("chan", "v2", 10).unwrap();
        db.rob("chan", "r", "v1", 100, 300, |_| 1).unwrap();
        db.rob("chan", "r", "v2", 500, 300, |_| 1).unwrap();

        assert_eq!(db.prune_cooldowns(200).unwrap(), 1);
        assert!(matches!(
            db.rob("chan", "r", "v2", 600, 300, |_| 1).unwrap(),
            RobOutcome::Cooldown { .. }
        ));
    }

    #[test]
    fn crate_opening_charges_and_records() {
        let db = db();
        db.apply_delta("chan", "dora", 150).unwrap();

        let outcome = db.open_crate("chan", "dora", 100, "Pearl", "rare", 10).unwrap();
        assert_eq!(outcome, CrateOutcome::Opened { balance: 50 });
        let outcome = db.open_crate("chan", "dora", 100, "Pearl", "rare", 11).unwrap();
        assert_eq!(outcome, CrateOutcome::InsufficientFunds { balance: 50 });

        let items = db.get_inventory("chan", "dora").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item, "Pearl");
        assert_eq!(items[0].rarity, "rare");
    }

    fn sample_poll() -> Poll {
        Poll {
            question: "Who wins?".into(),
            options: vec!["Red".into(), "Blue".into()],
        }
    }

    #[test]
    fn bet_requires_poll_option_and_funds() {
        let db = db();
        db.apply_delta("chan", "eve", 50).unwrap();
        assert_eq!(db.place_bet("chan", "eve", "red", 10).unwrap(), BetOutcome::NoPoll);

        db.start_poll("chan", &sample_poll()).unwrap();
        assert!(matches!(
            db.place_bet("chan", "eve", "green", 10).unwrap(),
            BetOutcome::UnknownAnswer { .. }
        ));
        assert_eq!(
            db.place_bet("chan", "eve", "red", 51).unwrap(),
            BetOutcome::InsufficientFunds { balance: 50 }
        );
        assert_eq!(
            db.place_bet("chan", "eve", "RED", 20).unwrap(),
            BetOutcome::Placed { answer: "Red".into(), balance: 30, replaced: None }
        );
    }

    #[test]
    fn second_bet_replaces_first() {
        let db = db();
        db.apply_delta("chan", "finn", 100).unwrap();
        db.start_poll("chan", &sample_poll()).unwrap();

        db.place_bet("chan", "finn", "red", 40).unwrap();
        assert_eq!(
            db.place_bet("chan", "finn", "blue", 70).unwrap(),
            BetOutcome::Placed { answer: "Blue".into(), balance: 30, replaced: Some(40) }
        );

        // A failed replacement keeps the existing bet
        assert_eq!(
            db.place_bet("chan", "finn", "red", 500).unwrap(),
            BetOutcome::InsufficientFunds { balance: 30 }
        );

        let PayupOutcome::Settled { winners, .. } = db.payup("chan", "blue").unwrap() else {
            panic!("poll should settle");
        };
        assert_eq!(winners, vec![("finn".to_string(), 140)]);
        assert_eq!(db.get_balance("chan", "finn").unwrap(), 170);
    }

    #[test]
    fn payup_pays_double_and_closes_poll() {
        let db = db();
        db.apply_delta("chan", "gus", 100).unwrap();
        db.apply_delta("chan", "hal", 100).unwrap();
        db.start_poll("chan", &sample_poll()).unwrap();
        db.place_bet("chan", "gus", "red", 30).unwrap();
        db.place_bet("chan", "hal", "blue", 60).unwrap();

        assert!(matches!(
            db.payup("chan", "purple").unwrap(),
            PayupOutcome::UnknownAnswer { .. }
        ));

        let outcome = db.payup("chan", "Red").unwrap();
        assert_eq!(
            outcome,
            PayupOutcome::Settled { answer: "Red".into(), winners: vec![("gus".into(), 60)] }
        );
        assert_eq!(db.get_balance("chan", "gus").unwrap(), 130);
        assert_eq!(db.get_balance("chan", "hal").unwrap(), 40);
        assert_eq!(db.get_poll("chan").unwrap(), None);
        assert_eq!(db.payup("chan", "red").unwrap(), PayupOutcome::NoPoll);
    }

    #[test]
    fn new_poll_refunds_open_bets() {
        let db = db();
        db.apply_delta("chan", "ivy", 100).unwrap();
        db.start_poll("chan", &sample_poll()).unwrap();
        db.place_bet("chan", "ivy", "blue", 45).unwrap();

        let next = Poll {
            question: "Next map?".into(),
            options: vec!["Dust".into(), "Nuke".into()],
        };
        assert_eq!(db.start_poll("chan", &next).unwrap(), 1);
        assert_eq!(db.get_balance("chan", "ivy").unwrap(), 100);
        assert_eq!(db.get_poll("chan").unwrap(), Some(next));
    }
}
