//! Results of multi-step ledger operations. Each variant other than the
//! success case means nothing was written.

use thiserror::Error;

/// A credit would push a balance past `i64::MAX`. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{user} can't hold any more points")]
pub struct BalanceOverflow {
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobOutcome {
    /// Seconds until this robber may hit this victim again (always > 0).
    Cooldown { remaining_secs: i64 },
    VictimBroke,
    Stolen {
        amount: i64,
        robber_balance: i64,
        victim_balance: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrateOutcome {
    InsufficientFunds { balance: i64 },
    Opened { balance: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetOutcome {
    NoPoll,
    UnknownAnswer { options: Vec<String> },
    InsufficientFunds { balance: i64 },
    Placed {
        /// The option as declared in the poll.
        answer: String,
        balance: i64,
        /// Stake of the bet this one replaced, already refunded.
        replaced: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayupOutcome {
    NoPoll,
    UnknownAnswer { options: Vec<String> },
    Settled {
        answer: String,
        /// (username, amount credited)
        winners: Vec<(String, i64)>,
    },
}
