//! Parsing of the loosely-typed values chat bots pass in query strings.

use std::str::FromStr;

use thiserror::Error;

use crate::models::Poll;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Wager must be a positive number or 'all'")]
    BadWager,
    #[error("Wager must be positive")]
    NonPositiveWager,
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("Missing {0}")]
    MissingName(&'static str),
    #[error("Poll needs a question and at least two options: question | a | b")]
    BadPoll,
}

/// A wager as typed in chat: a number or everything the user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wager {
    All,
    Amount(i64),
}

impl Wager {
    /// Resolves to a concrete amount given the user's current balance.
    pub fn resolve(self, balance: i64) -> i64 {
        match self {
            Wager::All => balance,
            Wager::Amount(n) => n,
        }
    }
}

impl FromStr for Wager {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Wager::All);
        }
        let amount: i64 = s.parse().map_err(|_| InputError::BadWager)?;
        if amount <= 0 {
            return Err(InputError::NonPositiveWager);
        }
        Ok(Wager::Amount(amount))
    }
}

/// Trims, drops a leading `@` or `#`, and lowercases a user or channel name.
pub fn normalize_name(raw: &str, what: &'static str) -> Result<String, InputError> {
    let name = raw.trim().trim_start_matches(['@', '#']).trim().to_lowercase();
    if name.is_empty() {
        return Err(InputError::MissingName(what));
    }
    Ok(name)
}

pub fn positive_amount(amount: i64) -> Result<i64, InputError> {
    if amount <= 0 {
        return Err(InputError::NonPositiveAmount);
    }
    Ok(amount)
}

/// Parses `question | option | option ...`. Empty options are dropped and
/// duplicates (ignoring case) collapse to the first spelling.
pub fn parse_poll(raw: &str) -> Result<Poll, InputError> {
    let mut parts = raw.split('|').map(str::trim);
    let question = parts.next().filter(|q| !q.is_empty()).ok_or(InputError::BadPoll)?;

    let mut options: Vec<String> = Vec::new();
    for option in parts.filter(|o| !o.is_empty()) {
        if !options.iter().any(|o| o.eq_ignore_ascii_case(option)) {
            options.push(option.to_string());
        }
    }
    if options.len() < 2 {
        return Err(InputError::BadPoll);
    }

    Ok(Poll {
        question: question.to_string(),
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wager_parsing() {
        assert_eq!("50".parse::<Wager>(), Ok(Wager::Amount(50)));
        assert_eq!(" ALL ".parse::<Wager>(), Ok(Wager::All));
        assert_eq!("0".parse::<Wager>(), Err(InputError::NonPositiveWager));
        assert_eq!("-5".parse::<Wager>(), Err(InputError::NonPositiveWager));
        assert_eq!("lots".parse::<Wager>(), Err(InputError::BadWager));
    }

    #[test]
    fn wager_all_resolves_to_balance() {
        assert_eq!(Wager::All.resolve(1234), 1234);
        assert_eq!(Wager::Amount(10).resolve(1234), 10);
    }

    #[test]
    fn names_are_normalized() {
        assert_eq!(normalize_name(" @ShrimpLord ", "user").unwrap(), "shrimplord");
        assert_eq!(normalize_name("#Channel", "channel").unwrap(), "channel");
        assert_eq!(normalize_name("  @ ", "user"), Err(InputError::MissingName("user")));
    }

    #[test]
    fn poll_parsing() {
        let poll = parse_poll("Who wins? | Red | blue | RED | ").unwrap();
        assert_eq!(poll.question, "Who wins?");
        assert_eq!(poll.options, vec!["Red".to_string(), "blue".to_string()]);
        assert_eq!(poll.find_option("BLUE"), Some("blue"));
        assert_eq!(poll.find_option("green"), None);

        assert_eq!(parse_poll("Only one | yes"), Err(InputError::BadPoll));
        assert_eq!(parse_poll(" | a | b"), Err(InputError::BadPoll));
    }
}
