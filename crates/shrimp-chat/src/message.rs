//! Just enough IRC line parsing for the NAMES handshake.

/// Sigils Twitch and classic IRC servers prepend to names in a 353 reply.
const ROLE_SIGILS: [char; 5] = ['@', '+', '%', '~', '&'];

/// One server line split into command and parameters. The trailing
/// parameter (after ` :`) is the last element of `params`.
#[derive(Debug, PartialEq, Eq)]
pub struct Message<'a> {
    pub command: &'a str,
    pub params: Vec<&'a str>,
}

impl<'a> Message<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        // IRCv3 tags
        if rest.starts_with('@') {
            rest = rest.split_once(' ')?.1;
        }
        // Source prefix
        if rest.starts_with(':') {
            rest = rest.split_once(' ')?.1;
        }

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (rest, None),
        };
        let mut words = head.split(' ').filter(|w| !w.is_empty());
        let command = words.next()?;

        let mut params: Vec<&str> = words.collect();
        params.extend(trailing);

        Some(Message { command, params })
    }

    pub fn trailing(&self) -> Option<&'a str> {
        self.params.last().copied()
    }
}

/// Names from the trailing parameter of a `353` reply, lowercased and with
/// role sigils removed.
pub fn names_from_reply(trailing: &str) -> impl Iterator<Item = String> + '_ {
    trailing
        .split_whitespace()
        .map(|name| name.trim_start_matches(ROLE_SIGILS).to_lowercase())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_reply() {
        let msg = Message::parse(":me.tmi.twitch.tv 353 me = #chan :@Mod +vip viewer\r\n").unwrap();
        assert_eq!(msg.command, "353");
        assert_eq!(msg.params, vec!["me", "=", "#chan", "@Mod +vip viewer"]);

        let names: Vec<String> = names_from_reply(msg.trailing().unwrap()).collect();
        assert_eq!(names, vec!["mod", "vip", "viewer"]);
    }

    #[test]
    fn parses_ping_and_tagged_lines() {
        let ping = Message::parse("PING :tmi.twitch.tv").unwrap();
        assert_eq!(ping.command, "PING");
        assert_eq!(ping.trailing(), Some("tmi.twitch.tv"));

        let tagged = Message::parse("@badge-info=;color=#FF0000 :a!a@a.tmi.twitch.tv PRIVMSG #chan :hi there").unwrap();
        assert_eq!(tagged.command, "PRIVMSG");
        assert_eq!(tagged.params, vec!["#chan", "hi there"]);

        let end = Message::parse(":tmi.twitch.tv 366 me #chan :End of /NAMES list").unwrap();
        assert_eq!(end.command, "366");
    }

    #[test]
    fn rejects_empty_lines() {
        assert_eq!(Message::parse(""), None);
        assert_eq!(Message::parse(":prefix.only"), None);
    }
}
