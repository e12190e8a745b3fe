//! Line commands understood by the terminal driver

use std::str::FromStr;

use otp_core::Channel;
use otp_shared::phone::normalize_mobile_input;

pub const HELP: &str = "\
Commands:
  send <mobile number> [sms|whatsapp]   Request a code (default: whatsapp)
  verify <code>                          Submit the code you received
  resend <sms|whatsapp>                  Resend the code once the timer allows
  status                                 Show the current state
  reset                                  Start over
  signout                                Start over and forget the session
  help                                   Show this help
  quit                                   Exit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send { mobile_number: String, channel: Channel },
    Verify { code: String },
    Resend { channel: Channel },
    Status,
    Reset,
    SignOut,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Err("Type a command, or 'help'".to_string());
        }
        let verb = words.remove(0).to_lowercase();

        match verb.as_str() {
            "send" | "login" => {
                // A trailing channel is optional; everything else is the number
                let channel = match words.last().map(|w| w.parse::<Channel>()) {
                    Some(Ok(channel)) => {
                        words.pop();
                        channel
                    }
                    _ => Channel::default(),
                };
                if words.is_empty() {
                    return Err("Usage: send <mobile number> [sms|whatsapp]".to_string());
                }
                Ok(Command::Send {
                    mobile_number: normalize_mobile_input(&words.concat()),
                    channel,
                })
            }
            "verify" => match words.as_slice() {
                [code] => Ok(Command::Verify {
                    code: code.to_string(),
                }),
                _ => Err("Usage: verify <code>".to_string()),
            },
            "resend" => match words.as_slice() {
                [channel] => Ok(Command::Resend {
                    channel: channel.parse()?,
                }),
                [] => Ok(Command::Resend {
                    channel: Channel::default(),
                }),
                _ => Err("Usage: resend <sms|whatsapp>".to_string()),
            },
            "status" => Ok(Command::Status),
            "reset" | "back" => Ok(Command::Reset),
            "signout" | "logout" => Ok(Command::SignOut),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}', try 'help'", other)),
        }
    }
}
