//! OTP login terminal driver
//!
//! Reads commands from stdin and drives one login flow against the
//! configured backend.

mod commands;
mod logging;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use otp_core::{FlowConfig, FlowState, OtpFlow, OtpGateway, Phase, SessionStore};
use otp_infra::gateway::create_gateway;
use otp_infra::session::create_session_store;
use otp_shared::phone::{country_label, display_masked_mobile, DEFAULT_COUNTRY_CODE};

use commands::{Command, HELP};

type Flow = OtpFlow<dyn OtpGateway, dyn SessionStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = otp_infra::load_config().context("Failed to load configuration")?;
    logging::init(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting OTP login client"
    );

    let gateway = create_gateway(&config.gateway).context("Failed to create OTP gateway")?;
    let sessions = create_session_store(&config.session, &config.cache)
        .await
        .context("Failed to create session store")?;
    let flow: Flow = OtpFlow::new(
        gateway,
        sessions,
        FlowConfig::from_settings(&config.flow, &config.session),
    );

    println!("{}", HELP);
    prompt(&flow);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt(&flow);
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => run(&flow, command).await,
            Err(message) => println!("{}", message),
        }
        prompt(&flow);
    }

    flow.reset();
    info!("OTP login client stopped");
    Ok(())
}

async fn run(flow: &Flow, command: Command) {
    match command {
        Command::Send {
            mobile_number,
            channel,
        } => match flow.request_code(&mobile_number, channel).await {
            Ok(notice) => {
                println!("{}", notice);
                println!(
                    "OTP sent via {} on {}",
                    channel.display_name(),
                    display_masked_mobile(&mobile_number, DEFAULT_COUNTRY_CODE)
                );
            }
            Err(e) => println!("Error: {}", e),
        },
        Command::Verify { code } => match flow.verify_code(&code).await {
            Ok(notice) => println!("{}. You are signed in.", notice),
            Err(e) => println!("Error: {}", e),
        },
        Command::Resend { channel } => match flow.resend(channel).await {
            Ok(notice) => println!("{} via {}", notice, channel.display_name()),
            Err(e) => println!("Error: {}", e),
        },
        Command::Status => print_status(&flow.snapshot()),
        Command::Reset => {
            flow.reset();
            println!("Start over: enter your mobile number");
        }
        Command::SignOut => match flow.sign_out().await {
            Ok(()) => println!("Signed out"),
            Err(e) => println!("Error: {}", e),
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn print_status(state: &FlowState) {
    println!("Phase: {}", state.phase);

    if let Some(mobile) = &state.mobile_number {
        println!(
            "Mobile: {} ({})",
            display_masked_mobile(mobile, DEFAULT_COUNTRY_CODE),
            country_label(DEFAULT_COUNTRY_CODE).unwrap_or("Unknown")
        );
    }
    if let Some(pending) = &state.pending {
        println!(
            "Code sent via {}, {} failed attempt(s)",
            pending.issued_channel.display_name(),
            pending.verify_attempts
        );
    }
    if state.phase == Phase::AwaitingCode {
        if state.cooldown_seconds > 0 {
            println!("Resend available in {}s", state.cooldown_seconds);
        } else {
            println!("Resend available");
        }
    }
    if let Some(message) = &state.last_message {
        println!("Last message: {}", message);
    }
    if let Some(error) = &state.last_error {
        println!("Last error: {} ({})", error.message, error.kind.code());
    }
}

fn prompt(flow: &Flow) {
    let hint = match flow.phase() {
        Phase::Idle => "send <mobile number> [sms|whatsapp]",
        Phase::Sending | Phase::Verifying => "please wait",
        Phase::AwaitingCode => "verify <code>",
        Phase::Authenticated => "signed in; signout or quit",
        Phase::Failed => "too many attempts; reset to start over",
    };
    println!("[{}] {}", flow.phase(), hint);
}
