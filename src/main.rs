//! Terminal front end for the tour chat session
//!
//! Prints the conversation as it changes and reads user input line by line.
//! A number picks one of the current options; `/reset`, `/summary`, `/plan`
//! and `/quit` are commands; anything else is sent as free text.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tour_chat::chat::{ChatService, Package};
use tour_chat::flow::selections_summary;
use tour_chat::state_machine::Role;
use tour_chat::trip::{answers_from_selections, submit_custom_trip, ContactDetails};
use tour_chat::{
    spawn_session, ClientConfig, HttpChatService, LoggingService, SessionContext, SessionHandle,
    SessionHandleError, SessionState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tour_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(api_url = %config.api_url, "Connecting to tour chat service");

    let service = Arc::new(LoggingService::new(HttpChatService::new(&config)?));
    let handle = spawn_session(
        Arc::clone(&service),
        SessionContext::new(config.reset_delay),
    );

    tokio::spawn(render(handle.subscribe()));
    handle.initialize().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input == "/plan" {
            plan_trip(service.as_ref(), &handle.snapshot(), &mut lines).await?;
            continue;
        }

        let result = match input {
            "/quit" => break,
            "/reset" => handle.reset().await,
            "/summary" => {
                print_summary(&handle.snapshot());
                Ok(())
            }
            _ => dispatch_input(&handle, input).await,
        };

        match result {
            Ok(()) => {}
            Err(SessionHandleError::Rejected(e)) => println!("  ({e})"),
            Err(e @ SessionHandleError::Closed) => return Err(e.into()),
        }
    }

    Ok(())
}

async fn dispatch_input(handle: &SessionHandle, input: &str) -> Result<(), SessionHandleError> {
    let picked = input.parse::<usize>().ok().and_then(|n| {
        handle
            .snapshot()
            .current_options
            .and_then(|options| options.into_iter().nth(n.checked_sub(1)?))
    });

    match picked {
        Some(option) => handle.select_option(option).await,
        None => handle.send_message(input, false).await,
    }
}

/// Collect contact details and submit the flow answers as a custom trip request
async fn plan_trip<S>(
    service: &S,
    state: &SessionState,
    lines: &mut Lines<BufReader<Stdin>>,
) -> std::io::Result<()>
where
    S: ChatService + ?Sized,
{
    let answers = answers_from_selections(&state.selections);
    let contact = ContactDetails {
        name: prompt(lines, "Name").await?,
        phone: prompt(lines, "Phone").await?,
        email: prompt(lines, "Email").await?,
        notes: Some(prompt(lines, "Notes (optional)").await?),
    };

    match submit_custom_trip(service, answers, contact).await {
        Ok(receipt) => {
            println!("  {}", receipt.message);
            if let Some(id) = receipt.request_id {
                println!("  Reference: {id}");
            }
        }
        Err(e) => println!("  [!] {e}"),
    }
    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> std::io::Result<String> {
    println!("  {label}:");
    Ok(lines.next_line().await?.unwrap_or_default().trim().to_string())
}

/// Print everything new each time the session changes
async fn render(mut rx: watch::Receiver<SessionState>) {
    let mut last_epoch = 0;
    let mut printed = 0;
    let mut was_loading = false;

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();

        if state.epoch != last_epoch {
            last_epoch = state.epoch;
            printed = 0;
            println!("\n--- new conversation ---");
        }

        for message in state.messages.iter().skip(printed) {
            match message.role {
                Role::User => println!("you > {}", message.content),
                Role::Bot => {
                    println!("bot > {}", message.content);
                    if let Some(packages) = &message.packages {
                        print_packages(packages);
                    }
                }
            }
        }
        printed = state.messages.len();

        if state.is_loading && !was_loading {
            println!("  ...");
        }
        was_loading = state.is_loading;

        if state.is_loading {
            continue;
        }
        if let Some(error) = state.error {
            println!("  [!] {error}");
        }
        if let Some(options) = &state.current_options {
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {}", i + 1, option.label);
            }
        }
    }
}

fn print_packages(packages: &[Package]) {
    if packages.is_empty() {
        println!("  (no packages)");
    }
    for package in packages {
        println!(
            "  * {} - {} days, ${:.0} pp ({})",
            package.name, package.duration, package.price, package.region
        );
    }
}

fn print_summary(state: &SessionState) {
    let lines = selections_summary(&state.selections);
    if lines.is_empty() {
        println!("  No selections yet");
    }
    for line in lines {
        println!("  {line}");
    }
}
