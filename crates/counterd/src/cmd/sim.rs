//! `counterd sim` - simulated traffic generator
//!
//! Generates events against a running server for testing and
//! benchmarking. With `--from`/`--to` a fixed number of events is spread
//! evenly across the range; without, events stream continuously until
//! interrupted. Each event picks a random value for every attribute key.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use counterd_client::{Client, ClientOptions, Event};
use rand::seq::SliceRandom;
use tracing::info;
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct SimArgs {
    /// Target API address
    #[arg(long, default_value = "http://127.0.0.1:8001")]
    pub address: String,

    /// Bearer token to use
    #[arg(long)]
    pub auth: Option<String>,

    /// Starting range of the date interval, RFC 3339; requires --to
    #[arg(long)]
    pub from: Option<String>,

    /// Ending range of the date interval, RFC 3339; requires --from
    #[arg(long)]
    pub to: Option<String>,

    /// Number of events to generate across the range
    #[arg(long, default_value_t = 1000)]
    pub num: usize,

    /// Possible attribute pair as key=value; repeat to add keys or values
    #[arg(short = 'a', long = "attribute", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub attributes: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("no '=' value in arg: {raw}")),
    }
}

pub async fn run(args: SimArgs) -> Result<()> {
    let client = Client::new(
        args.address.as_str(),
        ClientOptions {
            auth_token: args.auth.clone(),
        },
    )
    .context("failed to setup client")?;

    // Group attribute values under their keys
    let mut attributes: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in &args.attributes {
        attributes.entry(key.clone()).or_default().push(value.clone());
    }

    match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let from: DateTime<Utc> = from
                .parse()
                .context("failed to parse from date")?;
            let to: DateTime<Utc> = to.parse().context("failed to parse to date")?;
            if from > to {
                bail!("from must be before the to time");
            }
            if args.num == 0 {
                bail!("must have a non-zero number of events");
            }
            send_range(&client, from, to, args.num, &attributes).await
        }
        (None, None) => send_continuous(&client, &attributes).await,
        _ => bail!("--from and --to must be provided together"),
    }
}

/// Send a fixed number of events evenly spaced across a date range
async fn send_range(
    client: &Client,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    num: usize,
    attributes: &HashMap<String, Vec<String>>,
) -> Result<()> {
    let delta = (to - from) / num as i32;
    let prefix = id_prefix();
    let mut current = from;

    for counter in 0..num {
        let mut event = Event::new(format!("{prefix}{counter}"));
        event.date = Some(current);
        fill_attributes(&mut event, attributes);
        current += delta;

        client
            .send_event(&event)
            .await
            .context("failed to send event")?;
        log_progress(counter + 1);
    }
    Ok(())
}

/// Send events until interrupted
async fn send_continuous(
    client: &Client,
    attributes: &HashMap<String, Vec<String>>,
) -> Result<()> {
    let prefix = id_prefix();
    let mut counter: usize = 0;

    loop {
        let mut event = Event::new(format!("{prefix}{counter}"));
        fill_attributes(&mut event, attributes);
        counter += 1;

        client
            .send_event(&event)
            .await
            .context("failed to send event")?;
        log_progress(counter);
    }
}

/// Pick a random value for every attribute key
fn fill_attributes(event: &mut Event, attributes: &HashMap<String, Vec<String>>) {
    let mut rng = rand::thread_rng();
    for (key, values) in attributes {
        if let Some(value) = values.choose(&mut rng) {
            event.attributes.insert(key.clone(), value.clone());
        }
    }
}

/// Distinct prefix per run so repeated runs contribute new IDs
fn id_prefix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..9].to_string()
}

fn log_progress(sent: usize) {
    if sent % 1000 == 0 {
        info!(sent, "sent events");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("color=red"),
            Ok(("color".to_string(), "red".to_string()))
        );
        assert_eq!(
            parse_key_value("color=red=ish"),
            Ok(("color".to_string(), "red=ish".to_string()))
        );
        assert!(parse_key_value("color").is_err());
    }

    #[test]
    fn test_id_prefix_is_distinct() {
        let a = id_prefix();
        let b = id_prefix();
        assert_eq!(a.len(), 9);
        assert_ne!(a, b);
    }
}
