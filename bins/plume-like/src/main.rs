// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plume like demo
//!
//! Runs one optimistic like button against an in-process mock backend:
//! fires a burst of clicks, waits for the newest one to settle, and reports
//! what the user sees next to what the server holds.

mod store;

use anyhow::Result;
use clap::Parser;
use plume_app_core::config::ConfigService;
use plume_app_core::format::format_count;
use plume_app_core::notice::NoticeBoard;
use plume_app_core::settings::{BlogSettings, SETTINGS_KEY};
use plume_config_fs::FsConfigStore;
use plume_optimistic::{ActionState, Coordinator, NoticeObserver, WithTimeout};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use store::MockLikeStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Post to like
    #[arg(long, default_value = "post-1")]
    post: String,
    /// Like count when the page loaded
    #[arg(long, default_value_t = 10)]
    likes: u64,
    /// Whether the post was already liked when the page loaded
    #[arg(long)]
    liked: bool,
    /// Number of clicks in the burst
    #[arg(long, default_value_t = 3)]
    clicks: u32,
    /// Pause between clicks, in milliseconds
    #[arg(long, default_value_t = 40)]
    click_gap_ms: u64,
    /// Base backend latency, in milliseconds
    #[arg(long, default_value_t = 500)]
    latency_ms: u64,
    /// Make every Nth backend request fail (0 = never)
    #[arg(long, default_value_t = 0)]
    fail_every: u64,
    /// Ignore saved settings and use built-in defaults
    #[arg(long)]
    no_config: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    app: String,
    post: String,
    shown: ActionState,
    server: Option<ActionState>,
    notices: Vec<String>,
}

fn load_settings(skip: bool) -> BlogSettings {
    if skip {
        return BlogSettings::default();
    }
    let service = match FsConfigStore::new() {
        Ok(store) => ConfigService::new(store),
        Err(err) => {
            warn!(%err, "config dir unavailable, using default settings");
            return BlogSettings::default();
        }
    };
    service.load_or_init(SETTINGS_KEY).unwrap_or_else(|err| {
        warn!(%err, "settings unreadable, using defaults");
        BlogSettings::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(args.no_config);
    info!(api = %settings.api_url, app = %settings.app_name, "settings loaded");

    let initial = ActionState::new(args.liked, args.likes);
    let store = MockLikeStore::new(Duration::from_millis(args.latency_ms))
        .with_post(&args.post, initial)
        .fail_every(args.fail_every);

    let board = Arc::new(Mutex::new(NoticeBoard::new(settings.notice_capacity)));
    let likes = Coordinator::builder(initial)
        .label(format!("{}/like", args.post))
        .observer(NoticeObserver::new(
            Arc::clone(&board),
            "Failed to toggle like",
            settings.notice_ttl(),
        ))
        .build(WithTimeout::new(
            store.confirm_for(&args.post),
            settings.confirm_timeout(),
        ));

    for click in 0..args.clicks {
        let trigger = likes.trigger();
        info!(
            click,
            generation = %trigger.generation(),
            shown = %format_count(likes.state().count),
            liked = likes.state().active,
            "click"
        );
        tokio::time::sleep(Duration::from_millis(args.click_gap_ms)).await;
    }

    let shown = likes.idle().await;
    let notices = board
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .visible(Instant::now())
        .into_iter()
        .map(|n| match n.body {
            Some(body) => format!("{}: {body}", n.title),
            None => n.title,
        })
        .collect();
    let report = Report {
        app: settings.app_name,
        post: args.post.clone(),
        shown,
        server: store.get(&args.post),
        notices,
    };
    print_report(&report, args.json)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    let status = if report.shown.active { "liked" } else { "not liked" };
    println!(
        "{} | {}: {status}, {} likes",
        report.app,
        report.post,
        format_count(report.shown.count)
    );
    if let Some(server) = report.server {
        if server != report.shown {
            println!("  server holds {}, view will catch up on refresh", server);
        }
    }
    for notice in &report.notices {
        println!("  ! {notice}");
    }
    Ok(())
}
