//! Dockhand: a Telegram bot for controlling local containers.
//!
//! Allow-listed users list containers and start, stop, or restart them by id
//! or name. The docker or podman CLI does the actual work.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use dockhand::access::AccessGate;
//! use dockhand::bot::Bot;
//! use dockhand::channel::TelegramChannel;
//! use dockhand::config::load_config;
//! use dockhand::dispatch::CommandDispatcher;
//! use dockhand::runtime::EngineClient;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let engine = EngineClient::detect(&config.runtime).await.unwrap();
//! let dispatcher = CommandDispatcher::new(AccessGate::new(config.allow_list), Arc::new(engine));
//! let channel = TelegramChannel::new(&config.telegram).unwrap();
//! Bot::new(Arc::new(channel), Arc::new(dispatcher))
//!     .run(async { let _ = tokio::signal::ctrl_c().await; })
//!     .await;
//! # }
//! ```

pub mod access;
pub mod bot;
pub mod build_info;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod runtime;
pub mod telemetry;
#[cfg(test)]
pub mod testsupport;
