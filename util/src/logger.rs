// Copyright 2018 The Grin Developers
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging wrapper to be used throughout all crates in the workspace.
//! This crate only ever installs a `log` subscriber; it never assumes
//! ownership of process-wide concerns like panic hooks, which belong to
//! the embedding application, not a consensus library.

use std::sync::Once;

use log::{trace, LevelFilter, Record};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::{threshold::ThresholdFilter, Filter, Response};

use crate::types::{LogLevel, LoggingConfig};

static INIT: Once = Once::new();

const LOGGING_PATTERN: &str = "{d(%Y%m%d %H:%M:%S%.3f)} {h({l})} {M} - {m}{n}";

fn convert_log_level(in_level: &LogLevel) -> LevelFilter {
	match *in_level {
		LogLevel::Info => LevelFilter::Info,
		LogLevel::Warning => LevelFilter::Warn,
		LogLevel::Debug => LevelFilter::Debug,
		LogLevel::Trace => LevelFilter::Trace,
		LogLevel::Error => LevelFilter::Error,
	}
}

/// Rejects log records that don't originate from one of our own crates, to
/// keep test output readable when run alongside dependencies that also log.
#[derive(Debug)]
struct ClaimtrieFilter;

impl Filter for ClaimtrieFilter {
	fn filter(&self, record: &Record<'_>) -> Response {
		match record.module_path() {
			Some(path) if path.starts_with("claimtrie") => Response::Neutral,
			_ => Response::Reject,
		}
	}
}

/// Initialize the logger with the given configuration. Safe to call more
/// than once; only the first call takes effect.
pub fn init_logger(config: LoggingConfig) {
	INIT.call_once(|| {
		let level_stdout = convert_log_level(&config.stdout_log_level);
		let level_file = convert_log_level(&config.file_log_level);
		let level_minimum = level_stdout.max(level_file);

		let mut root = Root::builder();
		let mut appenders = vec![];

		if config.log_to_stdout {
			let stdout = ConsoleAppender::builder()
				.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
				.build();
			appenders.push(
				Appender::builder()
					.filter(Box::new(ThresholdFilter::new(level_stdout)))
					.filter(Box::new(ClaimtrieFilter))
					.build("stdout", Box::new(stdout)),
			);
			root = root.appender("stdout");
		}

		if config.log_to_file {
			if let Ok(file) = FileAppender::builder()
				.append(config.log_file_append)
				.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
				.build(&config.log_file_path)
			{
				appenders.push(
					Appender::builder()
						.filter(Box::new(ThresholdFilter::new(level_file)))
						.filter(Box::new(ClaimtrieFilter))
						.build("file", Box::new(file)),
				);
				root = root.appender("file");
			}
		}

		if let Ok(built) = Config::builder()
			.appenders(appenders)
			.build(root.build(level_minimum))
		{
			let _ = log4rs::init_config(built);
		}

		trace!("logger initialized, min level: {:?}", level_minimum);
	});
}

/// Initializes a stdout-only, debug-level logger for unit and integration
/// tests.
pub fn init_test_logger() {
	let mut config = LoggingConfig::default();
	config.log_to_file = false;
	config.stdout_log_level = LogLevel::Debug;
	init_logger(config);
}
