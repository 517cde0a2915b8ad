// Copyright 2025 Loglens Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Loglens Core
//!
//! Data model and stateless transforms for the log ingestion pipeline:
//! line classification, file parsing, summarization, and the canonical
//! text projection used as embedding input.

pub mod classifier;
pub mod entry;
pub mod parser;
pub mod projection;
pub mod summary;

pub use classifier::{LineClassifier, LEVEL_VOCABULARY};
pub use entry::{LogEntry, LogSummary, UNKNOWN_LEVEL};
pub use parser::{parse_log_file, parse_text};
pub use projection::project;
pub use summary::summarize;
