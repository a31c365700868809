//! # source_digest
//!
//! Fetch structured items (headlines, event listings, prices) from several
//! independent sources, tolerate any subset of them failing, and merge the
//! survivors into one timestamped report rendered as JSON, Markdown and a
//! static HTML dashboard.
//!
//! ## Architecture
//!
//! 1. **Sources** ([`sources`]): each adapter fetches one page and runs it
//!    through an ordered, first-match [`extract::RuleSet`]
//! 2. **Aggregation** ([`aggregator`]): every registered adapter is invoked
//!    under its own timeout; each produces exactly one outcome
//! 3. **Report** ([`models`]): outcomes in registration order plus derived
//!    counters, immutable once assembled
//! 4. **Output** ([`outputs`]): pure renderers of the report
//!
//! ## Example
//!
//! ```no_run
//! use source_digest::aggregator::Aggregator;
//! use source_digest::extract::{ItemPolicy, RuleSet, SelectorRule};
//! use source_digest::sources::WebSource;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let board = WebSource::from_fixture(
//!     "Board",
//!     "https://news.example.com/",
//!     r#"<h3><a href="/a">A headline worth reading</a></h3>"#,
//!     RuleSet::new().with(SelectorRule::new("h3 a")),
//!     ItemPolicy::default(),
//! )?;
//! let report = Aggregator::builder().register_adapter(board)?.build().run().await;
//! assert_eq!(report.total_items(), 1);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod models;
pub mod outputs;
pub mod sources;
pub mod utils;
