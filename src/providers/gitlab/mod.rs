mod allocation;
mod builder;
mod client;
mod filters;
#[cfg(test)]
mod fixtures;
mod grouping;
mod links;
mod merge_requests;
mod rows;
mod source;
mod types;
mod window;

pub use allocation::DEFAULT_WORKDAY_HOURS;
pub use builder::{build_with_deadline, BuildOptions, ReportBuilder};
pub use client::{ClientOptions, GitLabClient};
pub use filters::DEFAULT_EXCLUDED_BRANCHES;
pub use links::LINK_SEPARATOR;
pub use rows::DEFAULT_LINK_PLACEHOLDER;
pub use source::EventSource;
pub use window::ReportWindow;
