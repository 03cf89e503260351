//! Route command

use super::Services;
use crate::app::{OutputFormat, QueryArgs};
use crate::output::format_route;
use anyhow::Result;
use campusrag_core::{Config, QueryRouter};

pub async fn run(args: QueryArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");

    let services = Services::connect(config)?;
    let router = QueryRouter::new(services.completer.clone());
    let decision = router.route(&query).await;

    if decision.defaulted {
        eprintln!("Warning: intent could not be classified, using {}", decision.intent);
    }

    print!("{}", format_route(&query, &decision, format));
    Ok(())
}
