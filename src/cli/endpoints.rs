//! todo endpoints command: show the resolved endpoint registry.

use crate::endpoints::Endpoints;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::task::{load_config, ContextOptions};

pub struct EndpointsOptions {
    pub ctx: ContextOptions,
}

pub fn run(options: EndpointsOptions) -> Result<()> {
    let config = load_config(&options.ctx)?;
    let endpoints = Endpoints::new(&config.server.origin);

    let mut human = HumanOutput::new("Endpoints");
    human.push_summary("Server", config.server.origin.clone());
    for (name, url) in endpoints.entries() {
        human.push_detail(format!("{name}: {url}"));
    }

    emit_success(options.ctx.output(), "endpoints", &endpoints, Some(&human))
}
