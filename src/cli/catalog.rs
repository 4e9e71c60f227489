//! Catalog and schema inspection

use super::Context;
use crate::render;
use anyhow::Result;
use std::process::ExitCode;

/// Run `catalog`
pub fn catalog(ctx: &Context) -> Result<ExitCode> {
    let listing = render::catalog(ctx.pipeline.catalog());
    ctx.pipeline.gate().check_text(&listing)?;
    print!("{listing}");
    Ok(ExitCode::SUCCESS)
}

/// Run `schema`: the default record, a valid `evaluate --facts` input
pub fn schema(ctx: &Context) -> Result<ExitCode> {
    let record = serde_json::to_string_pretty(&ctx.pipeline.schema().defaults().to_json())?;
    ctx.pipeline.gate().check_text(&record)?;
    println!("{record}");
    Ok(ExitCode::SUCCESS)
}
