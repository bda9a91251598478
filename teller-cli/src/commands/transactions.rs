//! Transactions command - list one page of transaction history

use anyhow::Result;

use super::{get_context, print_slice_json, slice_outcome};
use crate::output::print_transactions;

pub async fn run(page: u32, limit: Option<u32>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let limit = limit.unwrap_or(ctx.config.page_size);
    let state = ctx.accounts.fetch_transactions(page, limit).await;

    if json {
        return print_slice_json(state);
    }

    print_transactions(&state);
    slice_outcome(&state)
}
