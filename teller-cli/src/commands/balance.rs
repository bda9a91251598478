//! Balance command - fetch the current account balance

use anyhow::Result;

use super::{get_context, print_slice_json, slice_outcome};
use crate::output::print_balance;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let state = ctx.accounts.fetch_balance().await;

    if json {
        return print_slice_json(state);
    }

    print_balance(&state);
    slice_outcome(&state)
}
