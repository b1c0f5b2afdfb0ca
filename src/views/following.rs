use crate::aggregator::{self, FollowedAccount};
use crate::error::Result;
use crate::templates;
use crate::views::AppState;
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Debug, Serialize)]
struct FollowingPage<'a> {
    name: &'a str,
    accounts: Vec<FollowedAccount>,
}

/// Most followed first. Stable, so ties stay in fetch order.
pub fn sort_by_followers(accounts: &mut [FollowedAccount]) {
    accounts.sort_by_key(|account| Reverse(account.followers));
}

pub async fn render(state: &AppState, handle: &str) -> Result<String> {
    let mut accounts = aggregator::fetch_following(state.source.as_ref(), handle).await?;
    sort_by_followers(&mut accounts);

    state.templates.render(
        templates::FOLLOWING,
        &FollowingPage {
            name: handle,
            accounts,
        },
    )
}
