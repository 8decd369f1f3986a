use crate::reply::Reply;
use crate::state::AppState;
use rollcall_core::Identity;

/// `/ignore`: list with no argument, add `@handle` tokens, otherwise clear.
pub fn ignore(state: &mut AppState, args: &str) -> Vec<Reply> {
    if args.trim().is_empty() {
        let listing = if state.ignored.is_empty() {
            "No ignored users.".to_string()
        } else {
            state
                .ignored
                .iter()
                .map(Identity::as_str)
                .collect::<Vec<_>>()
                .join("\n")
        };
        return vec![Reply::text(format!("Currently ignored users:\n{listing}"))];
    }

    let tokens = Identity::tokens_in(args);
    if tokens.is_empty() {
        // Text without any handle clears the list.
        state.ignored.clear();
        tracing::info!("Ignore list cleared");
        return vec![Reply::text("Ignore list cleared.")];
    }

    let named: Vec<&str> = tokens.iter().map(Identity::as_str).collect();
    let reply = format!("Added to ignore list: {}", named.join(", "));
    let added = state.ignored.add(tokens);
    tracing::info!("Ignoring {} more identities", added.len());
    vec![Reply::text(reply)]
}
