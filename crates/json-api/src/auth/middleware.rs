//! Auth middleware.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::debug;

use crate::{extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let state = match depot.state_or_500() {
        Ok(state) => state,
        Err(error) => {
            res.render(error);
            ctrl.skip_rest();

            return;
        }
    };

    if let Err(error) = authorize(&state, req) {
        res.render(error);
        ctrl.skip_rest();

        return;
    }

    ctrl.call_next(req, depot, res).await;
}

fn authorize(state: &Arc<State>, req: &Request) -> Result<(), StatusError> {
    let Some(expected) = &state.api_token else {
        return Ok(());
    };

    let Some(token) = extract_bearer_token(req) else {
        return Err(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
    };

    if !expected.matches(token) {
        debug!("rejected api token");

        return Err(StatusError::unauthorized().brief("Invalid API token"));
    }

    Ok(())
}

pub(crate) fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
