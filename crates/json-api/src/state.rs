//! State

use std::sync::Arc;

use stocksync_app::context::AppContext;

use crate::auth::ApiToken;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Token required on `/api` routes, if any.
    pub(crate) api_token: Option<ApiToken>,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, api_token: Option<ApiToken>) -> Self {
        Self { app, api_token }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, api_token: Option<ApiToken>) -> Arc<Self> {
        Arc::new(Self::new(app, api_token))
    }
}
