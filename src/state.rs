use std::sync::Arc;

use crate::services::AgentService;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<AgentService>,
}
